//! Patient-level driver and the worker pool that runs one driver per patient.
//!
//! Patients share nothing: each task parses its own summary, owns its own
//! layout and writes to its own output directory. The pool join is the only
//! synchronisation point.
use rayon::prelude::*;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;

use crate::config::{DatasetPaths, PatientTask, PrepConfig};
use crate::error::{PrepError, Result};
use crate::process::{process_recording, Outcome, PatientContext, Retain, SkipReason};
use crate::summary::Summary;

/// What happened to one patient's recordings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientReport {
    pub patient: String,
    pub written: Vec<(u32, PathBuf)>,
    pub skipped: Vec<(u32, SkipReason)>,
}

impl PatientReport {
    fn record(&mut self, number: u32, outcome: Outcome) {
        match outcome {
            Outcome::Written { path, .. } => self.written.push((number, path)),
            Outcome::Skipped { reason, .. } => self.skipped.push((number, reason)),
        }
    }
}

/// Run one patient end-to-end.
///
/// The reference recording is processed with every signal retained, then
/// each number in `start..=end` is matched by name against the layout.
pub fn run_patient(task: &PatientTask, paths: &DatasetPaths) -> Result<PatientReport> {
    task.validate()?;
    let summary = Summary::load(&paths.summary_path(&task.patient))?;

    let epochs = summary.layout_epochs();
    if task.epoch >= epochs {
        return Err(PrepError::SummaryMalformed(format!(
            "patient {}: layout epoch {} requested, summary declares {epochs}",
            task.patient, task.epoch
        )));
    }
    let layout = summary.channel_layout(task.epoch)?;
    let valid = layout.name_set();
    log::info!(
        "patient {}: {} channels in layout epoch {}",
        task.patient,
        layout.len(),
        task.epoch
    );

    std::fs::create_dir_all(paths.output_dir(&task.patient))?;

    let ctx = PatientContext {
        patient: &task.patient,
        paths,
        summary: &summary,
        layout: &layout,
        valid: &valid,
    };
    let mut report = PatientReport { patient: task.patient.clone(), ..Default::default() };

    let outcome = process_recording(&ctx, task.reference, Retain::All)?;
    report.record(task.reference, outcome);

    for number in task.start..=task.end {
        let outcome = process_recording(&ctx, number, Retain::ByName)?;
        report.record(number, outcome);
    }

    log::info!(
        "patient {}: {} written, {} skipped",
        task.patient,
        report.written.len(),
        report.skipped.len()
    );
    Ok(report)
}

/// Result of one patient task, in configuration order.
pub type TaskResult = (PatientTask, Result<PatientReport>);

/// Run every configured task on a pool of `jobs` workers
/// (`None` = one per CPU core).
pub fn run_all(cfg: &PrepConfig, jobs: Option<usize>) -> Result<Vec<TaskResult>> {
    let threads = jobs.unwrap_or_else(num_cpus::get).max(1);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("prep-worker-{i}"))
        .build()
        .map_err(|e| PrepError::Config(format!("cannot build worker pool: {e}")))?;

    std::fs::create_dir_all(&cfg.paths.clean_path)?;
    log::info!("processing {} patients on {threads} workers", cfg.tasks.len());

    Ok(pool.install(|| {
        cfg.tasks
            .par_iter()
            .with_max_len(1)
            .map(|task| {
                let result = catch_unwind(AssertUnwindSafe(|| run_patient(task, &cfg.paths)))
                    .unwrap_or_else(|payload| {
                        Err(PrepError::TaskPanicked {
                            patient: task.patient.clone(),
                            message: panic_message(payload.as_ref()),
                        })
                    });
                if let Err(e) = &result {
                    log::error!("patient {} failed: {e}", task.patient);
                }
                (task.clone(), result)
            })
            .collect()
    }))
}

/// Text of a panic payload raised with a string message.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_payloads_become_messages() {
        let caught = catch_unwind(|| panic!("bad {}", 7)).unwrap_err();
        assert_eq!(panic_message(caught.as_ref()), "bad 7");
        let caught = catch_unwind(|| panic!("static")).unwrap_err();
        assert_eq!(panic_message(caught.as_ref()), "static");
        let caught = catch_unwind(|| std::panic::panic_any(3u8)).unwrap_err();
        assert_eq!(panic_message(caught.as_ref()), "non-string panic payload");
    }
}
