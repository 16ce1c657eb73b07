//! Per-recording processing: read → intersect → reconcile → annotate → write.
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::config::DatasetPaths;
use crate::edf::{open_raw, RawEdf};
use crate::error::{PrepError, Result};
use crate::io::write_record;
use crate::layout::ChannelLayout;
use crate::reconcile::{collect_channels, placeholders, reconcile, Channels};
use crate::record::{RecordingRecord, SeizureMetadata};
use crate::summary::Summary;

/// Immutable per-patient state shared by every recording of that patient.
#[derive(Debug, Clone, Copy)]
pub struct PatientContext<'a> {
    pub patient: &'a str,
    pub paths:   &'a DatasetPaths,
    pub summary: &'a Summary,
    pub layout:  &'a ChannelLayout,
    /// Layout names, used to match container labels.
    pub valid:   &'a HashSet<String>,
}

/// Which container signals enter reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retain {
    /// Every ordinary signal (the reference recording).
    All,
    /// Signals whose label is a valid layout name.
    ByName,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Missing,
    Malformed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Written {
        path:         PathBuf,
        /// Container signals read.
        kept:         usize,
        /// Container signals not read.
        dropped:      usize,
        /// Layout channels zero-filled.
        placeholders: usize,
    },
    Skipped {
        reason: SkipReason,
        detail: String,
    },
}

/// Process recording `number` of the patient described by `ctx`.
///
/// Container problems yield [`Outcome::Skipped`]; summary and output errors
/// are returned.
pub fn process_recording(ctx: &PatientContext<'_>, number: u32, retain: Retain) -> Result<Outcome> {
    match build_record(ctx, number, retain) {
        Ok((record, kept, dropped, n_placeholders)) => {
            let path = ctx.paths.output_path(ctx.patient, number);
            write_record(&record, &path)?;
            log::info!(
                "chb{}_{number:02}: wrote {} channels ({n_placeholders} zero-filled) → {}",
                ctx.patient,
                record.channels.len(),
                path.display()
            );
            Ok(Outcome::Written { path, kept, dropped, placeholders: n_placeholders })
        }
        Err(e) if e.is_recoverable() => {
            let reason = match e {
                PrepError::RecordingMissing(_) => SkipReason::Missing,
                _ => SkipReason::Malformed,
            };
            log::warn!("patient {} recording {number}: skipped ({e})", ctx.patient);
            Ok(Outcome::Skipped { reason, detail: e.to_string() })
        }
        Err(e) => Err(e),
    }
}

/// Returns the record plus (kept, dropped, zero-filled) channel counts.
fn build_record(
    ctx: &PatientContext<'_>,
    number: u32,
    retain: Retain,
) -> Result<(RecordingRecord, usize, usize, usize)> {
    let source = ctx.paths.recording_path(ctx.patient, number);
    let raw = open_raw(&source)?;

    let picks: Vec<usize> = raw
        .labels()
        .iter()
        .enumerate()
        .filter(|(_, label)| retain == Retain::All || ctx.valid.contains(**label))
        .map(|(i, _)| i)
        .collect();
    let dropped = raw.n_signals() - picks.len();

    let (channels, n_placeholders) = if picks.is_empty() {
        (empty_intersection(ctx, &raw, &source)?, ctx.layout.len())
    } else {
        if dropped > 0 {
            log::info!(
                "removing {dropped} channels from {}",
                DatasetPaths::recording_name(ctx.patient, number)
            );
        }
        let data = raw.read(Some(picks.as_slice()), false)?;
        let labels: Vec<&str> = picks.iter().map(|&i| raw.signals[i].label.as_str()).collect();
        let collected = collect_channels(&labels[..], data);
        let missing = ctx
            .layout
            .names()
            .filter(|n| !collected.iter().any(|(c, _)| c == n))
            .count();
        match reconcile(collected, ctx.layout) {
            Ok(channels) => (channels, missing),
            Err(PrepError::EmptyChannelIntersection(_)) => {
                (empty_intersection(ctx, &raw, &source)?, ctx.layout.len())
            }
            Err(e) => return Err(e),
        }
    };

    let filename = DatasetPaths::recording_name(ctx.patient, number);
    let events = ctx.summary.seizures(&filename)?;
    let metadata = SeizureMetadata::new(events, ctx.layout.valid_names());

    Ok((RecordingRecord { channels, metadata }, picks.len(), dropped, n_placeholders))
}

/// Zero-filled record sized from the container header.
fn empty_intersection(
    ctx: &PatientContext<'_>,
    raw: &RawEdf,
    source: &Path,
) -> Result<Channels> {
    let n_samples = raw
        .n_samples()
        .ok_or_else(|| PrepError::malformed(source, "no ordinary signals"))?;
    log::warn!(
        "{}: no channel matches the layout of patient {}; writing {} zero-filled channels",
        source.display(),
        ctx.patient,
        ctx.layout.len()
    );
    Ok(placeholders(ctx.layout, n_samples))
}
