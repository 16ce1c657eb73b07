//! Batch configuration.
//!
//! [`PrepConfig`] is read from a JSON file with two sections:
//!
//! ```json
//! {
//!   "Paths": { "signals_path": "/data/chb-mit", "clean_path": "/data/clean" },
//!   "Parameters": [
//!     ["01", 1, 0, 2, 46],
//!     { "patient": "02", "reference": 1, "epoch": 0, "start": 2, "end": 35 }
//!   ]
//! }
//! ```
//!
//! Each task is either the tuple `[patient, reference, epoch, start, end]` or
//! the equivalent object. [`DatasetPaths`] owns the on-disk naming scheme.
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{PrepError, Result};

/// Suffix appended to the source file name of every output record.
pub const RECORD_SUFFIX: &str = ".safetensors";

// ── Paths ─────────────────────────────────────────────────────────────────

/// Input and output roots plus the file-naming scheme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetPaths {
    /// Root holding `chbPP/chbPP_NN.edf` and `chbPP/chbPP-summary.txt`.
    pub signals_path: PathBuf,
    /// Root the cleaned records are written under.
    pub clean_path:   PathBuf,
}

impl DatasetPaths {
    /// `chbPP_NN.edf`
    pub fn recording_name(patient: &str, number: u32) -> String {
        format!("chb{patient}_{number:02}.edf")
    }

    pub fn patient_dir(&self, patient: &str) -> PathBuf {
        self.signals_path.join(format!("chb{patient}"))
    }

    pub fn summary_path(&self, patient: &str) -> PathBuf {
        self.patient_dir(patient).join(format!("chb{patient}-summary.txt"))
    }

    pub fn recording_path(&self, patient: &str, number: u32) -> PathBuf {
        self.patient_dir(patient).join(Self::recording_name(patient, number))
    }

    pub fn output_dir(&self, patient: &str) -> PathBuf {
        self.clean_path.join(format!("chb{patient}"))
    }

    /// `clean/chbPP/chbPP_NN.edf.safetensors`
    pub fn output_path(&self, patient: &str, number: u32) -> PathBuf {
        self.output_dir(patient)
            .join(format!("{}{RECORD_SUFFIX}", Self::recording_name(patient, number)))
    }
}

// ── Tasks ─────────────────────────────────────────────────────────────────

/// One patient's work item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TaskRepr")]
pub struct PatientTask {
    /// Patient identifier as used in file names (`"01"` → `chb01`).
    pub patient:   String,
    /// Recording whose layout defines the patient's channel schema.
    pub reference: u32,
    /// Layout epoch of the summary file to use (0 = initial layout).
    pub epoch:     usize,
    /// First recording number to process (inclusive).
    pub start:     u32,
    /// Last recording number to process (inclusive).
    pub end:       u32,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TaskRepr {
    Tuple(String, u32, usize, u32, u32),
    Named { patient: String, reference: u32, epoch: usize, start: u32, end: u32 },
}

impl From<TaskRepr> for PatientTask {
    fn from(repr: TaskRepr) -> Self {
        match repr {
            TaskRepr::Tuple(patient, reference, epoch, start, end)
            | TaskRepr::Named { patient, reference, epoch, start, end } => {
                PatientTask { patient, reference, epoch, start, end }
            }
        }
    }
}

impl PatientTask {
    pub fn validate(&self) -> Result<()> {
        let id_ok = !self.patient.is_empty()
            && self.patient.chars().all(|c| c.is_ascii_alphanumeric());
        if !id_ok {
            return Err(PrepError::Config(format!(
                "patient id {:?} must be non-empty and alphanumeric",
                self.patient
            )));
        }
        if self.start > self.end {
            return Err(PrepError::Config(format!(
                "patient {}: range start {} is after end {}",
                self.patient, self.start, self.end
            )));
        }
        Ok(())
    }
}

// ── Top-level config ──────────────────────────────────────────────────────

/// Configuration of one batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrepConfig {
    #[serde(rename = "Paths")]
    pub paths: DatasetPaths,
    #[serde(rename = "Parameters")]
    pub tasks: Vec<PatientTask>,
}

impl PrepConfig {
    /// Parse and validate a configuration document.
    pub fn from_json(text: &str) -> Result<Self> {
        let cfg: PrepConfig = serde_json::from_str(text)
            .map_err(|e| PrepError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            PrepError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.paths.signals_path.as_os_str().is_empty()
            || self.paths.clean_path.as_os_str().is_empty()
        {
            return Err(PrepError::Config("signals_path and clean_path must be set".into()));
        }
        for task in &self.tasks {
            task.validate()?;
        }
        let mut seen = std::collections::HashSet::new();
        if let Some(dup) = self.tasks.iter().find(|t| !seen.insert(t.patient.as_str())) {
            return Err(PrepError::Config(format!(
                "patient {} is listed more than once",
                dup.patient
            )));
        }
        Ok(())
    }
}
