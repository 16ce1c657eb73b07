//! Error taxonomy for dataset preparation.
//!
//! Per-recording container failures ([`PrepError::RecordingMissing`],
//! [`PrepError::RecordingMalformed`]) are absorbed by the recording processor.
//! Everything else aborts the patient task that raised it.
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PrepError {
    #[error("recording not found: {}", .0.display())]
    RecordingMissing(PathBuf),

    #[error("malformed recording {}: {reason}", .path.display())]
    RecordingMalformed { path: PathBuf, reason: String },

    #[error("malformed summary: {0}")]
    SummaryMalformed(String),

    #[error("recording {0} is not described in the summary file")]
    RecordingNotInSummary(String),

    #[error("no channel of {0} survives reconciliation")]
    EmptyChannelIntersection(String),

    #[error("patient {patient} task panicked: {message}")]
    TaskPanicked { patient: String, message: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid record file {}: {reason}", .path.display())]
    RecordFormat { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PrepError {
    /// `true` for conditions that only invalidate a single recording.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PrepError::RecordingMissing(_) | PrepError::RecordingMalformed { .. }
        )
    }

    pub(crate) fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        PrepError::RecordingMalformed { path: path.into(), reason: reason.into() }
    }
}

pub type Result<T> = std::result::Result<T, PrepError>;
