//! In-memory output record: reconciled channels plus seizure metadata.
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Samples per second assumed by the summary files' second-resolution times.
pub const SUMMARY_SAMPLE_RATE: i64 = 256;

/// Convert a summary timestamp in whole seconds to a zero-based sample index.
///
/// `None` when the result does not fit in an `i64`.
#[inline]
pub fn seconds_to_sample(seconds: i64) -> Option<i64> {
    seconds.checked_mul(SUMMARY_SAMPLE_RATE)?.checked_sub(1)
}

/// Seizure events of one recording, as parsed from the summary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeizureEvents {
    pub count:     u32,
    /// `(start_sample, end_sample)` in summary order.
    pub intervals: Vec<(i64, i64)>,
}

/// Metadata attached to every output record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeizureMetadata {
    pub seizure_count: u32,
    pub intervals:     Vec<(i64, i64)>,
    /// The patient's valid channel names, in layout order.
    pub channels:      Vec<String>,
}

impl SeizureMetadata {
    pub fn new(events: SeizureEvents, channels: Vec<String>) -> Self {
        Self { seizure_count: events.count, intervals: events.intervals, channels }
    }
}

/// One reconciled recording, ready for serialization.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingRecord {
    /// `(channel name, samples)` in layout order.
    pub channels: Vec<(String, Array1<f64>)>,
    pub metadata: SeizureMetadata,
}

impl RecordingRecord {
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.channels.iter().map(|(n, _)| n.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&Array1<f64>> {
        self.channels.iter().find(|(n, _)| n == name).map(|(_, d)| d)
    }

    /// Shared channel length (0 for a record without channels).
    pub fn n_samples(&self) -> usize {
        self.channels.first().map_or(0, |(_, d)| d.len())
    }
}
