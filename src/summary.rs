//! Patient summary file parser.
//!
//! A summary is loosely structured text, one per patient:
//!
//! ```text
//! Channels in EDF Files:
//! **********************
//! Channel 1: FP1-F7
//! Channel 2: F7-T7
//! ...
//! File Name: chb01_03.edf
//! File Start Time: 13:43:04
//! File End Time: 14:43:04
//! Number of Seizures in File: 1
//! Seizure Start Time: 2996 seconds
//! Seizure End Time: 3036 seconds
//!
//! Channels changed:
//! Channel 1: FP1-F7
//! ...
//! ```
//!
//! Parsing is two-phase: [`Summary::parse`] splits the text into token lines
//! (blank lines are kept as empty lines), then each query walks those lines.
//! Seizure lookup is an explicit forward walk through [`Scan`] states.
use std::path::Path;

use crate::error::{PrepError, Result};
use crate::layout::ChannelLayout;
use crate::record::{seconds_to_sample, SeizureEvents};

/// Labels that mark an unused channel slot in the summary.
const VOID_LABELS: [&str; 2] = ["-", "."];

/// States of the seizure lookup walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scan {
    SeekingRecording,
    SeekingCount { anchor: usize },
    SeekingSeizure { cursor: usize, remaining: u32 },
    Done,
}

/// A tokenized summary file.
#[derive(Debug, Clone, Default)]
pub struct Summary {
    lines: Vec<Vec<String>>,
}

impl Summary {
    pub fn parse(text: &str) -> Self {
        let lines = text
            .lines()
            .map(|l| l.split_whitespace().map(str::to_string).collect())
            .collect();
        Self { lines }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            PrepError::SummaryMalformed(format!("cannot read {}: {e}", path.display()))
        })?;
        Ok(Self::parse(&text))
    }

    /// Number of layout epochs the file describes.
    pub fn layout_epochs(&self) -> usize {
        1 + self.lines.iter().filter(|t| is_epoch_marker(t)).count()
    }

    /// Build the channel layout of layout epoch `epoch` (0 = initial).
    pub fn channel_layout(&self, epoch: usize) -> Result<ChannelLayout> {
        let mut layout = ChannelLayout::new();
        let mut current = 0usize;

        for tokens in &self.lines {
            if is_epoch_marker(tokens) {
                current += 1;
                continue;
            }
            if current != epoch || tokens.len() < 3 || tokens[0] != "Channel" {
                continue;
            }
            let label = tokens[2].as_str();
            if VOID_LABELS.contains(&label) {
                continue;
            }
            let number = tokens[1].trim_end_matches(':');
            let source = number.parse::<usize>().map_err(|_| {
                PrepError::SummaryMalformed(format!("bad channel number {:?}", tokens[1]))
            })?;
            let name = layout.register(label, source);
            log::trace!("layout epoch {epoch}: channel {source} → {name}");
        }

        if layout.is_empty() {
            return Err(PrepError::SummaryMalformed(format!(
                "layout epoch {epoch} declares no channels ({} epochs in file)",
                self.layout_epochs()
            )));
        }
        Ok(layout)
    }

    /// Seizure count and sample intervals of the recording `filename`.
    pub fn seizures(&self, filename: &str) -> Result<SeizureEvents> {
        let mut events = SeizureEvents::default();
        let mut state = Scan::SeekingRecording;

        loop {
            state = match state {
                Scan::SeekingRecording => {
                    let anchor = self
                        .find_from(0, |t| t.len() == 3 && t[2] == filename)
                        .ok_or_else(|| PrepError::RecordingNotInSummary(filename.to_string()))?;
                    Scan::SeekingCount { anchor }
                }
                Scan::SeekingCount { anchor } => {
                    let at = self
                        .find_from(anchor + 1, |t| t.first().is_some_and(|w| w == "Number"))
                        .ok_or_else(|| {
                            PrepError::SummaryMalformed(format!("no seizure count for {filename}"))
                        })?;
                    events.count = last_integer(&self.lines[at], filename)?;
                    Scan::SeekingSeizure { cursor: anchor + 1, remaining: events.count }
                }
                Scan::SeekingSeizure { remaining: 0, .. } => Scan::Done,
                Scan::SeekingSeizure { cursor, remaining } => {
                    let start_at = self.find_from(cursor, is_seizure_start).ok_or_else(|| {
                        PrepError::SummaryMalformed(format!(
                            "{filename}: {} of {} seizures missing",
                            remaining, events.count
                        ))
                    })?;
                    let end_at = self
                        .find_from(start_at + 1, |t| !t.is_empty())
                        .ok_or_else(|| {
                            PrepError::SummaryMalformed(format!("{filename}: seizure without end time"))
                        })?;
                    let start = sample_token(&self.lines[start_at], filename)?;
                    let end = sample_token(&self.lines[end_at], filename)?;
                    events.intervals.push((start, end));
                    Scan::SeekingSeizure { cursor: start_at + 1, remaining: remaining - 1 }
                }
                Scan::Done => break,
            };
        }

        log::debug!("{filename}: {} seizures {:?}", events.count, events.intervals);
        Ok(events)
    }

    fn find_from(&self, from: usize, pred: impl Fn(&[String]) -> bool) -> Option<usize> {
        self.lines
            .iter()
            .enumerate()
            .skip(from)
            .find(|(_, t)| pred(t.as_slice()))
            .map(|(i, _)| i)
    }
}

fn is_epoch_marker(tokens: &[String]) -> bool {
    tokens.len() >= 2 && tokens[0] == "Channels" && tokens[1] == "changed:"
}

fn is_seizure_start(tokens: &[String]) -> bool {
    tokens.first().is_some_and(|w| w == "Seizure") && tokens.iter().any(|w| w == "Start")
}

fn last_integer(tokens: &[String], filename: &str) -> Result<u32> {
    let raw = tokens.last().map(String::as_str).unwrap_or_default();
    raw.parse().map_err(|_| {
        PrepError::SummaryMalformed(format!("{filename}: seizure count {raw:?} is not an integer"))
    })
}

/// Sample index of the second-to-last token, e.g. `2996` in
/// `Seizure Start Time: 2996 seconds`.
fn sample_token(tokens: &[String], filename: &str) -> Result<i64> {
    let raw = tokens
        .len()
        .checked_sub(2)
        .map(|i| tokens[i].as_str())
        .unwrap_or_default();
    let seconds: i64 = raw.parse().map_err(|_| {
        PrepError::SummaryMalformed(format!("{filename}: seizure time {raw:?} is not an integer"))
    })?;
    seconds_to_sample(seconds).ok_or_else(|| {
        PrepError::SummaryMalformed(format!("{filename}: seizure time {raw} s is out of range"))
    })
}
