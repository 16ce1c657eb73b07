//! # eegprep — channel-aligned EEG dataset preparation
//!
//! `eegprep` turns a directory of per-patient EDF recordings and their
//! free-text summary files into one safetensors record per recording, every
//! record of a patient sharing the exact same ordered channel schema and
//! carrying its seizure annotations.
//!
//! ## Pipeline overview
//!
//! ```text
//! chbPP/chbPP-summary.txt ─┬─ summary::Summary::channel_layout(epoch)  → ChannelLayout
//!                          └─ summary::Summary::seizures(file)          → SeizureEvents
//! chbPP/chbPP_NN.edf
//!   │
//!   ├─ edf::open_raw()            native EDF reader, headers only
//!   ├─ match labels by name       against the layout's name set
//!   ├─ RawEdf::read(picks)        physical values of the kept signals
//!   ├─ reconcile::collect_channels   repeated label → "label-2"
//!   ├─ reconcile::reconcile       drop foreign, zero-fill missing, layout order
//!   └─ io::write_record           chbPP_NN.edf.safetensors (+ metadata JSON)
//! ```
//!
//! Patients run in parallel on a rayon pool ([`batch::run_all`]); recordings
//! of one patient run sequentially on its worker ([`batch::run_patient`]).
//!
//! ## Quick start
//!
//! ```no_run
//! use eegprep::{run_all, PrepConfig};
//!
//! let cfg = PrepConfig::load("prep.json".as_ref()).unwrap();
//! for (task, result) in run_all(&cfg, None).unwrap() {
//!     match result {
//!         Ok(report) => println!("{}: {} records", task.patient, report.written.len()),
//!         Err(e)     => eprintln!("{}: {e}", task.patient),
//!     }
//! }
//! ```
//!
//! ## Using the pieces
//!
//! ```no_run
//! use eegprep::summary::Summary;
//! use eegprep::reconcile::{collect_channels, reconcile};
//! use eegprep::edf::open_raw;
//!
//! let summary = Summary::load("chb01/chb01-summary.txt".as_ref()).unwrap();
//! let layout  = summary.channel_layout(0).unwrap();
//!
//! let raw    = open_raw("chb01/chb01_03.edf").unwrap();
//! let data   = raw.read(None, false).unwrap();
//! let labels = raw.labels();
//! let record = reconcile(collect_channels(&labels[..], data), &layout).unwrap();
//! assert_eq!(record.len(), layout.len());
//! ```

pub mod batch;
pub mod config;
pub mod edf;
pub mod error;
pub mod io;
pub mod layout;
pub mod process;
pub mod reconcile;
pub mod record;
pub mod summary;

// ── Crate-root re-exports ─────────────────────────────────────────────────

// batch
pub use batch::{run_all, run_patient, PatientReport, TaskResult};

// config
pub use config::{DatasetPaths, PatientTask, PrepConfig, RECORD_SUFFIX};

// edf
pub use edf::{open_raw, FileHeader, RawEdf, SignalHeader};

// error
pub use error::{PrepError, Result};

// io
pub use io::{read_record, write_record, StWriter};

// layout
pub use layout::{ChannelLayout, LayoutChannel, DUPLICATE_SUFFIX};

// process
pub use process::{process_recording, Outcome, PatientContext, Retain, SkipReason};

// reconcile
pub use reconcile::{collect_channels, placeholders, reconcile, Channels};

// record
pub use record::{seconds_to_sample, RecordingRecord, SeizureEvents, SeizureMetadata, SUMMARY_SAMPLE_RATE};

// summary
pub use summary::Summary;
