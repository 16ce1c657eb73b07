//! EDF (European Data Format) recording reader.
//!
//! # Quick start
//! ```no_run
//! use eegprep::edf::open_raw;
//!
//! let raw = open_raw("chb01/chb01_03.edf").unwrap();
//! println!("{} signals: {:?}", raw.n_signals(), raw.labels());
//! let data = raw.read(None, false).unwrap();  // one [n_samples] f64 per signal
//! ```
pub mod header;
pub mod raw;

pub use header::{FileHeader, SignalHeader, ANNOTATION_LABEL};
pub use raw::{open_raw, RawEdf, SignalSlot};
