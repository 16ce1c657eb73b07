//! Raw EDF data reader.
//!
//! # Algorithm
//! 1. Open the file (absent → [`PrepError::RecordingMissing`]).
//! 2. Parse the fixed header and the `ns` signal headers.
//! 3. Lay out one [`SignalSlot`] per ordinary signal: its byte offset inside a
//!    data record. Annotation signals occupy record bytes but get no slot.
//! 4. Check the declared record count against the file length.
//! 5. On [`RawEdf::read`], stream the data records once and decode the picked
//!    slots into one `[n_samples]` array per signal.
//!
//! # Sample layout
//! ```text
//! record r:  | sig 0: spr₀ × i16 LE | sig 1: spr₁ × i16 LE | … |
//! physical = (digital − digital_min) × gain + physical_min
//! ```
//! Any header or data inconsistency is reported as
//! [`PrepError::RecordingMalformed`].
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use ndarray::Array1;

use super::header::{FileHeader, SignalHeader, FIXED_HEADER_LEN, SIGNAL_HEADER_LEN};
use crate::error::{PrepError, Result};

// ── Slot table ───────────────────────────────────────────────────────────

/// Position of one ordinary signal inside a data record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalSlot {
    /// Byte offset from the start of the data record.
    pub offset:             usize,
    pub samples_per_record: usize,
}

// ── RawEdf ───────────────────────────────────────────────────────────────

/// An opened EDF recording. Headers are loaded, sample data is not.
#[derive(Debug, Clone)]
pub struct RawEdf {
    pub header:   FileHeader,
    /// Ordinary (non-annotation) signals, in file order.
    pub signals:  Vec<SignalHeader>,
    /// File this was read from (for lazy re-reads).
    pub path:     PathBuf,
    slots:        Vec<SignalSlot>,
    record_bytes: usize,
    n_records:    usize,
}

impl RawEdf {
    /// Number of ordinary signals.
    #[inline]
    pub fn n_signals(&self) -> usize {
        self.signals.len()
    }

    /// Number of complete data records.
    #[inline]
    pub fn n_records(&self) -> usize {
        self.n_records
    }

    /// Signal labels in file order.
    pub fn labels(&self) -> Vec<&str> {
        self.signals.iter().map(|s| s.label.as_str()).collect()
    }

    /// Samples stored for signal `idx` across the whole file.
    pub fn samples_in_file(&self, idx: usize) -> usize {
        self.slots[idx].samples_per_record * self.n_records
    }

    /// Sample count of the first ordinary signal, if any.
    pub fn n_samples(&self) -> Option<usize> {
        (!self.slots.is_empty()).then(|| self.samples_in_file(0))
    }

    /// Sampling rate of signal `idx` in Hz.
    pub fn sfreq(&self, idx: usize) -> f64 {
        self.slots[idx].samples_per_record as f64 / self.header.record_duration
    }

    /// Read signal data, one array per picked signal, in `picks` order.
    ///
    /// `picks = None` reads every ordinary signal. With `digital = true` the
    /// stored integers are returned unscaled, otherwise physical values.
    pub fn read(&self, picks: Option<&[usize]>, digital: bool) -> Result<Vec<Array1<f64>>> {
        let picks: Vec<usize> = match picks {
            Some(p) => p.to_vec(),
            None => (0..self.n_signals()).collect(),
        };
        if let Some(&bad) = picks.iter().find(|&&p| p >= self.n_signals()) {
            return Err(PrepError::malformed(
                &self.path,
                format!("signal index {bad} out of range ({} signals)", self.n_signals()),
            ));
        }

        let mut reader = BufReader::new(open_file(&self.path)?);
        reader.seek(SeekFrom::Start(self.header.header_bytes as u64))?;

        let mut out: Vec<Vec<f64>> = picks
            .iter()
            .map(|&p| Vec::with_capacity(self.samples_in_file(p)))
            .collect();
        let mut record = vec![0u8; self.record_bytes];

        for r in 0..self.n_records {
            reader.read_exact(&mut record).map_err(|e| {
                PrepError::malformed(&self.path, format!("data record {r}/{}: {e}", self.n_records))
            })?;
            for (dst, &p) in out.iter_mut().zip(&picks) {
                let slot = self.slots[p];
                let sig = &self.signals[p];
                let bytes = &record[slot.offset..slot.offset + slot.samples_per_record * 2];
                dst.extend(bytes.chunks_exact(2).map(|b| {
                    let d = i16::from_le_bytes([b[0], b[1]]);
                    if digital { d as f64 } else { sig.to_physical(d) }
                }));
            }
        }

        Ok(out.into_iter().map(Array1::from_vec).collect())
    }
}

// ── Reader entry point ───────────────────────────────────────────────────

/// Open an EDF file and parse its headers without reading sample data.
pub fn open_raw<P: AsRef<Path>>(path: P) -> Result<RawEdf> {
    let path = path.as_ref();
    let mut reader = BufReader::new(open_file(path)?);
    let malformed = |reason: String| PrepError::malformed(path, reason);

    // 1. Fixed header -------------------------------------------------------
    let mut fixed = [0u8; FIXED_HEADER_LEN];
    reader
        .read_exact(&mut fixed)
        .map_err(|e| malformed(format!("fixed header: {e}")))?;
    let header = FileHeader::from_bytes(&fixed).map_err(malformed)?;

    // 2. Signal headers -----------------------------------------------------
    let ns = header.n_signals;
    let mut block = vec![0u8; ns * SIGNAL_HEADER_LEN];
    reader
        .read_exact(&mut block)
        .map_err(|e| malformed(format!("signal headers: {e}")))?;
    let all = SignalHeader::parse_all(&block, ns).map_err(malformed)?;

    // 3. Slot table ---------------------------------------------------------
    let mut offset = 0usize;
    let mut signals = Vec::with_capacity(ns);
    let mut slots = Vec::with_capacity(ns);
    for sig in all {
        let width = sig.samples_per_record * 2;
        if !sig.is_annotation() {
            slots.push(SignalSlot { offset, samples_per_record: sig.samples_per_record });
            signals.push(sig);
        }
        offset += width;
    }
    let record_bytes = offset;

    // 4. Record count -------------------------------------------------------
    let file_len = reader
        .get_ref()
        .metadata()
        .map_err(|e| malformed(format!("metadata: {e}")))?
        .len();
    let n_records = if header.n_records >= 0 {
        header.n_records as usize
    } else if record_bytes == 0 {
        0
    } else {
        (file_len as usize).saturating_sub(header.header_bytes) / record_bytes
    };

    // 5. Declared size must be backed by file bytes ---------------------------
    let needed = n_records
        .checked_mul(record_bytes)
        .and_then(|data| data.checked_add(header.header_bytes))
        .ok_or_else(|| malformed(format!("{n_records} records of {record_bytes} bytes overflow")))?;
    if needed as u64 > file_len {
        return Err(malformed(format!(
            "header declares {needed} bytes ({n_records} records of {record_bytes}), file has {file_len}"
        )));
    }

    log::trace!(
        "{}: {} signals, {n_records} records of {record_bytes} bytes",
        path.display(),
        signals.len()
    );

    Ok(RawEdf { header, signals, path: path.to_path_buf(), slots, record_bytes, n_records })
}

fn open_file(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => PrepError::RecordingMissing(path.to_path_buf()),
        _ => PrepError::malformed(path, format!("open: {e}")),
    })
}
