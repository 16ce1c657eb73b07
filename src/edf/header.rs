//! EDF header records.
//!
//! An EDF file starts with a 256-byte fixed header followed by `ns × 256`
//! bytes of per-signal headers. Every field is space-padded ASCII.
//!
//! ```text
//! fixed header (256 bytes)
//!   0  version        8      168  start date    8
//!   8  patient id    80      176  start time    8
//!  88  recording id  80      184  header bytes  8
//!                            192  reserved     44
//!                            236  n records     8   (-1 = unknown)
//!                            244  duration      8   (seconds per record)
//!                            252  ns            4
//!
//! signal headers (ns × 256 bytes, field-major)
//!   label 16 · transducer 80 · physical dim 8 · physical min 8 ·
//!   physical max 8 · digital min 8 · digital max 8 · prefilter 80 ·
//!   samples per record 8 · reserved 32
//! ```
use std::str::FromStr;

pub const FIXED_HEADER_LEN: usize = 256;
pub const SIGNAL_HEADER_LEN: usize = 256;

/// Label of the EDF+ annotation pseudo-signal; never exposed as a channel.
pub const ANNOTATION_LABEL: &str = "EDF Annotations";

// ── Fixed header ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct FileHeader {
    pub version:      String,
    pub patient_id:   String,
    pub recording_id: String,
    pub start_date:   String,
    pub start_time:   String,
    pub header_bytes: usize,
    pub reserved:     String,
    /// Number of data records, `-1` when the writer did not know it.
    pub n_records:    i64,
    /// Duration of one data record in seconds.
    pub record_duration: f64,
    pub n_signals:    usize,
}

impl FileHeader {
    pub fn from_bytes(raw: &[u8]) -> Result<Self, String> {
        if raw.len() < FIXED_HEADER_LEN {
            return Err(format!(
                "fixed header too short: {} bytes (need {FIXED_HEADER_LEN})",
                raw.len()
            ));
        }
        let header = FileHeader {
            version:         text_field(raw, 0, 8),
            patient_id:      text_field(raw, 8, 80),
            recording_id:    text_field(raw, 88, 80),
            start_date:      text_field(raw, 168, 8),
            start_time:      text_field(raw, 176, 8),
            header_bytes:    number_field(raw, 184, 8, "header bytes")?,
            reserved:        text_field(raw, 192, 44),
            n_records:       number_field(raw, 236, 8, "number of data records")?,
            record_duration: number_field(raw, 244, 8, "data record duration")?,
            n_signals:       number_field(raw, 252, 4, "number of signals")?,
        };
        if header.version != "0" {
            return Err(format!("unsupported EDF version {:?}", header.version));
        }
        let expected = FIXED_HEADER_LEN + header.n_signals * SIGNAL_HEADER_LEN;
        if header.header_bytes != expected {
            return Err(format!(
                "header size {} does not match {} signals (expected {expected})",
                header.header_bytes, header.n_signals
            ));
        }
        Ok(header)
    }
}

// ── Signal headers ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct SignalHeader {
    pub label:              String,
    pub transducer:         String,
    pub physical_dimension: String,
    pub physical_min:       f64,
    pub physical_max:       f64,
    pub digital_min:        i32,
    pub digital_max:        i32,
    pub prefilter:          String,
    pub samples_per_record: usize,
}

impl SignalHeader {
    /// Parse all `ns` signal headers from the field-major block that follows
    /// the fixed header.
    pub fn parse_all(raw: &[u8], ns: usize) -> Result<Vec<Self>, String> {
        if raw.len() < ns * SIGNAL_HEADER_LEN {
            return Err(format!(
                "signal headers too short: {} bytes (need {})",
                raw.len(),
                ns * SIGNAL_HEADER_LEN
            ));
        }
        (0..ns)
            .map(|i| {
                let sig = SignalHeader {
                    label:              text_field(raw, i * 16, 16),
                    transducer:         text_field(raw, ns * 16 + i * 80, 80),
                    physical_dimension: text_field(raw, ns * 96 + i * 8, 8),
                    physical_min:       number_field(raw, ns * 104 + i * 8, 8, "physical minimum")?,
                    physical_max:       number_field(raw, ns * 112 + i * 8, 8, "physical maximum")?,
                    digital_min:        number_field(raw, ns * 120 + i * 8, 8, "digital minimum")?,
                    digital_max:        number_field(raw, ns * 128 + i * 8, 8, "digital maximum")?,
                    prefilter:          text_field(raw, ns * 136 + i * 80, 80),
                    samples_per_record: number_field(raw, ns * 216 + i * 8, 8, "samples per record")?,
                };
                if !sig.is_annotation() && sig.digital_min == sig.digital_max {
                    return Err(format!("signal {i} ({}): digital min equals max", sig.label));
                }
                Ok(sig)
            })
            .collect()
    }

    #[inline]
    pub fn is_annotation(&self) -> bool {
        self.label == ANNOTATION_LABEL
    }

    /// Physical units per digital step.
    #[inline]
    pub fn gain(&self) -> f64 {
        (self.physical_max - self.physical_min)
            / (self.digital_max as f64 - self.digital_min as f64)
    }

    /// `physical = (digital − digital_min) × gain + physical_min`
    #[inline]
    pub fn to_physical(&self, digital: i16) -> f64 {
        (digital as f64 - self.digital_min as f64) * self.gain() + self.physical_min
    }
}

// ── Field helpers ────────────────────────────────────────────────────────

fn text_field(raw: &[u8], start: usize, len: usize) -> String {
    // Latin-1 → char is lossless for the ASCII fields EDF mandates.
    raw[start..start + len]
        .iter()
        .map(|&b| b as char)
        .collect::<String>()
        .trim()
        .to_string()
}

fn number_field<T: FromStr>(raw: &[u8], start: usize, len: usize, what: &str) -> Result<T, String> {
    let s = text_field(raw, start, len);
    s.parse::<T>()
        .map_err(|_| format!("invalid {what} field {s:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn put(buf: &mut [u8], start: usize, len: usize, s: &str) {
        let field = format!("{s:<len$}");
        buf[start..start + len].copy_from_slice(field.as_bytes());
    }

    fn fixed(ns: usize, n_records: &str) -> Vec<u8> {
        let mut raw = vec![b' '; FIXED_HEADER_LEN];
        put(&mut raw, 0, 8, "0");
        put(&mut raw, 184, 8, &(256 * (ns + 1)).to_string());
        put(&mut raw, 236, 8, n_records);
        put(&mut raw, 244, 8, "1");
        put(&mut raw, 252, 4, &ns.to_string());
        raw
    }

    #[test]
    fn fixed_header_basic() {
        let h = FileHeader::from_bytes(&fixed(23, "3600")).unwrap();
        assert_eq!(h.n_signals, 23);
        assert_eq!(h.header_bytes, 256 * 24);
        assert_eq!(h.n_records, 3600);
        approx::assert_abs_diff_eq!(h.record_duration, 1.0);
    }

    #[test]
    fn unknown_record_count_is_kept() {
        let h = FileHeader::from_bytes(&fixed(1, "-1")).unwrap();
        assert_eq!(h.n_records, -1);
    }

    #[test]
    fn header_size_mismatch_is_rejected() {
        let mut raw = fixed(2, "10");
        put(&mut raw, 184, 8, "512");
        let err = FileHeader::from_bytes(&raw).unwrap_err();
        assert!(err.contains("does not match"), "{err}");
    }

    #[test]
    fn garbage_number_is_rejected() {
        let mut raw = fixed(2, "10");
        put(&mut raw, 252, 4, "xx");
        assert!(FileHeader::from_bytes(&raw).is_err());
        assert!(FileHeader::from_bytes(&raw[..100]).is_err());
    }

    #[test]
    fn physical_conversion() {
        let sig = SignalHeader {
            label: "FP1-F7".into(),
            transducer: String::new(),
            physical_dimension: "uV".into(),
            physical_min: -3200.0,
            physical_max: 3200.0,
            digital_min: -2048,
            digital_max: 2047,
            prefilter: String::new(),
            samples_per_record: 256,
        };
        approx::assert_abs_diff_eq!(sig.to_physical(-2048), -3200.0, epsilon = 1e-9);
        approx::assert_abs_diff_eq!(sig.to_physical(2047), 3200.0, epsilon = 1e-9);
    }

    #[test]
    fn signal_headers_are_field_major() {
        let ns = 2;
        let mut raw = vec![b' '; ns * SIGNAL_HEADER_LEN];
        for (i, label) in ["T7-P7", "EDF Annotations"].iter().enumerate() {
            put(&mut raw, i * 16, 16, label);
            put(&mut raw, ns * 104 + i * 8, 8, "-100");
            put(&mut raw, ns * 112 + i * 8, 8, "100");
            put(&mut raw, ns * 120 + i * 8, 8, "-32768");
            put(&mut raw, ns * 128 + i * 8, 8, "32767");
            put(&mut raw, ns * 216 + i * 8, 8, if i == 0 { "256" } else { "60" });
        }
        let sigs = SignalHeader::parse_all(&raw, ns).unwrap();
        assert_eq!(sigs[0].label, "T7-P7");
        assert_eq!(sigs[0].samples_per_record, 256);
        assert!(!sigs[0].is_annotation());
        assert!(sigs[1].is_annotation());
        assert_eq!(sigs[1].samples_per_record, 60);
    }
}
