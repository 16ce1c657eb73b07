//! Safetensors I/O for recording records.
//!
//! One record file holds one `F64` tensor of shape `[T]` per channel. The
//! seizure metadata is stored as a JSON string under the reserved
//! `__metadata__` entry, key [`METADATA_KEY`]:
//!
//! ```text
//! u64 LE header length │ JSON header (space-padded to 8) │ tensor bytes…
//! header = { "FP1-F7": {dtype, shape, data_offsets}, …,
//!            "__metadata__": { "metadata": "{\"seizure_count\":…}" } }
//! ```
use ndarray::Array1;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

use crate::error::{PrepError, Result};
use crate::record::{RecordingRecord, SeizureMetadata};

/// Key of the metadata entry inside `__metadata__`.
pub const METADATA_KEY: &str = "metadata";

const HEADER_METADATA: &str = "__metadata__";

// ── Generic safetensors builder ───────────────────────────────────────────────

/// Minimal safetensors writer for F64 tensors plus string metadata.
///
/// ```rust,no_run
/// use eegprep::io::StWriter;
/// use std::path::Path;
/// let mut w = StWriter::new();
/// w.add_f64("FP1-F7", &[1.0, 2.0, 3.0], &[3]);
/// w.add_metadata("note", "demo");
/// w.write(Path::new("/tmp/out.safetensors")).unwrap();
/// ```
#[derive(Debug, Default)]
pub struct StWriter {
    entries:  Vec<(String, Vec<u8>, &'static str, Vec<usize>)>,
    metadata: Map<String, Value>,
}

impl StWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_f64(&mut self, name: &str, data: &[f64], shape: &[usize]) {
        let bytes: Vec<u8> = data.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.entries.push((name.to_string(), bytes, "F64", shape.to_vec()));
    }

    pub fn add_f64_arr1(&mut self, name: &str, arr: &Array1<f64>) {
        let data: Vec<f64> = arr.iter().copied().collect();
        self.add_f64(name, &data, &[arr.len()]);
    }

    pub fn add_metadata(&mut self, key: &str, value: &str) {
        self.metadata.insert(key.to_string(), Value::String(value.to_string()));
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let mut header_map = Map::new();
        let mut offset: usize = 0;
        for (name, data, dtype, shape) in &self.entries {
            header_map.insert(name.clone(), json!({
                "dtype": dtype,
                "shape": shape,
                "data_offsets": [offset, offset + data.len()],
            }));
            offset += data.len();
        }
        if !self.metadata.is_empty() {
            header_map.insert(HEADER_METADATA.to_string(), Value::Object(self.metadata.clone()));
        }
        let hdr_bytes = serde_json::to_vec(&header_map)?;
        let pad = (8 - hdr_bytes.len() % 8) % 8;
        let padded: Vec<u8> = hdr_bytes.into_iter()
            .chain(std::iter::repeat(b' ').take(pad))
            .collect();

        // Sibling temp file, renamed into place once complete.
        let tmp = path.with_extension("safetensors.tmp");
        {
            let mut f = std::io::BufWriter::new(std::fs::File::create(&tmp)?);
            f.write_all(&(padded.len() as u64).to_le_bytes())?;
            f.write_all(&padded)?;
            for (_, data, _, _) in &self.entries {
                f.write_all(data)?;
            }
            f.flush()?;
        }
        std::fs::rename(&tmp, path)?;
        Ok(())
    }
}

// ── Record files ──────────────────────────────────────────────────────────────

/// Serialize a reconciled record.
pub fn write_record(record: &RecordingRecord, path: &Path) -> Result<()> {
    let mut w = StWriter::new();
    for (name, data) in &record.channels {
        w.add_f64_arr1(name, data);
    }
    w.add_metadata(METADATA_KEY, &serde_json::to_string(&record.metadata)?);
    w.write(path)
}

/// Load a record written by [`write_record`].
///
/// Channel order follows the metadata channel list; tensors not named there
/// are appended in name order.
pub fn read_record(path: &Path) -> Result<RecordingRecord> {
    let bad = |reason: String| PrepError::RecordFormat { path: path.to_path_buf(), reason };

    let bytes = std::fs::read(path)?;
    let (header, data_start) = parse_header(&bytes).map_err(bad)?;

    let metadata: SeizureMetadata = header
        .get(HEADER_METADATA)
        .and_then(|m| m.get(METADATA_KEY))
        .and_then(Value::as_str)
        .ok_or_else(|| bad(format!("missing {HEADER_METADATA}.{METADATA_KEY}")))
        .and_then(|s| serde_json::from_str(s).map_err(|e| bad(format!("metadata: {e}"))))?;

    let mut tensors: HashMap<&str, Array1<f64>> = HashMap::new();
    for (name, entry) in &header {
        if name == HEADER_METADATA {
            continue;
        }
        let data = read_f64_tensor(&bytes, data_start, entry)
            .map_err(|e| bad(format!("tensor {name}: {e}")))?;
        tensors.insert(name.as_str(), Array1::from_vec(data));
    }

    let mut channels = Vec::with_capacity(tensors.len());
    for name in &metadata.channels {
        if let Some(data) = tensors.remove(name.as_str()) {
            channels.push((name.clone(), data));
        }
    }
    let mut rest: Vec<_> = tensors.into_iter().collect();
    rest.sort_by(|a, b| a.0.cmp(b.0));
    channels.extend(rest.into_iter().map(|(n, d)| (n.to_string(), d)));

    Ok(RecordingRecord { channels, metadata })
}

// ── Low-level parser ──────────────────────────────────────────────────────────

fn parse_header(bytes: &[u8]) -> std::result::Result<(Map<String, Value>, usize), String> {
    if bytes.len() < 8 {
        return Err("file too small".into());
    }
    let mut len = [0u8; 8];
    len.copy_from_slice(&bytes[..8]);
    let n = u64::from_le_bytes(len) as usize;
    let end = 8usize.checked_add(n).filter(|&e| e <= bytes.len())
        .ok_or_else(|| format!("header length {n} exceeds file size"))?;
    let header: Map<String, Value> = serde_json::from_slice(&bytes[8..end])
        .map_err(|e| format!("header JSON: {e}"))?;
    Ok((header, end))
}

fn read_f64_tensor(
    bytes: &[u8],
    data_start: usize,
    entry: &Value,
) -> std::result::Result<Vec<f64>, String> {
    if entry["dtype"].as_str() != Some("F64") {
        return Err(format!("unsupported dtype {}", entry["dtype"]));
    }
    let offsets = entry["data_offsets"]
        .as_array()
        .filter(|o| o.len() == 2)
        .ok_or("missing data_offsets")?;
    let s = offsets[0].as_u64().ok_or("bad offset")? as usize;
    let e = offsets[1].as_u64().ok_or("bad offset")? as usize;
    if s > e || data_start + e > bytes.len() {
        return Err(format!("offsets [{s}, {e}] out of bounds"));
    }
    let raw = &bytes[data_start + s..data_start + e];
    if raw.len() % 8 != 0 {
        return Err(format!("{} bytes is not a whole number of f64", raw.len()));
    }
    Ok(raw
        .chunks_exact(8)
        .map(|b| {
            let mut v = [0u8; 8];
            v.copy_from_slice(b);
            f64::from_le_bytes(v)
        })
        .collect())
}
