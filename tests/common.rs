/// Shared helpers: synthetic EDF files and CHB-style summary text.
use std::fs;
use std::path::{Path, PathBuf};

#[allow(unused)]
/// Digital value written for ordinary signal `sig` at sample `t`.
pub fn sample_value(sig: usize, t: usize) -> i16 {
    (sig as i16 + 1) * 1000 + (t % 97) as i16
}

/// Builder for small EDF files.
///
/// Physical and digital ranges default to the full `i16` span so physical
/// values equal the stored integers.
#[allow(unused)]
#[derive(Debug, Clone)]
pub struct EdfBuilder {
    labels:        Vec<String>,
    spr:           usize,
    n_records:     usize,
    declared:      Option<i64>,
    annotation:    bool,
    physical:      (f64, f64),
}

#[allow(unused)]
impl EdfBuilder {
    pub fn new(labels: &[&str]) -> Self {
        Self {
            labels:     labels.iter().map(|s| s.to_string()).collect(),
            spr:        16,
            n_records:  2,
            declared:   None,
            annotation: false,
            physical:   (-32768.0, 32767.0),
        }
    }

    pub fn samples_per_record(mut self, spr: usize) -> Self {
        self.spr = spr;
        self
    }

    pub fn records(mut self, n: usize) -> Self {
        self.n_records = n;
        self
    }

    /// Header record count field (e.g. `-1`), independent of the data written.
    pub fn declared_records(mut self, n: i64) -> Self {
        self.declared = Some(n);
        self
    }

    /// Put an `EDF Annotations` signal in front of the ordinary signals.
    pub fn with_annotation(mut self) -> Self {
        self.annotation = true;
        self
    }

    pub fn physical_range(mut self, min: f64, max: f64) -> Self {
        self.physical = (min, max);
        self
    }

    /// Samples per ordinary signal in the file.
    pub fn n_samples(&self) -> usize {
        self.spr * self.n_records
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        // (label, spr, is_annotation) in file order
        let mut sigs: Vec<(String, usize, bool)> = Vec::new();
        if self.annotation {
            sigs.push(("EDF Annotations".to_string(), 8, true));
        }
        sigs.extend(self.labels.iter().map(|l| (l.clone(), self.spr, false)));
        let ns = sigs.len();

        let mut out = Vec::new();
        let declared = self.declared.unwrap_or(self.n_records as i64);
        push_field(&mut out, "0", 8);
        push_field(&mut out, "X X X X", 80);
        push_field(&mut out, "Startdate X X X X", 80);
        push_field(&mut out, "01.01.10", 8);
        push_field(&mut out, "00.00.00", 8);
        push_field(&mut out, &(256 * (ns + 1)).to_string(), 8);
        push_field(&mut out, "", 44);
        push_field(&mut out, &declared.to_string(), 8);
        push_field(&mut out, "1", 8);
        push_field(&mut out, &ns.to_string(), 4);

        let (pmin, pmax) = self.physical;
        for (label, _, _) in &sigs { push_field(&mut out, label, 16); }
        for _ in &sigs { push_field(&mut out, "", 80); }
        for _ in &sigs { push_field(&mut out, "uV", 8); }
        for _ in &sigs { push_field(&mut out, &pmin.to_string(), 8); }
        for _ in &sigs { push_field(&mut out, &pmax.to_string(), 8); }
        for _ in &sigs { push_field(&mut out, "-32768", 8); }
        for _ in &sigs { push_field(&mut out, "32767", 8); }
        for _ in &sigs { push_field(&mut out, "", 80); }
        for (_, spr, _) in &sigs { push_field(&mut out, &spr.to_string(), 8); }
        for _ in &sigs { push_field(&mut out, "", 32); }

        for r in 0..self.n_records {
            let mut ordinary = 0usize;
            for (_, spr, is_annotation) in &sigs {
                for s in 0..*spr {
                    let v = if *is_annotation { 0 } else { sample_value(ordinary, r * spr + s) };
                    out.extend_from_slice(&v.to_le_bytes());
                }
                if !is_annotation {
                    ordinary += 1;
                }
            }
        }
        out
    }

    pub fn write(&self, path: &Path) {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).unwrap();
        }
        fs::write(path, self.to_bytes()).unwrap();
    }
}

#[allow(unused)]
fn push_field(out: &mut Vec<u8>, value: &str, len: usize) {
    let field = format!("{value:<len$}");
    assert_eq!(field.len(), len, "field {value:?} wider than {len}");
    out.extend_from_slice(field.as_bytes());
}

#[allow(unused)]
/// Cut a file down to its first `keep` bytes.
pub fn truncate(path: &Path, keep: usize) {
    let bytes = fs::read(path).unwrap();
    fs::write(path, &bytes[..keep.min(bytes.len())]).unwrap();
}

#[allow(unused)]
/// CHB-style summary: one channel block, then one entry per recording with
/// its `(start, end)` seizure times in seconds.
pub fn summary_text(channels: &[&str], files: &[(&str, Vec<(i64, i64)>)]) -> String {
    let mut s = String::from("Data Sampling Rate: 256 Hz\n*************************\n\n");
    s.push_str("Channels in EDF Files:\n**********************\n");
    for (i, ch) in channels.iter().enumerate() {
        s.push_str(&format!("Channel {}: {ch}\n", i + 1));
    }
    for (name, seizures) in files {
        s.push_str(&format!("\nFile Name: {name}\n"));
        s.push_str("File Start Time: 00:00:00\nFile End Time: 01:00:00\n");
        s.push_str(&format!("Number of Seizures in File: {}\n", seizures.len()));
        for (i, (start, end)) in seizures.iter().enumerate() {
            s.push_str(&format!("Seizure {} Start Time: {start} seconds\n", i + 1));
            s.push_str(&format!("Seizure {} End Time: {end} seconds\n", i + 1));
        }
    }
    s
}

#[allow(unused)]
/// Write `chbPP/chbPP-summary.txt` under `root`.
pub fn write_summary(root: &Path, patient: &str, text: &str) -> PathBuf {
    let dir = root.join(format!("chb{patient}"));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(format!("chb{patient}-summary.txt"));
    fs::write(&path, text).unwrap();
    path
}

#[allow(unused)]
/// `root/chbPP/chbPP_NN.edf`
pub fn recording_path(root: &Path, patient: &str, number: u32) -> PathBuf {
    root.join(format!("chb{patient}")).join(format!("chb{patient}_{number:02}.edf"))
}
