//! Channel reconciliation against a patient layout.
//!
//! ```text
//! container labels + data ──collect_channels──► deduplicated channels
//!                                     │
//!                           reconcile(layout)
//!                                     │
//!   drop names not in layout ─► reference length ─► zero-fill the rest
//!                                     │
//!                                     ▼
//!                   exactly the layout's names, in layout order
//! ```
use std::collections::HashMap;
use ndarray::Array1;

use crate::error::{PrepError, Result};
use crate::layout::{disambiguate, ChannelLayout};

/// `(name, samples)` pairs.
pub type Channels = Vec<(String, Array1<f64>)>;

/// Pair retained labels with their data, renaming a repeated label to
/// `label-2`.
///
/// A label seen a third time replaces the data already stored under
/// `label-2`.
pub fn collect_channels<S: AsRef<str>>(labels: &[S], data: Vec<Array1<f64>>) -> Channels {
    let mut out: Channels = Vec::with_capacity(data.len());
    let mut position: HashMap<String, usize> = HashMap::new();

    for (label, samples) in labels.iter().zip(data) {
        let name = disambiguate(label.as_ref(), |n| position.contains_key(n));
        match position.get(&name).copied() {
            Some(p) => out[p].1 = samples,
            None => {
                position.insert(name.clone(), out.len());
                out.push((name, samples));
            }
        }
    }
    out
}

/// Align `channels` to `layout`.
///
/// Fails with [`PrepError::EmptyChannelIntersection`] when no channel is part
/// of the layout, since the placeholder length would be undefined.
pub fn reconcile(channels: Channels, layout: &ChannelLayout) -> Result<Channels> {
    let mut kept: HashMap<String, Array1<f64>> = channels
        .into_iter()
        .filter(|(name, _)| layout.contains(name))
        .collect();

    let n_samples = layout
        .names()
        .find_map(|n| kept.get(n))
        .map(|d| d.len())
        .ok_or_else(|| PrepError::EmptyChannelIntersection(layout.valid_names().join(",")))?;

    Ok(layout
        .names()
        .map(|name| {
            let samples = kept
                .remove(name)
                .unwrap_or_else(|| Array1::zeros(n_samples));
            (name.to_string(), samples)
        })
        .collect())
}

/// A record made only of zero-filled channels.
pub fn placeholders(layout: &ChannelLayout, n_samples: usize) -> Channels {
    layout
        .names()
        .map(|name| (name.to_string(), Array1::zeros(n_samples)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn layout(names: &[&str]) -> ChannelLayout {
        let mut l = ChannelLayout::new();
        for (i, n) in names.iter().enumerate() {
            l.register(n, i + 1);
        }
        l
    }

    #[test]
    fn duplicate_labels_keep_both() {
        let ch = collect_channels(&["L", "L"], vec![array![1.0, 1.0], array![2.0, 2.0]]);
        assert_eq!(ch[0], ("L".to_string(), array![1.0, 1.0]));
        assert_eq!(ch[1], ("L-2".to_string(), array![2.0, 2.0]));
    }

    #[test]
    fn third_duplicate_overwrites_suffixed() {
        let ch = collect_channels(
            &["L", "L", "L"],
            vec![array![1.0], array![2.0], array![3.0]],
        );
        assert_eq!(ch.len(), 2);
        assert_eq!(ch[1], ("L-2".to_string(), array![3.0]));
    }

    #[test]
    fn drops_extra_and_fills_missing_in_layout_order() {
        let l = layout(&["F3", "F4", "C3"]);
        let ch = collect_channels(
            &["ECG", "C3", "F3"],
            vec![array![9.0, 9.0, 9.0], array![3.0, 3.0, 3.0], array![1.0, 1.0, 1.0]],
        );
        let out = reconcile(ch, &l).unwrap();
        let names: Vec<_> = out.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["F3", "F4", "C3"]);
        assert_eq!(out[1].1, Array1::<f64>::zeros(3));
        assert_eq!(out[2].1, array![3.0, 3.0, 3.0]);
    }

    #[test]
    fn reconcile_is_idempotent() {
        let l = layout(&["A", "B"]);
        let once = reconcile(collect_channels(&["B"], vec![array![0.5, 0.25]]), &l).unwrap();
        let twice = reconcile(once.clone(), &l).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn nothing_in_layout_is_an_error() {
        let l = layout(&["A"]);
        let ch = collect_channels(&["Z"], vec![array![1.0]]);
        assert!(matches!(reconcile(ch, &l), Err(PrepError::EmptyChannelIntersection(_))));
        assert!(matches!(reconcile(Vec::new(), &l), Err(PrepError::EmptyChannelIntersection(_))));
    }

    #[test]
    fn placeholder_record() {
        let out = placeholders(&layout(&["A", "B"]), 4);
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|(_, d)| d.len() == 4 && d.iter().all(|&v| v == 0.0)));
    }
}
