/// Integration tests for summary parsing and layout construction.
mod common;

use common::{summary_text, write_summary};
use eegprep::{PrepError, Summary};

#[test]
fn layout_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let text = summary_text(
        &["FP1-F7", "-", "F3", "F4", "T8-P8", "T8-P8"],
        &[("chb05_01.edf", vec![])],
    );
    let path = write_summary(dir.path(), "05", &text);

    let summary = Summary::load(&path).unwrap();
    assert_eq!(summary.layout_epochs(), 1);
    let layout = summary.channel_layout(0).unwrap();
    assert_eq!(layout.valid_names(), ["FP1-F7", "F3", "F4", "T8-P8", "T8-P8-2"]);

    // Indices count registrations; sources are the numbers in the file.
    let f3 = layout.get("F3").unwrap();
    assert_eq!(f3.indices, vec![2]);
    assert_eq!(f3.source, vec![3]);
    assert_eq!(layout.get("T8-P8-2").unwrap().source, vec![6]);
}

#[test]
fn third_duplicate_joins_the_renamed_entry() {
    let summary = Summary::parse(&summary_text(&["A", "A", "A"], &[]));
    let layout = summary.channel_layout(0).unwrap();
    assert_eq!(layout.valid_names(), ["A", "A-2"]);
    assert_eq!(layout.get("A-2").unwrap().indices, vec![2, 3]);
    assert_eq!(layout.get("A-2").unwrap().source, vec![2, 3]);
}

#[test]
fn seizure_times_are_zero_based_samples() {
    let summary = Summary::parse(&summary_text(
        &["F3"],
        &[("chb01_02.edf", vec![]), ("chb01_03.edf", vec![(5, 7), (100, 140)])],
    ));
    let none = summary.seizures("chb01_02.edf").unwrap();
    assert_eq!(none.count, 0);
    assert!(none.intervals.is_empty());

    let ev = summary.seizures("chb01_03.edf").unwrap();
    assert_eq!(ev.count, 2);
    assert_eq!(ev.intervals, vec![(1279, 1791), (25599, 35839)]);
}

#[test]
fn missing_summary_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = Summary::load(&dir.path().join("none.txt")).unwrap_err();
    assert!(matches!(err, PrepError::SummaryMalformed(_)));
    assert!(!err.is_recoverable());
}

#[test]
fn summary_without_channels() {
    let summary = Summary::parse("File Name: chb01_01.edf\nNumber of Seizures in File: 0\n");
    assert!(matches!(summary.channel_layout(0), Err(PrepError::SummaryMalformed(_))));
}

#[test]
fn bad_channel_number() {
    let summary = Summary::parse("Channel x: F3\n");
    assert!(matches!(summary.channel_layout(0), Err(PrepError::SummaryMalformed(_))));
}
