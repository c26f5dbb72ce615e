#[path = "common/mod.rs"]
mod common;

use common::*;
use gocount::{GoTermCount, IntegrityMode};

/// Demonstrates integrity checks over a deliberately broken input:
/// - We add `annotations_bad.tsv.zst` with invalid (non-zstd) contents.
/// - `check_corpus_integrity(Quick)` and `(Full)` should report one bad file.
/// Outcome: both modes detect the corruption and return it in the error list.
#[test]
fn integrity_check_detects_corrupt_input() {
    let base = make_corpus_basic();
    add_corrupt_input(&base);

    let bad_quick = GoTermCount::new()
        .input_dir(&base)
        .progress(false)
        .check_corpus_integrity(IntegrityMode::Quick { sample_bytes: 64 * 1024 })
        .unwrap();

    assert_eq!(bad_quick.len(), 1, "quick integrity should flag the corrupt file");
    assert!(bad_quick[0].0.ends_with("annotations_bad.tsv.zst"));

    let bad_full = GoTermCount::new()
        .input_dir(&base)
        .progress(false)
        .check_corpus_integrity(IntegrityMode::Full)
        .unwrap();

    assert_eq!(bad_full.len(), 1, "full integrity should also flag the corrupt file");
}

/// A healthy corpus passes both modes with no findings.
#[test]
fn integrity_check_passes_clean_corpus() {
    let base = make_corpus_basic();

    let bad = GoTermCount::new()
        .input_dir(&base)
        .progress(false)
        .check_corpus_integrity(IntegrityMode::Full)
        .unwrap();

    assert!(bad.is_empty());
}

/// The scanner skips a corrupt compressed file with a warning and keeps
/// counting the healthy inputs; the run itself does not fail.
#[test]
fn scan_skips_corrupt_input_and_continues() {
    let base = make_corpus_basic();
    add_corrupt_input(&base);

    let table = GoTermCount::new()
        .input_dir(&base)
        .progress(false)
        .count_table()
        .unwrap();

    // Totals from the two healthy files only.
    assert_eq!(table.total(), 7);
    assert_eq!(table.get("GO:9999999"), 0);
}
