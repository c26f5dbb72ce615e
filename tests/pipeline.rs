#[path = "common/mod.rs"]
mod common;

use common::*;
use gocount::{select_top_k, GoTermCount};
use std::fs;

/// End-to-end over the mixed plain/zstd corpus: totals are summed across
/// files, the report is ordered, and the count tie at 3 resolves by
/// ascending term order.
#[test]
fn top_terms_over_mixed_corpus() {
    let base = make_corpus_basic();

    let top = GoTermCount::new()
        .input_dir(&base)
        .progress(false)
        .top_k(10)
        .top_terms()
        .unwrap();

    let got: Vec<(String, u64)> = top.into_iter().map(|e| (e.term, e.count)).collect();
    assert_eq!(
        got,
        vec![
            ("GO:0000001".to_string(), 3),
            ("GO:0000002".to_string(), 3),
            ("GO:0000003".to_string(), 1),
        ]
    );
}

/// The minimal worked example: GO:1 twice and GO:2 once aggregate to
/// {GO:1: 2, GO:2: 1}, and the top-2 report lists them in that order.
#[test]
fn tiny_corpus_aggregates_exactly() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.into_path();
    write_tsv_lines(
        &base.join("tiny.tsv"),
        &[
            "a\tb\tc\td\tGO:1".to_string(),
            "a\tb\tc\td\tGO:1".to_string(),
            "a\tb\tc\td\tGO:2".to_string(),
        ],
    );

    let table = GoTermCount::new()
        .input_dir(&base)
        .progress(false)
        .count_table()
        .unwrap();
    assert_eq!(table.get("GO:1"), 2);
    assert_eq!(table.get("GO:2"), 1);
    assert_eq!(table.distinct(), 2);

    let top = GoTermCount::new()
        .input_dir(&base)
        .progress(false)
        .top_k(2)
        .top_terms()
        .unwrap();
    assert_eq!(top.len(), 2);
    assert_eq!((top[0].term.as_str(), top[0].count), ("GO:1", 2));
    assert_eq!((top[1].term.as_str(), top[1].count), ("GO:2", 1));
}

/// Conservation and skip correctness: the 3-field row contributes to no key
/// and is excluded from the qualifying total; everything else is counted.
#[test]
fn short_rows_affect_no_count() {
    let base = make_corpus_basic();

    let table = GoTermCount::new()
        .input_dir(&base)
        .progress(false)
        .count_table()
        .unwrap();

    // 8 input rows, 7 qualifying: the short row vanished without error.
    assert_eq!(table.total(), 7);
    assert_eq!(table.distinct(), 3);
    assert_eq!(table.get("short"), 0);
}

/// The sharded grouping path and the in-memory path agree exactly.
#[test]
fn sharded_and_in_memory_paths_agree() {
    let base = make_corpus_basic();

    let table = GoTermCount::new()
        .input_dir(&base)
        .file_concurrency(2)
        .progress(false)
        .count_table()
        .unwrap();

    let top_sharded = GoTermCount::new()
        .input_dir(&base)
        .shard_count(8)
        .progress(false)
        .top_k(10)
        .top_terms()
        .unwrap();

    assert_eq!(top_sharded, select_top_k(&table, 10));
}

/// Full per-key totals land in a `term<TAB>count` TSV.
#[test]
fn term_counts_tsv_contains_all_totals() {
    let base = make_corpus_basic();
    let out_dir = base.join("out");
    fs::create_dir_all(&out_dir).unwrap();
    let counts_tsv = out_dir.join("term_counts.tsv");

    GoTermCount::new()
        .input_dir(&base)
        .progress(false)
        .term_counts_to_tsv(&counts_tsv)
        .unwrap();

    let mut kv = parse_kv_lines(read_lines(&counts_tsv));
    kv.sort();
    assert_eq!(
        kv,
        vec![
            ("GO:0000001".to_string(), 3),
            ("GO:0000002".to_string(), 3),
            ("GO:0000003".to_string(), 1),
        ]
    );
}

/// The report writer emits `term<TAB>count` lines in report order.
#[test]
fn top_terms_tsv_matches_report_order() {
    let base = make_corpus_basic();
    let out_dir = base.join("out");
    fs::create_dir_all(&out_dir).unwrap();
    let report = out_dir.join("top_terms.tsv");

    GoTermCount::new()
        .input_dir(&base)
        .progress(false)
        .top_k(2)
        .top_terms_to_tsv(&report)
        .unwrap();

    let lines = read_lines(&report);
    assert_eq!(lines, vec!["GO:0000001\t3".to_string(), "GO:0000002\t3".to_string()]);
}

/// 15 distinct terms with count 1: the report holds exactly 10 entries and
/// the all-ways tie resolves in ascending term order.
#[test]
fn fifteen_way_tie_fills_ten_slots() {
    let base = make_corpus_ties();

    let top = GoTermCount::new()
        .input_dir(&base)
        .progress(false)
        .top_k(10)
        .top_terms()
        .unwrap();

    assert_eq!(top.len(), 10);
    for (i, entry) in top.iter().enumerate() {
        assert_eq!(entry.term, format!("GO:{:07}", i + 1));
        assert_eq!(entry.count, 1);
    }
}

/// No inputs: an empty report, not an error.
#[test]
fn empty_input_dir_yields_empty_report() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.into_path();

    let top = GoTermCount::new()
        .input_dir(&base)
        .progress(false)
        .top_terms()
        .unwrap();
    assert!(top.is_empty());
}

/// Counting a different column via the builder.
#[test]
fn key_column_overrides_extracted_field() {
    let base = make_corpus_basic();

    // Column 0 is the database tag, identical on every qualifying row —
    // including the short row, which has enough fields for column 0.
    let table = GoTermCount::new()
        .input_dir(&base)
        .key_column(0)
        .progress(false)
        .count_table()
        .unwrap();

    assert_eq!(table.get("UniProtKB"), 7);
    assert_eq!(table.get("short"), 1);
    assert_eq!(table.total(), 8);
}

/// The aggregated mapping can be snapshotted to JSON from the pipeline.
#[test]
fn count_table_json_snapshot_from_pipeline() {
    let base = make_corpus_basic();
    let out_dir = base.join("out");
    fs::create_dir_all(&out_dir).unwrap();
    let snapshot = out_dir.join("counts.json");

    GoTermCount::new()
        .input_dir(&base)
        .progress(false)
        .count_table_to_json(&snapshot, true)
        .unwrap();

    let reloaded = gocount::CountTable::from_json_file(&snapshot).unwrap();
    assert_eq!(reloaded.total(), 7);
    assert_eq!(reloaded.get("GO:0000002"), 3);
}
