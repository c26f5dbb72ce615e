use gocount::{CountAccumulator, CountTable};

/// Conservation: the sum of all aggregated totals equals the number of unit
/// entries fed in, however they are interleaved.
#[test]
fn totals_conserve_unit_entries() {
    let mut acc = CountAccumulator::new();
    for key in ["GO:1", "GO:2", "GO:1", "GO:3", "GO:1", "GO:2"] {
        acc.add_unit(key);
    }
    let table = acc.finish();

    assert_eq!(table.total(), 6);
    assert_eq!(table.distinct(), 3);
    assert_eq!(table.get("GO:1"), 3);
    assert_eq!(table.get("GO:2"), 2);
    assert_eq!(table.get("GO:3"), 1);
    assert_eq!(table.get("GO:unseen"), 0);
}

/// Summing pre-aggregated counts mirrors the "sum across shuffle" semantics:
/// several partitions may each contribute a partial total for the same key.
#[test]
fn add_sums_partial_counts() {
    let mut acc = CountAccumulator::new();
    acc.add("GO:1", 4);
    acc.add("GO:1", 2);
    acc.add("GO:2", 1);
    let table = acc.finish();

    assert_eq!(table.get("GO:1"), 6);
    assert_eq!(table.get("GO:2"), 1);
}

/// Idempotent re-aggregation: merging tables computed over disjoint
/// partitions of the input equals the table computed in one pass.
#[test]
fn merged_partitions_equal_one_pass() {
    let keys = ["GO:1", "GO:2", "GO:1", "GO:3", "GO:2", "GO:1", "GO:4"];

    let mut whole = CountAccumulator::new();
    for k in keys {
        whole.add_unit(k);
    }
    let whole = whole.finish();

    let (left, right) = keys.split_at(3);
    let mut acc_l = CountAccumulator::new();
    for k in left {
        acc_l.add_unit(k);
    }
    let mut acc_r = CountAccumulator::new();
    for k in right {
        acc_r.add_unit(k);
    }

    let mut merged = acc_l.finish();
    merged.merge(acc_r.finish());

    assert_eq!(merged, whole);
}

/// An accumulator that saw nothing finishes into an empty table.
#[test]
fn empty_accumulator_finishes_empty() {
    let table = CountAccumulator::new().finish();
    assert!(table.is_empty());
    assert_eq!(table.total(), 0);
    assert_eq!(table.distinct(), 0);
}

/// Tables round-trip through their JSON snapshot representation.
#[test]
fn json_snapshot_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("counts.json");

    let mut acc = CountAccumulator::new();
    acc.add("GO:0000001", 12);
    acc.add("GO:0000002", 7);
    let table = acc.finish();

    table.to_json_file(&path, false).unwrap();
    let reloaded = CountTable::from_json_file(&path).unwrap();
    assert_eq!(reloaded, table);
}
