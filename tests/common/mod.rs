use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Write a plain-text file containing the provided tab-delimited lines.
pub fn write_tsv_lines(path: &Path, lines: &[String]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut f = File::create(path).unwrap();
    for l in lines {
        writeln!(&mut f, "{}", l).unwrap();
    }
}

/// Write a compressed `.zst` file containing the provided tab-delimited lines.
/// This mirrors how large annotation dumps ship, but with tiny content.
pub fn write_zst_lines(path: &Path, lines: &[String]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let f = File::create(path).unwrap();
    let mut enc = zstd::stream::write::Encoder::new(f, 3).unwrap();
    for l in lines {
        writeln!(&mut enc, "{}", l).unwrap();
    }
    enc.finish().unwrap();
}

/// Read a text file line-by-line into strings (useful for .tsv outputs).
pub fn read_lines(path: &Path) -> Vec<String> {
    let f = File::open(path).unwrap();
    let r = BufReader::new(f);
    r.lines().map(|l| l.unwrap()).filter(|s| !s.is_empty()).collect()
}

/// Parse `key<TAB>count` lines into (term, count) pairs.
pub fn parse_kv_lines(lines: Vec<String>) -> Vec<(String, u64)> {
    lines
        .into_iter()
        .filter_map(|line| {
            let (k, v) = line.split_once('\t')?;
            Some((k.to_string(), v.parse::<u64>().ok()?))
        })
        .collect()
}

/// One GAF-style annotation row with `go` at column index 4.
pub fn anno_row(object_id: &str, symbol: &str, go: &str) -> String {
    format!("UniProtKB\t{}\t{}\tenables\t{}\tPMID:12345\tIDA", object_id, symbol, go)
}

/// Build a tiny **valid** corpus with:
/// - `annotations_1.tsv` (plain): GO:0000001 twice, GO:0000002 once, plus one
///   3-field row (too short to carry a GO term — must be skipped silently).
/// - `annotations_2.tsv.zst` (compressed): GO:0000002 twice, GO:0000001 once,
///   GO:0000003 once.
///
/// Expected totals: GO:0000001 = 3, GO:0000002 = 3, GO:0000003 = 1;
/// 7 qualifying records overall. The two top terms tie at 3, so the
/// tie-break (ascending term order) puts GO:0000001 first.
pub fn make_corpus_basic() -> PathBuf {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.into_path();

    let plain = base.join("annotations_1.tsv");
    let plain_lines = vec![
        anno_row("P10001", "TP53", "GO:0000001"),
        anno_row("P10002", "BRCA1", "GO:0000001"),
        anno_row("P10003", "EGFR", "GO:0000002"),
        "short\trow\tonly".to_string(),
    ];
    write_tsv_lines(&plain, &plain_lines);

    let compressed = base.join("annotations_2.tsv.zst");
    let zst_lines = vec![
        anno_row("P10004", "MYC", "GO:0000002"),
        anno_row("P10005", "KRAS", "GO:0000002"),
        anno_row("P10006", "PTEN", "GO:0000001"),
        anno_row("P10007", "AKT1", "GO:0000003"),
    ];
    write_zst_lines(&compressed, &zst_lines);

    base
}

/// Build a corpus with 15 distinct GO terms, each annotated exactly once,
/// to exercise tie-breaking across an entire top-10 report.
pub fn make_corpus_ties() -> PathBuf {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.into_path();

    let lines: Vec<String> = (1..=15)
        .map(|i| anno_row(&format!("P2{:04}", i), "GENE", &format!("GO:{:07}", i)))
        .collect();
    write_tsv_lines(&base.join("annotations_ties.tsv"), &lines);

    base
}

/// Add a deliberately broken compressed input (correct name, invalid
/// contents — plain text rather than a zstd stream) to exercise the
/// integrity checker and the scanner's skip-on-corruption behavior.
pub fn add_corrupt_input(base: &Path) {
    let corrupt = base.join("annotations_bad.tsv.zst");
    fs::create_dir_all(corrupt.parent().unwrap()).unwrap();
    let mut f = File::create(&corrupt).unwrap();
    // Not a zstd stream:
    writeln!(&mut f, "UniProtKB\tP99999\tBAD\tenables\tGO:9999999").unwrap();
}
