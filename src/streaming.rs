//! Streaming primitives: one-pass scanners for a single input file, feeding
//! either the sharded grouping layer or an in-memory accumulator.

use crate::accumulate::CountAccumulator;
use crate::extract::KeyExtractor;
use crate::kv_shard::ShardedKVWriter;
use crate::paths::FileJob;
use crate::zstd_tsv::{for_each_line_cfg, for_each_line_with_progress_cfg};
use anyhow::Result;
use indicatif::ProgressBar;

/// Per-file scan tally. `qualifying` is the number of records that produced a
/// key; `skipped` counts non-empty lines that did not (too few fields).
/// Skips are an observability aid, never an error.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub qualifying: u64,
    pub skipped: u64,
}

impl ScanStats {
    pub fn absorb(&mut self, other: ScanStats) {
        self.qualifying += other.qualifying;
        self.skipped += other.skipped;
    }
}

/// Scan one file and route every unit entry into the grouping shards.
pub fn scan_file_into_shards(
    job: &FileJob,
    read_buf_bytes: usize,
    extractor: &KeyExtractor,
    kv: &ShardedKVWriter,
    pb: Option<ProgressBar>,
) -> Result<ScanStats> {
    let mut stats = ScanStats::default();

    let mut on_line = |line: &str| -> Result<()> {
        if line.is_empty() { return Ok(()); }
        match extractor.key_from_line(line) {
            Some(key) => {
                kv.write_kv(&key, 1)?;
                stats.qualifying += 1;
            }
            None => stats.skipped += 1,
        }
        Ok(())
    };

    if let Some(pb) = pb {
        for_each_line_with_progress_cfg(&job.path, read_buf_bytes, |delta| pb.inc(delta), |s| on_line(s))?;
    } else {
        for_each_line_cfg(&job.path, read_buf_bytes, |s| on_line(s))?;
    }

    Ok(stats)
}

/// Scan one file into a caller-owned accumulator (the in-memory path for
/// corpora that fit in RAM).
pub fn scan_file_into_accumulator(
    job: &FileJob,
    read_buf_bytes: usize,
    extractor: &KeyExtractor,
    acc: &mut CountAccumulator,
    pb: Option<ProgressBar>,
) -> Result<ScanStats> {
    let mut stats = ScanStats::default();

    let mut on_line = |line: &str| -> Result<()> {
        if line.is_empty() { return Ok(()); }
        match extractor.key_from_line(line) {
            Some(key) => {
                acc.add_unit(&key);
                stats.qualifying += 1;
            }
            None => stats.skipped += 1,
        }
        Ok(())
    };

    if let Some(pb) = pb {
        for_each_line_with_progress_cfg(&job.path, read_buf_bytes, |delta| pb.inc(delta), |s| on_line(s))?;
    } else {
        for_each_line_cfg(&job.path, read_buf_bytes, |s| on_line(s))?;
    }

    Ok(stats)
}
