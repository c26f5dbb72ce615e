use crate::accumulate::{CountAccumulator, CountEntry, CountTable};
use crate::config::CountOptions;
use crate::extract::KeyExtractor;
use crate::kv_shard::ShardedKVWriter;
use crate::paths::{discover_inputs, FileJob};
use crate::progress::{make_progress_bar_labeled, total_input_size};
use crate::stitch::concat_tsvs;
use crate::streaming::{scan_file_into_accumulator, scan_file_into_shards, ScanStats};
use crate::tsv_io::TsvWriter;
use crate::util::init_tracing_once;
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// The pipeline facade: configure with builder methods, then run one of the
/// terminal operations. Each terminal op consumes the builder; state never
/// leaks between runs.
#[derive(Clone)]
pub struct GoTermCount {
    pub(crate) opts: CountOptions,
    extractor: KeyExtractor,
}

impl GoTermCount {
    pub fn new() -> Self {
        Self { opts: CountOptions::default(), extractor: KeyExtractor::go_term() }
    }

    // -------- Builder methods --------
    pub fn input_dir(mut self, dir: impl AsRef<Path>) -> Self { self.opts = self.opts.with_input_dir(dir); self }
    pub fn top_k(mut self, k: usize) -> Self { self.opts = self.opts.with_top_k(k); self }
    pub fn shard_count(mut self, count: usize) -> Self { self.opts = self.opts.with_shard_count(count); self }
    pub fn parallelism(mut self, threads: usize) -> Self { self.opts = self.opts.with_parallelism(threads); self }
    pub fn work_dir(mut self, dir: impl AsRef<Path>) -> Self { self.opts = self.opts.with_work_dir(dir); self }
    pub fn file_concurrency(mut self, n: usize) -> Self { self.opts = self.opts.with_file_concurrency(n); self }
    pub fn progress(mut self, yes: bool) -> Self { self.opts = self.opts.with_progress(yes); self }
    pub fn progress_label(mut self, label: impl Into<String>) -> Self { self.opts = self.opts.with_progress_label(label); self }
    pub fn io_read_buffer(mut self, bytes: usize) -> Self { self.opts = self.opts.with_io_read_buffer(bytes); self }
    pub fn io_write_buffer(mut self, bytes: usize) -> Self { self.opts = self.opts.with_io_write_buffer(bytes); self }
    pub fn io_buffers(mut self, read_bytes: usize, write_bytes: usize) -> Self { self.opts = self.opts.with_io_buffers(read_bytes, write_bytes); self }

    /// Count a different column than the GO-term default.
    pub fn key_column(mut self, idx: usize) -> Self { self.extractor = KeyExtractor::column(idx); self }
    /// Replace the extractor entirely (custom record-based keys).
    pub fn extractor(mut self, ex: KeyExtractor) -> Self { self.extractor = ex; self }

    // -------- Terminal operations --------

    /// Full pipeline: scan -> group by key into shards -> reduce -> merged
    /// global top-K, largest count first.
    pub fn top_terms(self) -> Result<Vec<CountEntry>> {
        let k = self.opts.top_k;
        let kv = self.scan_to_shards("top_terms")?;
        kv.reduce_top_k(k)
    }

    /// As `top_terms`, then write the report as `term<TAB>count` lines,
    /// atomically promoted into place.
    pub fn top_terms_to_tsv(self, out_path: &Path) -> Result<()> {
        let write_buf = self.opts.write_buffer_bytes;
        let work_dir = self.ensure_work_dir()?;
        let entries = self.top_terms()?;

        let tmp = work_dir.join("top_terms.tsv.inprogress");
        let mut w = TsvWriter::create(&tmp, write_buf)
            .with_context(|| format!("create {}", tmp.display()))?;
        for e in &entries {
            w.write_entry(e)?;
        }
        w.finish_atomic(out_path)
    }

    /// Every key's total, written as `term<TAB>count` TSV (one concatenation
    /// of key-sorted per-shard reductions).
    pub fn term_counts_to_tsv(self, out_path: &Path) -> Result<()> {
        let write_buf = self.opts.write_buffer_bytes;
        let kv = self.scan_to_shards("term_counts")?;
        let shards = kv.reduce_sum("term_counts")?;
        concat_tsvs(&shards, out_path, write_buf)?;
        Ok(())
    }

    /// In-memory path for corpora that fit in RAM: accumulate per file,
    /// merge the per-file tables into one.
    pub fn count_table(self) -> Result<CountTable> {
        init_tracing_once();
        let files = self.planned_files();

        let read_buf = self.opts.read_buffer_bytes;
        let mut total_stats = ScanStats::default();
        let mut table = CountTable::default();

        if self.opts.file_concurrency <= 1 {
            let mut acc = CountAccumulator::new();
            for job in &files {
                let stats = scan_file_into_accumulator(job, read_buf, &self.extractor, &mut acc, None)
                    .with_context(|| format!("scanning {}", job.path.display()))?;
                total_stats.absorb(stats);
            }
            table = acc.finish();
        } else {
            for chunk in files.chunks(self.opts.file_concurrency) {
                let parts = chunk
                    .par_iter()
                    .map(|job| -> Result<(CountTable, ScanStats)> {
                        let mut acc = CountAccumulator::new();
                        let stats = scan_file_into_accumulator(job, read_buf, &self.extractor, &mut acc, None)
                            .with_context(|| format!("scanning {}", job.path.display()))?;
                        Ok((acc.finish(), stats))
                    })
                    .collect::<Result<Vec<_>>>()?;
                for (part, stats) in parts {
                    table.merge(part);
                    total_stats.absorb(stats);
                }
            }
        }

        log_scan_stats(total_stats);
        Ok(table)
    }

    /// Snapshot the full aggregated mapping as JSON.
    pub fn count_table_to_json(self, out_path: &Path, pretty: bool) -> Result<()> {
        let table = self.count_table()?;
        table.to_json_file(out_path, pretty)
    }

    // -------- Internals --------

    pub(crate) fn ensure_work_dir(&self) -> Result<PathBuf> {
        let dir = self.opts.work_dir.clone().unwrap_or_else(|| self.opts.input_dir.join(".gocount_work"));
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    fn planned_files(&self) -> Vec<FileJob> {
        let files = discover_inputs(&self.opts.input_dir);
        if files.is_empty() {
            tracing::warn!("No input files found. Check input_dir.");
        } else {
            tracing::info!("Planned {} files for processing.", files.len());
        }
        files
    }

    /// Shared scan stage: stream every input file, route each unit entry to
    /// its grouping shard. Consuming the returned writer is the end-of-input
    /// signal for the reduce stage.
    fn scan_to_shards(&self, prefix: &str) -> Result<ShardedKVWriter> {
        init_tracing_once();
        if let Some(n) = self.opts.parallelism { if n > 0 { rayon::ThreadPoolBuilder::new().num_threads(n).build_global().ok(); } }

        let work_dir = self.ensure_work_dir()?;
        let files = self.planned_files();
        let kv = ShardedKVWriter::create(&work_dir, prefix, self.opts.shard_count)?;
        let read_buf = self.opts.read_buffer_bytes;

        let total_bytes = total_input_size(&files);
        let pb = if self.opts.progress {
            Some(make_progress_bar_labeled(total_bytes, self.opts.progress_label.as_deref()))
        } else {
            None
        };

        let total_stats = Mutex::new(ScanStats::default());
        crate::concurrency::for_each_file_limited(&files, self.opts.file_concurrency, |job| {
            let stats = scan_file_into_shards(job, read_buf, &self.extractor, &kv, pb.clone())
                .with_context(|| format!("scanning {}", job.path.display()))?;
            total_stats.lock().unwrap().absorb(stats);
            Ok(())
        })?;

        if let Some(pb) = pb { pb.finish_with_message("done"); }
        log_scan_stats(total_stats.into_inner().unwrap());
        Ok(kv)
    }
}

impl Default for GoTermCount {
    fn default() -> Self {
        Self::new()
    }
}

fn log_scan_stats(stats: ScanStats) {
    if stats.skipped > 0 {
        tracing::info!(
            "Scanned {} qualifying records; skipped {} short records.",
            stats.qualifying, stats.skipped
        );
    } else {
        tracing::info!("Scanned {} qualifying records.", stats.qualifying);
    }
}
