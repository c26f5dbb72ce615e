//! The grouping layer: a sharded key->count writer. Every occurrence of a key
//! is routed to the same shard file, so each shard can be reduced by exactly
//! one accumulation unit. Consuming the writer in a `reduce_*` call is the
//! end-of-input signal for all shards.

use ahash::RandomState;
use anyhow::{Context, Result};
use parking_lot::Mutex;
use rayon::prelude::*;
use std::fs::{self, File};
use std::hash::{BuildHasher, Hash, Hasher};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::accumulate::{CountAccumulator, CountEntry, CountTable};
use crate::topk::{merge_top_k, select_top_k};

/// Sharded key->u64 writer for large-scale count reductions.
pub struct ShardedKVWriter {
    base_dir: PathBuf,
    shards: Vec<Mutex<BufWriter<File>>>,
    count: usize,
    state: RandomState,
}

impl ShardedKVWriter {
    pub fn create(work_dir: &Path, prefix: &str, count: usize) -> Result<Self> {
        let count = count.max(1);
        let dir = work_dir.join(format!("{prefix}_kv_shards"));
        fs::create_dir_all(&dir)?;
        let mut shards = Vec::with_capacity(count);
        for i in 0..count {
            let p = dir.join(format!("kv_{:04}.tmp", i));
            shards.push(Mutex::new(BufWriter::new(File::create(p)?)));
        }
        // Seeded for deterministic key routing across runs.
        let state = RandomState::with_seeds(
            0x0123_4567_89ab_cdef,
            0xfedc_ba98_7654_3210,
            0xcafe_babe_dead_beef,
            0xface_feed_0bad_f00d,
        );
        Ok(Self { base_dir: dir, shards, count, state })
    }

    #[inline]
    fn shard_index(&self, k: &str) -> usize {
        let mut h = self.state.build_hasher();
        k.hash(&mut h);
        (h.finish() as usize) % self.count
    }

    pub fn write_kv(&self, key: &str, val: u64) -> Result<()> {
        let idx = self.shard_index(key);
        let mut w = self.shards[idx].lock();
        w.write_all(key.as_bytes())?;
        w.write_all(b"\t")?;
        w.write_all(val.to_string().as_bytes())?;
        w.write_all(b"\n")?;
        Ok(())
    }

    pub fn flush_all(&self) -> Result<()> {
        for w in &self.shards { w.lock().flush()?; }
        Ok(())
    }

    /// Sum every shard into per-shard `key<TAB>total` TSVs (key-sorted) and
    /// return their paths.
    pub fn reduce_sum(self, prefix: &str) -> Result<Vec<PathBuf>> {
        // Ensure on-disk buffers are flushed before we move fields out of `self`.
        self.flush_all()?;

        // Move all fields out of `self` **once** to avoid partial-move borrow errors.
        let ShardedKVWriter { base_dir, shards, count, state: _ } = self;
        drop(shards);

        let out_dir = base_dir.parent().unwrap().join(format!("{prefix}_kv_sum"));
        fs::create_dir_all(&out_dir)?;

        // Compute shard input paths from moved fields (no further `self` usage).
        let ins: Vec<PathBuf> = (0..count)
            .map(|i| base_dir.join(format!("kv_{:04}.tmp", i)))
            .collect();

        let outs: Vec<PathBuf> = ins
            .par_iter()
            .map(|p| -> Result<PathBuf> {
                let out = out_dir.join(p.file_name().unwrap().to_string_lossy().replace(".tmp", ".tsv"));
                let table = reduce_shard_table(p)?;
                write_table_tsv(&table, &out)?;
                Ok(out)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(outs)
    }

    /// Reduce every shard, take its local top-K, and merge the candidate
    /// lists into the exact global top-K. Shards hold disjoint key sets, so
    /// the merge is a union + re-sort + re-truncate, never a re-sum.
    pub fn reduce_top_k(self, k: usize) -> Result<Vec<CountEntry>> {
        self.flush_all()?;

        let ShardedKVWriter { base_dir, shards, count, state: _ } = self;
        drop(shards);

        let ins: Vec<PathBuf> = (0..count)
            .map(|i| base_dir.join(format!("kv_{:04}.tmp", i)))
            .collect();

        let locals: Vec<Vec<CountEntry>> = ins
            .par_iter()
            .map(|p| -> Result<Vec<CountEntry>> {
                let table = reduce_shard_table(p)?;
                Ok(select_top_k(&table, k))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(merge_top_k(locals, k))
    }
}

/// Sum one shard file into a completed table. Lines that do not parse as
/// `key<TAB>u64` are ignored.
fn reduce_shard_table(input: &Path) -> Result<CountTable> {
    let mut acc = CountAccumulator::with_capacity(64_000);
    let r = BufReader::new(File::open(input).with_context(|| format!("open {}", input.display()))?);
    for line in r.lines() {
        let line = line?;
        if line.is_empty() { continue; }
        if let Some((k, v)) = line.rsplit_once('\t') {
            if let Ok(val) = v.parse::<u64>() {
                acc.add(k, val);
            }
        }
    }
    Ok(acc.finish())
}

fn write_table_tsv(table: &CountTable, output: &Path) -> Result<()> {
    let mut entries = table.entries();
    entries.sort_unstable_by(|a, b| a.term.cmp(&b.term));
    let mut w = BufWriter::new(File::create(output)?);
    for e in entries {
        w.write_all(e.term.as_bytes())?;
        w.write_all(b"\t")?;
        w.write_all(e.count.to_string().as_bytes())?;
        w.write_all(b"\n")?;
    }
    w.flush()?;
    Ok(())
}
