//! Per-key count accumulation: the running-sum state and the finished table,
//! with a merge helper for combining tables built over disjoint partitions.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// A (key, count) pair. Unit entries carry count 1; aggregated entries carry
/// the per-key total.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountEntry {
    pub term: String,
    pub count: u64,
}

/// Running per-key totals. Holds one counter per distinct key; raw entries are
/// never buffered. Totals are not observable until `finish` — the move into
/// `CountTable` is the end-of-input signal.
#[derive(Debug, Default)]
pub struct CountAccumulator {
    counts: HashMap<String, u64>,
}

impl CountAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(n: usize) -> Self {
        Self { counts: HashMap::with_capacity(n) }
    }

    /// Add `count` to the running total for `key` (starting from 0 if unseen).
    /// Sum, never count-of-distinct: several partitions may each contribute
    /// entries for the same key.
    pub fn add(&mut self, key: &str, count: u64) {
        *self.counts.entry(key.to_string()).or_insert(0) += count;
    }

    /// Record one unit entry.
    pub fn add_unit(&mut self, key: &str) {
        self.add(key, 1);
    }

    /// End-of-input: consume the accumulator and expose the final mapping.
    pub fn finish(self) -> CountTable {
        CountTable { counts: self.counts }
    }
}

/// The completed key -> total mapping produced by a finished accumulator.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountTable {
    counts: HashMap<String, u64>,
}

impl CountTable {
    /// Total for `key`; 0 for keys never observed.
    pub fn get(&self, key: &str) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Number of distinct keys observed.
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum over all totals. Equals the number of qualifying input records
    /// (conservation of counts).
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Fold `other` into `self`, summing per key. Merging tables built over
    /// disjoint partitions of an input equals one-pass accumulation over the
    /// whole input.
    pub fn merge(&mut self, other: CountTable) {
        for (k, v) in other.counts {
            *self.counts.entry(k).or_insert(0) += v;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Snapshot the mapping as owned entries (unordered).
    pub fn entries(&self) -> Vec<CountEntry> {
        self.counts
            .iter()
            .map(|(k, v)| CountEntry { term: k.clone(), count: *v })
            .collect()
    }

    /// Persist the table as a JSON snapshot.
    pub fn to_json_file(&self, path: &Path, pretty: bool) -> Result<()> {
        let out = File::create(path).with_context(|| format!("create {}", path.display()))?;
        let mut w = BufWriter::new(out);
        if pretty {
            serde_json::to_writer_pretty(&mut w, self)?;
        } else {
            serde_json::to_writer(&mut w, self)?;
        }
        w.flush()?;
        Ok(())
    }

    /// Reload a snapshot written by `to_json_file`.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
        let r = BufReader::new(f);
        Ok(serde_json::from_reader(r)?)
    }
}
