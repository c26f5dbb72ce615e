//! Bounded top-K selection over completed count tables, and the merge stage
//! that combines shard-local candidate lists into the global result.

use crate::accumulate::{CountEntry, CountTable};
use std::cmp::Ordering;

/// Ranking order for the final report: larger counts first, ties broken by
/// ascending lexicographic term order so the output is deterministic.
#[inline]
pub(crate) fn rank_cmp(a: &CountEntry, b: &CountEntry) -> Ordering {
    b.count.cmp(&a.count).then_with(|| a.term.cmp(&b.term))
}

/// Select the `k` most frequent entries from a completed table.
/// Output length is `min(k, distinct keys)`; the table is not mutated.
pub fn select_top_k(table: &CountTable, k: usize) -> Vec<CountEntry> {
    let mut entries = table.entries();
    // Unstable sort is fine: the comparator is total over unique terms.
    entries.sort_unstable_by(rank_cmp);
    entries.truncate(k);
    entries
}

/// Merge per-shard local top-K candidate lists into the global top-K: union,
/// re-sort, re-truncate. Correct only when the lists come from shards holding
/// disjoint key sets (the grouping layer routes each key to exactly one
/// shard), so no term appears in more than one list.
pub fn merge_top_k(locals: Vec<Vec<CountEntry>>, k: usize) -> Vec<CountEntry> {
    let mut all: Vec<CountEntry> = locals.into_iter().flatten().collect();
    all.sort_unstable_by(rank_cmp);
    all.truncate(k);
    all
}
