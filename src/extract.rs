use crate::accumulate::CountEntry;
use crate::zstd_tsv::Record;
use std::sync::Arc;

/// Column index (0-based) of the GO term in a standard annotation row.
pub const GO_TERM_COLUMN: usize = 4;

/// A reusable key extractor with a fast path for fixed-column keys,
/// plus custom record-based extractors.
///
/// Two calling styles:
///  - `key_from_record(&Record)`
///  - `key_from_line(&str)`
///
/// Notes:
///  - `Column` avoids building a `Record` on the line-based path.
///  - A record with too few fields yields `None` (skip, not an error).
#[derive(Clone)]
pub enum KeyExtractor {
    Column(usize),
    ByRecord(Arc<dyn Fn(&Record) -> Option<String> + Send + Sync>),
}

impl KeyExtractor {
    /// The standard extractor: GO term at column 4.
    pub fn go_term() -> Self { Self::Column(GO_TERM_COLUMN) }
    pub fn column(idx: usize) -> Self { Self::Column(idx) }
    pub fn by_record(f: impl Fn(&Record) -> Option<String> + Send + Sync + 'static) -> Self {
        Self::ByRecord(Arc::new(f))
    }

    /// Extract the key from a parsed `Record`. Exact string identity; no
    /// normalization is applied.
    pub fn key_from_record(&self, rec: &Record) -> Option<String> {
        match self {
            KeyExtractor::Column(idx) => rec.field(*idx).map(|s| s.to_string()),
            KeyExtractor::ByRecord(f) => f(rec),
        }
    }

    /// Extract the key directly from a raw line. The `Column` variant walks
    /// the tab-split iterator without collecting a `Record`.
    pub fn key_from_line(&self, line: &str) -> Option<String> {
        match self {
            KeyExtractor::Column(idx) => line.split('\t').nth(*idx).map(|s| s.to_string()),
            KeyExtractor::ByRecord(f) => f(&Record::parse(line)),
        }
    }

    /// Emit the unit pair for one qualifying line: `(key, 1)`.
    /// Lines whose record cannot produce a key contribute nothing.
    pub fn unit_entry(&self, line: &str) -> Option<CountEntry> {
        self.key_from_line(line).map(|term| CountEntry { term, count: 1 })
    }
}

impl Default for KeyExtractor {
    fn default() -> Self {
        Self::go_term()
    }
}
