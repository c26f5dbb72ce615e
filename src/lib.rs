mod config;
mod paths;
mod zstd_tsv;

mod extract;
mod accumulate;
mod topk;
mod kv_shard;

mod progress;
mod stitch;
mod concurrency;
mod streaming;
mod util;
mod mem;
mod pipeline;

mod integrity;
mod tsv_io;

pub use crate::config::CountOptions;
pub use crate::pipeline::GoTermCount;

pub use crate::accumulate::{CountAccumulator, CountEntry, CountTable};
pub use crate::extract::{KeyExtractor, GO_TERM_COLUMN};
pub use crate::topk::{merge_top_k, select_top_k};
pub use crate::zstd_tsv::Record;
pub use crate::streaming::ScanStats;

// Expose multiprogress and progress helpers.
pub use crate::progress::{set_global_multiprogress, make_count_progress, make_progress_bar_labeled};

// Expose memory helpers for adaptive throttling from the binary.
pub use crate::mem::{available_memory_fraction, is_low_memory};

// Expose integrity checker mode, and (optionally) direct zstd validators.
pub use crate::integrity::IntegrityMode;
pub use crate::zstd_tsv::{quick_validate_zst, validate_zst_full};

// export TSV writer so binaries can emit reports in the same format.
pub use crate::tsv_io::TsvWriter;

//export robust file ops from util so binaries can import from crate root.
pub use crate::util::{open_with_backoff, create_with_backoff, remove_with_backoff, replace_file_atomic_backoff};
