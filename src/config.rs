use std::path::{Path, PathBuf};

/// User-facing options with sensible defaults and builder chaining.
#[derive(Clone, Debug)]
pub struct CountOptions {
    pub input_dir: PathBuf,
    pub top_k: usize,                 // how many entries the final report keeps
    pub shard_count: usize,           // number of on-disk grouping shards
    pub parallelism: Option<usize>,   // Some(N) to set rayon threads, None to use default
    pub work_dir: Option<PathBuf>,    // if None, create in input_dir/.gocount_work/
    pub file_concurrency: usize,      // limit number of input files processed concurrently
    pub progress: bool,               // show progress bar
    pub progress_label: Option<String>, // optional label for progress bar

    // IO tuning
    pub read_buffer_bytes: usize,     // BufReader capacity
    pub write_buffer_bytes: usize,    // BufWriter capacity
}

impl Default for CountOptions {
    fn default() -> Self {
        // Defaults chosen to be safe but noticeably faster than std defaults.
        // Adjust at runtime via io_* builder methods.
        let default_read = 256 * 1024;
        let default_write = 256 * 1024;

        Self {
            input_dir: PathBuf::from("./annotations"),
            top_k: 10,
            shard_count: 64,
            parallelism: None,
            work_dir: None,
            file_concurrency: 1, // safe default to prevent OOM on big .zst windows
            progress: true,
            progress_label: None,

            read_buffer_bytes: default_read,
            write_buffer_bytes: default_write,
        }
    }
}

impl CountOptions {
    pub fn with_input_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.input_dir = dir.as_ref().to_path_buf();
        self
    }
    pub fn with_top_k(mut self, k: usize) -> Self {
        self.top_k = k;
        self
    }
    pub fn with_shard_count(mut self, shards: usize) -> Self {
        self.shard_count = shards.max(1);
        self
    }
    pub fn with_parallelism(mut self, threads: usize) -> Self {
        self.parallelism = Some(threads);
        self
    }
    pub fn with_work_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.work_dir = Some(dir.as_ref().to_path_buf());
        self
    }
    pub fn with_file_concurrency(mut self, n: usize) -> Self {
        self.file_concurrency = n.max(1);
        self
    }
    pub fn with_progress(mut self, yes: bool) -> Self {
        self.progress = yes;
        self
    }
    pub fn with_progress_label(mut self, label: impl Into<String>) -> Self {
        self.progress_label = Some(label.into());
        self
    }

    // IO buffers tuning
    pub fn with_io_read_buffer(mut self, bytes: usize) -> Self {
        self.read_buffer_bytes = bytes.max(8 * 1024);
        self
    }
    pub fn with_io_write_buffer(mut self, bytes: usize) -> Self {
        self.write_buffer_bytes = bytes.max(8 * 1024);
        self
    }
    pub fn with_io_buffers(mut self, read_bytes: usize, write_bytes: usize) -> Self {
        self.read_buffer_bytes = read_bytes.max(8 * 1024);
        self.write_buffer_bytes = write_bytes.max(8 * 1024);
        self
    }
}
