use crate::accumulate::CountEntry;
use crate::util::{create_with_backoff, replace_file_atomic_backoff};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Minimal TSV writer with buffering and robust file creation.
/// Rows are written as `key<TAB>count`, one per line.
pub struct TsvWriter {
    path: PathBuf,
    w: Option<BufWriter<File>>,
}

impl TsvWriter {
    pub fn create(path: &Path, buf_bytes: usize) -> io::Result<Self> {
        let f = create_with_backoff(path, 16, 50)?;
        Ok(Self { path: path.to_path_buf(), w: Some(BufWriter::with_capacity(buf_bytes.max(8 * 1024), f)) })
    }

    #[inline]
    pub fn write_kv(&mut self, key: &str, count: u64) -> io::Result<()> {
        if let Some(w) = &mut self.w {
            w.write_all(key.as_bytes())?;
            w.write_all(b"\t")?;
            w.write_all(count.to_string().as_bytes())?;
            w.write_all(b"\n")?;
        }
        Ok(())
    }

    pub fn write_entry(&mut self, entry: &CountEntry) -> io::Result<()> {
        self.write_kv(&entry.term, entry.count)
    }

    pub fn finish(mut self) -> io::Result<()> {
        if let Some(mut w) = self.w.take() {
            w.flush()?;
        }
        Ok(())
    }

    /// Flushes and atomically promotes the temp file to `final_path`.
    /// Use when the writer was created on a temp location.
    pub fn finish_atomic(mut self, final_path: &Path) -> Result<()> {
        if let Some(mut w) = self.w.take() {
            w.flush().with_context(|| format!("flush {}", self.path.display()))?;
        }
        replace_file_atomic_backoff(&self.path, final_path)
    }
}
