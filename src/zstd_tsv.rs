use anyhow::Result;
use std::fs;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use zstd::stream::read::Decoder;

use crate::mem::maybe_throttle_low_memory;
use crate::util::open_with_backoff;

/// One tab-delimited input row, borrowed from the source line.
/// Fields keep their exact byte content; no trimming or case folding.
#[derive(Debug)]
pub struct Record<'a> {
    fields: Vec<&'a str>,
}

impl<'a> Record<'a> {
    /// Split one line on tab characters. Never fails; a line without tabs
    /// is a single-field record.
    pub fn parse(line: &'a str) -> Self {
        Self { fields: line.split('\t').collect() }
    }

    pub fn field(&self, idx: usize) -> Option<&'a str> {
        self.fields.get(idx).copied()
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}

fn is_zst_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("zst"))
        .unwrap_or(false)
}

// ----------------------------- Helpers for full-error logging ------------------------------------

#[inline]
fn warn_decode_skip(path: &Path, e: &anyhow::Error) {
    // Try to print an absolute, canonical path to avoid truncation/ambiguity.
    let abs = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    // Emit a multi-line message to stderr (separate from progress bars) and to tracing.
    let msg = format!(
        "Skipping input file after read/decode error\n  path : {}\n  error: {}\n\
         note : For .zst inputs this usually indicates file corruption (often late/trailing). \
                Quick integrity sampling may miss trailing corruption. \
                Consider running a Full integrity check or re-fetching this file. \
                The pipeline will skip this file and continue.",
        abs.display(),
        e
    );
    eprintln!("{}", msg);
    tracing::warn!("{}", msg);
}

// ----------------------------- Streaming ----------------------------------

/// Stream an input file line-by-line; call `on_line` with the raw `&str`.
/// `.zst` inputs are decoded transparently; anything else is read as plain text.
///
/// For zstd we request `window_log_max(31)` up front to avoid "Frame requires
/// too much memory" on very large frames. If reading still fails (e.g.,
/// checksum/corruption), log a single warning and skip the file (do not abort
/// the run).
pub fn for_each_line_cfg(
    path: &Path,
    read_buf_bytes: usize,
    mut on_line: impl FnMut(&str) -> Result<()>,
) -> Result<()> {
    match for_each_line_attempt(path, &mut on_line, Some(31), Some(read_buf_bytes)) {
        Ok(()) => Ok(()),
        Err(e) => {
            warn_decode_skip(path, &e);
            Ok(())
        }
    }
}

fn for_each_line_attempt(
    path: &Path,
    on_line: &mut impl FnMut(&str) -> Result<()>,
    window_log_max: Option<u32>,
    read_buf_bytes: Option<usize>,
) -> Result<()> {
    let file = open_with_backoff(path, 16, 50)?;
    let source: Box<dyn Read> = if is_zst_path(path) {
        let mut decoder = Decoder::new(file)?;
        if let Some(log) = window_log_max {
            decoder.window_log_max(log)?;
        }
        Box::new(decoder)
    } else {
        Box::new(file)
    };
    let cap = read_buf_bytes.unwrap_or(16 * 1024);
    let mut reader = BufReader::with_capacity(cap, source);

    let mut buf = String::with_capacity(16 * 1024);
    loop {
        buf.clear();
        let n = reader.read_line(&mut buf)?;
        if n == 0 {
            break;
        }
        if buf.ends_with('\n') {
            let _ = buf.pop();
            if buf.ends_with('\r') { let _ = buf.pop(); }
        }
        on_line(&buf)?;
        // Cooperative memory backoff
        maybe_throttle_low_memory(0.10);
    }
    Ok(())
}

/// A `Read` wrapper that counts source bytes read (compressed bytes for .zst).
struct CountingReader<R: Read> {
    inner: R,
    counter: Arc<AtomicU64>,
}
impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.counter.fetch_add(n as u64, Ordering::Relaxed);
        Ok(n)
    }
}

/// Same as `for_each_line_cfg` but calls `on_progress(delta_bytes_read)` after
/// each line. On a read/decode failure, logs a warning, **advances the progress
/// by the file's size**, and skips the file.
pub fn for_each_line_with_progress_cfg(
    path: &Path,
    read_buf_bytes: usize,
    mut on_progress: impl FnMut(u64),
    mut on_line: impl FnMut(&str) -> Result<()>,
) -> Result<()> {
    match for_each_line_attempt_with_progress(path, Some(read_buf_bytes), &mut on_progress, &mut on_line, Some(31)) {
        Ok(()) => Ok(()),
        Err(e) => {
            warn_decode_skip(path, &e);
            if let Ok(meta) = fs::metadata(path) {
                on_progress(meta.len());
            }
            Ok(())
        }
    }
}

fn for_each_line_attempt_with_progress(
    path: &Path,
    read_buf_bytes: Option<usize>,
    on_progress: &mut impl FnMut(u64),
    on_line: &mut impl FnMut(&str) -> Result<()>,
    window_log_max: Option<u32>,
) -> Result<()> {
    let file = open_with_backoff(path, 16, 50)?;
    let counter = Arc::new(AtomicU64::new(0));
    let cnt = CountingReader { inner: file, counter: counter.clone() };

    let source: Box<dyn Read> = if is_zst_path(path) {
        let mut decoder = Decoder::new(cnt)?;
        if let Some(log) = window_log_max {
            decoder.window_log_max(log)?;
        }
        Box::new(decoder)
    } else {
        Box::new(cnt)
    };
    let cap = read_buf_bytes.unwrap_or(16 * 1024);
    let mut reader = BufReader::with_capacity(cap, source);

    let mut buf = String::with_capacity(16 * 1024);
    let mut last = 0u64;
    loop {
        buf.clear();
        let n = reader.read_line(&mut buf)?;
        if n == 0 {
            // final progress flush
            let cur = counter.load(Ordering::Relaxed);
            if cur > last {
                on_progress(cur - last);
            }
            break;
        }
        if buf.ends_with('\n') {
            let _ = buf.pop();
            if buf.ends_with('\r') { let _ = buf.pop(); }
        }
        // progress
        let cur = counter.load(Ordering::Relaxed);
        if cur > last {
            on_progress(cur - last);
            last = cur;
        }
        on_line(&buf)?;
        maybe_throttle_low_memory(0.10);
    }
    Ok(())
}

// ----------------------------- Integrity checks ----------------------------------

/// QUICK check: attempt to decode up to `max_decompressed_bytes` and stop.
pub fn quick_validate_zst(path: &Path, max_decompressed_bytes: u64) -> Result<()> {
    let file = open_with_backoff(path, 16, 50)?;
    let mut decoder = Decoder::new(file)?;
    decoder.window_log_max(31)?;
    let mut limited = decoder.take(max_decompressed_bytes);
    // Discard output; we only care about whether decoding produces an error.
    io::copy(&mut limited, &mut io::sink())?;
    Ok(())
}

/// FULL check: decode the entire stream to EOF.
pub fn validate_zst_full(path: &Path) -> Result<()> {
    let file = open_with_backoff(path, 16, 50)?;
    let mut decoder = Decoder::new(file)?;
    decoder.window_log_max(31)?;
    io::copy(&mut decoder, &mut io::sink())?;
    Ok(())
}
