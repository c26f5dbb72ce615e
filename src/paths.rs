use regex::Regex;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One input file scheduled for scanning.
#[derive(Clone, Debug)]
pub struct FileJob {
    pub path: PathBuf,
}

impl FileJob {
    /// Whether the scanner must route this file through the zstd decoder.
    pub fn is_zst(&self) -> bool {
        self.path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("zst"))
            .unwrap_or(false)
    }
}

/// Discover annotation files directly under `input_dir`, in stable (sorted) order.
/// Accepted names: `*.tsv`, `*.gaf`, `*.txt`, each optionally `.zst`-compressed.
/// A missing directory yields an empty plan; the caller decides how loudly to complain.
pub fn discover_inputs(input_dir: &Path) -> Vec<FileJob> {
    let re = Regex::new(r"(?i)\.(?:tsv|gaf|txt)(?:\.zst)?$").unwrap();

    let mut jobs = Vec::new();
    if !input_dir.exists() {
        return jobs;
    }
    for entry in WalkDir::new(input_dir).min_depth(1).max_depth(1) {
        if let Ok(ent) = entry {
            if !ent.file_type().is_file() {
                continue;
            }
            if let Some(name) = ent.file_name().to_str() {
                if re.is_match(name) {
                    jobs.push(FileJob { path: ent.path().to_path_buf() });
                }
            }
        }
    }
    jobs.sort_by(|a, b| a.path.cmp(&b.path));
    jobs
}
