//! Output stitching helper: concatenate per-shard TSVs into one file.

use anyhow::Result;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

pub fn concat_tsvs(parts: &Vec<PathBuf>, out_path: &Path, write_buf: usize) -> Result<()> {
    let mut paths = parts.clone();
    paths.sort();
    let mut out = BufWriter::with_capacity(write_buf, std::fs::File::create(out_path)?);
    for p in paths {
        let mut r = BufReader::new(std::fs::File::open(&p)?);
        std::io::copy(&mut r, &mut out)?;
    }
    out.flush()?;
    Ok(())
}
