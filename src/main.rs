use anyhow::Result;
use gocount::{GoTermCount, TsvWriter};
use std::fs;
use std::path::PathBuf;

const DATA_ROOT: &str = "./data";
const WORK_ROOT: &str = "./gocount_work";
const OUT_PATH: &str = "./top_terms.tsv";

fn main() -> Result<()> {
    let input_dir = PathBuf::from(DATA_ROOT);
    let work_dir = PathBuf::from(WORK_ROOT);
    let out_path = PathBuf::from(OUT_PATH);
    let hw = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(8);

    fs::create_dir_all(&work_dir)?;

    let top = GoTermCount::new()
        .input_dir(&input_dir)
        .work_dir(&work_dir)
        .parallelism(hw)
        .file_concurrency(4)
        .progress(true)
        .progress_label("Counting GO terms")
        .top_k(10)
        .top_terms()?;

    for entry in &top {
        println!("{}\t{}", entry.term, entry.count);
    }

    let mut w = TsvWriter::create(&out_path, 256 * 1024)?;
    for entry in &top {
        w.write_entry(entry)?;
    }
    w.finish()?;
    println!("Wrote {} entries to {}", top.len(), out_path.display());

    Ok(())
}
