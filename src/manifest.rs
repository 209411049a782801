use crate::aggregate::SplitReport;
use crate::config::MANIFEST_FILE;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Summary of one run, written as `manifest.json` beside the split files
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub corpus: String,
    /// What split counts measure: `documents` or `lines`
    pub unit: &'static str,
    pub workers: usize,
    pub files: usize,
    pub splits: Vec<SplitReport>,
    pub written: u64,
    pub empty_dropped: u64,
    pub file_errors: u64,
    pub urls_fetched: u64,
    pub urls_skipped: u64,
    pub duration_secs: f64,
}

impl RunReport {
    pub fn split_count(&self, file: &str) -> Option<u64> {
        self.splits.iter().find(|s| s.file == file).map(|s| s.count)
    }
}

pub fn write_manifest(output_dir: &Path, report: &RunReport) -> Result<()> {
    let path = output_dir.join(MANIFEST_FILE);
    let file = File::create(&path)
        .with_context(|| format!("Failed to create manifest: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report)
        .with_context(|| format!("Failed to write manifest: {}", path.display()))?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
