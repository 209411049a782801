use crate::aggregate::write_splits;
use crate::manifest::{write_manifest, RunReport};
use crate::pool::WorkerPool;
use crate::segment::Segmenter;
use crate::split::SplitPlan;
use crate::stats::ExtractionStats;
use crate::walk::list_files;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Runs a document pipeline end to end: enumerate `input`, segment every file on a
/// worker pool, and write the documents into `plan`'s split files under `output_dir`.
pub fn run_extraction(
    input: &Path,
    output_dir: &Path,
    segmenter: Arc<dyn Segmenter>,
    workers: usize,
    plan: &SplitPlan,
) -> Result<RunReport> {
    let start = Instant::now();
    let files = list_files(input)?;
    let file_count = files.len();

    fs::create_dir_all(output_dir).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            output_dir.display()
        )
    })?;

    let corpus = segmenter.name();
    let stats = Arc::new(ExtractionStats::new());
    let pool = WorkerPool::spawn(segmenter, files, workers, Arc::clone(&stats))?;
    let pool_size = pool.size();
    info!(corpus, files = file_count, workers = pool_size, "Starting extraction");

    let splits = write_splits(pool.outcomes(), pool_size, plan, output_dir, &stats)?;
    pool.join();

    let report = RunReport {
        corpus: corpus.to_string(),
        unit: "documents",
        workers: pool_size,
        files: file_count,
        splits,
        written: stats.written(),
        empty_dropped: stats.empty(),
        file_errors: stats.file_errors(),
        urls_fetched: stats.fetched(),
        urls_skipped: stats.skipped(),
        duration_secs: start.elapsed().as_secs_f64(),
    };
    write_manifest(output_dir, &report)?;

    info!(
        documents = report.written,
        emitted = stats.emitted(),
        lines = stats.lines(),
        files = stats.files(),
        duration_secs = report.duration_secs,
        "Extraction complete"
    );
    Ok(report)
}
