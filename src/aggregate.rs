use crate::config::{DOCUMENT_SEPARATOR, PROGRESS_INTERVAL};
use crate::models::Outcome;
use crate::split::SplitPlan;
use crate::stats::ExtractionStats;
use anyhow::{Context, Result};
use crossbeam::channel::Receiver;
use indicatif::ProgressBar;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info, warn};

const WRITE_BUFFER: usize = 128 * 1024;

/// Items written into one split file (documents, or lines for the stream pipeline)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SplitReport {
    pub file: String,
    pub count: u64,
}

/// Drains the outbound channel into the plan's split files, in arrival order.
///
/// Stops once all `workers` have sent [`Outcome::WorkerDone`]; splits never reached
/// are not created. Empty documents are counted as dropped and never written.
pub fn write_splits(
    outcomes: &Receiver<Outcome>,
    workers: usize,
    plan: &SplitPlan,
    output_dir: &Path,
    stats: &ExtractionStats,
) -> Result<Vec<SplitReport>> {
    let mut remaining = workers;
    let mut total = 0u64;
    let mut reports = Vec::new();
    let pb = ProgressBar::new_spinner();

    for split in plan.splits() {
        if remaining == 0 {
            break;
        }

        let path = output_dir.join(&split.file_name);
        let file = File::create(&path)
            .with_context(|| format!("Failed to create split file: {}", path.display()))?;
        let mut writer = BufWriter::with_capacity(WRITE_BUFFER, file);
        let mut count = 0u64;

        while remaining > 0 && !split.quota.is_filled(count) {
            let doc = match outcomes.recv() {
                Ok(Outcome::Document(doc)) => doc,
                Ok(Outcome::WorkerDone) => {
                    remaining -= 1;
                    continue;
                }
                Err(_) => {
                    warn!(remaining, "All workers hung up without signalling completion");
                    remaining = 0;
                    continue;
                }
            };

            if doc.is_empty() {
                stats.inc_empty();
                continue;
            }

            if count > 0 {
                writer
                    .write_all(DOCUMENT_SEPARATOR.as_bytes())
                    .with_context(|| format!("Failed to write to: {}", path.display()))?;
            }
            writer
                .write_all(doc.as_str().as_bytes())
                .with_context(|| format!("Failed to write to: {}", path.display()))?;
            count += 1;
            total += 1;
            stats.inc_written();

            if total % PROGRESS_INTERVAL == 0 {
                pb.set_message(format!(
                    "Processed {} docs, {} workers remaining",
                    total, remaining
                ));
                pb.tick();
                debug!(documents = total, remaining, "Progress");
            }
        }

        writer
            .flush()
            .with_context(|| format!("Failed to flush: {}", path.display()))?;
        info!(file = %split.file_name, documents = count, "Split written");
        reports.push(SplitReport {
            file: split.file_name,
            count,
        });
    }

    pb.finish_and_clear();
    Ok(reports)
}
