//! Single-threaded pipeline for continuous-line corpora (books).
//!
//! There are no document boundaries: every input line is detokenized and written on its
//! own line, with split quotas counted in input lines. The quote state runs on across
//! the whole of each file and resets only when the next file starts.

use crate::aggregate::SplitReport;
use crate::config::LINE_PROGRESS_INTERVAL;
use crate::detok::combine;
use crate::manifest::{write_manifest, RunReport};
use crate::models::QuoteState;
use crate::reader::LineReader;
use crate::split::SplitPlan;
use crate::walk::list_inputs;
use anyhow::{Context, Result};
use indicatif::ProgressBar;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

const WRITE_BUFFER: usize = 128 * 1024;

/// Lines of several files in order, each flagged when it is the first of its file.
pub struct StreamLines {
    files: std::vec::IntoIter<PathBuf>,
    current: Option<LineReader>,
    first: bool,
}

impl StreamLines {
    pub fn new(files: Vec<PathBuf>) -> Self {
        Self {
            files: files.into_iter(),
            current: None,
            first: false,
        }
    }
}

impl Iterator for StreamLines {
    type Item = Result<(String, bool)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(reader) = self.current.as_mut() {
                match reader.next() {
                    Some(Ok(line)) => {
                        let first = std::mem::replace(&mut self.first, false);
                        return Some(Ok((line, first)));
                    }
                    Some(Err(e)) => return Some(Err(e.into())),
                    None => self.current = None,
                }
            }

            let path = self.files.next()?;
            match LineReader::open(&path) {
                Ok(reader) => {
                    debug!(path = %path.display(), "Reading input file");
                    self.current = Some(reader);
                    self.first = true;
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

pub fn run_stream<P: AsRef<Path>>(
    inputs: &[P],
    output_dir: &Path,
    plan: &SplitPlan,
) -> Result<RunReport> {
    let start = Instant::now();
    let files = list_inputs(inputs)?;
    let file_count = files.len();

    fs::create_dir_all(output_dir).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            output_dir.display()
        )
    })?;

    let mut lines = StreamLines::new(files);
    let mut quote = QuoteState::Closed;
    let mut total = 0u64;
    let mut written = 0u64;
    let mut reports = Vec::new();
    let pb = ProgressBar::new_spinner();

    for split in plan.splits() {
        let path = output_dir.join(&split.file_name);
        let file = File::create(&path)
            .with_context(|| format!("Failed to create split file: {}", path.display()))?;
        let mut writer = BufWriter::with_capacity(WRITE_BUFFER, file);
        let mut count = 0u64;
        let mut exhausted = false;

        while !split.quota.is_filled(count) {
            let Some(next) = lines.next() else {
                exhausted = true;
                break;
            };
            let (raw, new_file) = next?;
            if new_file {
                quote = QuoteState::Closed;
            }

            let (cleaned, state) = combine(&raw, quote);
            quote = state;
            if !cleaned.is_empty() {
                writer
                    .write_all(cleaned.as_bytes())
                    .and_then(|()| writer.write_all(b"\n"))
                    .with_context(|| format!("Failed to write to: {}", path.display()))?;
                written += 1;
            }

            count += 1;
            total += 1;
            if total % LINE_PROGRESS_INTERVAL == 0 {
                pb.set_message(format!("Processed {} lines", total));
                pb.tick();
            }
        }

        writer
            .flush()
            .with_context(|| format!("Failed to flush: {}", path.display()))?;
        info!(file = %split.file_name, lines = count, "Split written");
        reports.push(SplitReport {
            file: split.file_name,
            count,
        });

        if exhausted {
            break;
        }
    }
    pb.finish_and_clear();

    let report = RunReport {
        corpus: "books".to_string(),
        unit: "lines",
        workers: 1,
        files: file_count,
        splits: reports,
        written,
        empty_dropped: total - written,
        file_errors: 0,
        urls_fetched: 0,
        urls_skipped: 0,
        duration_secs: start.elapsed().as_secs_f64(),
    };
    write_manifest(output_dir, &report)?;

    info!(lines = total, files = file_count, "Processed all lines");
    Ok(report)
}
