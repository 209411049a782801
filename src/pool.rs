//! Bounded pool of extraction workers.
//!
//! Paths go into an unbounded intake channel followed by one [`Job::Stop`] per worker.
//! Each worker runs the segmenter over one file at a time and pushes documents into a
//! bounded outbound channel, so a slow aggregator stalls the workers instead of letting
//! documents pile up in memory. Every worker ends by sending [`Outcome::WorkerDone`].

use crate::config::CHANNEL_FACTOR;
use crate::models::{Document, Job, Outcome};
use crate::segment::Segmenter;
use crate::stats::ExtractionStats;
use anyhow::{Context, Result};
use crossbeam::channel::{bounded, unbounded, Receiver, SendError, Sender};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

/// Workers actually started: never more than there are files, never fewer than one.
pub fn pool_size(configured: usize, files: usize) -> usize {
    configured.min(files).max(1)
}

pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
    outcomes: Receiver<Outcome>,
}

impl WorkerPool {
    pub fn spawn(
        segmenter: Arc<dyn Segmenter>,
        files: Vec<PathBuf>,
        workers: usize,
        stats: Arc<ExtractionStats>,
    ) -> Result<Self> {
        let size = pool_size(workers, files.len());
        let (job_tx, job_rx) = unbounded::<Job>();
        let (outcome_tx, outcome_rx) = bounded::<Outcome>(size * CHANNEL_FACTOR);

        for path in files {
            job_tx
                .send(Job::File(path))
                .context("Intake channel closed")?;
        }
        for _ in 0..size {
            job_tx.send(Job::Stop).context("Intake channel closed")?;
        }

        let mut handles = Vec::with_capacity(size);
        for id in 0..size {
            let jobs = job_rx.clone();
            let outcomes = outcome_tx.clone();
            let segmenter = Arc::clone(&segmenter);
            let stats = Arc::clone(&stats);
            let handle = thread::Builder::new()
                .name(format!("extract-worker-{}", id))
                .spawn(move || worker_loop(id, segmenter.as_ref(), &jobs, outcomes, &stats))
                .context("Failed to spawn worker thread")?;
            handles.push(handle);
        }

        debug!(workers = size, "Worker pool started");
        Ok(Self {
            handles,
            outcomes: outcome_rx,
        })
    }

    pub fn size(&self) -> usize {
        self.handles.len()
    }

    pub fn outcomes(&self) -> &Receiver<Outcome> {
        &self.outcomes
    }

    pub fn join(self) {
        for handle in self.handles {
            if handle.join().is_err() {
                warn!("Worker thread panicked");
            }
        }
    }
}

/// Sends the completion sentinel when the worker exits. Covers unwinding panics too; the
/// release profile aborts on panic instead.
struct DoneGuard(Sender<Outcome>);

impl Drop for DoneGuard {
    fn drop(&mut self) {
        let _ = self.0.send(Outcome::WorkerDone);
    }
}

fn worker_loop(
    id: usize,
    segmenter: &dyn Segmenter,
    jobs: &Receiver<Job>,
    outcomes: Sender<Outcome>,
    stats: &ExtractionStats,
) {
    let done = DoneGuard(outcomes);
    let outcomes = &done.0;

    while let Ok(job) = jobs.recv() {
        let path = match job {
            Job::File(path) => path,
            Job::Stop => break,
        };

        let mut emit = |doc: Document| -> Result<()> {
            stats.inc_emitted();
            outcomes.send(Outcome::Document(doc))?;
            Ok(())
        };

        match segmenter.segment(&path, stats, &mut emit) {
            Ok(()) => stats.inc_files(),
            Err(e) if e.downcast_ref::<SendError<Outcome>>().is_some() => {
                debug!(worker = id, "Outcome channel closed, stopping");
                break;
            }
            Err(e) => {
                stats.inc_file_errors();
                warn!(worker = id, path = %path.display(), error = %format!("{:#}", e), "Skipping file");
            }
        }
    }

    debug!(worker = id, "Worker finished");
}
