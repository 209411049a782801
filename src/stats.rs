use std::sync::atomic::{AtomicU64, Ordering};

/// Counters shared between the workers and the aggregator
#[derive(Default)]
pub struct ExtractionStats {
    pub files_processed: AtomicU64,
    pub file_errors: AtomicU64,
    pub lines_read: AtomicU64,
    pub documents_emitted: AtomicU64,
    pub documents_written: AtomicU64,
    pub empty_documents: AtomicU64,
    pub urls_fetched: AtomicU64,
    pub urls_skipped: AtomicU64,
}

impl ExtractionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_files(&self) {
        self.files_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_file_errors(&self) {
        self.file_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_lines(&self, count: u64) {
        self.lines_read.fetch_add(count, Ordering::Relaxed);
    }

    pub fn inc_emitted(&self) {
        self.documents_emitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_written(&self) {
        self.documents_written.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_empty(&self) {
        self.empty_documents.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_fetched(&self) {
        self.urls_fetched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_skipped(&self) {
        self.urls_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn files(&self) -> u64 {
        self.files_processed.load(Ordering::Relaxed)
    }

    pub fn file_errors(&self) -> u64 {
        self.file_errors.load(Ordering::Relaxed)
    }

    pub fn lines(&self) -> u64 {
        self.lines_read.load(Ordering::Relaxed)
    }

    pub fn emitted(&self) -> u64 {
        self.documents_emitted.load(Ordering::Relaxed)
    }

    pub fn written(&self) -> u64 {
        self.documents_written.load(Ordering::Relaxed)
    }

    pub fn empty(&self) -> u64 {
        self.empty_documents.load(Ordering::Relaxed)
    }

    pub fn fetched(&self) -> u64 {
        self.urls_fetched.load(Ordering::Relaxed)
    }

    pub fn skipped(&self) -> u64 {
        self.urls_skipped.load(Ordering::Relaxed)
    }
}
