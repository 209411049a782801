use super::{Emit, Lines, Segmenter};
use crate::fetch::{fetch_with_timeouts, Fetcher};
use crate::models::Document;
use crate::stats::ExtractionStats;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::trace;

/// One URL per line; each page that downloads becomes one document.
pub struct FetchSegmenter {
    fetcher: Arc<dyn Fetcher>,
    timeouts: Vec<Duration>,
}

impl FetchSegmenter {
    pub fn new(fetcher: Arc<dyn Fetcher>, timeouts: Vec<Duration>) -> Self {
        Self { fetcher, timeouts }
    }
}

impl Segmenter for FetchSegmenter {
    fn name(&self) -> &'static str {
        "webtext"
    }

    fn segment_lines(
        &self,
        lines: Lines<'_>,
        stats: &ExtractionStats,
        emit: Emit<'_>,
    ) -> Result<()> {
        for line in lines {
            let line = line?;
            let url = line.trim();
            if url.is_empty() {
                continue;
            }

            match fetch_with_timeouts(self.fetcher.as_ref(), url, &self.timeouts) {
                Some(paragraphs) => {
                    stats.inc_fetched();
                    trace!(url, paragraphs = paragraphs.len(), "Fetched page");
                    emit(Document::new(paragraphs.join("\n\n")))?;
                }
                None => stats.inc_skipped(),
            }
        }
        Ok(())
    }
}
