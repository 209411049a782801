//! Corpus-specific strategies for cutting one input file into documents.

mod stories;
mod webtext;
mod wiki;

pub use stories::BlankLineSegmenter;
pub use webtext::FetchSegmenter;
pub use wiki::{process_article, TaggedSegmenter};

use crate::models::Document;
use crate::reader::LineReader;
use crate::stats::ExtractionStats;
use anyhow::{Context, Result};
use std::io;
use std::path::Path;

pub type Lines<'a> = &'a mut dyn Iterator<Item = io::Result<String>>;
pub type Emit<'a> = &'a mut dyn FnMut(Document) -> Result<()>;

pub trait Segmenter: Send + Sync {
    /// Corpus name recorded in the run manifest
    fn name(&self) -> &'static str;

    /// Feeds every document found in `lines` to `emit`, in line order.
    fn segment_lines(
        &self,
        lines: Lines<'_>,
        stats: &ExtractionStats,
        emit: Emit<'_>,
    ) -> Result<()>;

    fn segment(&self, path: &Path, stats: &ExtractionStats, emit: Emit<'_>) -> Result<()> {
        let mut read = 0u64;
        let mut lines = LineReader::open(path)?.inspect(|_| read += 1);
        let result = self
            .segment_lines(&mut lines, stats, emit)
            .with_context(|| format!("Failed to segment: {}", path.display()));
        drop(lines);
        stats.add_lines(read);
        result
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Runs a segmenter over in-memory text and collects its documents.
    pub fn segment_text(segmenter: &dyn Segmenter, text: &str) -> Vec<Document> {
        let stats = ExtractionStats::new();
        segment_text_with_stats(segmenter, text, &stats)
    }

    pub fn segment_text_with_stats(
        segmenter: &dyn Segmenter,
        text: &str,
        stats: &ExtractionStats,
    ) -> Vec<Document> {
        let mut docs = Vec::new();
        let mut lines = text.lines().map(|l| Ok::<_, io::Error>(l.to_string()));
        segmenter
            .segment_lines(&mut lines, stats, &mut |doc: Document| {
                docs.push(doc);
                Ok(())
            })
            .unwrap();
        docs
    }
}
