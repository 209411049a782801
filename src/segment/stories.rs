use super::{Emit, Lines, Segmenter};
use crate::detok::combine;
use crate::models::{Document, QuoteState};
use crate::stats::ExtractionStats;
use anyhow::Result;

/// Documents separated by blank lines; quote state resets at every boundary.
#[derive(Debug, Default, Clone, Copy)]
pub struct BlankLineSegmenter;

impl Segmenter for BlankLineSegmenter {
    fn name(&self) -> &'static str {
        "stories"
    }

    fn segment_lines(
        &self,
        lines: Lines<'_>,
        _stats: &ExtractionStats,
        emit: Emit<'_>,
    ) -> Result<()> {
        let mut doc: Vec<String> = Vec::new();
        let mut quote = QuoteState::Closed;

        for line in lines {
            let line = line?;
            let line = line.trim();

            if line.is_empty() {
                if !doc.is_empty() {
                    emit(Document::from_lines(&doc))?;
                    doc.clear();
                }
                quote = QuoteState::Closed;
                continue;
            }

            let (cleaned, next) = combine(line, quote);
            quote = next;
            if !cleaned.is_empty() {
                doc.push(cleaned);
            }
        }

        if !doc.is_empty() {
            emit(Document::from_lines(&doc))?;
        }
        Ok(())
    }
}
