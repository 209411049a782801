use super::{Emit, Lines, Segmenter};
use crate::config::{DOC_BEGIN_MARKER, DOC_END_MARKER, SECTION_MARKER};
use crate::detok::combine;
use crate::models::{Document, QuoteState};
use crate::sentences::split_sentences;
use crate::stats::ExtractionStats;
use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

static LINK_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<\s*a\b[^>]*>(.*?)<\s*/\s*a\s*>").unwrap());

/// WikiExtractor output: articles between `<doc ...>` and `</doc>` marker lines.
///
/// Lines outside an article are ignored and an article left open at end of file is
/// discarded. With `detokenize` set, content lines also go through
/// [`combine`](crate::detok::combine), the quote state resetting at each article.
#[derive(Debug, Default, Clone, Copy)]
pub struct TaggedSegmenter {
    pub detokenize: bool,
}

impl TaggedSegmenter {
    pub fn new(detokenize: bool) -> Self {
        Self { detokenize }
    }
}

impl Segmenter for TaggedSegmenter {
    fn name(&self) -> &'static str {
        "wiki"
    }

    fn segment_lines(
        &self,
        lines: Lines<'_>,
        _stats: &ExtractionStats,
        emit: Emit<'_>,
    ) -> Result<()> {
        let mut article: Option<Vec<String>> = None;
        let mut quote = QuoteState::Closed;

        for line in lines {
            let line = line?;
            let line = line.trim();

            if line.starts_with(DOC_BEGIN_MARKER) {
                article = Some(Vec::new());
                quote = QuoteState::Closed;
                continue;
            }
            if line.starts_with(DOC_END_MARKER) {
                if let Some(lines) = article.take() {
                    emit(process_article(&lines))?;
                }
                continue;
            }

            let Some(body) = article.as_mut() else {
                continue;
            };
            if is_only_links(line) {
                continue;
            }

            let text = unwrap_links(line);
            if self.detokenize && !text.is_empty() && !text.starts_with(SECTION_MARKER) {
                let (cleaned, next) = combine(&text, quote);
                quote = next;
                body.push(cleaned);
            } else {
                body.push(text.into_owned());
            }
        }

        Ok(())
    }
}

/// True for a non-blank line that is nothing but `<a ...>...</a>` elements.
fn is_only_links(line: &str) -> bool {
    !line.is_empty() && LINK_REGEX.replace_all(line, "").trim().is_empty()
}

/// Replaces each link element with its anchor text.
fn unwrap_links(line: &str) -> Cow<'_, str> {
    LINK_REGEX.replace_all(line, "$1")
}

/// Lays out one article: title dropped, sentences one per line, a blank line between
/// paragraphs and two between sections.
///
/// Returns an empty document when nothing but the title (and blank lines) is present.
pub fn process_article(lines: &[String]) -> Document {
    let body = lines.iter().skip(1).skip_while(|line| line.is_empty());

    let mut sections: Vec<String> = Vec::new();
    let mut paragraphs: Vec<String> = Vec::new();
    let mut sentences: Vec<String> = Vec::new();

    for line in body {
        if line.is_empty() {
            close_block(&mut sentences, &mut paragraphs, "\n");
        } else if line.starts_with(SECTION_MARKER) {
            close_block(&mut sentences, &mut paragraphs, "\n");
            close_block(&mut paragraphs, &mut sections, "\n\n");
        } else {
            sentences.extend(split_sentences(line));
        }
    }
    close_block(&mut sentences, &mut paragraphs, "\n");
    close_block(&mut paragraphs, &mut sections, "\n\n");

    Document::new(sections.join("\n\n\n"))
}

/// Joins the open parts into one block; empty blocks leave no trace.
fn close_block(parts: &mut Vec<String>, blocks: &mut Vec<String>, separator: &str) {
    if !parts.is_empty() {
        blocks.push(parts.join(separator));
        parts.clear();
    }
}
