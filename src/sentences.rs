use unicode_segmentation::UnicodeSegmentation;

/// Splits text on Unicode (UAX #29) sentence boundaries, trimming each sentence.
pub fn split_sentences(text: &str) -> Vec<String> {
    text.unicode_sentences()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
