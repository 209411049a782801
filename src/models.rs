use std::path::PathBuf;

/// Whether an unmatched opening double quote has been seen in the current scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuoteState {
    #[default]
    Closed,
    Open,
}

impl QuoteState {
    pub fn is_open(self) -> bool {
        matches!(self, QuoteState::Open)
    }
}

/// One logical unit of output text: a story, an article, a fetched web page
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    text: String,
}

impl Document {
    pub fn new(text: String) -> Self {
        Self { text }
    }

    pub fn from_lines(lines: &[String]) -> Self {
        Self {
            text: lines.join("\n"),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Message on the intake channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    File(PathBuf),
    Stop,
}

/// Message on the outbound channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Document(Document),
    WorkerDone,
}
