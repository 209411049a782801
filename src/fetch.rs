//! Web page acquisition for URL-list corpora.
//!
//! A [`Fetcher`] downloads one page under an explicit per-call deadline and returns its
//! paragraph text. [`fetch_with_timeouts`] drives a fetcher through an escalating series
//! of deadlines: a timeout moves on to the next, longer attempt, any other failure
//! abandons the URL.

use crate::config::USER_AGENT;
use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::time::Duration;
use tracing::debug;

static PARAGRAPH_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<p\b[^>]*>(.*?)</p\s*>").unwrap());

static SKIPPED_BLOCK_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<(script|style|noscript)\b[^>]*>.*?</(script|style|noscript)\s*>").unwrap()
});

static TAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());

static NUMERIC_ENTITY_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&#(x[0-9a-fA-F]+|[0-9]+);").unwrap());

#[derive(Debug)]
pub enum FetchError {
    /// The deadline for this attempt elapsed
    Timeout,
    Http(reqwest::Error),
    Status(u16),
    /// The page held no paragraph text
    Empty,
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Timeout => write!(f, "request timed out"),
            FetchError::Http(e) => write!(f, "request failed: {}", e),
            FetchError::Status(code) => write!(f, "unexpected HTTP status {}", code),
            FetchError::Empty => write!(f, "no paragraph text found"),
        }
    }
}

impl std::error::Error for FetchError {}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Http(err)
        }
    }
}

pub trait Fetcher: Send + Sync {
    /// Fetches `url` and returns its paragraphs. `None` means no deadline.
    fn fetch(&self, url: &str, timeout: Option<Duration>) -> Result<Vec<String>, FetchError>;
}

/// Blocking HTTP fetcher extracting the text of `<p>` elements
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(None::<Duration>)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str, timeout: Option<Duration>) -> Result<Vec<String>, FetchError> {
        let mut request = self.client.get(url);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let paragraphs = extract_paragraphs(&response.text()?);
        if paragraphs.is_empty() {
            return Err(FetchError::Empty);
        }
        Ok(paragraphs)
    }
}

/// Tries each deadline in turn. Returns `None` once the series is exhausted or on the
/// first failure that is not a timeout. A zero deadline means no limit.
pub fn fetch_with_timeouts(
    fetcher: &dyn Fetcher,
    url: &str,
    timeouts: &[Duration],
) -> Option<Vec<String>> {
    for (attempt, timeout) in timeouts.iter().enumerate() {
        let deadline = (!timeout.is_zero()).then_some(*timeout);
        match fetcher.fetch(url, deadline) {
            Ok(paragraphs) => return Some(paragraphs),
            Err(FetchError::Timeout) => {
                debug!(
                    url,
                    attempt = attempt + 1,
                    timeout_secs = timeout.as_secs_f64(),
                    "Fetch timed out"
                );
            }
            Err(e) => {
                debug!(url, error = %e, "Fetch failed, skipping URL");
                return None;
            }
        }
    }
    debug!(url, attempts = timeouts.len(), "Fetch attempts exhausted");
    None
}

/// Text of every non-empty `<p>` element, tags stripped and whitespace collapsed.
pub fn extract_paragraphs(html: &str) -> Vec<String> {
    let html = SKIPPED_BLOCK_REGEX.replace_all(html, "");
    PARAGRAPH_REGEX
        .captures_iter(&html)
        .map(|c| {
            let text = TAG_REGEX.replace_all(&c[1], " ");
            decode_entities(&text)
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|p| !p.is_empty())
        .collect()
}

fn decode_entities(text: &str) -> String {
    let numeric = NUMERIC_ENTITY_REGEX.replace_all(text, |caps: &regex::Captures| {
        let code = &caps[1];
        let value = match code.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => code.parse::<u32>().ok(),
        };
        value
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_default()
    });

    numeric
        .replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Replays a fixed sequence of results and records the deadlines it was given.
    struct ScriptedFetcher {
        script: Mutex<Vec<Result<Vec<String>, FetchError>>>,
        seen: Mutex<Vec<Option<Duration>>>,
    }

    impl ScriptedFetcher {
        fn new(mut script: Vec<Result<Vec<String>, FetchError>>) -> Self {
            script.reverse();
            Self {
                script: Mutex::new(script),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn deadlines(&self) -> Vec<Option<Duration>> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl Fetcher for ScriptedFetcher {
        fn fetch(&self, _url: &str, timeout: Option<Duration>) -> Result<Vec<String>, FetchError> {
            self.seen.lock().unwrap().push(timeout);
            self.script.lock().unwrap().pop().unwrap_or(Err(FetchError::Empty))
        }
    }

    fn secs(values: &[u64]) -> Vec<Duration> {
        values.iter().map(|&s| Duration::from_secs(s)).collect()
    }

    #[test]
    fn first_success_returned() {
        let fetcher = ScriptedFetcher::new(vec![Ok(vec!["text".to_string()])]);
        let result = fetch_with_timeouts(&fetcher, "http://a", &secs(&[5, 5, 10]));
        assert_eq!(result, Some(vec!["text".to_string()]));
        assert_eq!(fetcher.deadlines().len(), 1);
    }

    #[test]
    fn timeouts_escalate_in_order() {
        let fetcher = ScriptedFetcher::new(vec![
            Err(FetchError::Timeout),
            Err(FetchError::Timeout),
            Ok(vec!["late".to_string()]),
        ]);
        let result = fetch_with_timeouts(&fetcher, "http://a", &secs(&[5, 5, 10]));
        assert_eq!(result, Some(vec!["late".to_string()]));
        assert_eq!(
            fetcher.deadlines(),
            vec![
                Some(Duration::from_secs(5)),
                Some(Duration::from_secs(5)),
                Some(Duration::from_secs(10)),
            ]
        );
    }

    #[test]
    fn exhausted_series_gives_up() {
        let fetcher = ScriptedFetcher::new(vec![
            Err(FetchError::Timeout),
            Err(FetchError::Timeout),
        ]);
        assert_eq!(fetch_with_timeouts(&fetcher, "http://a", &secs(&[1, 2])), None);
        assert_eq!(fetcher.deadlines().len(), 2);
    }

    #[test]
    fn other_failure_abandons_immediately() {
        let fetcher = ScriptedFetcher::new(vec![
            Err(FetchError::Status(404)),
            Ok(vec!["never".to_string()]),
        ]);
        assert_eq!(fetch_with_timeouts(&fetcher, "http://a", &secs(&[5, 5, 10])), None);
        assert_eq!(fetcher.deadlines().len(), 1);
    }

    #[test]
    fn zero_timeout_means_no_deadline() {
        let fetcher = ScriptedFetcher::new(vec![Ok(vec!["x".to_string()])]);
        fetch_with_timeouts(&fetcher, "http://a", &secs(&[0]));
        assert_eq!(fetcher.deadlines(), vec![None]);
    }

    #[test]
    fn empty_series_never_fetches() {
        let fetcher = ScriptedFetcher::new(vec![Ok(vec!["x".to_string()])]);
        assert_eq!(fetch_with_timeouts(&fetcher, "http://a", &[]), None);
        assert!(fetcher.deadlines().is_empty());
    }

    #[test]
    fn paragraphs_extracted() {
        let html = r#"<html><head><style>p { color: red }</style></head>
            <body><div><p class="lead">First <b>bold</b>
            paragraph.</p><script>var p = "<p>no</p>";</script>
            <p>   </p><P>Fish &amp; chips &#8212; &quot;tasty&quot;&#x21;</P></div></body></html>"#;
        assert_eq!(
            extract_paragraphs(html),
            vec!["First bold paragraph.", "Fish & chips \u{2014} \"tasty\"!"]
        );
    }

    #[test]
    fn no_paragraphs() {
        assert!(extract_paragraphs("<div>just a div</div>").is_empty());
    }
}
