//! End-to-end tests for the corpus pipelines.
//!
//! Each test builds a small corpus in its own TempDir, runs a full pipeline over it and
//! checks the split files on disk:
//!
//! - **Stories** -- Quota accounting, document conservation, arrival-order writing
//! - **Wiki** -- Article layout, bz2 inputs, link markup
//! - **Webtext** -- URL lists served by an in-memory fetcher
//! - **Books** -- The continuous-line stream
//! - **Manifest** -- Run summary contents
//!
//! Documents never contain four consecutive newlines, so split files are read back by
//! cutting on the separator.

use bzip2::write::BzEncoder;
use bzip2::Compression;
use corpus_prep::config::{DOCUMENT_SEPARATOR, MANIFEST_FILE, REMAINDER_FILE};
use corpus_prep::extract::run_extraction;
use corpus_prep::fetch::{FetchError, Fetcher};
use corpus_prep::segment::{BlankLineSegmenter, FetchSegmenter, TaggedSegmenter};
use corpus_prep::split::SplitPlan;
use corpus_prep::stream::run_stream;
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Documents in one split file, in file order.
fn read_documents(path: &Path) -> Vec<String> {
    let text = fs::read_to_string(path).unwrap();
    if text.is_empty() {
        return Vec::new();
    }
    text.split(DOCUMENT_SEPARATOR).map(str::to_string).collect()
}

/// A stories file holding `count` two-line documents tagged with `name`.
fn stories_file(dir: &Path, name: &str, count: usize) {
    let mut text = String::new();
    for i in 0..count {
        text.push_str(&format!("{} story {} begins .\nit ends here .\n\n", name, i));
    }
    fs::write(dir.join(name), text).unwrap();
}

// ---------------------------------------------------------------------------
// Stories
// ---------------------------------------------------------------------------

#[test]
fn quota_then_remainder() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in");
    fs::create_dir(&input).unwrap();
    stories_file(&input, "a.txt", 5);
    stories_file(&input, "b.txt", 3);
    stories_file(&input, "c.txt", 4);
    let out = dir.path().join("out");

    let report = run_extraction(
        &input,
        &out,
        Arc::new(BlankLineSegmenter),
        2,
        &SplitPlan::Quotas(vec![6]),
    )
    .unwrap();

    assert_eq!(read_documents(&out.join("split1.txt")).len(), 6);
    assert_eq!(read_documents(&out.join(REMAINDER_FILE)).len(), 6);
    assert_eq!(report.split_count("split1.txt"), Some(6));
    assert_eq!(report.split_count(REMAINDER_FILE), Some(6));
    assert_eq!(report.files, 3);
    assert_eq!(report.workers, 2);
}

#[test]
fn every_document_written_exactly_once() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in");
    fs::create_dir_all(input.join("nested")).unwrap();
    stories_file(&input, "a.txt", 7);
    stories_file(&input.join("nested"), "b.txt", 11);
    stories_file(&input, "c.txt", 2);
    let out = dir.path().join("out");

    let report = run_extraction(
        &input,
        &out,
        Arc::new(BlankLineSegmenter),
        4,
        &SplitPlan::Quotas(vec![3, 5]),
    )
    .unwrap();

    let mut all = Vec::new();
    for name in ["split1.txt", "split2.txt", REMAINDER_FILE] {
        all.extend(read_documents(&out.join(name)));
    }
    assert_eq!(all.len(), 20);
    let unique: HashSet<&String> = all.iter().collect();
    assert_eq!(unique.len(), 20);
    assert!(all.contains(&"b.txt story 10 begins.\nit ends here.".to_string()));
    assert_eq!(report.written, 20);
}

#[test]
fn documents_of_one_file_keep_their_order() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in");
    fs::create_dir(&input).unwrap();
    stories_file(&input, "a.txt", 30);
    stories_file(&input, "b.txt", 30);
    let out = dir.path().join("out");

    run_extraction(
        &input,
        &out,
        Arc::new(BlankLineSegmenter),
        2,
        &SplitPlan::Quotas(vec![]),
    )
    .unwrap();

    let docs = read_documents(&out.join(REMAINDER_FILE));
    let from_a: Vec<&String> = docs.iter().filter(|d| d.starts_with("a.txt")).collect();
    for (i, doc) in from_a.iter().enumerate() {
        assert!(doc.starts_with(&format!("a.txt story {} begins.", i)));
    }
}

#[test]
fn more_quota_than_documents() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in");
    fs::create_dir(&input).unwrap();
    stories_file(&input, "a.txt", 3);
    let out = dir.path().join("out");

    let report = run_extraction(
        &input,
        &out,
        Arc::new(BlankLineSegmenter),
        8,
        &SplitPlan::Quotas(vec![10, 10]),
    )
    .unwrap();

    assert_eq!(read_documents(&out.join("split1.txt")).len(), 3);
    assert!(!out.join("split2.txt").exists());
    assert!(!out.join(REMAINDER_FILE).exists());
    assert_eq!(report.workers, 1);
}

#[test]
fn chunked_plan_covers_everything() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in");
    fs::create_dir(&input).unwrap();
    stories_file(&input, "a.txt", 9);
    let out = dir.path().join("out");

    let report = run_extraction(
        &input,
        &out,
        Arc::new(BlankLineSegmenter),
        1,
        &SplitPlan::Chunked(4),
    )
    .unwrap();

    assert_eq!(read_documents(&out.join("split1.txt")).len(), 4);
    assert_eq!(read_documents(&out.join("split2.txt")).len(), 4);
    assert_eq!(read_documents(&out.join("split3.txt")).len(), 1);
    assert!(!out.join(REMAINDER_FILE).exists());
    assert_eq!(report.written, 9);
}

#[test]
fn missing_input_directory_fails() {
    let dir = TempDir::new().unwrap();
    let result = run_extraction(
        &dir.path().join("missing"),
        &dir.path().join("out"),
        Arc::new(BlankLineSegmenter),
        2,
        &SplitPlan::Quotas(vec![1]),
    );
    assert!(result.is_err());
}

// ---------------------------------------------------------------------------
// Wiki
// ---------------------------------------------------------------------------

const WIKI_SAMPLE: &str = "<doc id=\"1\" url=\"https://en.wikipedia.org/wiki?curid=1\" title=\"Anarchism\">
Anarchism

Anarchism is a political philosophy. It rejects hierarchy.
Section::::History.
Early forms existed in antiquity.
</doc>
<doc id=\"2\" url=\"https://en.wikipedia.org/wiki?curid=2\" title=\"Empty\">
Empty

</doc>
<doc id=\"3\" url=\"https://en.wikipedia.org/wiki?curid=3\" title=\"Links\">
Links

<a href=\"Foo\">Foo</a>
See <a href=\"Bar\">Bar</a> for more.
</doc>
";

#[test]
fn wiki_articles_laid_out_by_sentence() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in");
    fs::create_dir(&input).unwrap();
    fs::write(input.join("wiki_00"), WIKI_SAMPLE).unwrap();
    let out = dir.path().join("out");

    let report = run_extraction(
        &input,
        &out,
        Arc::new(TaggedSegmenter::new(false)),
        2,
        &SplitPlan::Quotas(vec![]),
    )
    .unwrap();

    let docs = read_documents(&out.join(REMAINDER_FILE));
    assert_eq!(
        docs,
        vec![
            "Anarchism is a political philosophy.\nIt rejects hierarchy.\n\n\nEarly forms existed in antiquity."
                .to_string(),
            "See Bar for more.".to_string(),
        ]
    );
    assert_eq!(report.empty_dropped, 1);
    assert_eq!(report.corpus, "wiki");
}

#[test]
fn wiki_reads_bz2_inputs() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in");
    fs::create_dir(&input).unwrap();

    let mut encoder = BzEncoder::new(Vec::new(), Compression::fast());
    encoder.write_all(WIKI_SAMPLE.as_bytes()).unwrap();
    fs::write(input.join("wiki_00.bz2"), encoder.finish().unwrap()).unwrap();
    let out = dir.path().join("out");

    let report = run_extraction(
        &input,
        &out,
        Arc::new(TaggedSegmenter::new(false)),
        1,
        &SplitPlan::Quotas(vec![1]),
    )
    .unwrap();

    assert_eq!(read_documents(&out.join("split1.txt")).len(), 1);
    assert_eq!(read_documents(&out.join(REMAINDER_FILE)).len(), 1);
    assert_eq!(report.written, 2);
}

// ---------------------------------------------------------------------------
// Webtext
// ---------------------------------------------------------------------------

/// `/page*` URLs serve two paragraphs, `/slow` always times out, anything else 404s.
struct StubFetcher;

impl Fetcher for StubFetcher {
    fn fetch(&self, url: &str, _timeout: Option<Duration>) -> Result<Vec<String>, FetchError> {
        if url.contains("/page") {
            Ok(vec![format!("Text of {}.", url), "Second paragraph.".to_string()])
        } else if url.ends_with("/slow") {
            Err(FetchError::Timeout)
        } else {
            Err(FetchError::Status(404))
        }
    }
}

#[test]
fn webtext_fetches_listed_urls() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in");
    fs::create_dir(&input).unwrap();
    fs::write(
        input.join("urls.txt"),
        "http://example.com/page1\n\nhttp://example.com/slow\nhttp://example.com/gone\nhttp://example.com/page2\n",
    )
    .unwrap();
    let out = dir.path().join("out");

    let segmenter = FetchSegmenter::new(
        Arc::new(StubFetcher),
        vec![Duration::from_secs(5), Duration::from_secs(10)],
    );
    let report = run_extraction(&input, &out, Arc::new(segmenter), 2, &SplitPlan::Quotas(vec![]))
        .unwrap();

    let docs = read_documents(&out.join(REMAINDER_FILE));
    assert_eq!(
        docs,
        vec![
            "Text of http://example.com/page1.\n\nSecond paragraph.".to_string(),
            "Text of http://example.com/page2.\n\nSecond paragraph.".to_string(),
        ]
    );
    assert_eq!(report.urls_fetched, 2);
    assert_eq!(report.urls_skipped, 2);
}

// ---------------------------------------------------------------------------
// Books
// ---------------------------------------------------------------------------

#[test]
fn books_stream_across_files() {
    let dir = TempDir::new().unwrap();
    let first = dir.path().join("part1.txt");
    let second = dir.path().join("part2.txt");
    fs::write(&first, "it was n't late .\nhe said `` wait\n").unwrap();
    fs::write(&second, "chapter two .\n").unwrap();
    let out = dir.path().join("out");

    let report = run_stream(&[&first, &second], &out, &SplitPlan::Quotas(vec![1])).unwrap();

    assert_eq!(
        fs::read_to_string(out.join("split1.txt")).unwrap(),
        "it wasn't late.\n"
    );
    assert_eq!(
        fs::read_to_string(out.join(REMAINDER_FILE)).unwrap(),
        "he said \"wait\nchapter two.\n"
    );
    assert_eq!(report.written, 3);
    assert_eq!(report.unit, "lines");
}

// ---------------------------------------------------------------------------
// Manifest
// ---------------------------------------------------------------------------

#[test]
fn manifest_records_the_run() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in");
    fs::create_dir(&input).unwrap();
    stories_file(&input, "a.txt", 4);
    fs::write(input.join("blank.txt"), "\n\n\n").unwrap();
    let out = dir.path().join("out");

    run_extraction(
        &input,
        &out,
        Arc::new(BlankLineSegmenter),
        2,
        &SplitPlan::Quotas(vec![3]),
    )
    .unwrap();

    let text = fs::read_to_string(out.join(MANIFEST_FILE)).unwrap();
    let manifest: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(manifest["corpus"], "stories");
    assert_eq!(manifest["unit"], "documents");
    assert_eq!(manifest["files"], 2);
    assert_eq!(manifest["written"], 4);
    assert_eq!(manifest["splits"][0]["file"], "split1.txt");
    assert_eq!(manifest["splits"][0]["count"], 3);
    assert_eq!(manifest["splits"][1]["file"], REMAINDER_FILE);
    assert_eq!(manifest["splits"][1]["count"], 1);
}
