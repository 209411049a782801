//! corpus-prep: corpus cleaning and split partitioning for language-model training
//!
//! This crate turns raw corpus dumps into cleaned, document-segmented text files,
//! partitioned into fixed-size splits plus a remainder:
//!
//! 1. **Enumeration** -- Walk the input tree and collect every regular file
//! 2. **Segmentation** -- A pool of worker threads cuts each file into documents with a
//!    corpus-specific strategy, detokenizing lines on the way
//! 3. **Aggregation** -- A single consumer writes documents into `split1.txt ...
//!    splitK.txt` and `remainder.txt` in arrival order until each quota is filled
//!
//! # Corpora
//!
//! - **books** -- Continuous tokenized lines, no document boundaries, single-threaded
//! - **stories** -- Tokenized documents separated by blank lines
//! - **wiki** -- WikiExtractor output delimited by `<doc>` / `</doc>` markers, laid out
//!   one sentence per line
//! - **webtext** -- Lists of URLs; each page is downloaded and its paragraphs kept
//!
//! # Architecture
//!
//! - **Tagged messages** -- `Job::File | Job::Stop` on the intake channel and
//!   `Outcome::Document | Outcome::WorkerDone` on the outbound channel
//! - **Backpressure** -- The outbound channel holds at most ten documents per worker
//! - **Explicit state** -- Quote state is passed into and returned from [`detok::combine`]
//! - **Scoped deadlines** -- Every fetch attempt carries its own timeout
//!
//! # Key Modules
//!
//! - [`detok`] -- Token merging and quote tracking
//! - [`walk`] -- Recursive file enumeration
//! - [`reader`] -- Line reading with transparent bz2 decompression
//! - [`segment`] -- Per-corpus segmentation strategies
//! - [`fetch`] -- Web page fetching with escalating timeouts
//! - [`pool`] -- Worker threads and channels
//! - [`aggregate`] -- Quota-bounded split writing
//! - [`stream`] -- The continuous-line pipeline
//! - [`extract`] -- The document pipeline end to end
//! - [`split`] -- Split plans and quotas
//! - [`manifest`] -- Run summary written as JSON
//! - [`stats`] -- Shared atomic counters
//! - [`config`] -- Constants
//!
//! # Example Usage
//!
//! ```bash
//! # Two 50k-article splits plus the rest, on 16 workers
//! corpus-prep -v wiki -i extracted/ -o out/ -s 50000 50000 --num-workers 16
//!
//! # Books in a fixed file order, split by line count
//! corpus-prep books -i books/part1.txt books/part2.txt -o out/ -s 1000000
//!
//! # Web pages in chunks of 10k documents
//! corpus-prep webtext -i urls/ -o out/ --chunk 10000 -t 5 5 10
//! ```

pub mod aggregate;
pub mod config;
pub mod detok;
pub mod extract;
pub mod fetch;
pub mod manifest;
pub mod models;
pub mod pool;
pub mod reader;
pub mod segment;
pub mod sentences;
pub mod split;
pub mod stats;
pub mod stream;
pub mod walk;
