/// Written between two documents in the same split file
pub const DOCUMENT_SEPARATOR: &str = "\n\n\n\n";

/// File name of the final, unbounded split
pub const REMAINDER_FILE: &str = "remainder.txt";

/// Run summary written next to the split files
pub const MANIFEST_FILE: &str = "manifest.json";

/// Outbound channel capacity per worker (capacity = workers * CHANNEL_FACTOR)
pub const CHANNEL_FACTOR: usize = 10;

/// Progress update interval for document pipelines (every N documents)
pub const PROGRESS_INTERVAL: u64 = 10_000;

/// Progress update interval for the continuous line stream (every N lines)
pub const LINE_PROGRESS_INTERVAL: u64 = 100_000;

/// Per-attempt fetch timeouts in seconds, tried in order
pub const DEFAULT_FETCH_TIMEOUTS: [u64; 3] = [5, 5, 10];

/// Marker lines of WikiExtractor output
pub const DOC_BEGIN_MARKER: &str = "<doc";
pub const DOC_END_MARKER: &str = "</doc>";
pub const SECTION_MARKER: &str = "Section::::";

pub const USER_AGENT: &str = concat!("corpus-prep/", env!("CARGO_PKG_VERSION"));
