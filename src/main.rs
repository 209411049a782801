use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use corpus_prep::config::DEFAULT_FETCH_TIMEOUTS;
use corpus_prep::fetch::HttpFetcher;
use corpus_prep::manifest::RunReport;
use corpus_prep::segment::{BlankLineSegmenter, FetchSegmenter, Segmenter, TaggedSegmenter};
use corpus_prep::split::SplitPlan;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "corpus-prep")]
#[command(about = "Clean, segment and split raw text corpora for language-model training")]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detokenize continuous book text; splits count lines
    Books(BooksArgs),
    /// Split blank-line separated stories into documents
    Stories(DocumentArgs),
    /// Lay out WikiExtractor articles one sentence per line
    Wiki(WikiArgs),
    /// Download the pages of URL lists and keep their paragraphs
    Webtext(WebtextArgs),
}

#[derive(Args)]
struct SplitArgs {
    /// Output directory for split files
    #[arg(short, long)]
    output: PathBuf,

    /// Size of each split, in order; everything left goes to remainder.txt
    #[arg(short, long, num_args = 1..)]
    splits: Vec<u64>,

    /// Write an open-ended series of splits of this size instead
    #[arg(short, long, conflicts_with = "splits")]
    chunk: Option<u64>,
}

impl SplitArgs {
    fn plan(&self) -> Result<SplitPlan> {
        SplitPlan::from_args(self.splits.clone(), self.chunk)
    }
}

#[derive(Args)]
struct BooksArgs {
    /// Input files or directories, in order
    #[arg(short, long, num_args = 1.., required = true)]
    input: Vec<PathBuf>,

    #[command(flatten)]
    split: SplitArgs,
}

#[derive(Args)]
struct DocumentArgs {
    /// Directory of input files (searched recursively)
    #[arg(short, long)]
    input: PathBuf,

    #[command(flatten)]
    split: SplitArgs,

    /// Number of worker threads
    #[arg(long, default_value_t = default_workers())]
    num_workers: usize,
}

#[derive(Args)]
struct WikiArgs {
    #[command(flatten)]
    common: DocumentArgs,

    /// Also detokenize article lines
    #[arg(long)]
    detokenize: bool,
}

#[derive(Args)]
struct WebtextArgs {
    #[command(flatten)]
    common: DocumentArgs,

    /// Per-attempt download timeouts in seconds, tried in order (0 = no limit)
    #[arg(short, long = "timeout", num_args = 1.., default_values_t = DEFAULT_FETCH_TIMEOUTS)]
    timeouts: Vec<u64>,
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn run_documents(args: &DocumentArgs, segmenter: Arc<dyn Segmenter>) -> Result<RunReport> {
    let plan = args.split.plan()?;
    corpus_prep::extract::run_extraction(
        &args.input,
        &args.split.output,
        segmenter,
        args.num_workers,
        &plan,
    )
}

fn run(command: Commands) -> Result<RunReport> {
    match command {
        Commands::Books(args) => {
            let plan = args.split.plan()?;
            corpus_prep::stream::run_stream(args.input.as_slice(), &args.split.output, &plan)
        }
        Commands::Stories(args) => run_documents(&args, Arc::new(BlankLineSegmenter)),
        Commands::Wiki(args) => run_documents(
            &args.common,
            Arc::new(TaggedSegmenter::new(args.detokenize)),
        ),
        Commands::Webtext(args) => {
            let timeouts = args.timeouts.iter().map(|&s| Duration::from_secs(s)).collect();
            let fetcher = Arc::new(HttpFetcher::new()?);
            run_documents(&args.common, Arc::new(FetchSegmenter::new(fetcher, timeouts)))
        }
    }
}

fn print_summary(report: &RunReport, output_dir: &Path) {
    println!();
    println!("=== Summary ===");
    println!("Corpus:             {}", report.corpus);
    println!("Input files:        {}", report.files);
    println!("Workers:            {}", report.workers);
    println!("Total time:         {:.2}s", report.duration_secs);
    println!();
    for split in &report.splits {
        println!("{:<20}{} {}", split.file, split.count, report.unit);
    }
    println!();
    println!("Written:            {}", report.written);
    println!("Empty dropped:      {}", report.empty_dropped);
    if report.file_errors > 0 {
        println!("File errors:        {}", report.file_errors);
    }
    if report.urls_fetched + report.urls_skipped > 0 {
        println!("URLs fetched:       {}", report.urls_fetched);
        println!("URLs skipped:       {}", report.urls_skipped);
    }
    println!("Output:             {}", output_dir.display());
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    let output_dir = match &cli.command {
        Commands::Books(args) => args.split.output.clone(),
        Commands::Stories(args) => args.split.output.clone(),
        Commands::Wiki(args) => args.common.split.output.clone(),
        Commands::Webtext(args) => args.common.split.output.clone(),
    };

    match run(cli.command) {
        Ok(report) => {
            print_summary(&report, &output_dir);
            info!("Completed successfully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Error: {:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
