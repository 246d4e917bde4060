use std::io::{self, BufWriter};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tenths::report::{self, Order};
use tenths::Options;

/// Average, minimum and maximum per key of a `<key>;<value>` measurements file.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the measurements file
    input: PathBuf,

    /// Worker threads [default: hardware parallelism]
    #[arg(short, long, env = "TENTHS_WORKERS")]
    workers: Option<usize>,

    /// Candidate chunk size in memory pages
    #[arg(long, env = "TENTHS_CHUNK_PAGES", default_value_t = tenths::plan::CHUNK_PAGES)]
    chunk_pages: usize,

    /// Chunk descriptors queued ahead of the workers
    #[arg(long, default_value_t = tenths::config::DEFAULT_QUEUE_CAPACITY)]
    queue_capacity: usize,

    /// Fail on malformed records instead of assuming well-formed input
    #[arg(long)]
    validate: bool,

    /// Print keys in byte order
    #[arg(long)]
    sorted: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let mut options = Options::default()
        .chunk_pages(args.chunk_pages)
        .queue_capacity(args.queue_capacity)
        .validate(args.validate);
    if let Some(workers) = args.workers {
        options = options.workers(workers);
    }

    let table = tenths::run(&args.input, &options)
        .with_context(|| format!("aggregating {}", args.input.display()))?;

    let order = if args.sorted { Order::ByKey } else { Order::Unspecified };
    let mut out = BufWriter::new(io::stdout().lock());
    report::write_report(&mut out, &table, order).context("writing report")?;
    Ok(())
}
