use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tenths::generate::{Generator, DEFAULT_KEYS};

/// Writes random `<key>;<value>` records for the aggregator to chew on.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Number of records
    #[arg(short, long, default_value_t = 1_000_000_000)]
    lines: u64,

    /// Number of distinct keys to draw records from
    #[arg(short, long, default_value_t = DEFAULT_KEYS)]
    keys: usize,

    /// Random seed [default: derived from the clock]
    #[arg(short, long)]
    seed: Option<u64>,

    /// Output file [default: stdout]
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let seed = match args.seed {
        Some(seed) => seed,
        None => std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .context("system clock before 1970")?
            .as_nanos() as u64,
    };
    let generator = Generator::with_keys(seed, args.keys);
    info!(lines = args.lines, keys = args.keys, seed, "generating");

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    generator
        .write(&mut out, args.lines)
        .context("writing records")?;
    Ok(())
}
