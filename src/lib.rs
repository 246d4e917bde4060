//! Per-key sum, count, minimum and maximum over `<key>;<value>` files.
//!
//! The file is memory mapped, cut into page-sized candidate chunks, and each
//! chunk is snapped to line boundaries and folded into a worker-local table.
//! Worker tables are merged into one [`AggregationTable`] at the end.

use std::path::Path;
use std::time::Instant;

use tracing::info;

pub mod boundary;
pub mod config;
pub mod error;
pub mod generate;
pub mod mapped;
pub mod parse;
pub mod plan;
pub mod pool;
pub mod report;
pub mod table;

pub use config::Options;
pub use error::{Error, Result};
pub use mapped::MappedInput;
pub use plan::ByteRange;
pub use table::{Aggregate, AggregationTable};

/// Maps the file at `path` and aggregates it.
pub fn run(path: impl AsRef<Path>, options: &Options) -> Result<AggregationTable> {
    let path = path.as_ref();
    let input = MappedInput::open(path)?;
    info!(path = %path.display(), bytes = input.len(), "mapped input");
    run_bytes(&input, options)
}

/// Aggregates an in-memory buffer with the same engine as [`run`].
pub fn run_bytes(buf: &[u8], options: &Options) -> Result<AggregationTable> {
    let started = Instant::now();
    let table = pool::aggregate(buf, options)?;
    info!(
        bytes = buf.len(),
        chunk_size = options.chunk_size,
        chunks = plan::ChunkPlan::new(buf.len(), options.chunk_size).chunk_count(),
        workers = options.workers,
        keys = table.len(),
        records = table.records(),
        elapsed = ?started.elapsed(),
        "aggregation finished"
    );
    Ok(table)
}
