use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, ScopedJoinHandle};

use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, trace};

use crate::boundary;
use crate::config::Options;
use crate::error::{Error, Result};
use crate::parse::{CheckedRecords, Records};
use crate::plan::{ByteRange, ChunkPlan};
use crate::table::AggregationTable;

/// Aggregates every record in `buf` using `options.workers` threads.
///
/// One producer feeds candidate ranges into a bounded queue; each worker
/// resolves, parses and folds them into its own table. Tables are merged on
/// the calling thread as workers hand them over.
pub fn aggregate(buf: &[u8], options: &Options) -> Result<AggregationTable> {
    let workers = options.workers.max(1);
    let plan = ChunkPlan::new(buf.len(), options.chunk_size);
    let (chunk_tx, chunk_rx) = crossbeam_channel::bounded(options.queue_capacity.max(1));
    let (table_tx, table_rx) = crossbeam_channel::unbounded();
    let stop = AtomicBool::new(false);

    thread::scope(|s| {
        thread::Builder::new()
            .name("tenths-planner".into())
            .spawn_scoped(s, move || produce(plan, chunk_tx))
            .map_err(Error::Spawn)?;

        let mut handles = Vec::with_capacity(workers);
        for id in 0..workers {
            let chunks = chunk_rx.clone();
            let tables = table_tx.clone();
            let stop = &stop;
            let validate = options.validate;
            let handle = thread::Builder::new()
                .name(format!("tenths-worker-{id:02}"))
                .spawn_scoped(s, move || {
                    let result = run_worker(id, buf, chunks, validate, stop);
                    if result.is_err() {
                        stop.store(true, Ordering::Relaxed);
                    }
                    let _ = tables.send((id, result));
                });
            match handle {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    stop.store(true, Ordering::Relaxed);
                    return Err(Error::Spawn(e));
                }
            }
        }
        drop(chunk_rx);
        drop(table_tx);

        let merged = merge_incoming(table_rx, workers);

        join_workers(handles)?;
        merged
    })
}

/// Joins every handle, then reports the first one that panicked.
///
/// Stopping at the first failure would leave later panicked workers to the
/// scope, which re-raises their panic.
fn join_workers<T>(handles: Vec<ScopedJoinHandle<'_, T>>) -> Result<()> {
    let panicked: Vec<bool> = handles
        .into_iter()
        .map(|handle| handle.join().is_err())
        .collect();
    match panicked.iter().position(|&p| p) {
        Some(id) => Err(Error::Worker(id)),
        None => Ok(()),
    }
}

fn produce(plan: ChunkPlan, chunks: Sender<ByteRange>) {
    for candidate in plan {
        // All workers gone: nothing left to feed.
        if chunks.send(candidate).is_err() {
            break;
        }
    }
}

fn merge_incoming(
    tables: Receiver<(usize, Result<AggregationTable>)>,
    workers: usize,
) -> Result<AggregationTable> {
    let mut merged = AggregationTable::new();
    let mut reported = vec![false; workers];
    let mut failure = None;

    for (id, result) in tables {
        reported[id] = true;
        match result {
            Ok(table) if failure.is_none() => {
                debug!(worker = id, keys = table.len(), "merging worker table");
                merged.merge(table);
            }
            Ok(_) => {}
            Err(e) => {
                failure.get_or_insert(e);
            }
        }
    }

    if let Some(e) = failure {
        return Err(e);
    }
    match reported.iter().position(|done| !done) {
        Some(id) => Err(Error::Worker(id)),
        None => Ok(merged),
    }
}

fn run_worker(
    id: usize,
    buf: &[u8],
    chunks: Receiver<ByteRange>,
    validate: bool,
    stop: &AtomicBool,
) -> Result<AggregationTable> {
    let mut table = AggregationTable::new();
    let mut processed = 0usize;
    let mut bytes = 0usize;

    for candidate in chunks.iter() {
        if stop.load(Ordering::Relaxed) {
            break;
        }
        let range = boundary::resolve(buf, candidate);
        trace!(worker = id, ?candidate, ?range, "resolved chunk");
        if range.is_empty() {
            continue;
        }

        let chunk = &buf[range.start..range.end];
        if validate {
            for record in CheckedRecords::new(chunk, range.start) {
                let (key, value) = record?;
                table.fold(key, value);
            }
        } else {
            table.extend(Records::new(chunk));
        }
        processed += 1;
        bytes += range.len();
    }

    debug!(
        worker = id,
        chunks = processed,
        bytes,
        keys = table.len(),
        records = table.records(),
        "worker finished"
    );
    Ok(table)
}
