//! Concurrent counting pipeline.
//!
//! One reader thread feeds chunks into a bounded queue of depth `worker_count`, so the
//! reader is throttled when workers fall behind. Each worker drains the queue, parsing
//! every line into its own `ExactSet` without any shared state. Once the queue is closed
//! and empty, each worker merges its set into the shared counter exactly once, under the
//! `MergeCoordinator` lock. The lock is therefore taken at most `worker_count` times per
//! run, independently of the input size.
//!
//! Peak memory is bounded by `worker_count` local sets plus the shared counter, which is
//! itself capped at the bitmap size once promoted.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::thread;

use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;

use crate::address::parse_line;
use crate::config::Config;
use crate::counter::AdaptiveCounter;
use crate::error::{Error, Result};
use crate::exact::ExactSet;
use crate::reader::{ChunkReader, ReadStats};
use crate::representation::RepresentationKind;

/// Diagnostics reported by a worker after its merge.
///
/// `local_unique` counts keys distinct within that worker only; summing it across workers
/// overcounts addresses seen by several of them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerReport {
    pub worker: usize,
    pub chunks: usize,
    pub lines: usize,
    pub malformed: usize,
    pub local_unique: usize,
}

/// Result of a counting run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of distinct valid addresses
    pub unique: usize,
    /// Representation of the shared counter at the end of the run
    pub representation: RepresentationKind,
    /// Number of times the shared counter was promoted
    pub promotions: usize,
    /// Per-worker diagnostics, ordered by worker index
    pub workers: Vec<WorkerReport>,
    pub read: ReadStats,
}

/// Guards the shared counter; the only place where it is mutated.
pub struct MergeCoordinator {
    global: Mutex<AdaptiveCounter>,
}

impl MergeCoordinator {
    /// Creates new `MergeCoordinator` over an empty counter
    pub fn new(promotion_threshold: usize) -> Self {
        Self {
            global: Mutex::new(AdaptiveCounter::new(promotion_threshold)),
        }
    }

    /// Fold a local set into the shared counter, promoting it first if the projected size
    /// exceeds the threshold. Promotion and insertion happen under one lock acquisition,
    /// so no other merge ever observes a half-built representation.
    /// Returns the number of keys in `local`.
    pub fn merge(&self, local: &ExactSet) -> usize {
        let mut global = self.global.lock();
        global.merge(local);
        local.len()
    }

    /// Return current number of distinct keys in the shared counter
    pub fn count(&self) -> usize {
        self.global.lock().count()
    }

    /// Consume coordinator, returning the shared counter
    pub fn into_inner(self) -> AdaptiveCounter {
        self.global.into_inner()
    }
}

/// Count distinct IPv4 addresses in the file at `path`
pub fn count_unique_in_file(path: impl AsRef<Path>, config: &Config) -> Result<RunSummary> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| Error::InputUnavailable {
        path: path.to_path_buf(),
        source,
    })?;
    count_unique(file, config)
}

/// Count distinct IPv4 addresses in a newline-delimited byte stream
pub fn count_unique<R: Read + Send>(input: R, config: &Config) -> Result<RunSummary> {
    config.validate()?;

    let coordinator = MergeCoordinator::new(config.promotion_threshold);
    let (chunk_tx, chunk_rx) = bounded::<Vec<u8>>(config.worker_count);
    let (report_tx, report_rx) = bounded::<WorkerReport>(config.worker_count);

    let reader = ChunkReader::new(input, config.chunk_size, config.boundary)?;
    let read = thread::scope(|s| {
        let reader = s.spawn(move || reader.run(chunk_tx));

        for worker in 0..config.worker_count {
            let chunks = chunk_rx.clone();
            let reports = report_tx.clone();
            let coordinator = &coordinator;
            s.spawn(move || run_worker(worker, chunks, coordinator, reports));
        }
        // only workers hold the queue and report endpoints from here on
        drop(chunk_rx);
        drop(report_tx);

        match reader.join() {
            Ok(stats) => stats,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    });

    let mut workers: Vec<WorkerReport> = report_rx.iter().collect();
    workers.sort_unstable_by_key(|report| report.worker);

    let counter = coordinator.into_inner();
    let summary = RunSummary {
        unique: counter.count(),
        representation: counter.representation(),
        promotions: counter.promotions(),
        workers,
        read,
    };
    tracing::info!(
        unique = summary.unique,
        representation = ?summary.representation,
        promotions = summary.promotions,
        bytes = summary.read.bytes,
        "counting finished"
    );
    Ok(summary)
}

/// Worker loop: accumulate locally until the queue is drained, then merge once
fn run_worker(
    worker: usize,
    chunks: Receiver<Vec<u8>>,
    coordinator: &MergeCoordinator,
    reports: Sender<WorkerReport>,
) {
    let mut local = ExactSet::new();
    let mut report = WorkerReport {
        worker,
        ..WorkerReport::default()
    };

    for chunk in chunks.iter() {
        report.chunks += 1;
        let body = chunk.strip_suffix(b"\n").unwrap_or(&chunk[..]);
        for line in body.split(|&b| b == b'\n') {
            report.lines += 1;
            match parse_line(line) {
                Ok(key) => {
                    local.insert(key);
                }
                Err(_) => report.malformed += 1,
            }
        }
    }

    report.local_unique = coordinator.merge(&local);
    drop(local);

    tracing::debug!(
        worker,
        chunks = report.chunks,
        lines = report.lines,
        malformed = report.malformed,
        local_unique = report.local_unique,
        "worker merged"
    );
    // the report channel holds one slot per worker, so this never blocks
    let _ = reports.send(report);
}
