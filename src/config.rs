//! Startup tunables of a counting run.
//!
//! None of them change the reported count (with line-aligned chunks); they trade memory
//! for throughput:
//! - `chunk_size`: bytes per read handed to a worker; also bounds the queue memory to
//!   roughly `worker_count * chunk_size`.
//! - `worker_count`: number of parsing threads, each with its own exact local set.
//! - `promotion_threshold`: projected cardinality above which the shared counter switches
//!   to the 512 MiB bitmap.
//! - `boundary`: whether chunks are cut on line boundaries.

use crate::counter::DEFAULT_PROMOTION_THRESHOLD;
use crate::error::{Error, Result};

/// Default number of bytes per chunk (1 MiB)
pub const DEFAULT_CHUNK_SIZE: usize = 1 << 20;
/// Default number of worker threads
pub const DEFAULT_WORKER_COUNT: usize = 4;

/// How chunk edges relate to line boundaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "with_serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "with_serde", serde(rename_all = "snake_case"))]
pub enum ChunkBoundary {
    /// The partial line at the end of a chunk is carried into the next chunk,
    /// so every line is parsed whole.
    #[default]
    LineAligned,
    /// Chunks are cut every `chunk_size` bytes regardless of content. An address
    /// straddling a cut is parsed as two malformed fragments and is not counted.
    Split,
}

/// Configuration of a counting run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "with_serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "with_serde", serde(default))]
pub struct Config {
    pub chunk_size: usize,
    pub worker_count: usize,
    pub promotion_threshold: usize,
    pub boundary: ChunkBoundary,
}

impl Config {
    #[inline]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    #[inline]
    pub fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    #[inline]
    pub fn with_promotion_threshold(mut self, promotion_threshold: usize) -> Self {
        self.promotion_threshold = promotion_threshold;
        self
    }

    #[inline]
    pub fn with_boundary(mut self, boundary: ChunkBoundary) -> Self {
        self.boundary = boundary;
        self
    }

    /// Check that the configuration can drive a run
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::InvalidConfig("chunk size must be positive".into()));
        }
        if self.worker_count == 0 {
            return Err(Error::InvalidConfig("worker count must be positive".into()));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            worker_count: DEFAULT_WORKER_COUNT,
            promotion_threshold: DEFAULT_PROMOTION_THRESHOLD,
            boundary: ChunkBoundary::default(),
        }
    }
}
