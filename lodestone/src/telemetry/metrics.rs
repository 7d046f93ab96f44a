//! Atomic counters for the engine's hot paths.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use super::TelemetrySnapshot;

/// Lock-free event counters shared by the search driver, the query
/// cache, and the engine facade.
///
/// Counters only ever increase; [`EngineMetrics::snapshot`] takes a
/// point-in-time copy for display. Relaxed ordering is enough because
/// no counter guards other memory.
#[derive(Debug)]
pub struct EngineMetrics {
    started_at: Instant,

    searches_started: AtomicU64,
    searches_completed: AtomicU64,
    searches_failed: AtomicU64,

    chunks_sampled: AtomicU64,
    chunks_failed: AtomicU64,
    blocks_sampled: AtomicU64,

    deposits_found: AtomicU64,
    ores_found: AtomicU64,

    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    cache_joined: AtomicU64,
    cache_invalidations: AtomicU64,

    query_timeouts: AtomicU64,
}

impl EngineMetrics {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            searches_started: AtomicU64::new(0),
            searches_completed: AtomicU64::new(0),
            searches_failed: AtomicU64::new(0),
            chunks_sampled: AtomicU64::new(0),
            chunks_failed: AtomicU64::new(0),
            blocks_sampled: AtomicU64::new(0),
            deposits_found: AtomicU64::new(0),
            ores_found: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
            cache_misses: AtomicU64::new(0),
            cache_joined: AtomicU64::new(0),
            cache_invalidations: AtomicU64::new(0),
            query_timeouts: AtomicU64::new(0),
        }
    }

    /// Records a search passing validation and starting fan-out.
    pub fn search_started(&self) {
        self.searches_started.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a search reaching a report.
    ///
    /// # Arguments
    ///
    /// * `deposits` - Deposits in the report
    /// * `ores` - Total ore blocks across those deposits
    pub fn search_completed(&self, deposits: u64, ores: u64) {
        self.searches_completed.fetch_add(1, Ordering::Relaxed);
        self.deposits_found.fetch_add(deposits, Ordering::Relaxed);
        self.ores_found.fetch_add(ores, Ordering::Relaxed);
    }

    /// Records a search ending in an error.
    pub fn search_failed(&self) {
        self.searches_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Records one successfully sampled chunk and its ore block count.
    pub fn chunk_sampled(&self, blocks: u64) {
        self.chunks_sampled.fetch_add(1, Ordering::Relaxed);
        self.blocks_sampled.fetch_add(blocks, Ordering::Relaxed);
    }

    /// Records one chunk whose generator invocation failed.
    pub fn chunk_failed(&self) {
        self.chunks_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a query answered from a completed cache entry.
    pub fn cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a query that had to start a fresh computation.
    pub fn cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a query coalesced onto an in-flight computation.
    pub fn cache_joined(&self) {
        self.cache_joined.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a full cache invalidation.
    pub fn cache_invalidated(&self) {
        self.cache_invalidations.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a caller abandoning a query at its wall-clock budget.
    pub fn query_timeout(&self) {
        self.query_timeouts.fetch_add(1, Ordering::Relaxed);
    }

    /// Takes a point-in-time copy of every counter.
    pub fn snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot {
            uptime: self.started_at.elapsed(),
            searches_started: self.searches_started.load(Ordering::Relaxed),
            searches_completed: self.searches_completed.load(Ordering::Relaxed),
            searches_failed: self.searches_failed.load(Ordering::Relaxed),
            chunks_sampled: self.chunks_sampled.load(Ordering::Relaxed),
            chunks_failed: self.chunks_failed.load(Ordering::Relaxed),
            blocks_sampled: self.blocks_sampled.load(Ordering::Relaxed),
            deposits_found: self.deposits_found.load(Ordering::Relaxed),
            ores_found: self.ores_found.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            cache_joined: self.cache_joined.load(Ordering::Relaxed),
            cache_invalidations: self.cache_invalidations.load(Ordering::Relaxed),
            query_timeouts: self.query_timeouts.load(Ordering::Relaxed),
        }
    }
}

impl Default for EngineMetrics {
    fn default() -> Self {
        Self::new()
    }
}
