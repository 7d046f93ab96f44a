//! Point-in-time view of the engine counters.

use std::fmt;
use std::time::Duration;

/// A copy of every [`EngineMetrics`](super::EngineMetrics) counter,
/// taken at one moment.
///
/// Plain data: cheap to clone, safe to hold across await points, and
/// stable while a view renders it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetrySnapshot {
    /// Time since the metrics were created.
    pub uptime: Duration,

    /// Searches that passed validation and started fan-out.
    pub searches_started: u64,
    /// Searches that produced a report.
    pub searches_completed: u64,
    /// Searches that ended in an error.
    pub searches_failed: u64,

    /// Chunks sampled successfully.
    pub chunks_sampled: u64,
    /// Chunks whose generator invocation failed.
    pub chunks_failed: u64,
    /// Ore blocks reported by successful chunks.
    pub blocks_sampled: u64,

    /// Deposits across all completed searches.
    pub deposits_found: u64,
    /// Ore blocks across all completed searches, after clustering.
    pub ores_found: u64,

    /// Queries answered from a completed cache entry.
    pub cache_hits: u64,
    /// Queries that started a fresh computation.
    pub cache_misses: u64,
    /// Queries coalesced onto an in-flight computation.
    pub cache_joined: u64,
    /// Full cache invalidations.
    pub cache_invalidations: u64,

    /// Callers that hit their wall-clock budget.
    pub query_timeouts: u64,
}

impl TelemetrySnapshot {
    /// Fraction of non-leading lookups served without a fresh
    /// computation. Returns 0.0 before any lookup.
    pub fn cache_hit_rate(&self) -> f64 {
        let served = self.cache_hits + self.cache_joined;
        let total = served + self.cache_misses;
        if total == 0 {
            return 0.0;
        }
        served as f64 / total as f64
    }
}

impl fmt::Display for TelemetrySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "searches {}/{} ok, chunks {}/{} ok, {} deposits ({} ores), \
             cache {} hit / {} joined / {} miss",
            self.searches_completed,
            self.searches_started,
            self.chunks_sampled,
            self.chunks_sampled + self.chunks_failed,
            self.deposits_found,
            self.ores_found,
            self.cache_hits,
            self.cache_joined,
            self.cache_misses,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty() -> TelemetrySnapshot {
        TelemetrySnapshot {
            uptime: Duration::ZERO,
            searches_started: 0,
            searches_completed: 0,
            searches_failed: 0,
            chunks_sampled: 0,
            chunks_failed: 0,
            blocks_sampled: 0,
            deposits_found: 0,
            ores_found: 0,
            cache_hits: 0,
            cache_misses: 0,
            cache_joined: 0,
            cache_invalidations: 0,
            query_timeouts: 0,
        }
    }

    #[test]
    fn test_hit_rate_of_empty_snapshot_is_zero() {
        assert_eq!(empty().cache_hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_counts_joins_as_served() {
        let snapshot = TelemetrySnapshot {
            cache_hits: 2,
            cache_joined: 2,
            cache_misses: 4,
            ..empty()
        };
        assert!((snapshot.cache_hit_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_display_is_compact() {
        let snapshot = TelemetrySnapshot {
            searches_started: 3,
            searches_completed: 2,
            chunks_sampled: 17,
            chunks_failed: 1,
            deposits_found: 9,
            ores_found: 40,
            cache_hits: 1,
            cache_misses: 2,
            ..empty()
        };
        assert_eq!(
            snapshot.to_string(),
            "searches 2/3 ok, chunks 17/18 ok, 9 deposits (40 ores), \
             cache 1 hit / 0 joined / 2 miss"
        );
    }
}
