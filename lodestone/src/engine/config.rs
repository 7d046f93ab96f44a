//! Engine tuning knobs.
//!
//! Everything here has a default that works for a single-host
//! deployment; the CLI and embedding services override fields as
//! needed.

use std::time::Duration;

use crate::search::{DEFAULT_MAX_RADIUS, DEFAULT_WORKERS};

// ==================== Engine Defaults ====================

/// Default per-caller wall-clock budget for one query in seconds.
///
/// Generous: a worst-case radius-8 search is 289 chunks of generator
/// time.
pub const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 60;

/// Default per-invocation budget for one generator process in seconds.
pub const DEFAULT_GENERATOR_TIMEOUT_SECS: u64 = 30;

/// Runtime configuration for [`OreEngine`](super::OreEngine).
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Ceiling on the search radius in chunk rings.
    ///
    /// Default: 8 (a 17x17 chunk square).
    pub max_radius: u32,

    /// Chunks sampled concurrently within one query.
    ///
    /// The engine-wide generator limiter still caps total processes
    /// across queries. Default: 4.
    pub workers: usize,

    /// Per-caller wall-clock budget for one query in seconds.
    ///
    /// A caller hitting the budget gets a timeout error; a computation
    /// other callers still wait on keeps running. Default: 60 seconds.
    pub query_timeout_secs: u64,

    /// Budget for one generator process invocation in seconds.
    ///
    /// Default: 30 seconds.
    pub generator_timeout_secs: u64,

    /// Age at which completed cache entries expire in seconds.
    ///
    /// `None` keeps entries until explicitly invalidated.
    /// Default: `None`.
    pub cache_ttl_secs: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_radius: DEFAULT_MAX_RADIUS,
            workers: DEFAULT_WORKERS,
            query_timeout_secs: DEFAULT_QUERY_TIMEOUT_SECS,
            generator_timeout_secs: DEFAULT_GENERATOR_TIMEOUT_SECS,
            cache_ttl_secs: None,
        }
    }
}

impl EngineConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the query budget as a Duration.
    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }

    /// Get the generator invocation budget as a Duration.
    pub fn generator_timeout(&self) -> Duration {
        Duration::from_secs(self.generator_timeout_secs)
    }

    /// Get the cache TTL as a Duration, if one is configured.
    pub fn cache_ttl(&self) -> Option<Duration> {
        self.cache_ttl_secs.map(Duration::from_secs)
    }
}
