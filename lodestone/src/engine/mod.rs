//! The assembled ore resolution engine.
//!
//! [`OreEngine`] wires the profile registry, generator backends, search
//! driver, and query cache into one facade. Embedders and the CLI talk
//! to this type only.
//!
//! # Architecture
//!
//! ```text
//! find_ores(query)
//!     │
//!     ▼
//! QueryCache ── Hit ──────────────────────────► Arc<SearchReport>
//!     │ Lead                        ▲
//!     ▼                             │ publish
//! spawned task ──► SearchDriver ────┘
//!                  (fan-out over generator backends)
//! ```
//!
//! A leading caller spawns the computation instead of running it inline,
//! so coalesced followers get their result even if the leader's own
//! wall-clock budget elapses first.
//!
//! # Example
//!
//! ```no_run
//! use lodestone::engine::OreEngineBuilder;
//! use lodestone::profile::Edition;
//! use lodestone::query::OreQuery;
//!
//! # async fn run() -> Result<(), lodestone::search::SearchError> {
//! let engine = OreEngineBuilder::new()
//!     .bedrock_generator("/opt/generators/vanilla_generator")
//!     .build();
//!
//! let query = OreQuery::new(123_456_789, Edition::Bedrock, 100, 200).with_radius(2);
//! let report = engine.find_ores(query).await?;
//! println!("{} ore blocks", report.total_ores());
//! # Ok(())
//! # }
//! ```

mod config;

pub use config::{EngineConfig, DEFAULT_GENERATOR_TIMEOUT_SECS, DEFAULT_QUERY_TIMEOUT_SECS};

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::cache::{CacheStats, Joined, QueryCache};
use crate::generator::{BlockSource, ProcessSource};
use crate::profile::{OreKind, ProfileRegistry};
use crate::query::OreQuery;
use crate::search::{GeneratorLimiter, SearchDriver, SearchError, SearchReport};
use crate::telemetry::{EngineMetrics, TelemetrySnapshot};

// ============================================================================
// Builder
// ============================================================================

/// Assembles an [`OreEngine`].
///
/// Backends come either from executable paths (production) or injected
/// [`BlockSource`] trait objects (tests and embeddings with their own
/// generators). A path-wired Java generator serves every supported Java
/// version through its `--version` flag.
pub struct OreEngineBuilder {
    config: EngineConfig,
    registry: ProfileRegistry,
    bedrock: Option<Arc<dyn BlockSource>>,
    java: Vec<(String, Arc<dyn BlockSource>)>,
    bedrock_path: Option<PathBuf>,
    java_path: Option<PathBuf>,
}

impl OreEngineBuilder {
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            registry: ProfileRegistry::builtin(),
            bedrock: None,
            java: Vec::new(),
            bedrock_path: None,
            java_path: None,
        }
    }

    /// Replaces the default configuration.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Wires the Bedrock backend to a generator executable.
    pub fn bedrock_generator(mut self, path: impl Into<PathBuf>) -> Self {
        self.bedrock_path = Some(path.into());
        self
    }

    /// Wires every supported Java version to one generator executable.
    pub fn java_generator(mut self, path: impl Into<PathBuf>) -> Self {
        self.java_path = Some(path.into());
        self
    }

    /// Injects a Bedrock backend directly.
    pub fn bedrock_source(mut self, source: Arc<dyn BlockSource>) -> Self {
        self.bedrock = Some(source);
        self
    }

    /// Injects a backend for one Java version tag.
    pub fn java_source(mut self, version_tag: impl Into<String>, source: Arc<dyn BlockSource>) -> Self {
        self.java.push((version_tag.into(), source));
        self
    }

    pub fn build(self) -> OreEngine {
        let config = self.config;
        let registry = Arc::new(self.registry);
        let metrics = Arc::new(EngineMetrics::new());
        let limiter = Arc::new(GeneratorLimiter::with_defaults("generators"));

        let mut driver = SearchDriver::new(
            Arc::clone(&registry),
            limiter,
            Arc::clone(&metrics),
        )
        .with_workers(config.workers)
        .with_max_radius(config.max_radius);

        let bedrock_tag = registry.bedrock_profile().version_tag();
        let mut wired = 0usize;
        if let Some(source) = self.bedrock {
            driver = driver.with_source(bedrock_tag, source);
            wired += 1;
        } else if let Some(path) = self.bedrock_path {
            let source =
                ProcessSource::new(&path).with_timeout(config.generator_timeout());
            driver = driver.with_source(bedrock_tag, Arc::new(source));
            wired += 1;
        }

        for (tag, source) in self.java {
            driver = driver.with_source(tag, source);
            wired += 1;
        }
        if let Some(path) = self.java_path {
            for profile in registry.java_profiles() {
                let tag = profile.version_tag();
                let source = ProcessSource::new(&path)
                    .with_version_tag(tag)
                    .with_timeout(config.generator_timeout());
                driver = driver.with_source(tag, Arc::new(source));
                wired += 1;
            }
        }

        if wired == 0 {
            warn!("Engine built with no generator backends; every query will fail");
        }

        let cache = QueryCache::new(Arc::clone(&metrics)).with_ttl(config.cache_ttl());

        info!(
            backends = wired,
            workers = config.workers,
            max_radius = config.max_radius,
            cache_ttl_secs = config.cache_ttl_secs,
            "Ore engine ready"
        );

        OreEngine {
            driver: Arc::new(driver),
            cache,
            registry,
            metrics,
            query_timeout: config.query_timeout(),
        }
    }
}

impl Default for OreEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Resolves ore locations for world seeds.
pub struct OreEngine {
    driver: Arc<SearchDriver>,
    cache: QueryCache,
    registry: Arc<ProfileRegistry>,
    metrics: Arc<EngineMetrics>,
    query_timeout: Duration,
}

impl OreEngine {
    /// Resolves one query, through the cache.
    ///
    /// Repeated queries are answered from memory; concurrent identical
    /// queries share one computation. The caller waits at most the
    /// configured query budget; hitting it abandons this caller's wait
    /// but never poisons the cache.
    ///
    /// # Errors
    ///
    /// Any [`SearchError`] from validation or the search itself, plus
    /// [`SearchError::Timeout`] when this caller's budget elapses.
    pub async fn find_ores(&self, query: OreQuery) -> Result<Arc<SearchReport>, SearchError> {
        let key = query.key();

        let follower = match self.cache.get_or_join(&key) {
            Joined::Hit(report) => {
                debug!(key = %key, "Query served from cache");
                return Ok(report);
            }
            Joined::Follow(follower) => {
                debug!(key = %key, "Joined in-flight query");
                follower
            }
            Joined::Lead { leader, follower } => {
                let driver = Arc::clone(&self.driver);
                let cancel = leader.cancel_token();
                tokio::spawn(async move {
                    let result = driver.search(&query, &cancel).await;
                    leader.publish(result);
                });
                follower
            }
        };

        match tokio::time::timeout(self.query_timeout, follower.wait()).await {
            Ok(outcome) => outcome,
            Err(_) => {
                self.metrics.query_timeout();
                let elapsed_ms = self.query_timeout.as_millis() as u64;
                warn!(key = %key, elapsed_ms, "Caller abandoned query at its budget");
                Err(SearchError::Timeout { elapsed_ms })
            }
        }
    }

    /// Ore kinds the engine understands, in catalog order.
    pub fn supported_ore_kinds(&self) -> &'static [OreKind] {
        self.registry.ore_kinds()
    }

    /// Version tags the engine can resolve, Bedrock first.
    pub fn supported_versions(&self) -> Vec<&'static str> {
        self.registry.version_tags()
    }

    /// The profile registry backing this engine.
    pub fn registry(&self) -> &ProfileRegistry {
        &self.registry
    }

    /// Drops every completed cache entry. Returns how many were dropped.
    pub fn invalidate_cache(&self) -> usize {
        self.cache.invalidate_all()
    }

    /// Current cache occupancy.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Point-in-time engine counters.
    pub fn metrics(&self) -> TelemetrySnapshot {
        self.metrics.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::ChunkCoord;
    use crate::generator::{BoxFuture, GeneratorError, RawBlock};
    use crate::profile::Edition;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Backend reporting one diamond per chunk after an optional delay.
    struct SlowSource {
        calls: AtomicUsize,
        delay: Duration,
    }

    impl SlowSource {
        fn instant() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                delay: Duration::ZERO,
            }
        }

        fn delayed(delay: Duration) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                delay,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl BlockSource for SlowSource {
        fn chunk_blocks(
            &self,
            _seed: i64,
            chunk: ChunkCoord,
        ) -> BoxFuture<'_, Result<Vec<RawBlock>, GeneratorError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let delay = self.delay;
            Box::pin(async move {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                let (bx, bz) = chunk.min_block(16);
                Ok(vec![RawBlock {
                    material: "diamond_ore".to_string(),
                    x: bx,
                    y: 12,
                    z: bz,
                }])
            })
        }

        fn describe(&self) -> String {
            "slow source".to_string()
        }
    }

    fn engine_with(source: Arc<dyn BlockSource>, config: EngineConfig) -> OreEngine {
        OreEngineBuilder::new()
            .config(config)
            .bedrock_source(source)
            .build()
    }

    #[tokio::test]
    async fn test_find_ores_end_to_end() {
        let source = Arc::new(SlowSource::instant());
        let engine = engine_with(source.clone(), EngineConfig::default());

        let query = OreQuery::new(123_456_789, Edition::Bedrock, 100, 200).with_radius(1);
        let report = engine.find_ores(query).await.unwrap();

        assert_eq!(report.origin_chunk(), ChunkCoord::new(6, 12));
        assert_eq!(report.total_ores(), 9);
        assert_eq!(source.calls(), 9);
    }

    #[tokio::test]
    async fn test_repeat_query_is_served_from_cache() {
        let source = Arc::new(SlowSource::instant());
        let engine = engine_with(source.clone(), EngineConfig::default());

        let query = OreQuery::new(42, Edition::Bedrock, 0, 0).with_radius(1);
        let first = engine.find_ores(query.clone()).await.unwrap();
        let second = engine.find_ores(query).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(source.calls(), 9);
        assert_eq!(engine.metrics().cache_hits, 1);
    }

    #[tokio::test]
    async fn test_invalidate_cache_forces_one_more_computation() {
        let source = Arc::new(SlowSource::instant());
        let engine = engine_with(source.clone(), EngineConfig::default());

        let query = OreQuery::new(42, Edition::Bedrock, 0, 0).with_radius(1);
        engine.find_ores(query.clone()).await.unwrap();
        assert_eq!(engine.invalidate_cache(), 1);
        engine.find_ores(query).await.unwrap();

        assert_eq!(source.calls(), 18);
    }

    #[tokio::test]
    async fn test_unsupported_version_fails_without_sampling() {
        let source = Arc::new(SlowSource::instant());
        let engine = engine_with(source.clone(), EngineConfig::default());

        let query = OreQuery::new(42, Edition::Java, 0, 0).with_version("1.25");
        let err = engine.find_ores(query).await.unwrap_err();

        assert!(matches!(err, SearchError::UnsupportedVersion(_)));
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_caller_budget_elapses_without_poisoning_the_cache() {
        let source = Arc::new(SlowSource::delayed(Duration::from_millis(200)));
        let config = EngineConfig {
            query_timeout_secs: 0,
            ..EngineConfig::default()
        };
        let engine = engine_with(source.clone(), config);

        let query = OreQuery::new(42, Edition::Bedrock, 0, 0).with_radius(0);
        let err = engine.find_ores(query.clone()).await.unwrap_err();
        assert!(matches!(err, SearchError::Timeout { .. }));

        // The abandoned flight was the only interest, so it is cancelled
        // and its slot removed rather than cached.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(engine.cache_stats().entries(), 0);
    }

    #[tokio::test]
    async fn test_listings_come_from_the_registry() {
        let engine = engine_with(Arc::new(SlowSource::instant()), EngineConfig::default());

        let kinds = engine.supported_ore_kinds();
        assert_eq!(kinds.first(), Some(&crate::profile::OreKind::Diamond));

        let versions = engine.supported_versions();
        assert_eq!(versions[0], "bedrock");
        assert!(versions.contains(&"1.21"));
    }
}
