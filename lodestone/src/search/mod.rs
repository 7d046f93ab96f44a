//! Parallel ore search across a chunk area.
//!
//! The search driver turns one [`OreQuery`] into one [`SearchReport`]:
//! it validates the query, resolves a generation profile, enumerates the
//! chunk area, samples chunks in parallel, and hands the merged samples
//! to deposit clustering.
//!
//! # Architecture
//!
//! ```text
//! OreQuery ──► radius check ──► profile resolution ──► ChunkArea
//!                                                          │
//!                                          fan out: buffered(workers)
//!                                                          │
//!                                 ChunkSampler ◄── GeneratorLimiter permit
//!                                                          │
//!                                     merge samples in enumeration order
//!                                                          │
//!                                     cluster_deposits ──► SearchReport
//! ```
//!
//! Chunks are sampled concurrently but merged in enumeration order, so a
//! fixed query against a deterministic backend always produces the same
//! report. A failing chunk does not abort the search; it lands in the
//! report's failure side channel. Only a search in which every chunk
//! fails becomes an error.

mod limiter;

pub use limiter::{GeneratorLimiter, GeneratorPermit, FALLBACK_PERMITS};

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use crate::cluster::{cluster_deposits, OreDeposit};
use crate::coord::{chunks_covering, ChunkCoord};
use crate::generator::{BlockSample, BlockSource, ChunkSampler, GeneratorError};
use crate::profile::{ProfileError, ProfileRegistry};
use crate::query::OreQuery;
use crate::telemetry::EngineMetrics;

// ============================================================================
// Defaults
// ============================================================================

/// Default ceiling on the search radius, in chunk rings.
///
/// Radius 8 spans a 17x17 chunk square, 136 blocks of half-width. Wide
/// enough for any practical hunt, small enough to keep one query from
/// monopolizing the generator budget.
pub const DEFAULT_MAX_RADIUS: u32 = 8;

/// Default number of chunks sampled concurrently per query.
pub const DEFAULT_WORKERS: usize = 4;

// ============================================================================
// Errors
// ============================================================================

/// Errors from the search driver.
///
/// Cloneable so a single failure can be broadcast to every caller
/// coalesced onto the same query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// The query named an edition or version with no generation profile.
    /// Raised before any generator work starts.
    #[error(transparent)]
    UnsupportedVersion(#[from] ProfileError),

    /// The requested radius exceeds the engine's ceiling.
    #[error("search radius {requested} exceeds the maximum of {max} chunks")]
    RadiusTooLarge { requested: u32, max: u32 },

    /// The version resolved to a profile, but no generator backend was
    /// wired for it when the engine was built.
    #[error("no generator backend wired for version {version:?}")]
    NoBackend { version: String },

    /// Every chunk in the area failed to generate.
    #[error("all {failed_chunks} chunks failed to generate; first: {first}")]
    Backend { failed_chunks: usize, first: String },

    /// The caller's wall-clock budget elapsed before the search finished.
    #[error("search timed out after {elapsed_ms} ms")]
    Timeout { elapsed_ms: u64 },

    /// The search was cancelled before completion.
    #[error("search cancelled")]
    Cancelled,
}

/// One chunk the driver could not sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkFailure {
    /// Chunk that failed.
    pub chunk: ChunkCoord,
    /// What its generator invocation reported.
    pub reason: GeneratorError,
}

impl fmt::Display for ChunkFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chunk {}: {}", self.chunk, self.reason)
    }
}

// ============================================================================
// Report
// ============================================================================

/// The result of one completed search.
///
/// Produced by [`SearchDriver::search`] and cached as `Arc<SearchReport>`
/// so coalesced and repeated queries share one allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchReport {
    pub(crate) query: OreQuery,
    pub(crate) version_tag: String,
    pub(crate) origin_chunk: ChunkCoord,
    pub(crate) chunks_total: usize,
    pub(crate) deposits: Vec<OreDeposit>,
    pub(crate) total_ores: u32,
    pub(crate) failed_chunks: Vec<ChunkFailure>,
    pub(crate) elapsed: Duration,
}

impl SearchReport {
    /// The query this report answers.
    pub fn query(&self) -> &OreQuery {
        &self.query
    }

    /// Resolved profile tag (`"bedrock"`, `"1.20"`, ...).
    pub fn version_tag(&self) -> &str {
        &self.version_tag
    }

    /// Chunk containing the query origin.
    pub fn origin_chunk(&self) -> ChunkCoord {
        self.origin_chunk
    }

    /// Number of chunks the search area covers.
    pub fn chunks_total(&self) -> usize {
        self.chunks_total
    }

    /// Number of chunks that produced samples.
    pub fn chunks_sampled(&self) -> usize {
        self.chunks_total - self.failed_chunks.len()
    }

    /// Deposits found, in first-encounter order.
    pub fn deposits(&self) -> &[OreDeposit] {
        &self.deposits
    }

    /// Total ore blocks across all deposits.
    pub fn total_ores(&self) -> u32 {
        self.total_ores
    }

    /// Chunks that failed to generate. Empty on a clean search.
    pub fn failed_chunks(&self) -> &[ChunkFailure] {
        &self.failed_chunks
    }

    /// Whether some chunks failed while others succeeded.
    pub fn is_partial(&self) -> bool {
        !self.failed_chunks.is_empty()
    }

    /// Wall-clock time spent sampling and clustering.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

// ============================================================================
// Driver
// ============================================================================

/// Fans one query out over its chunk area and assembles the report.
///
/// One driver serves all queries; backends are wired per version tag at
/// construction. Per-query concurrency is `workers`; across queries the
/// shared [`GeneratorLimiter`] caps total generator processes.
pub struct SearchDriver {
    registry: Arc<ProfileRegistry>,
    samplers: HashMap<String, ChunkSampler>,
    limiter: Arc<GeneratorLimiter>,
    metrics: Arc<EngineMetrics>,
    workers: usize,
    max_radius: u32,
}

impl SearchDriver {
    pub fn new(
        registry: Arc<ProfileRegistry>,
        limiter: Arc<GeneratorLimiter>,
        metrics: Arc<EngineMetrics>,
    ) -> Self {
        Self {
            registry,
            samplers: HashMap::new(),
            limiter,
            metrics,
            workers: DEFAULT_WORKERS,
            max_radius: DEFAULT_MAX_RADIUS,
        }
    }

    /// Wires a backend for one version tag (`"bedrock"`, `"1.18"`, ...).
    pub fn with_source(mut self, version_tag: impl Into<String>, source: Arc<dyn BlockSource>) -> Self {
        self.samplers
            .insert(version_tag.into(), ChunkSampler::new(source));
        self
    }

    /// Sets per-query sampling concurrency. Clamped to at least 1.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Sets the radius ceiling.
    pub fn with_max_radius(mut self, max_radius: u32) -> Self {
        self.max_radius = max_radius;
        self
    }

    /// Runs one search to completion.
    ///
    /// Validation happens up front: an oversized radius or an unknown
    /// version returns before any generator runs. After fan-out, chunk
    /// results are merged in enumeration order regardless of completion
    /// order.
    ///
    /// # Errors
    ///
    /// - [`SearchError::RadiusTooLarge`] - radius over the ceiling
    /// - [`SearchError::UnsupportedVersion`] - no profile for the query
    /// - [`SearchError::NoBackend`] - profile without a wired backend
    /// - [`SearchError::Backend`] - every chunk failed
    /// - [`SearchError::Cancelled`] - the token fired mid-search
    #[instrument(skip(self, query, cancel), fields(key = %query.key()))]
    pub async fn search(
        &self,
        query: &OreQuery,
        cancel: &CancellationToken,
    ) -> Result<SearchReport, SearchError> {
        let radius = query.radius();
        if radius > self.max_radius {
            return Err(SearchError::RadiusTooLarge {
                requested: radius,
                max: self.max_radius,
            });
        }

        let profile = self.registry.resolve(query.edition(), query.version())?;
        let version_tag = profile.version_tag();
        let sampler = self
            .samplers
            .get(version_tag)
            .ok_or_else(|| SearchError::NoBackend {
                version: version_tag.to_string(),
            })?;

        let (origin_x, origin_z) = query.origin();
        let area = chunks_covering(origin_x, origin_z, radius, profile.chunk_size);
        let origin_chunk = area.center();
        let chunks_total = area.chunk_count();
        let seed = query.seed();

        self.metrics.search_started();
        debug!(
            seed,
            origin = %origin_chunk,
            radius,
            chunks = chunks_total,
            backend = %sampler.describe(),
            "Starting ore search"
        );
        let started = Instant::now();

        let results = stream::iter(area.iter())
            .map(|chunk| async move {
                let _permit = self.limiter.acquire().await;
                let outcome = sampler.sample_chunk(seed, chunk, profile).await;
                (chunk, outcome)
            })
            .buffered(self.workers);
        tokio::pin!(results);

        let mut samples: Vec<BlockSample> = Vec::new();
        let mut failures: Vec<ChunkFailure> = Vec::new();

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(seed, origin = %origin_chunk, "Search cancelled");
                    self.metrics.search_failed();
                    return Err(SearchError::Cancelled);
                }
                next = results.next() => {
                    let Some((chunk, outcome)) = next else { break };
                    match outcome {
                        Ok(blocks) => {
                            self.metrics.chunk_sampled(blocks.len() as u64);
                            samples.extend(
                                blocks.into_iter().filter(|s| query.matches_filter(s.kind)),
                            );
                        }
                        Err(reason) => {
                            warn!(chunk = %chunk, error = %reason, "Chunk generation failed");
                            self.metrics.chunk_failed();
                            failures.push(ChunkFailure { chunk, reason });
                        }
                    }
                }
            }
        }

        if failures.len() == chunks_total {
            self.metrics.search_failed();
            let first = failures[0].reason.to_string();
            return Err(SearchError::Backend {
                failed_chunks: failures.len(),
                first,
            });
        }

        let deposits = cluster_deposits(&samples);
        let total_ores: u32 = deposits.iter().map(|d| d.count).sum();
        let elapsed = started.elapsed();

        self.metrics
            .search_completed(deposits.len() as u64, u64::from(total_ores));
        debug!(
            seed,
            deposits = deposits.len(),
            total_ores,
            failed = failures.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Search complete"
        );

        Ok(SearchReport {
            query: query.clone(),
            version_tag: version_tag.to_string(),
            origin_chunk,
            chunks_total,
            deposits,
            total_ores,
            failed_chunks: failures,
            elapsed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::BlockPos;
    use crate::generator::{BoxFuture, RawBlock};
    use crate::profile::{Edition, OreKind};
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Backend that reports one diamond and one coal block per chunk,
    /// failing for selected chunks, and records every invocation.
    struct ScriptedSource {
        calls: AtomicUsize,
        seen: Mutex<Vec<ChunkCoord>>,
        failing: HashSet<ChunkCoord>,
    }

    impl ScriptedSource {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
                failing: HashSet::new(),
            }
        }

        fn failing_on(chunks: impl IntoIterator<Item = ChunkCoord>) -> Self {
            Self {
                failing: chunks.into_iter().collect(),
                ..Self::new()
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn seen(&self) -> Vec<ChunkCoord> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl BlockSource for ScriptedSource {
        fn chunk_blocks(
            &self,
            _seed: i64,
            chunk: ChunkCoord,
        ) -> BoxFuture<'_, Result<Vec<RawBlock>, GeneratorError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(chunk);
            let fail = self.failing.contains(&chunk);
            Box::pin(async move {
                if fail {
                    return Err(GeneratorError::Failed {
                        status: Some(1),
                        stderr: "scripted failure".to_string(),
                    });
                }
                let (bx, bz) = chunk.min_block(16);
                Ok(vec![
                    RawBlock {
                        material: "diamond_ore".to_string(),
                        x: bx,
                        y: 12,
                        z: bz,
                    },
                    RawBlock {
                        material: "coal_ore".to_string(),
                        x: bx + 4,
                        y: 40,
                        z: bz + 4,
                    },
                ])
            })
        }

        fn describe(&self) -> String {
            "scripted source".to_string()
        }
    }

    /// Backend whose first-enumerated chunks finish last.
    struct ReversedDelaySource;

    impl BlockSource for ReversedDelaySource {
        fn chunk_blocks(
            &self,
            _seed: i64,
            chunk: ChunkCoord,
        ) -> BoxFuture<'_, Result<Vec<RawBlock>, GeneratorError>> {
            Box::pin(async move {
                let delay = ((1 - chunk.x) * 10 + (1 - chunk.z) * 3).max(0) as u64;
                tokio::time::sleep(Duration::from_millis(delay)).await;
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
            "reversed delay source".to_string()
        }
    }

    fn driver_with(source: Arc<dyn BlockSource>) -> SearchDriver {
        SearchDriver::new(
            Arc::new(ProfileRegistry::builtin()),
            Arc::new(GeneratorLimiter::new(16, "test")),
            Arc::new(EngineMetrics::new()),
        )
        .with_source("bedrock", source)
    }

    #[tokio::test]
    async fn test_radius_is_checked_before_version_resolution() {
        // Both the radius and the version are invalid; the radius error
        // must win because it is checked first.
        let driver = driver_with(Arc::new(ScriptedSource::new()));
        let query = OreQuery::new(42, Edition::Java, 0, 0)
            .with_version("1.95")
            .with_radius(99);

        let err = driver
            .search(&query, &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(
            err,
            SearchError::RadiusTooLarge {
                requested: 99,
                max: DEFAULT_MAX_RADIUS,
            }
        );
    }

    #[tokio::test]
    async fn test_unsupported_version_never_invokes_the_generator() {
        let source = Arc::new(ScriptedSource::new());
        let driver = driver_with(source.clone());
        let query = OreQuery::new(42, Edition::Java, 0, 0).with_version("1.25");

        let err = driver
            .search(&query, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SearchError::UnsupportedVersion(ProfileError::UnsupportedVersion { .. })
        ));
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_java_without_a_version_is_rejected() {
        let driver = driver_with(Arc::new(ScriptedSource::new()));
        let query = OreQuery::new(42, Edition::Java, 0, 0);

        let err = driver
            .search(&query, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SearchError::UnsupportedVersion(ProfileError::VersionRequired { .. })
        ));
    }

    #[tokio::test]
    async fn test_supported_version_without_backend_fails_fast() {
        // Only a bedrock backend is wired; 1.20 resolves but cannot run.
        let source = Arc::new(ScriptedSource::new());
        let driver = driver_with(source.clone());
        let query = OreQuery::new(42, Edition::Java, 0, 0).with_version("1.20");

        let err = driver
            .search(&query, &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(
            err,
            SearchError::NoBackend {
                version: "1.20".to_string(),
            }
        );
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_search_samples_every_chunk_exactly_once() {
        let source = Arc::new(ScriptedSource::new());
        let driver = driver_with(source.clone());
        let query = OreQuery::new(123_456_789, Edition::Bedrock, 100, 200).with_radius(1);

        let report = driver
            .search(&query, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.origin_chunk(), ChunkCoord::new(6, 12));
        assert_eq!(report.chunks_total(), 9);
        assert_eq!(source.calls(), 9);

        let seen = source.seen();
        let unique: HashSet<_> = seen.iter().copied().collect();
        assert_eq!(unique.len(), 9);
        for chunk in seen {
            assert!((chunk.x - 6).abs() <= 1 && (chunk.z - 12).abs() <= 1);
        }

        // Two isolated blocks per chunk, nine chunks.
        assert_eq!(report.total_ores(), 18);
        assert_eq!(report.deposits().len(), 18);
        assert!(!report.is_partial());
    }

    #[tokio::test]
    async fn test_radius_zero_covers_only_the_origin_chunk() {
        let source = Arc::new(ScriptedSource::new());
        let driver = driver_with(source.clone());
        let query = OreQuery::new(42, Edition::Bedrock, 100, 200).with_radius(0);

        let report = driver
            .search(&query, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.chunks_total(), 1);
        assert_eq!(source.seen(), vec![ChunkCoord::new(6, 12)]);
    }

    #[tokio::test]
    async fn test_samples_merge_in_enumeration_order() {
        // All nine chunks run concurrently and the first-enumerated
        // chunks finish last; the report must still follow enumeration
        // order, not completion order.
        let driver = driver_with(Arc::new(ReversedDelaySource)).with_workers(9);
        let query = OreQuery::new(42, Edition::Bedrock, 0, 0).with_radius(1);

        let report = driver
            .search(&query, &CancellationToken::new())
            .await
            .unwrap();

        let anchors: Vec<BlockPos> = report.deposits().iter().map(|d| d.anchor).collect();
        let mut expected = Vec::new();
        for cx in -1..=1 {
            for cz in -1..=1 {
                expected.push(BlockPos::new(cx * 16, 12, cz * 16));
            }
        }
        assert_eq!(anchors, expected);
    }

    #[tokio::test]
    async fn test_one_failing_chunk_yields_a_partial_report() {
        let bad = ChunkCoord::new(6, 12);
        let source = Arc::new(ScriptedSource::failing_on([bad]));
        let driver = driver_with(source);
        let query = OreQuery::new(42, Edition::Bedrock, 100, 200).with_radius(1);

        let report = driver
            .search(&query, &CancellationToken::new())
            .await
            .unwrap();

        assert!(report.is_partial());
        assert_eq!(report.failed_chunks().len(), 1);
        assert_eq!(report.failed_chunks()[0].chunk, bad);
        assert_eq!(report.chunks_sampled(), 8);
        assert_eq!(report.total_ores(), 16);
    }

    #[tokio::test]
    async fn test_every_chunk_failing_is_a_backend_error() {
        let area: Vec<ChunkCoord> = ChunkCoord::new(6, 12).area(1).iter().collect();
        let source = Arc::new(ScriptedSource::failing_on(area));
        let driver = driver_with(source);
        let query = OreQuery::new(42, Edition::Bedrock, 100, 200).with_radius(1);

        let err = driver
            .search(&query, &CancellationToken::new())
            .await
            .unwrap_err();

        match err {
            SearchError::Backend {
                failed_chunks,
                first,
            } => {
                assert_eq!(failed_chunks, 9);
                assert!(first.contains("scripted failure"));
            }
            other => panic!("expected Backend error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_ore_filter_drops_unrequested_kinds() {
        let driver = driver_with(Arc::new(ScriptedSource::new()));
        let query = OreQuery::new(42, Edition::Bedrock, 0, 0)
            .with_radius(1)
            .with_ore_filter([OreKind::Diamond]);

        let report = driver
            .search(&query, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.deposits().len(), 9);
        assert!(report.deposits().iter().all(|d| d.kind == OreKind::Diamond));
    }

    #[tokio::test]
    async fn test_cancelled_token_stops_the_search_before_sampling() {
        let source = Arc::new(ScriptedSource::new());
        let driver = driver_with(source.clone());
        let query = OreQuery::new(42, Edition::Bedrock, 0, 0).with_radius(1);

        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = driver.search(&query, &cancel).await.unwrap_err();

        assert_eq!(err, SearchError::Cancelled);
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_report_echoes_query_and_resolved_tag() {
        let driver = driver_with(Arc::new(ScriptedSource::new()));
        let query = OreQuery::new(7, Edition::Bedrock, -33, 64).with_radius(0);

        let report = driver
            .search(&query, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.query(), &query);
        assert_eq!(report.version_tag(), "bedrock");
        assert_eq!(report.origin_chunk(), ChunkCoord::new(-3, 4));
    }
}
