//! Lodestone - Minecraft ore location resolution engine
//!
//! This library finds ore deposits around a world coordinate by driving
//! external chunk generators, clustering the raw block samples into
//! deposits, and caching finished reports per query.
//!
//! # Architecture
//!
//! ```text
//!                    ┌─────────────┐
//!        OreQuery ──►│  OreEngine  │──► Arc<SearchReport> ──► SearchResponse
//!                    └──────┬──────┘
//!                           │ single-flight per QueryKey
//!                    ┌──────▼──────┐
//!                    │ QueryCache  │
//!                    └──────┬──────┘
//!                           │ leader computes, followers wait
//!                    ┌──────▼──────┐      ┌──────────────┐
//!                    │ SearchDriver│─────►│ ChunkSampler │──► generator process
//!                    └──────┬──────┘      └──────────────┘
//!                           │ per-chunk samples
//!                    ┌──────▼──────┐
//!                    │  cluster    │  6-connectivity union-find
//!                    └─────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use lodestone::engine::OreEngineBuilder;
//! use lodestone::profile::Edition;
//! use lodestone::query::OreQuery;
//! use lodestone::response::SearchResponse;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = OreEngineBuilder::new()
//!     .bedrock_generator("/opt/generators/bedrock_chunk")
//!     .java_generator("/opt/generators/java_chunk")
//!     .build();
//!
//! let query = OreQuery::new(123_456_789, Edition::Bedrock, 100, 200);
//! let report = engine.find_ores(query).await?;
//! let envelope = SearchResponse::from_report(&report);
//! println!("{}", serde_json::to_string_pretty(&envelope)?);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod cluster;
pub mod coord;
pub mod engine;
pub mod generator;
pub mod profile;
pub mod query;
pub mod response;
pub mod search;
pub mod telemetry;

pub use cache::QueryCache;
pub use cluster::OreDeposit;
pub use coord::{BlockPos, ChunkCoord};
pub use engine::{EngineConfig, OreEngine, OreEngineBuilder};
pub use profile::{Edition, OreKind};
pub use query::OreQuery;
pub use response::SearchResponse;
pub use search::{SearchError, SearchReport};
pub use telemetry::{EngineMetrics, TelemetrySnapshot};
