//! Engine telemetry for observability and user feedback.
//!
//! This module provides metrics collection and reporting for the ore
//! resolution engine. It uses lock-free atomic counters so instrumenting
//! the hot path costs almost nothing.
//!
//! # Architecture
//!
//! ```text
//! Search / Cache ─────► EngineMetrics ─────► TelemetrySnapshot ─────► Views
//!                      (atomic counters)    (point-in-time copy)     (CLI, etc.)
//! ```
//!
//! # Example
//!
//! ```
//! use lodestone::telemetry::EngineMetrics;
//!
//! let metrics = EngineMetrics::new();
//!
//! // Record events from the search path.
//! metrics.search_started();
//! metrics.chunk_sampled(24); // one chunk, 24 ore blocks
//! metrics.search_completed(5, 24); // 5 deposits, 24 ore blocks
//!
//! // Take a snapshot for display.
//! let snapshot = metrics.snapshot();
//! assert_eq!(snapshot.searches_completed, 1);
//! assert_eq!(snapshot.deposits_found, 5);
//! ```

mod metrics;
mod snapshot;

pub use metrics::EngineMetrics;
pub use snapshot::TelemetrySnapshot;
