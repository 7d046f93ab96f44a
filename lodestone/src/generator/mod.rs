//! Chunk generation backends and the sampling adapter
//!
//! This module defines the `BlockSource` trait which allows different
//! native world generators to be driven interchangeably: the wrapped
//! Bedrock vanilla generator, the cubiomes-backed Java generators, or
//! in-process fakes in tests.
//!
//! A source reports raw per-chunk block data in whatever material
//! vocabulary its backend speaks; the [`ChunkSampler`] adapter sits on
//! top and normalizes that into uniform [`BlockSample`]s using the
//! query's generation profile. Nothing downstream of the adapter ever
//! sees backend-specific material ids.

mod process;
mod sampler;

pub use process::ProcessSource;
pub use sampler::ChunkSampler;

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use thiserror::Error;

use crate::coord::{BlockPos, ChunkCoord};
use crate::profile::OreKind;

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Errors from a single native generator invocation.
///
/// Cloneable so one chunk's failure can be fanned out to every caller
/// waiting on the same query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeneratorError {
    /// The generator executable could not be started.
    #[error("failed to launch generator {program}: {message}")]
    Spawn { program: String, message: String },

    /// I/O failed while talking to the running generator.
    #[error("generator i/o failed: {0}")]
    Io(String),

    /// The generator exited with a failure status.
    #[error("generator exited with status {status:?}: {stderr}")]
    Failed { status: Option<i32>, stderr: String },

    /// The generator's stdout was not a valid block report.
    #[error("malformed generator output: {0}")]
    Malformed(String),

    /// The generator exceeded its per-invocation budget.
    #[error("generator timed out after {timeout:?}")]
    TimedOut { timeout: Duration },
}

/// Raw block as reported by a generation backend, before material
/// normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBlock {
    /// Backend material id, e.g. `"minecraft:deepslate_gold_ore"`.
    pub material: String,
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

/// One ore block in the engine's uniform vocabulary.
///
/// Produced per chunk by the [`ChunkSampler`], consumed immediately by
/// filtering and clustering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockSample {
    pub pos: BlockPos,
    pub kind: OreKind,
}

/// A native world generator driven one chunk at a time.
///
/// Implementations must be thread-safe (`Send + Sync`); the search
/// driver invokes them concurrently across chunks. Async methods use
/// `Pin<Box<dyn Future>>` so sources can be held as trait objects
/// (`Arc<dyn BlockSource>`) and swapped per edition/version.
pub trait BlockSource: Send + Sync {
    /// Generates one chunk and reports its raw blocks.
    ///
    /// # Arguments
    ///
    /// * `seed` - World seed to generate under
    /// * `chunk` - Chunk to generate
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError`] if the backend cannot be launched,
    /// fails, times out, or reports unparseable data. A failure covers
    /// this chunk only; the caller decides whether the query survives.
    fn chunk_blocks(
        &self,
        seed: i64,
        chunk: ChunkCoord,
    ) -> BoxFuture<'_, Result<Vec<RawBlock>, GeneratorError>>;

    /// Human-readable backend description for logs.
    fn describe(&self) -> String;
}
