//! Material normalization between backends and the engine.

use std::sync::Arc;

use tracing::debug;

use super::{BlockSample, BlockSource, GeneratorError};
use crate::coord::{BlockPos, ChunkCoord};
use crate::profile::GenerationProfile;

/// Adapter that turns one backend's raw chunk report into uniform
/// [`BlockSample`]s.
///
/// Applies, in order: material normalization through the profile's ore
/// table, the profile's vertical band, and the chunk's own column
/// bounds (a generator occasionally reports vein spill-over from a
/// neighboring chunk; those blocks belong in that chunk's report, not
/// this one's).
pub struct ChunkSampler {
    source: Arc<dyn BlockSource>,
}

impl ChunkSampler {
    pub fn new(source: Arc<dyn BlockSource>) -> Self {
        Self { source }
    }

    /// Backend description for logs.
    pub fn describe(&self) -> String {
        self.source.describe()
    }

    /// Samples one chunk, returning its ore blocks in report order.
    ///
    /// Deterministic for a fixed (seed, chunk) as long as the backend
    /// itself is: filtering preserves report order and adds nothing.
    ///
    /// # Errors
    ///
    /// Propagates the backend's [`GeneratorError`] untouched.
    pub async fn sample_chunk(
        &self,
        seed: i64,
        chunk: ChunkCoord,
        profile: &GenerationProfile,
    ) -> Result<Vec<BlockSample>, GeneratorError> {
        let raw = self.source.chunk_blocks(seed, chunk).await?;
        let reported = raw.len();

        let samples: Vec<BlockSample> = raw
            .into_iter()
            .filter_map(|block| {
                let kind = profile.ore_for_material(&block.material)?;
                if !profile.contains_y(block.y) {
                    return None;
                }
                if !chunk.contains_column(block.x, block.z, profile.chunk_size) {
                    return None;
                }
                Some(BlockSample {
                    pos: BlockPos::new(block.x, block.y, block.z),
                    kind,
                })
            })
            .collect();

        debug!(chunk = %chunk, reported, ores = samples.len(), "Sampled chunk");

        Ok(samples)
    }
}
