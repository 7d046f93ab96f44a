//! Client-facing response envelope.
//!
//! The engine's [`SearchReport`] is rich and internal; clients get a
//! flat JSON envelope instead. One success shape, one failure shape,
//! never conflated: an empty search is a success with zero ores, and a
//! failed search is `success: false` with a human-readable message.

use serde::{Deserialize, Serialize};

use crate::cluster::OreDeposit;
use crate::coord::{BlockPos, ChunkCoord};
use crate::profile::Edition;
use crate::query::OreQuery;
use crate::search::{SearchError, SearchReport};

/// An (x, z) column position on the world plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaneCoordinates {
    pub x: i32,
    pub z: i32,
}

impl From<ChunkCoord> for PlaneCoordinates {
    fn from(chunk: ChunkCoord) -> Self {
        Self {
            x: chunk.x,
            z: chunk.z,
        }
    }
}

/// A full block position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockCoordinates {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl From<BlockPos> for BlockCoordinates {
    fn from(pos: BlockPos) -> Self {
        Self {
            x: pos.x,
            y: pos.y,
            z: pos.z,
        }
    }
}

/// One deposit as clients see it: the anchor block stands for the vein.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OreLocation {
    /// Display name of the ore (`"Diamond"`, `"Lapis Lazuli"`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// Anchor coordinate of the deposit.
    pub coordinates: BlockCoordinates,
    /// Blocks in the deposit.
    pub count: u32,
}

impl OreLocation {
    fn from_deposit(deposit: &OreDeposit) -> Self {
        Self {
            kind: deposit.kind.name().to_string(),
            coordinates: deposit.anchor.into(),
            count: deposit.count,
        }
    }
}

/// The JSON envelope returned for every search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub seed: i64,
    pub search_coordinates: PlaneCoordinates,
    /// Resolved Java version tag; absent for Bedrock.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub version: Option<String>,
    /// Chunk containing the search origin; absent when the search never
    /// got far enough to resolve a profile.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub chunk_coordinates: Option<PlaneCoordinates>,
    pub total_ores: u32,
    pub ore_locations: Vec<OreLocation>,
    pub success: bool,
    pub message: String,
}

impl SearchResponse {
    /// Builds the success envelope for a completed report.
    ///
    /// Partial reports stay successful; the message notes how many
    /// chunks went unsampled.
    pub fn from_report(report: &SearchReport) -> Self {
        let query = report.query();
        let (x, z) = query.origin();

        let version = match query.edition() {
            Edition::Java => Some(report.version_tag().to_string()),
            Edition::Bedrock => None,
        };

        let mut message = match &version {
            Some(tag) => format!("Found {} ore blocks in Java {}", report.total_ores(), tag),
            None => format!("Found {} ore blocks", report.total_ores()),
        };
        if report.is_partial() {
            message.push_str(&format!(
                " ({} of {} chunks unavailable)",
                report.failed_chunks().len(),
                report.chunks_total()
            ));
        }

        Self {
            seed: query.seed(),
            search_coordinates: PlaneCoordinates { x, z },
            version,
            chunk_coordinates: Some(report.origin_chunk().into()),
            total_ores: report.total_ores(),
            ore_locations: report.deposits().iter().map(OreLocation::from_deposit).collect(),
            success: true,
            message,
        }
    }

    /// Builds the failure envelope for a query that produced no report.
    pub fn failure(query: &OreQuery, error: &SearchError) -> Self {
        let (x, z) = query.origin();
        Self {
            seed: query.seed(),
            search_coordinates: PlaneCoordinates { x, z },
            version: query.version().map(|tag| tag.trim().to_string()),
            chunk_coordinates: None,
            total_ores: 0,
            ore_locations: Vec::new(),
            success: false,
            message: format!("Failed to find ores: {error}"),
        }
    }
}
