//! Core types for block and chunk addressing.

use std::fmt;

/// Absolute position of a single block in the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    /// Creates a block position from absolute world coordinates.
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The chunk containing this block, for a grid of `chunk_size` blocks.
    pub fn chunk(&self, chunk_size: i32) -> ChunkCoord {
        ChunkCoord::containing(self.x, self.z, chunk_size)
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Position of a chunk on the horizontal chunk grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    pub x: i32,
    pub z: i32,
}

impl ChunkCoord {
    /// Creates a chunk coordinate directly.
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// The chunk containing the block column at (`block_x`, `block_z`).
    ///
    /// Floor division keeps negative coordinates correct: block -1 lies
    /// in chunk -1, not chunk 0.
    pub fn containing(block_x: i32, block_z: i32, chunk_size: i32) -> Self {
        Self {
            x: super::block_to_chunk(block_x, chunk_size),
            z: super::block_to_chunk(block_z, chunk_size),
        }
    }

    /// Lowest block coordinates covered by this chunk.
    pub fn min_block(&self, chunk_size: i32) -> (i32, i32) {
        (self.x * chunk_size, self.z * chunk_size)
    }

    /// Whether the block column at (`block_x`, `block_z`) falls inside
    /// this chunk.
    pub fn contains_column(&self, block_x: i32, block_z: i32, chunk_size: i32) -> bool {
        ChunkCoord::containing(block_x, block_z, chunk_size) == *self
    }

    /// The square neighborhood of `radius` chunk rings around this chunk.
    pub fn area(self, radius: u32) -> ChunkArea {
        ChunkArea {
            center: self,
            radius,
        }
    }
}

impl fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// Square neighborhood of chunks around a center chunk.
///
/// Covers every chunk within `radius` rings of the center; radius 0 is
/// the center alone. Iteration order is deterministic, chunk x ascending
/// in the outer loop and chunk z in the inner loop, so repeated runs of
/// the same query visit chunks (and therefore flatten samples) in the
/// same order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkArea {
    center: ChunkCoord,
    radius: u32,
}

impl ChunkArea {
    /// The chunk at the center of the area.
    pub fn center(&self) -> ChunkCoord {
        self.center
    }

    /// Neighborhood size in chunk rings.
    pub fn radius(&self) -> u32 {
        self.radius
    }

    /// Number of chunks in the area: (2 * radius + 1)².
    pub fn chunk_count(&self) -> usize {
        let edge = 2 * self.radius as usize + 1;
        edge * edge
    }

    /// Whether `chunk` lies inside the area.
    pub fn contains(&self, chunk: ChunkCoord) -> bool {
        let r = i64::from(self.radius);
        (i64::from(chunk.x) - i64::from(self.center.x)).abs() <= r
            && (i64::from(chunk.z) - i64::from(self.center.z)).abs() <= r
    }

    /// Iterates the chunks of the area in enumeration order.
    pub fn iter(&self) -> ChunkAreaIter {
        ChunkAreaIter {
            area: *self,
            dx: -i64::from(self.radius),
            dz: -i64::from(self.radius),
        }
    }
}

impl IntoIterator for ChunkArea {
    type Item = ChunkCoord;
    type IntoIter = ChunkAreaIter;

    fn into_iter(self) -> ChunkAreaIter {
        self.iter()
    }
}

impl IntoIterator for &ChunkArea {
    type Item = ChunkCoord;
    type IntoIter = ChunkAreaIter;

    fn into_iter(self) -> ChunkAreaIter {
        self.iter()
    }
}

/// Iterator over the chunks of a [`ChunkArea`].
#[derive(Debug, Clone)]
pub struct ChunkAreaIter {
    area: ChunkArea,
    dx: i64,
    dz: i64,
}

impl Iterator for ChunkAreaIter {
    type Item = ChunkCoord;

    fn next(&mut self) -> Option<ChunkCoord> {
        let r = i64::from(self.area.radius);
        if self.dx > r {
            return None;
        }

        let chunk = ChunkCoord::new(
            (i64::from(self.area.center.x) + self.dx) as i32,
            (i64::from(self.area.center.z) + self.dz) as i32,
        );

        self.dz += 1;
        if self.dz > r {
            self.dz = -r;
            self.dx += 1;
        }

        Some(chunk)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let r = i64::from(self.area.radius);
        let edge = 2 * r + 1;
        let consumed = if self.dx > r {
            edge * edge
        } else {
            (self.dx + r) * edge + (self.dz + r)
        };
        let remaining = (edge * edge - consumed) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ChunkAreaIter {}
