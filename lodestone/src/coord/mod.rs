//! Block and chunk coordinate arithmetic
//!
//! Converts absolute block coordinates to chunk-grid coordinates and
//! enumerates the chunk neighborhoods a search covers. World generation
//! operates on square chunks (16×16 blocks in every supported profile),
//! so a query starts by mapping its origin into the chunk grid and then
//! fans out over the surrounding area. The chunk edge length comes from
//! the generation profile rather than being baked in here.

mod types;

pub use types::{BlockPos, ChunkArea, ChunkAreaIter, ChunkCoord};

/// Converts a block coordinate to its chunk coordinate along one axis.
///
/// # Arguments
///
/// * `block` - Absolute block coordinate (may be negative)
/// * `chunk_size` - Chunk edge length in blocks (positive)
///
/// # Returns
///
/// The chunk-grid coordinate of the chunk containing the block.
///
/// Uses floor division rather than truncation: with a chunk size of 16,
/// blocks -16..=-1 belong to chunk -1 and blocks 0..=15 to chunk 0, with
/// no double-width chunk straddling the origin.
#[inline]
pub fn block_to_chunk(block: i32, chunk_size: i32) -> i32 {
    block.div_euclid(chunk_size)
}

/// Enumerates the chunks covering a square search area.
///
/// # Arguments
///
/// * `origin_x` - Block X coordinate of the search origin
/// * `origin_z` - Block Z coordinate of the search origin
/// * `radius` - Neighborhood size in chunk rings around the origin chunk
/// * `chunk_size` - Chunk edge length in blocks (positive)
///
/// # Returns
///
/// The chunk area centered on the chunk containing the origin.
#[inline]
pub fn chunks_covering(origin_x: i32, origin_z: i32, radius: u32, chunk_size: i32) -> ChunkArea {
    ChunkCoord::containing(origin_x, origin_z, chunk_size).area(radius)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIZE: i32 = 16;

    #[test]
    fn test_positive_blocks_floor_to_chunk() {
        assert_eq!(block_to_chunk(0, SIZE), 0);
        assert_eq!(block_to_chunk(15, SIZE), 0);
        assert_eq!(block_to_chunk(16, SIZE), 1);
        assert_eq!(block_to_chunk(31, SIZE), 1);
        assert_eq!(block_to_chunk(100, SIZE), 6);
        assert_eq!(block_to_chunk(200, SIZE), 12);
    }

    #[test]
    fn test_negative_blocks_floor_not_truncate() {
        // Truncating division would map -1..=-15 into chunk 0, producing
        // a nonexistent 31-block chunk around the origin.
        assert_eq!(block_to_chunk(-1, SIZE), -1);
        assert_eq!(block_to_chunk(-15, SIZE), -1);
        assert_eq!(block_to_chunk(-16, SIZE), -1);
        assert_eq!(block_to_chunk(-17, SIZE), -2);
        assert_eq!(block_to_chunk(-100, SIZE), -7);
    }

    #[test]
    fn test_containing_chunk_combines_both_axes() {
        let chunk = ChunkCoord::containing(100, 200, SIZE);
        assert_eq!(chunk, ChunkCoord::new(6, 12));

        let chunk = ChunkCoord::containing(-1, 16, SIZE);
        assert_eq!(chunk, ChunkCoord::new(-1, 1));
    }

    #[test]
    fn test_block_pos_reports_its_chunk() {
        let pos = BlockPos::new(100, -59, 200);
        assert_eq!(pos.chunk(SIZE), ChunkCoord::new(6, 12));
    }

    #[test]
    fn test_chunk_min_block_is_inclusive_corner() {
        assert_eq!(ChunkCoord::new(6, 12).min_block(SIZE), (96, 192));
        assert_eq!(ChunkCoord::new(-1, -1).min_block(SIZE), (-16, -16));
    }

    #[test]
    fn test_chunk_contains_its_own_columns() {
        let chunk = ChunkCoord::new(-1, 0);
        assert!(chunk.contains_column(-16, 0, SIZE));
        assert!(chunk.contains_column(-1, 15, SIZE));
        assert!(!chunk.contains_column(0, 0, SIZE));
        assert!(!chunk.contains_column(-17, 0, SIZE));
    }

    #[test]
    fn test_area_radius_zero_is_single_chunk() {
        let area = chunks_covering(100, 200, 0, SIZE);
        let chunks: Vec<_> = area.iter().collect();
        assert_eq!(chunks, vec![ChunkCoord::new(6, 12)]);
        assert_eq!(area.chunk_count(), 1);
    }

    #[test]
    fn test_area_radius_one_covers_nine_chunks() {
        let area = chunks_covering(100, 200, 1, SIZE);
        assert_eq!(area.chunk_count(), 9);
        assert_eq!(area.iter().count(), 9);
    }

    #[test]
    fn test_area_enumeration_order_x_outer_z_inner() {
        let area = ChunkCoord::new(6, 12).area(1);
        let chunks: Vec<_> = area.iter().collect();

        assert_eq!(
            chunks,
            vec![
                ChunkCoord::new(5, 11),
                ChunkCoord::new(5, 12),
                ChunkCoord::new(5, 13),
                ChunkCoord::new(6, 11),
                ChunkCoord::new(6, 12),
                ChunkCoord::new(6, 13),
                ChunkCoord::new(7, 11),
                ChunkCoord::new(7, 12),
                ChunkCoord::new(7, 13),
            ]
        );
    }

    #[test]
    fn test_area_contains_matches_chebyshev_distance() {
        let area = ChunkCoord::new(0, 0).area(2);
        assert!(area.contains(ChunkCoord::new(0, 0)));
        assert!(area.contains(ChunkCoord::new(2, -2)));
        assert!(area.contains(ChunkCoord::new(-2, 1)));
        assert!(!area.contains(ChunkCoord::new(3, 0)));
        assert!(!area.contains(ChunkCoord::new(0, -3)));
    }

    #[test]
    fn test_area_iterator_reports_exact_len() {
        let mut iter = ChunkCoord::new(4, -4).area(2).iter();
        assert_eq!(iter.len(), 25);

        iter.next();
        iter.next();
        assert_eq!(iter.len(), 23);

        for _ in iter.by_ref() {}
        assert_eq!(iter.len(), 0);
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_area_iterator_no_duplicates() {
        let area = ChunkCoord::new(-3, 7).area(3);
        let mut seen = std::collections::HashSet::new();

        for chunk in area.iter() {
            assert!(seen.insert(chunk), "Duplicate chunk at {chunk}");
        }

        assert_eq!(seen.len(), 49);
    }

    // Property-based tests using proptest
    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_chunk_always_covers_its_block(block in -1_000_000i32..1_000_000) {
                let chunk = block_to_chunk(block, SIZE);
                let min = chunk * SIZE;

                prop_assert!(
                    min <= block && block < min + SIZE,
                    "Block {} not covered by chunk {} ({}..{})",
                    block, chunk, min, min + SIZE
                );
            }

            #[test]
            fn test_containing_is_per_axis(
                x in -1_000_000i32..1_000_000,
                z in -1_000_000i32..1_000_000
            ) {
                let chunk = ChunkCoord::containing(x, z, SIZE);
                prop_assert_eq!(chunk.x, block_to_chunk(x, SIZE));
                prop_assert_eq!(chunk.z, block_to_chunk(z, SIZE));
            }

            #[test]
            fn test_area_yields_square_count(
                cx in -10_000i32..10_000,
                cz in -10_000i32..10_000,
                radius in 0u32..=8
            ) {
                let area = ChunkCoord::new(cx, cz).area(radius);
                let expected = (2 * radius as usize + 1).pow(2);

                prop_assert_eq!(area.iter().count(), expected);
                prop_assert_eq!(area.chunk_count(), expected);
            }

            #[test]
            fn test_area_members_within_radius(
                cx in -10_000i32..10_000,
                cz in -10_000i32..10_000,
                radius in 0u32..=8
            ) {
                let center = ChunkCoord::new(cx, cz);
                let area = center.area(radius);

                for chunk in area.iter() {
                    prop_assert!(area.contains(chunk));
                    prop_assert!((chunk.x - cx).unsigned_abs() <= radius);
                    prop_assert!((chunk.z - cz).unsigned_abs() <= radius);
                }
            }

            #[test]
            fn test_area_order_strictly_ascending(
                cx in -10_000i32..10_000,
                cz in -10_000i32..10_000,
                radius in 0u32..=8
            ) {
                let area = ChunkCoord::new(cx, cz).area(radius);
                let chunks: Vec<_> = area.iter().collect();

                for pair in chunks.windows(2) {
                    prop_assert!(
                        (pair[0].x, pair[0].z) < (pair[1].x, pair[1].z),
                        "Enumeration not ascending: {} before {}",
                        pair[0], pair[1]
                    );
                }
            }
        }
    }
}
