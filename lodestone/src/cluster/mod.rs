//! Deposit clustering over sampled ore blocks.
//!
//! Generators report individual ore blocks; players care about veins. This
//! module groups face-adjacent blocks of the same ore kind into
//! [`OreDeposit`]s using a union-find over the sampled positions.
//!
//! # Overview
//!
//! Two blocks belong to the same deposit when they share an ore kind and a
//! chain of face adjacencies (6-connectivity; diagonal contact does not
//! merge). Grouping is deterministic: deposits are emitted in the order
//! their first member appeared in the input, and that first member is the
//! deposit's anchor coordinate.
//!
//! # Example
//!
//! ```
//! use lodestone::cluster::cluster_deposits;
//! use lodestone::coord::BlockPos;
//! use lodestone::generator::BlockSample;
//! use lodestone::profile::OreKind;
//!
//! let samples = vec![
//!     BlockSample { pos: BlockPos::new(0, 12, 0), kind: OreKind::Diamond },
//!     BlockSample { pos: BlockPos::new(0, 13, 0), kind: OreKind::Diamond },
//!     BlockSample { pos: BlockPos::new(9, 40, 9), kind: OreKind::Gold },
//! ];
//!
//! let deposits = cluster_deposits(&samples);
//! assert_eq!(deposits.len(), 2);
//! assert_eq!(deposits[0].count, 2);
//! assert_eq!(deposits[0].anchor, BlockPos::new(0, 12, 0));
//! ```

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::coord::BlockPos;
use crate::generator::BlockSample;
use crate::profile::OreKind;

// ============================================================================
// Deposit
// ============================================================================

/// Upper bound on member coordinates stored per deposit.
///
/// `count` stays exact for larger veins; only the stored list is capped.
pub const MAX_DEPOSIT_BLOCKS: usize = 64;

/// A connected group of same-kind ore blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OreDeposit {
    /// Ore kind shared by every member block.
    pub kind: OreKind,
    /// First member encountered in sample order. Stable across repeated
    /// runs of the same generator output.
    pub anchor: BlockPos,
    /// Exact member count, including blocks beyond the stored cap.
    pub count: u32,
    /// Member coordinates in sample order, at most [`MAX_DEPOSIT_BLOCKS`].
    pub blocks: Vec<BlockPos>,
}

impl OreDeposit {
    fn seed(kind: OreKind, anchor: BlockPos) -> Self {
        Self {
            kind,
            anchor,
            count: 0,
            blocks: Vec::new(),
        }
    }

    fn push(&mut self, pos: BlockPos) {
        self.count += 1;
        if self.blocks.len() < MAX_DEPOSIT_BLOCKS {
            self.blocks.push(pos);
        }
    }

    /// Whether the vein had more members than the stored list holds.
    pub fn is_truncated(&self) -> bool {
        self.count as usize > self.blocks.len()
    }
}

impl fmt::Display for OreDeposit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x{} at {}", self.kind, self.count, self.anchor)
    }
}

// ============================================================================
// Union-find
// ============================================================================

/// Disjoint-set forest with path halving and union by rank.
struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            rank: vec![0; len],
        }
    }

    fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
    }
}

// ============================================================================
// Clustering
// ============================================================================

/// Face-neighbor offsets (6-connectivity).
const FACE_OFFSETS: [(i32, i32, i32); 6] = [
    (1, 0, 0),
    (-1, 0, 0),
    (0, 1, 0),
    (0, -1, 0),
    (0, 0, 1),
    (0, 0, -1),
];

/// Groups samples into deposits of face-connected, same-kind blocks.
///
/// The first report for a position wins; later samples at an occupied
/// position are dropped. Output order follows the input: deposits are
/// sorted by their anchor's position in the sample slice, so a fixed
/// input always yields an identical grouping.
pub fn cluster_deposits(samples: &[BlockSample]) -> Vec<OreDeposit> {
    if samples.is_empty() {
        return Vec::new();
    }

    // Deduplicate by position, keeping input order.
    let mut occupied: HashMap<BlockPos, usize> = HashMap::with_capacity(samples.len());
    let mut retained: Vec<BlockSample> = Vec::with_capacity(samples.len());
    for sample in samples {
        if occupied.contains_key(&sample.pos) {
            continue;
        }
        occupied.insert(sample.pos, retained.len());
        retained.push(*sample);
    }

    let mut sets = UnionFind::new(retained.len());
    for (index, sample) in retained.iter().enumerate() {
        for (dx, dy, dz) in FACE_OFFSETS {
            let neighbor = BlockPos::new(sample.pos.x + dx, sample.pos.y + dy, sample.pos.z + dz);
            if let Some(&other) = occupied.get(&neighbor) {
                if retained[other].kind == sample.kind {
                    sets.union(index, other);
                }
            }
        }
    }

    // Walking in input order makes the first member of each component its
    // anchor and fixes the emission order.
    let mut slot_of_root: HashMap<usize, usize> = HashMap::new();
    let mut deposits: Vec<OreDeposit> = Vec::new();
    for (index, sample) in retained.iter().enumerate() {
        let root = sets.find(index);
        let slot = *slot_of_root.entry(root).or_insert_with(|| {
            deposits.push(OreDeposit::seed(sample.kind, sample.pos));
            deposits.len() - 1
        });
        deposits[slot].push(sample.pos);
    }

    debug!(
        samples = samples.len(),
        unique = retained.len(),
        deposits = deposits.len(),
        "Clustered ore samples"
    );

    deposits
}
