use std::fmt;

use glam::IVec3;
use serde::{Deserialize, Serialize};

/// Chunk position on the horizontal grid. Each unit spans
/// `CHUNK_SIZE_X` (resp. `CHUNK_SIZE_Z`) cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ChunkKey {
    pub x: i32,
    pub z: i32,
}

impl ChunkKey {
    pub const ZERO: ChunkKey = ChunkKey { x: 0, z: 0 };

    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Manhattan distance on the chunk grid, used for build ordering.
    pub fn manhattan_distance(self, other: ChunkKey) -> u64 {
        self.x.abs_diff(other.x) as u64 + self.z.abs_diff(other.z) as u64
    }

    /// Chebyshev distance on the chunk grid (square rings).
    pub fn chebyshev_distance(self, other: ChunkKey) -> u32 {
        self.x.abs_diff(other.x).max(self.z.abs_diff(other.z))
    }
}

impl fmt::Display for ChunkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// Cell coordinate inside a chunk: `x` and `z` are horizontal, `y` is vertical.
pub type LocalCoord = IVec3;

/// Block identifiers. Persisted as a single byte; 0 = air.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum BlockId {
    #[default]
    Air = 0,
    Dirt = 1,
    Grass = 2,
    Stone = 3,
    Sand = 4,
    Water = 5,
}

impl BlockId {
    pub const ALL: [BlockId; 6] = [
        BlockId::Air,
        BlockId::Dirt,
        BlockId::Grass,
        BlockId::Stone,
        BlockId::Sand,
        BlockId::Water,
    ];

    /// Whether the block occludes neighbors and produces geometry.
    pub fn is_solid(self) -> bool {
        !matches!(self, BlockId::Air | BlockId::Water)
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for BlockId {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        BlockId::ALL
            .get(value as usize)
            .copied()
            .ok_or(value)
    }
}
