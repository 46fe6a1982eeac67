//! Single source of truth for chunk layout constants.
//! Chunk extents are fixed at compile time; `WorldConfig::chunk_extent`
//! is checked against these values rather than changing them.

/// Chunk width along chunk-space X, in cells.
pub const CHUNK_SIZE_X: u32 = 16;

/// Chunk height (vertical axis), in cells. There is no vertical chunking.
pub const CHUNK_SIZE_Y: u32 = 64;

/// Chunk depth along chunk-space Z, in cells.
pub const CHUNK_SIZE_Z: u32 = 16;

/// Total cells per chunk.
pub const CELLS_PER_CHUNK: usize = (CHUNK_SIZE_X * CHUNK_SIZE_Y * CHUNK_SIZE_Z) as usize;

/// Default edge length of one block in world units.
pub const DEFAULT_BLOCK_SIZE: f32 = 100.0;

/// Completed build results consumed per tick when not configured otherwise.
pub const DEFAULT_MAX_DRAIN_PER_TICK: usize = 4;

/// Minimum nudge applied to edit hit points, in world units.
pub const MIN_EDIT_EPSILON: f32 = 1.0;

/// Edit nudge as a fraction of the block size.
pub const EDIT_EPSILON_FRACTION: f32 = 0.01;
