use crate::constants::{
    CELLS_PER_CHUNK, CHUNK_SIZE_X, CHUNK_SIZE_Y, CHUNK_SIZE_Z, EDIT_EPSILON_FRACTION,
    MIN_EDIT_EPSILON,
};
use crate::types::{ChunkKey, LocalCoord};
use glam::{IVec3, Vec3};

// World space is Z-up: world X -> voxel X, world Y -> voxel Z (horizontal),
// world Z -> voxel Y (vertical, never chunked).

/// A single cell resolved from a world-space position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoxelAddress {
    pub key: ChunkKey,
    pub local: LocalCoord,
}

/// Floor mapping: the cell whose volume contains `world`.
pub fn world_to_voxel(world: Vec3, block_size: f32) -> VoxelAddress {
    address_from_global(world, block_size, 0.0)
}

/// Centered mapping: like [`world_to_voxel`] but rounds each axis to the
/// nearest cell, so a point sitting on a face boundary resolves predictably
/// once nudged off the surface.
pub fn world_to_voxel_centered(world: Vec3, block_size: f32) -> VoxelAddress {
    address_from_global(world, block_size, 0.5)
}

fn address_from_global(world: Vec3, block_size: f32, bias: f64) -> VoxelAddress {
    let bs = block_size as f64;
    let gx = floor_to_i32(world.x as f64 / bs + bias);
    let gz = floor_to_i32(world.y as f64 / bs + bias);
    let gy = floor_to_i32(world.z as f64 / bs + bias);

    let sx = CHUNK_SIZE_X as i32;
    let sz = CHUNK_SIZE_Z as i32;
    let key = ChunkKey::new(gx.div_euclid(sx), gz.div_euclid(sz));
    let local = IVec3::new(
        gx.rem_euclid(sx).clamp(0, sx - 1),
        gy.clamp(0, CHUNK_SIZE_Y as i32 - 1),
        gz.rem_euclid(sz).clamp(0, sz - 1),
    );
    VoxelAddress { key, local }
}

/// Saturating floor; NaN maps to 0.
fn floor_to_i32(v: f64) -> i32 {
    v.floor() as i32
}

/// Chunk containing a world point, without resolving the cell.
pub fn world_to_chunk_xz(world: Vec3, block_size: f32) -> ChunkKey {
    let bs = block_size as f64;
    let extent_x = CHUNK_SIZE_X as f64 * bs;
    let extent_z = CHUNK_SIZE_Z as f64 * bs;
    ChunkKey::new(
        floor_to_i32(world.x as f64 / extent_x),
        floor_to_i32(world.y as f64 / extent_z),
    )
}

/// World-space origin of a chunk (minimum corner, zero height).
pub fn chunk_origin(key: ChunkKey, block_size: f32) -> Vec3 {
    let bs = block_size as f64;
    Vec3::new(
        (key.x as f64 * CHUNK_SIZE_X as f64 * bs) as f32,
        (key.z as f64 * CHUNK_SIZE_Z as f64 * bs) as f32,
        0.0,
    )
}

/// World-space minimum corner of a cell.
pub fn local_to_world(key: ChunkKey, local: LocalCoord, block_size: f32) -> Vec3 {
    let bs = block_size as f64;
    let gx = key.x as f64 * CHUNK_SIZE_X as f64 + local.x as f64;
    let gz = key.z as f64 * CHUNK_SIZE_Z as f64 + local.z as f64;
    Vec3::new(
        (gx * bs) as f32,
        (gz * bs) as f32,
        (local.y as f64 * bs) as f32,
    )
}

/// World-space center of a cell.
pub fn cell_center(key: ChunkKey, local: LocalCoord, block_size: f32) -> Vec3 {
    local_to_world(key, local, block_size) + Vec3::splat(block_size * 0.5)
}

pub fn in_chunk_bounds(local: LocalCoord) -> bool {
    local.x >= 0
        && local.x < CHUNK_SIZE_X as i32
        && local.y >= 0
        && local.y < CHUNK_SIZE_Y as i32
        && local.z >= 0
        && local.z < CHUNK_SIZE_Z as i32
}

/// Linear cell index: X fastest, then Z, then Y.
pub fn linear_index(local: LocalCoord) -> Option<usize> {
    if !in_chunk_bounds(local) {
        return None;
    }
    let sx = CHUNK_SIZE_X as usize;
    let sz = CHUNK_SIZE_Z as usize;
    Some(local.x as usize + sx * (local.z as usize + sz * local.y as usize))
}

/// Inverse of [`linear_index`].
pub fn local_from_index(index: usize) -> Option<LocalCoord> {
    if index >= CELLS_PER_CHUNK {
        return None;
    }
    let sx = CHUNK_SIZE_X as usize;
    let sz = CHUNK_SIZE_Z as usize;
    Some(IVec3::new(
        (index % sx) as i32,
        (index / (sx * sz)) as i32,
        ((index / sx) % sz) as i32,
    ))
}

/// Distance an edit hit point is nudged off the surface.
pub fn edit_epsilon(block_size: f32) -> f32 {
    (block_size * EDIT_EPSILON_FRACTION).max(MIN_EDIT_EPSILON)
}
