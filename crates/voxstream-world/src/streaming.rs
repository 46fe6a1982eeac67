use std::collections::HashSet;

use voxstream_core::{ChunkKey, WorldConfig, WorldSize};

/// Policy for which chunks should be loaded around a tracked point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamingPolicy {
    /// Chebyshev radius of the desired square, in chunks.
    pub render_radius: i32,
    /// Largest absolute chunk coordinate that exists on either axis.
    pub radius_limit: i32,
}

impl StreamingPolicy {
    pub fn new(render_radius: i32, world_size: WorldSize) -> Self {
        Self {
            render_radius: render_radius.max(0),
            radius_limit: world_size.radius_limit(),
        }
    }

    pub fn from_config(config: &WorldConfig) -> Self {
        Self::new(config.render_radius_chunks, config.world_size)
    }

    /// Whether `key` lies inside the world; keys outside are never loaded.
    pub fn in_world_limit(&self, key: ChunkKey) -> bool {
        key.x.unsigned_abs() <= self.radius_limit as u32
            && key.z.unsigned_abs() <= self.radius_limit as u32
    }

    /// Desired keys around `center`, nearest first by Manhattan distance.
    /// Ties keep row-major (x, then z) order.
    pub fn desired_ordered(&self, center: ChunkKey) -> Vec<ChunkKey> {
        let r = self.render_radius as i64;
        let side = (2 * r + 1) as usize;
        let mut keys = Vec::with_capacity(side * side);

        for dx in -r..=r {
            for dz in -r..=r {
                let (Ok(x), Ok(z)) = (
                    i32::try_from(center.x as i64 + dx),
                    i32::try_from(center.z as i64 + dz),
                ) else {
                    continue;
                };
                let key = ChunkKey::new(x, z);
                if self.in_world_limit(key) {
                    keys.push(key);
                }
            }
        }

        // Stable sort: equal distances keep generation order.
        keys.sort_by_key(|k| k.manhattan_distance(center));
        keys
    }

    pub fn desired_set(&self, center: ChunkKey) -> HashSet<ChunkKey> {
        self.desired_ordered(center).into_iter().collect()
    }
}
