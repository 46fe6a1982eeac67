use glam::Vec3;
use voxstream_core::math::{edit_epsilon, world_to_voxel_centered, VoxelAddress};
use voxstream_core::{BlockId, ChunkKey, LocalCoord};

use crate::error::EditError;
use crate::mesher::Mesher;
use crate::presentation::Presentation;
use crate::terrain::Generator;
use crate::VoxelWorld;

impl<G, M, P> VoxelWorld<G, M, P>
where
    G: Generator + 'static,
    M: Mesher + 'static,
    P: Presentation,
{
    /// Set one cell of a loaded chunk and get it rebuilt.
    ///
    /// If a build for the chunk is already in flight, the edit only marks
    /// the record dirty; the drain resubmits once that build lands.
    pub fn place_block(
        &mut self,
        key: ChunkKey,
        local: LocalCoord,
        block: BlockId,
    ) -> Result<(), EditError> {
        let Some(record) = self.cache.get_mut(&key) else {
            self.stats.rejected_edits += 1;
            log::debug!("Edit rejected: chunk {key} not loaded");
            return Err(EditError::ChunkNotLoaded(key));
        };
        if !record.data.set(local, block) {
            self.stats.rejected_edits += 1;
            log::debug!("Edit rejected: cell {local} outside chunk {key}");
            return Err(EditError::OutOfBounds { key, local });
        }
        record.dirty = true;
        self.stats.edits += 1;

        if !self.pipeline.is_pending(key) {
            self.dispatch_build(key);
        }
        Ok(())
    }

    pub fn remove_block(&mut self, key: ChunkKey, local: LocalCoord) -> Result<(), EditError> {
        self.place_block(key, local, BlockId::Air)
    }

    /// Place `block` in the cell in front of a surface hit: the point is
    /// nudged back against `ray_dir` before mapping.
    pub fn place_at_hit(
        &mut self,
        point: Vec3,
        ray_dir: Vec3,
        block: BlockId,
    ) -> Result<VoxelAddress, EditError> {
        let address = self.hit_address(point, ray_dir, -1.0);
        self.place_block(address.key, address.local, block)?;
        Ok(address)
    }

    /// Remove the cell behind a surface hit: the point is nudged along
    /// `ray_dir` into the surface before mapping.
    pub fn remove_at_hit(&mut self, point: Vec3, ray_dir: Vec3) -> Result<VoxelAddress, EditError> {
        let address = self.hit_address(point, ray_dir, 1.0);
        self.remove_block(address.key, address.local)?;
        Ok(address)
    }

    fn hit_address(&self, point: Vec3, ray_dir: Vec3, sign: f32) -> VoxelAddress {
        let block_size = self.config.block_size;
        let nudge = ray_dir.normalize_or_zero() * edit_epsilon(block_size) * sign;
        world_to_voxel_centered(point + nudge, block_size)
    }
}
