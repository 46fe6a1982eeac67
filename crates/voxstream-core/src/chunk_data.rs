use std::collections::BTreeMap;

use crate::constants::CELLS_PER_CHUNK;
use crate::math::{linear_index, local_from_index};
use crate::types::{BlockId, ChunkKey, LocalCoord};

/// Dense block grid for one chunk plus the sparse set of cells that differ
/// from the generated baseline.
///
/// Every entry in `modified` mirrors the grid value at the same index; the
/// only writers that touch `modified` are [`ChunkData::set`] and
/// [`ChunkData::set_index`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkData {
    key: ChunkKey,
    blocks: Box<[BlockId]>,
    modified: BTreeMap<usize, BlockId>,
}

impl ChunkData {
    /// An all-air chunk with no modifications.
    pub fn new(key: ChunkKey) -> Self {
        Self {
            key,
            blocks: vec![BlockId::Air; CELLS_PER_CHUNK].into_boxed_slice(),
            modified: BTreeMap::new(),
        }
    }

    pub fn key(&self) -> ChunkKey {
        self.key
    }

    /// Block at a local cell, or `None` when out of bounds.
    pub fn get(&self, local: LocalCoord) -> Option<BlockId> {
        linear_index(local).map(|i| self.blocks[i])
    }

    pub fn block_at_index(&self, index: usize) -> Option<BlockId> {
        self.blocks.get(index).copied()
    }

    /// Edit a cell and record it as modified. Returns false when out of bounds.
    pub fn set(&mut self, local: LocalCoord, block: BlockId) -> bool {
        match linear_index(local) {
            Some(index) => self.set_index(index, block),
            None => false,
        }
    }

    /// Edit a cell by linear index and record it as modified.
    pub fn set_index(&mut self, index: usize, block: BlockId) -> bool {
        match self.blocks.get_mut(index) {
            Some(cell) => {
                *cell = block;
                self.modified.insert(index, block);
                true
            }
            None => false,
        }
    }

    /// Baseline write used by generators. Not recorded as a modification,
    /// and a no-op on cells that already carry one, so edits always win.
    /// Returns whether the grid was written.
    pub fn set_baseline(&mut self, local: LocalCoord, block: BlockId) -> bool {
        match linear_index(local) {
            Some(index) if !self.modified.contains_key(&index) => {
                self.blocks[index] = block;
                true
            }
            _ => false,
        }
    }

    /// Modified cells in ascending index order.
    pub fn modified_blocks(&self) -> impl Iterator<Item = (usize, BlockId)> + '_ {
        self.modified.iter().map(|(&i, &b)| (i, b))
    }

    /// Modified cells resolved to local coordinates.
    pub fn modified_cells(&self) -> impl Iterator<Item = (LocalCoord, BlockId)> + '_ {
        self.modified
            .iter()
            .filter_map(|(&i, &b)| local_from_index(i).map(|local| (local, b)))
    }

    pub fn modified_count(&self) -> usize {
        self.modified.len()
    }

    pub fn has_modifications(&self) -> bool {
        !self.modified.is_empty()
    }

    pub fn blocks(&self) -> &[BlockId] {
        &self.blocks
    }

    pub fn solid_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_solid()).count()
    }
}
