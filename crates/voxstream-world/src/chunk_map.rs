use crate::chunk::ChunkRecord;
use std::collections::HashMap;
use voxstream_core::{ChunkData, ChunkKey};

/// Authoritative map of loaded chunks. Only the main loop touches it.
#[derive(Debug, Default)]
pub struct ChunkCache {
    chunks: HashMap<ChunkKey, ChunkRecord>,
}

impl ChunkCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &ChunkKey) -> Option<&ChunkRecord> {
        self.chunks.get(key)
    }

    pub fn get_mut(&mut self, key: &ChunkKey) -> Option<&mut ChunkRecord> {
        self.chunks.get_mut(key)
    }

    pub fn contains(&self, key: &ChunkKey) -> bool {
        self.chunks.contains_key(key)
    }

    /// Existing record for `key`, or a new one built from `data`.
    /// `data` is only invoked when the record is missing.
    pub fn get_or_insert_with(
        &mut self,
        key: ChunkKey,
        data: impl FnOnce() -> ChunkData,
    ) -> &mut ChunkRecord {
        self.chunks
            .entry(key)
            .or_insert_with(|| ChunkRecord::new(data()))
    }

    pub fn insert(&mut self, key: ChunkKey, record: ChunkRecord) -> Option<ChunkRecord> {
        self.chunks.insert(key, record)
    }

    pub fn remove(&mut self, key: &ChunkKey) -> Option<ChunkRecord> {
        self.chunks.remove(key)
    }

    /// Keys of loaded chunks, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = ChunkKey> + '_ {
        self.chunks.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ChunkKey, &ChunkRecord)> {
        self.chunks.iter()
    }

    /// Remove and yield every record.
    pub fn drain(&mut self) -> impl Iterator<Item = (ChunkKey, ChunkRecord)> + '_ {
        self.chunks.drain()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Number of loaded chunks carrying edits.
    pub fn modified_count(&self) -> usize {
        self.chunks
            .values()
            .filter(|r| r.data.has_modifications())
            .count()
    }
}
