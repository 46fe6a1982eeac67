use voxstream_core::ChunkData;

use crate::presentation::HandleId;

/// Cache entry for one loaded chunk.
#[derive(Debug, Clone)]
pub struct ChunkRecord {
    /// Authoritative block data. Build jobs only ever see clones of it.
    pub data: ChunkData,
    /// Presentation object, absent until the first successful handoff.
    pub handle: Option<HandleId>,
    /// Edits exist that the most recently dispatched snapshot does not include.
    pub dirty: bool,
}

impl ChunkRecord {
    pub fn new(data: ChunkData) -> Self {
        Self {
            data,
            handle: None,
            dirty: false,
        }
    }
}
