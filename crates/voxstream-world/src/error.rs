use glam::IVec3;
use thiserror::Error;
use voxstream_core::{ChunkKey, ConfigError};

/// Why an edit was refused. `Display` is the status line shown to users.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("chunk {0} is not loaded")]
    ChunkNotLoaded(ChunkKey),

    #[error("cell {local} is outside chunk {key}")]
    OutOfBounds { key: ChunkKey, local: IVec3 },
}

/// Errors that can occur while constructing a world.
#[derive(Debug, Error)]
pub enum WorldError {
    #[error("invalid world config: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
