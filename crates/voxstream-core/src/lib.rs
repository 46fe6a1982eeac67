pub mod chunk_data;
pub mod config;
pub mod constants;
pub mod error;
pub mod math;
pub mod types;

pub use chunk_data::ChunkData;
pub use config::{WorldConfig, WorldSize};
pub use error::ConfigError;
pub use types::{BlockId, ChunkKey, LocalCoord};
