use thiserror::Error;

/// Errors raised while loading or validating a [`crate::config::WorldConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config RON: {0}")]
    Parse(String),

    #[error("{field} = {value} is out of range ({min}..={max})")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("block_size must be positive and finite, got {0}")]
    InvalidBlockSize(f32),

    #[error("chunk_extent {actual:?} does not match compiled extent {expected:?}")]
    ChunkExtentMismatch { expected: [u32; 3], actual: [u32; 3] },
}
