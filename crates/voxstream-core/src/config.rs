use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{
    CHUNK_SIZE_X, CHUNK_SIZE_Y, CHUNK_SIZE_Z, DEFAULT_BLOCK_SIZE, DEFAULT_MAX_DRAIN_PER_TICK,
};
use crate::error::ConfigError;

/// World-size class. Each class caps the absolute chunk coordinate on
/// both horizontal axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WorldSize {
    #[default]
    Small,
    Medium,
    Large,
}

impl WorldSize {
    pub fn radius_limit(self) -> i32 {
        match self {
            WorldSize::Small => 16,
            WorldSize::Medium => 64,
            WorldSize::Large => 256,
        }
    }
}

/// Streaming world configuration, loaded from RON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Cells per chunk on (X, Y, Z). Must equal the compiled extents.
    pub chunk_extent: [u32; 3],
    /// Edge length of one block in world units.
    pub block_size: f32,
    /// Chebyshev radius of the desired set, in chunks.
    pub render_radius_chunks: i32,
    pub world_size: WorldSize,
    pub world_seed: i32,
    /// Seconds between streaming passes.
    pub update_interval_secs: f32,
    pub max_concurrent_background_tasks: usize,
    /// Completed builds consumed per tick.
    pub max_drain_per_tick: usize,
    /// Build worker threads; 0 picks one per CPU.
    pub worker_threads: usize,
    /// Root directory for delta files.
    pub save_root: PathBuf,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            chunk_extent: [CHUNK_SIZE_X, CHUNK_SIZE_Y, CHUNK_SIZE_Z],
            block_size: DEFAULT_BLOCK_SIZE,
            render_radius_chunks: 6,
            world_size: WorldSize::Small,
            world_seed: 1337,
            update_interval_secs: 0.15,
            max_concurrent_background_tasks: 8,
            max_drain_per_tick: DEFAULT_MAX_DRAIN_PER_TICK,
            worker_threads: 0,
            save_root: PathBuf::from("Saved"),
        }
    }
}

impl WorldConfig {
    pub const RENDER_RADIUS_RANGE: (i32, i32) = (1, 32);
    pub const UPDATE_INTERVAL_RANGE: (f32, f32) = (0.02, 2.0);
    pub const CONCURRENCY_RANGE: (usize, usize) = (1, 64);

    pub fn validate(&self) -> Result<(), ConfigError> {
        let expected = [CHUNK_SIZE_X, CHUNK_SIZE_Y, CHUNK_SIZE_Z];
        if self.chunk_extent != expected {
            return Err(ConfigError::ChunkExtentMismatch {
                expected,
                actual: self.chunk_extent,
            });
        }

        if !(self.block_size.is_finite() && self.block_size > 0.0) {
            return Err(ConfigError::InvalidBlockSize(self.block_size));
        }

        let (lo, hi) = Self::RENDER_RADIUS_RANGE;
        check_range(
            "render_radius_chunks",
            self.render_radius_chunks as f64,
            lo as f64,
            hi as f64,
        )?;

        let (lo, hi) = Self::UPDATE_INTERVAL_RANGE;
        check_range(
            "update_interval_secs",
            self.update_interval_secs as f64,
            lo as f64,
            hi as f64,
        )?;

        let (lo, hi) = Self::CONCURRENCY_RANGE;
        check_range(
            "max_concurrent_background_tasks",
            self.max_concurrent_background_tasks as f64,
            lo as f64,
            hi as f64,
        )?;

        check_range(
            "max_drain_per_tick",
            self.max_drain_per_tick as f64,
            1.0,
            usize::MAX as f64,
        )?;

        Ok(())
    }
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    // NaN fails both comparisons and is rejected.
    if value >= min && value <= max {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

/// Parse and validate a config from RON text.
pub fn load_config_from_str(ron_str: &str) -> Result<WorldConfig, ConfigError> {
    let options = ron::Options::default();
    let config: WorldConfig = options
        .from_str(ron_str)
        .map_err(|e| ConfigError::Parse(e.to_string()))?;
    config.validate()?;
    Ok(config)
}

/// Read, parse and validate a config file.
pub fn load_config(path: &Path) -> Result<WorldConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let config = load_config_from_str(&text)?;
    log::debug!("Loaded world config from {}", path.display());
    Ok(config)
}
