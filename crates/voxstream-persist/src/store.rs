use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use voxstream_core::{ChunkData, ChunkKey};

use crate::error::PersistError;
use crate::format::FILE_EXTENSION;
use crate::load::{apply_delta, decode_delta};
use crate::save::encode_delta;

/// Per-chunk delta files under `<root>/Voxel/Seed_<seed>/Chunks/`.
#[derive(Debug, Clone)]
pub struct DeltaStore {
    root: PathBuf,
}

impl DeltaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding every delta file for one seed.
    pub fn chunk_dir(&self, seed: i32) -> PathBuf {
        self.root
            .join("Voxel")
            .join(format!("Seed_{seed}"))
            .join("Chunks")
    }

    pub fn chunk_path(&self, seed: i32, key: ChunkKey) -> PathBuf {
        self.chunk_dir(seed)
            .join(format!("{}_{}.{FILE_EXTENSION}", key.x, key.z))
    }

    /// Write the chunk's modified cells. `Ok(false)` means there was nothing
    /// to write and no file was touched.
    pub fn save(&self, seed: i32, chunk: &ChunkData) -> Result<bool, PersistError> {
        let Some(bytes) = encode_delta(chunk)? else {
            return Ok(false);
        };

        let path = self.chunk_path(seed, chunk.key());
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        // Readers only ever see a complete file.
        let tmp = path.with_extension(format!("{FILE_EXTENSION}.tmp"));
        fs::write(&tmp, &bytes)?;
        fs::rename(&tmp, &path)?;

        log::debug!(
            "Saved {} modified cells for chunk {} to {}",
            chunk.modified_count(),
            chunk.key(),
            path.display()
        );
        Ok(true)
    }

    /// Overlay the persisted delta for `chunk.key()` onto `chunk`.
    ///
    /// Returns false ("no delta") when the file is missing, unreadable or
    /// malformed; in that case `chunk` is left untouched.
    pub fn load_into(&self, seed: i32, chunk: &mut ChunkData) -> bool {
        let path = self.chunk_path(seed, chunk.key());
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return false,
            Err(e) => {
                log::warn!("Failed to read delta {}: {e}", path.display());
                return false;
            }
        };

        match decode_delta(&bytes) {
            Ok(cells) => {
                apply_delta(chunk, &cells);
                log::debug!(
                    "Applied {} delta cells to chunk {}",
                    cells.len(),
                    chunk.key()
                );
                true
            }
            Err(e) => {
                log::warn!("Rejected delta {}: {e}", path.display());
                false
            }
        }
    }

    /// Whether a delta file exists for the key.
    pub fn has_delta(&self, seed: i32, key: ChunkKey) -> bool {
        self.chunk_path(seed, key).is_file()
    }
}
