use voxstream_core::ChunkData;

use crate::error::PersistError;
use crate::format::{DeltaEntry, DeltaHeader, ENTRY_SIZE, HEADER_SIZE};

/// Serialize a chunk's modified cells into the delta binary format.
///
/// Layout: header (10B) + entries (5B × N), all little-endian.
/// Returns `Ok(None)` when the chunk has no modified cells, so callers
/// never write empty files.
pub fn encode_delta(chunk: &ChunkData) -> Result<Option<Vec<u8>>, PersistError> {
    let count = chunk.modified_count();
    if count == 0 {
        return Ok(None);
    }
    let header_count = u32::try_from(count).map_err(|_| PersistError::TooManyEntries(count))?;

    let mut output = Vec::with_capacity(HEADER_SIZE + count * ENTRY_SIZE);
    DeltaHeader::new(header_count).write_to(&mut output);

    for (index, block) in chunk.modified_blocks() {
        let index = i32::try_from(index).map_err(|_| PersistError::TooManyEntries(index))?;
        DeltaEntry {
            index,
            block: block.as_u8(),
        }
        .write_to(&mut output);
    }

    Ok(Some(output))
}
