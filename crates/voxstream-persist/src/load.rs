use voxstream_core::constants::CELLS_PER_CHUNK;
use voxstream_core::{BlockId, ChunkData};

use crate::compat;
use crate::error::PersistError;
use crate::format::{DeltaEntry, DeltaHeader, ENTRY_SIZE, HEADER_SIZE};

/// Parse and validate a delta file from raw bytes.
///
/// Every entry is checked before anything is returned, so a file with a
/// single bad index or block id is rejected as a whole. Bytes past the
/// last entry are ignored.
pub fn decode_delta(bytes: &[u8]) -> Result<Vec<(usize, BlockId)>, PersistError> {
    let header = DeltaHeader::parse(bytes)?;
    compat::validate_header(&header)?;

    let count = header.count as usize;
    let table_end = count
        .saturating_mul(ENTRY_SIZE)
        .saturating_add(HEADER_SIZE);
    if bytes.len() < table_end {
        return Err(PersistError::TruncatedFile {
            expected: table_end,
            actual: bytes.len(),
        });
    }

    let mut cells = Vec::with_capacity(count);
    for raw in bytes[HEADER_SIZE..table_end].chunks_exact(ENTRY_SIZE) {
        let raw: &[u8; ENTRY_SIZE] = raw.try_into().map_err(|_| PersistError::TruncatedFile {
            expected: table_end,
            actual: bytes.len(),
        })?;
        let entry = DeltaEntry::parse(raw);

        let index = usize::try_from(entry.index)
            .ok()
            .filter(|&i| i < CELLS_PER_CHUNK)
            .ok_or(PersistError::IndexOutOfRange(entry.index))?;
        let block = BlockId::try_from(entry.block).map_err(|id| PersistError::UnknownBlock {
            index: entry.index,
            id,
        })?;

        cells.push((index, block));
    }

    Ok(cells)
}

/// Overlay decoded cells onto a chunk. Each applied cell is recorded as
/// modified, exactly as if it had just been edited.
pub fn apply_delta(chunk: &mut ChunkData, cells: &[(usize, BlockId)]) {
    for &(index, block) in cells {
        chunk.set_index(index, block);
    }
}
