use crate::error::PersistError;
use crate::format::{DeltaHeader, FORMAT_VERSION, MAGIC};

/// Check magic then version. Any mismatch rejects the file.
pub fn validate_header(header: &DeltaHeader) -> Result<(), PersistError> {
    if header.magic != MAGIC {
        return Err(PersistError::InvalidMagic(header.magic));
    }

    if header.version != FORMAT_VERSION {
        return Err(PersistError::UnsupportedVersion(header.version));
    }

    Ok(())
}
