/// Errors that can occur while encoding, decoding or storing chunk deltas.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("invalid magic 0x{0:08x} (expected VCD1)")]
    InvalidMagic(u32),

    #[error("unsupported delta format version {0}")]
    UnsupportedVersion(u16),

    #[error("file too small ({0} bytes, minimum {1})")]
    FileTooSmall(usize, usize),

    #[error("truncated file: expected {expected} bytes, got {actual}")]
    TruncatedFile { expected: usize, actual: usize },

    #[error("cell index {0} outside chunk")]
    IndexOutOfRange(i32),

    #[error("unknown block id {id} at cell index {index}")]
    UnknownBlock { index: i32, id: u8 },

    #[error("delta entry count {0} does not fit the format")]
    TooManyEntries(usize),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
