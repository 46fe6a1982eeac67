use crate::error::PersistError;

/// Magic identifying a chunk delta file ('VCD1'), stored little-endian.
pub const MAGIC: u32 = 0x4443_5631;

/// Current delta format version. Must match exactly on load.
pub const FORMAT_VERSION: u16 = 1;

/// Header: magic (4) + version (2) + entry count (4).
pub const HEADER_SIZE: usize = 10;

/// Entry: signed linear cell index (4) + block id (1).
pub const ENTRY_SIZE: usize = 5;

/// File extension for delta files.
pub const FILE_EXTENSION: &str = "vcd";

/// Fixed-size delta file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeltaHeader {
    pub magic: u32,
    pub version: u16,
    pub count: u32,
}

impl DeltaHeader {
    pub fn new(count: u32) -> Self {
        Self {
            magic: MAGIC,
            version: FORMAT_VERSION,
            count,
        }
    }

    /// Read the header fields without validating them.
    pub fn parse(bytes: &[u8]) -> Result<Self, PersistError> {
        match bytes {
            [m0, m1, m2, m3, v0, v1, c0, c1, c2, c3, ..] => Ok(Self {
                magic: u32::from_le_bytes([*m0, *m1, *m2, *m3]),
                version: u16::from_le_bytes([*v0, *v1]),
                count: u32::from_le_bytes([*c0, *c1, *c2, *c3]),
            }),
            _ => Err(PersistError::FileTooSmall(bytes.len(), HEADER_SIZE)),
        }
    }

    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.magic.to_le_bytes());
        out.extend_from_slice(&self.version.to_le_bytes());
        out.extend_from_slice(&self.count.to_le_bytes());
    }
}

/// One modified cell as stored on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeltaEntry {
    pub index: i32,
    pub block: u8,
}

impl DeltaEntry {
    pub fn parse(bytes: &[u8; ENTRY_SIZE]) -> Self {
        let [i0, i1, i2, i3, block] = *bytes;
        Self {
            index: i32::from_le_bytes([i0, i1, i2, i3]),
            block,
        }
    }

    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.index.to_le_bytes());
        out.push(self.block);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_layout() {
        let mut out = Vec::new();
        DeltaHeader::new(2).write_to(&mut out);
        assert_eq!(out.len(), HEADER_SIZE);
        assert_eq!(&out[0..4], &[0x31, 0x56, 0x43, 0x44]);
        assert_eq!(&out[4..6], &[1, 0]);
        assert_eq!(&out[6..10], &[2, 0, 0, 0]);
        assert_eq!(DeltaHeader::parse(&out).expect("parse"), DeltaHeader::new(2));
    }

    #[test]
    fn test_header_too_short() {
        let result = DeltaHeader::parse(&[0u8; 9]);
        assert!(matches!(result, Err(PersistError::FileTooSmall(9, 10))));
    }

    #[test]
    fn test_entry_layout() {
        let mut out = Vec::new();
        DeltaEntry { index: -2, block: 4 }.write_to(&mut out);
        assert_eq!(out, vec![0xFE, 0xFF, 0xFF, 0xFF, 4]);
        let bytes: [u8; ENTRY_SIZE] = [0xFE, 0xFF, 0xFF, 0xFF, 4];
        assert_eq!(DeltaEntry::parse(&bytes), DeltaEntry { index: -2, block: 4 });
    }
}
