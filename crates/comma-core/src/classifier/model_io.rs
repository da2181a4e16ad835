//! Binary model persistence.
//!
//! Layout: magic `CMLM`, version byte, 3 reserved bytes, crc32 of the
//! payload (little-endian u32), bincode payload.

use std::fs;
use std::io;
use std::path::Path;

use super::LinearModel;

const MAGIC: &[u8; 4] = b"CMLM";
const VERSION: u8 = 1;
const HEADER_SIZE: usize = 12;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid header (too short)")]
    InvalidHeader,

    #[error("invalid magic bytes (expected CMLM)")]
    InvalidMagic,

    #[error("unsupported version: {0}")]
    UnsupportedVersion(u8),

    #[error("payload checksum mismatch")]
    ChecksumMismatch,

    #[error("serialization error: {0}")]
    Serialize(bincode::Error),

    #[error("deserialization error: {0}")]
    Deserialize(bincode::Error),
}

impl LinearModel {
    pub fn to_bytes(&self) -> Result<Vec<u8>, ModelError> {
        let payload = bincode::serialize(self).map_err(ModelError::Serialize)?;
        let checksum = crc32fast::hash(&payload);

        let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len());
        buf.extend_from_slice(MAGIC);
        buf.push(VERSION);
        buf.extend_from_slice(&[0u8; 3]); // reserved
        buf.extend_from_slice(&checksum.to_le_bytes());
        buf.extend_from_slice(&payload);
        Ok(buf)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, ModelError> {
        if data.len() < 5 {
            return Err(ModelError::InvalidHeader);
        }
        if &data[..4] != MAGIC {
            return Err(ModelError::InvalidMagic);
        }
        if data[4] != VERSION {
            return Err(ModelError::UnsupportedVersion(data[4]));
        }
        if data.len() < HEADER_SIZE {
            return Err(ModelError::InvalidHeader);
        }
        let stored = u32::from_le_bytes(data[8..12].try_into().unwrap());
        let payload = &data[HEADER_SIZE..];
        if crc32fast::hash(payload) != stored {
            return Err(ModelError::ChecksumMismatch);
        }
        bincode::deserialize(payload).map_err(ModelError::Deserialize)
    }

    pub fn save(&self, path: &Path) -> Result<(), ModelError> {
        fs::write(path, self.to_bytes()?)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, ModelError> {
        Self::from_bytes(&fs::read(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentence::Label;

    fn sample_model() -> LinearModel {
        let mut row = [0.0; Label::COUNT];
        row[Label::List.index()] = 1.25;
        LinearModel::from_weights([("w[1]=and", row)], [0.1; Label::COUNT])
    }

    #[test]
    fn test_round_trip() {
        let model = sample_model();
        let bytes = model.to_bytes().unwrap();
        let loaded = LinearModel::from_bytes(&bytes).unwrap();
        assert_eq!(loaded.feature_count(), model.feature_count());
    }

    #[test]
    fn test_save_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("comma.model");
        sample_model().save(&path).unwrap();
        let loaded = LinearModel::load(&path).unwrap();
        assert_eq!(loaded.feature_count(), 1);
    }

    #[test]
    fn test_rejects_bad_magic() {
        let mut bytes = sample_model().to_bytes().unwrap();
        bytes[0] = b'X';
        assert!(matches!(
            LinearModel::from_bytes(&bytes),
            Err(ModelError::InvalidMagic)
        ));
    }

    #[test]
    fn test_rejects_bad_version() {
        let mut bytes = sample_model().to_bytes().unwrap();
        bytes[4] = 99;
        assert!(matches!(
            LinearModel::from_bytes(&bytes),
            Err(ModelError::UnsupportedVersion(99))
        ));
    }

    #[test]
    fn test_rejects_corrupted_payload() {
        let mut bytes = sample_model().to_bytes().unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        assert!(matches!(
            LinearModel::from_bytes(&bytes),
            Err(ModelError::ChecksumMismatch)
        ));
    }

    #[test]
    fn test_rejects_truncated() {
        assert!(matches!(
            LinearModel::from_bytes(b"CM"),
            Err(ModelError::InvalidHeader)
        ));
    }
}
