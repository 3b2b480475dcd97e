//! CRC32 checksum utilities for payload integrity verification.

use crate::error::{PacketError, Result};
use crc32fast::Hasher;

/// Computes the CRC32 checksum of the given bytes.
pub fn crc32(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Verifies payload bytes against a checksum stored in a packet header.
/// Returns `Crc32Mismatch` carrying both values if they disagree.
pub fn verify_crc32(data: &[u8], stored: u32) -> Result<()> {
    let computed = crc32(data);
    if computed != stored {
        return Err(PacketError::Crc32Mismatch { stored, computed });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crc32_is_deterministic() {
        let data = b"Hello, world!";
        assert_eq!(crc32(data), crc32(data));
    }

    #[test]
    fn test_crc32_known_value() {
        // IEEE CRC32 of "123456789"
        assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn test_verify_accepts_matching_checksum() {
        let data = b"payload bytes";
        assert!(verify_crc32(data, crc32(data)).is_ok());
    }

    #[test]
    fn test_verify_rejects_corruption() {
        let data = b"payload bytes";
        let stored = crc32(data);
        let mut corrupted = data.to_vec();
        corrupted[0] ^= 0xFF;

        let err = verify_crc32(&corrupted, stored).unwrap_err();
        assert!(matches!(err, PacketError::Crc32Mismatch { .. }));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(crc32(b""), 0);
        assert!(verify_crc32(b"", 0).is_ok());
    }
}
