//! Compression strategies for packet payloads.
//!
//! The serializer treats compression as an injected strategy: a pair of
//! `compress`/`decompress` callables bundled in a [`Compressor`]. The
//! built-in [`CompressionKind`]s wrap LZ4 and Zstd with decompression
//! size limits; callers can also supply their own callables.

use crate::config::MAX_DECOMPRESSED_SIZE;
use crate::error::{constants, PacketError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Built-in compression algorithms.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionKind {
    /// LZ4 with size-prefixed framing (fast, moderate ratio).
    Lz4,
    /// Zstd at the fast compression level.
    Zstd,
}

/// Compresses data using the specified compression algorithm
///
/// # Errors
/// Returns `PacketError::CompressionFailure` if compression fails
pub fn compress(data: &[u8], kind: CompressionKind) -> Result<Vec<u8>> {
    match kind {
        CompressionKind::Lz4 => Ok(lz4_flex::compress_prepend_size(data)),
        CompressionKind::Zstd => {
            let mut out = Vec::new();
            zstd::stream::copy_encode(data, &mut out, 1)
                .map_err(|_| PacketError::CompressionFailure)?;
            Ok(out)
        }
    }
}

/// Decompresses data that was compressed with the specified algorithm
///
/// Enforces a maximum output size limit to prevent decompression bombs.
/// The limit is `MAX_DECOMPRESSED_SIZE`.
///
/// # Errors
/// Returns `PacketError::DecompressionFailure` if:
/// - Decompression fails
/// - Output size exceeds `MAX_DECOMPRESSED_SIZE`
pub fn decompress(data: &[u8], kind: CompressionKind) -> Result<Vec<u8>> {
    match kind {
        CompressionKind::Lz4 => {
            // lz4_flex prepends the uncompressed size as a 4-byte
            // little-endian integer. Validate the claim before any
            // allocation happens.
            if data.len() < 4 {
                return Err(PacketError::DecompressionFailure);
            }

            let claimed_size = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;
            if claimed_size > MAX_DECOMPRESSED_SIZE {
                return Err(PacketError::DecompressionFailure);
            }

            let decompressed = lz4_flex::decompress_size_prepended(data)
                .map_err(|_| PacketError::DecompressionFailure)?;

            if decompressed.len() > MAX_DECOMPRESSED_SIZE {
                return Err(PacketError::DecompressionFailure);
            }
            Ok(decompressed)
        }
        CompressionKind::Zstd => {
            let mut out = Vec::new();
            let mut reader = zstd::stream::Decoder::new(data)
                .map_err(|_| PacketError::DecompressionFailure)?;

            // Read in chunks so the size limit holds even for streams
            // that claim nothing up front.
            use std::io::Read;
            let mut buffer = [0u8; 8192];
            loop {
                match reader.read(&mut buffer) {
                    Ok(0) => break,
                    Ok(n) => {
                        out.extend_from_slice(&buffer[..n]);
                        if out.len() > MAX_DECOMPRESSED_SIZE {
                            return Err(PacketError::DecompressionFailure);
                        }
                    }
                    Err(_) => return Err(PacketError::DecompressionFailure),
                }
            }
            Ok(out)
        }
    }
}

/// Boxed compression callable, shared-safe so a serializer holding one can
/// sit behind a mutex.
pub type CompressFn = Box<dyn Fn(&[u8]) -> Result<Vec<u8>> + Send + Sync>;

/// An injected compression strategy: a `compress`/`decompress` pair.
///
/// Construct with [`Compressor::lz4`] or [`Compressor::zstd`] for the
/// built-in algorithms, [`Compressor::new`] for custom callables, or
/// [`Compressor::from_parts`] when the two halves arrive separately and may
/// be incomplete.
pub struct Compressor {
    compress: CompressFn,
    decompress: CompressFn,
}

impl Compressor {
    /// Build a strategy from a complete pair of callables.
    pub fn new(compress: CompressFn, decompress: CompressFn) -> Self {
        Self {
            compress,
            decompress,
        }
    }

    /// Build a strategy from optionally-present halves.
    ///
    /// A strategy with only one half configured would produce packets its
    /// own consumer cannot read, so anything short of a complete pair is
    /// rejected with `InvalidCompressor`.
    pub fn from_parts(compress: Option<CompressFn>, decompress: Option<CompressFn>) -> Result<Self> {
        match (compress, decompress) {
            (Some(compress), Some(decompress)) => Ok(Self {
                compress,
                decompress,
            }),
            _ => Err(PacketError::InvalidCompressor(
                constants::ERR_PARTIAL_COMPRESSOR,
            )),
        }
    }

    /// LZ4 strategy with size-prefixed framing.
    pub fn lz4() -> Self {
        Self::of_kind(CompressionKind::Lz4)
    }

    /// Zstd strategy at the fast compression level.
    pub fn zstd() -> Self {
        Self::of_kind(CompressionKind::Zstd)
    }

    /// Strategy for any built-in kind.
    pub fn of_kind(kind: CompressionKind) -> Self {
        Self {
            compress: Box::new(move |data| compress(data, kind)),
            decompress: Box::new(move |data| decompress(data, kind)),
        }
    }

    /// Run the compress half.
    pub fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        (self.compress)(data)
    }

    /// Run the decompress half.
    pub fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        (self.decompress)(data)
    }
}

impl fmt::Debug for Compressor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Compressor").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_lz4_compression_roundtrip() {
        let original = b"Hello, World! This is a test of LZ4 compression.";
        let compressed = compress(original, CompressionKind::Lz4).unwrap();
        let decompressed = decompress(&compressed, CompressionKind::Lz4).unwrap();
        assert_eq!(original.as_slice(), decompressed.as_slice());
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_zstd_compression_roundtrip() {
        let original = b"Hello, World! This is a test of Zstd compression.";
        let compressed = compress(original, CompressionKind::Zstd).unwrap();
        let decompressed = decompress(&compressed, CompressionKind::Zstd).unwrap();
        assert_eq!(original.as_slice(), decompressed.as_slice());
    }

    #[test]
    fn test_lz4_oversized_claim_rejected() {
        // Claims to decompress to 3+ GB (0xbbbb60ab bytes)
        let malicious_payload = vec![0x2b, 0x60, 0xbb, 0xbb];

        let result = decompress(&malicious_payload, CompressionKind::Lz4);
        assert!(
            result.is_err(),
            "Should reject payload claiming huge output size"
        );
    }

    #[test]
    fn test_lz4_short_input_rejection() {
        let short_input = vec![0x2b, 0x60];
        let result = decompress(&short_input, CompressionKind::Lz4);
        assert!(result.is_err(), "Should reject input shorter than 4 bytes");
    }

    #[test]
    fn test_malformed_compressed_data() {
        // Valid size claim but malformed compressed data
        let malformed = vec![0x10, 0x00, 0x00, 0x00, 0xff, 0xff, 0xff];
        let result = decompress(&malformed, CompressionKind::Lz4);
        assert!(result.is_err(), "Should reject malformed compressed data");
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_strategy_object_roundtrip() {
        let strategy = Compressor::lz4();
        let data = vec![7u8; 4096];
        let compressed = strategy.compress(&data).unwrap();
        assert!(compressed.len() < data.len());
        assert_eq!(strategy.decompress(&compressed).unwrap(), data);
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_from_parts_complete_pair() {
        let strategy = Compressor::from_parts(
            Some(Box::new(|data| compress(data, CompressionKind::Zstd))),
            Some(Box::new(|data| decompress(data, CompressionKind::Zstd))),
        )
        .unwrap();
        let data = b"strategy assembled from parts";
        let roundtrip = strategy.decompress(&strategy.compress(data).unwrap()).unwrap();
        assert_eq!(roundtrip, data);
    }

    #[test]
    fn test_from_parts_rejects_partial_pair() {
        let compress_only = Compressor::from_parts(
            Some(Box::new(|data| compress(data, CompressionKind::Lz4))),
            None,
        );
        assert!(matches!(
            compress_only,
            Err(PacketError::InvalidCompressor(_))
        ));

        let neither = Compressor::from_parts(None, None);
        assert!(matches!(neither, Err(PacketError::InvalidCompressor(_))));
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_kind_serde_names() {
        // Kinds appear as lowercase strings in config files.
        #[derive(serde::Serialize, serde::Deserialize)]
        struct Wrap {
            kind: CompressionKind,
        }
        let wrap: Wrap = toml::from_str("kind = \"zstd\"").unwrap();
        assert_eq!(wrap.kind, CompressionKind::Zstd);
        let rendered = toml::to_string(&Wrap {
            kind: CompressionKind::Lz4,
        })
        .unwrap();
        assert!(rendered.contains("\"lz4\""));
    }
}
