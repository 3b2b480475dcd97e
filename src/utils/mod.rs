//! # Utility Modules
//!
//! Supporting utilities for integrity checking and compression.
//!
//! ## Components
//! - **Checksum**: CRC32 payload tagging and verification
//! - **Compression**: LZ4 and Zstd strategies with size limits and thresholds
//!
//! ## Security
//! - Decompression bomb protection (16MB limit on built-in strategies)

pub mod checksum;
pub mod compression;

pub use compression::{CompressionKind, Compressor};
