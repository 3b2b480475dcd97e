//! # Configuration Management
//!
//! Centralized configuration for the packet codec.
//!
//! This module holds the wire-format constants and a small serde-backed
//! configuration structure for building serializers from TOML files, for
//! deployments that want producer and consumer settings kept in config
//! rather than code.
//!
//! ## Configuration Sources
//! - TOML files via `from_file()`
//! - TOML strings via `from_toml()`
//! - Direct instantiation with defaults

use crate::error::{PacketError, Result};
use crate::utils::compression::CompressionKind;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current packet format version, written at offset 0 of every packet.
pub const PROTOCOL_VERSION: u8 = 3;

/// Default minimum payload size (bytes) before compression is applied.
pub const DEFAULT_COMPRESSION_THRESHOLD: usize = 1024;

/// Maximum output size accepted from the built-in decompressors (16 MB).
/// Caps decompression bombs before they can allocate.
pub const MAX_DECOMPRESSED_SIZE: usize = 16 * 1024 * 1024;

/// Serializer settings in a serde-friendly shape.
///
/// `CodecConfig` names a built-in compression kind rather than holding the
/// strategy callables directly, so it can round-trip through TOML. Convert
/// it with [`crate::PacketSerializer::from_config`].
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CodecConfig {
    /// Whether packets carry a CRC32 of their payload bytes.
    pub use_crc32: bool,

    /// Built-in compression kind, or `None` to disable compression.
    #[serde(default)]
    pub compression: Option<CompressionKind>,

    /// Minimum payload size (bytes) before compression is applied.
    /// Payloads smaller than this threshold bypass compression to reduce overhead.
    #[serde(default = "default_threshold")]
    pub compression_threshold_bytes: usize,
}

fn default_threshold() -> usize {
    DEFAULT_COMPRESSION_THRESHOLD
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            use_crc32: false,
            compression: None,
            compression_threshold_bytes: DEFAULT_COMPRESSION_THRESHOLD,
        }
    }
}

impl CodecConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| PacketError::ConfigError(format!("Failed to read config file: {e}")))?;
        Self::from_toml(&contents)
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| PacketError::ConfigError(format!("Failed to parse TOML: {e}")))
    }

    /// Generate example configuration file content
    pub fn example_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|_| String::from("# Failed to generate example config"))
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| PacketError::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)
            .map_err(|e| PacketError::ConfigError(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// Validate the configuration for common issues and misconfigurations
    ///
    /// Returns a list of validation errors. Empty list means configuration is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        // A threshold without a strategy is inert, not wrong; only the
        // reverse misconfiguration is flagged.
        if self.compression.is_some()
            && self.compression_threshold_bytes > MAX_DECOMPRESSED_SIZE
        {
            errors.push(format!(
                "Compression threshold too large: {} bytes (maximum useful: {} bytes)",
                self.compression_threshold_bytes, MAX_DECOMPRESSED_SIZE
            ));
        }

        errors
    }

    /// Validate and return Result - convenience method
    pub fn validate_strict(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(PacketError::ConfigError(format!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}
