//! # wirepack
//!
//! Schema-aware binary packet serialization with optional compression and
//! CRC32 integrity checking.
//!
//! A [`PacketSerializer`] frames structured values into self-contained
//! binary packets. Payloads are string-keyed maps; when the payload's key
//! set matches a registered schema, field names are elided from the wire
//! and only the values travel, in the schema's canonical sorted order.
//! Compression and integrity checking compose orthogonally through the
//! packet's flag byte.
//!
//! ## Example
//! ```rust
//! use wirepack::{PacketSerializer, SerializerOptions, Value};
//!
//! # fn main() -> wirepack::Result<()> {
//! let mut serializer = PacketSerializer::new(SerializerOptions::new().with_crc32(true));
//! serializer.register_schema(100, &["age", "name"])?;
//!
//! let payload = Value::Map(vec![
//!     (Value::from("name"), Value::from("Ada")),
//!     (Value::from("age"), Value::from(36)),
//! ]);
//!
//! let packet = serializer.serialize(&payload)?;
//! let roundtrip = serializer.deserialize(&packet)?;
//! assert_eq!(roundtrip.as_map().map(Vec::len), Some(2));
//! # Ok(())
//! # }
//! ```
//!
//! ## Components
//! - [`SchemaRegistry`]: id to sorted-field-list mapping with first-match
//!   auto-detection
//! - [`ObjectCoder`]/[`MessagePackCoder`]: the structured-value codec seam
//! - [`Compressor`]: injected compression strategy (LZ4 and Zstd built in)
//! - [`PacketInfo`]: header introspection without a full decode

pub mod config;
pub mod core;
pub mod error;
pub mod utils;

pub use crate::config::{CodecConfig, DEFAULT_COMPRESSION_THRESHOLD, PROTOCOL_VERSION};
pub use crate::core::coder::{MessagePackCoder, ObjectCoder};
pub use crate::core::packet::{PacketInfo, PacketSerializer, SchemaRef, SerializerOptions};
pub use crate::core::schema::SchemaRegistry;
pub use crate::error::{PacketError, Result};
pub use crate::utils::compression::{CompressionKind, Compressor};

/// Structured payload value, re-exported from `rmpv`.
pub use rmpv::Value;
