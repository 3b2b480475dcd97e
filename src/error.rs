//! # Error Types
//!
//! Comprehensive error handling for packet serialization.
//!
//! This module defines all error variants that can occur while registering
//! schemas, framing packets, and parsing them back, from construction-time
//! configuration mistakes to wire-level corruption.
//!
//! ## Error Categories
//! - **Registry Errors**: Invalid field lists, duplicate or unknown schema ids
//! - **Validation Errors**: Payload shape or schema mismatches on serialize
//! - **Wire Errors**: Version mismatches, truncated buffers, CRC32 failures
//! - **Configuration Errors**: Partial compression strategies, bad config files
//!
//! All errors implement `std::error::Error` for interoperability, and every
//! message names the specific violated invariant (the offending field names,
//! the expected-vs-actual counts, the stored-vs-computed checksum).

use thiserror::Error;

/// Error message constants to reduce allocations in error paths.
/// Static strings are borrowed, avoiding heap allocations for common error cases.
pub mod constants {
    /// Registry validation errors
    pub const ERR_EMPTY_FIELD_LIST: &str = "schema field list is empty";
    pub const ERR_EMPTY_FIELD_NAME: &str = "schema field names must be non-empty";

    /// Payload validation errors
    pub const ERR_NOT_A_MAP: &str = "payload must be a string-keyed map";
    pub const ERR_NON_STRING_KEY: &str = "payload map keys must be strings";

    /// Compression strategy errors
    pub const ERR_PARTIAL_COMPRESSOR: &str =
        "compression strategy must provide both compress and decompress";
}

/// The primary error type for all registry, serialize, and deserialize
/// operations.
#[derive(Error, Debug)]
pub enum PacketError {
    /// Serialize was called with a top-level value that is not a
    /// string-keyed map.
    #[error("invalid payload: {0}")]
    InvalidPayload(&'static str),

    /// A schema field list failed validation on register or update.
    #[error("invalid schema fields: {0}")]
    InvalidSchemaFields(&'static str),

    /// The schema id is already present in the registry.
    #[error("schema id {0} is already registered")]
    DuplicateSchemaId(u32),

    /// The schema id is not present in the registry. On registry operations
    /// this is a caller bug; on deserialize it means the packet header
    /// promised a schema this instance does not know.
    #[error("schema id {0} is not registered")]
    SchemaNotFound(u32),

    /// The payload does not satisfy the referenced schema. The message
    /// carries the exact mismatch: field counts, missing names, or
    /// unexpected names.
    #[error("schema validation failed: {0}")]
    SchemaValidation(String),

    /// A compression strategy was supplied with only one of its two
    /// callables. Raised at construction, before any packet is produced.
    #[error("{0}")]
    InvalidCompressor(&'static str),

    /// The packet was produced by an incompatible format version.
    #[error("unsupported packet version {actual}, expected {expected}")]
    VersionMismatch {
        /// Version this build understands.
        expected: u8,
        /// Version byte found in the packet.
        actual: u8,
    },

    /// The buffer is too small to hold the fields its own header claims.
    #[error("packet too short: {0} bytes")]
    PacketTooShort(usize),

    /// The payload bytes do not match the checksum stored in the header.
    #[error("crc32 mismatch: stored {stored:#010x}, computed {computed:#010x}")]
    Crc32Mismatch {
        /// Checksum carried in the packet header.
        stored: u32,
        /// Checksum recomputed over the received payload bytes.
        computed: u32,
    },

    /// The packet is flagged as compressed but this instance has no
    /// decompressor configured.
    #[error("packet is compressed but no decompressor is configured")]
    MissingCompressor,

    /// The header claims a schema but the decoded payload is not the value
    /// array a schema-encoded packet must carry.
    #[error("schema flag is set but the decoded payload is not an array")]
    MalformedSchemaPayload,

    /// The decoded value array does not line up with the schema's field
    /// count.
    #[error("schema arity mismatch: expected {expected} values, got {actual}")]
    SchemaArity {
        /// Field count of the schema named in the header.
        expected: usize,
        /// Number of values actually decoded.
        actual: usize,
    },

    /// A coder extension was registered with a tag outside the user range.
    #[error("extension tag {0} out of range, user tags are 0-127")]
    InvalidExtensionTag(i8),

    /// The object coder failed to encode a value.
    #[error("encode failed: {0}")]
    EncodeError(String),

    /// The object coder failed to decode a payload.
    #[error("decode failed: {0}")]
    DecodeError(String),

    /// The compression strategy failed to compress.
    #[error("compression failed")]
    CompressionFailure,

    /// The compression strategy failed to decompress, or its output
    /// exceeded the configured size limit.
    #[error("decompression failed")]
    DecompressionFailure,

    /// A configuration file or value could not be used.
    #[error("configuration error: {0}")]
    ConfigError(String),
}

/// Type alias for Results using PacketError
pub type Result<T> = std::result::Result<T, PacketError>;
