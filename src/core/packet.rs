//! # Packet Serializer
//!
//! Schema-aware packet framing over the object coder.
//!
//! ## Wire Format
//! ```text
//! [Version(1)] [Flags(1)] [CRC32(4)?] [SchemaId(4)?] [Payload(N)]
//! ```
//!
//! The flag byte records which optional fields are present and whether the
//! payload bytes were compressed. Multi-byte integers are big-endian. When
//! a schema is in play the payload is the coder's encoding of a value
//! array in the schema's sorted field order, names elided; otherwise it is
//! the self-describing encoding of the payload map.
//!
//! ## Integrity
//! The optional CRC32 covers the payload bytes exactly as framed, after
//! compression. On deserialize it is verified before any decompression or
//! decoding touches the data.

use crate::config::{CodecConfig, DEFAULT_COMPRESSION_THRESHOLD, PROTOCOL_VERSION};
use crate::core::coder::{MessagePackCoder, ObjectCoder};
use crate::core::flags::{
    pack_flags, unpack_flags, FLAG_SLOTS, SLOT_COMPRESSED, SLOT_CRC32, SLOT_SCHEMA,
};
use crate::core::schema::SchemaRegistry;
use crate::error::{constants, PacketError, Result};
use crate::utils::checksum::{crc32, verify_crc32};
use crate::utils::compression::Compressor;
use bytes::{Buf, BufMut, BytesMut};
use indexmap::IndexMap;
use rmpv::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// Construction-time serializer settings.
///
/// Moved into [`PacketSerializer::new`], so the caller keeps no handle
/// through which to mutate a live serializer's configuration.
#[derive(Debug, Default)]
pub struct SerializerOptions {
    /// Compression strategy, or `None` to never compress.
    pub compression: Option<Compressor>,
    /// Whether produced packets carry a CRC32 of their payload bytes.
    pub use_crc32: bool,
}

impl SerializerOptions {
    /// Options with no compression and no checksums.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables CRC32 tagging.
    #[must_use]
    pub fn with_crc32(mut self, use_crc32: bool) -> Self {
        self.use_crc32 = use_crc32;
        self
    }

    /// Sets the compression strategy.
    #[must_use]
    pub fn with_compression(mut self, compression: Compressor) -> Self {
        self.compression = Some(compression);
        self
    }
}

/// Explicit schema reference for [`PacketSerializer::serialize_with`].
#[derive(Debug, Clone)]
pub enum SchemaRef {
    /// A schema id to look up in the registry.
    Id(u32),
    /// An id paired with its field list. The fields are informational;
    /// lookup still goes through the registry by id.
    Definition {
        /// Registry id to look up.
        id: u32,
        /// Field names the caller believes the schema has.
        fields: Vec<String>,
    },
}

impl SchemaRef {
    fn id(&self) -> u32 {
        match self {
            SchemaRef::Id(id) | SchemaRef::Definition { id, .. } => *id,
        }
    }
}

/// Parsed packet header, read without decoding, decompressing, or
/// verifying the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketInfo {
    /// Format version byte.
    pub version: u8,
    /// Whether the payload bytes were compressed.
    pub compressed: bool,
    /// Whether a CRC32 field is present.
    pub crc32_present: bool,
    /// Schema id, when the schema flag is set.
    pub schema_id: Option<u32>,
    /// Length of the payload region in bytes.
    pub data_size: usize,
}

impl PacketInfo {
    /// Reads the header fields of a packet.
    ///
    /// # Errors
    /// - `PacketTooShort` if the buffer cannot hold the fields its own
    ///   flag byte claims
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 2 {
            return Err(PacketError::PacketTooShort(bytes.len()));
        }
        let mut cursor = bytes;
        let version = cursor.get_u8();
        let flags = unpack_flags(cursor.get_u8());

        let crc32_present = flags[SLOT_CRC32];
        if crc32_present {
            if cursor.remaining() < 4 {
                return Err(PacketError::PacketTooShort(bytes.len()));
            }
            cursor.advance(4);
        }

        let schema_id = if flags[SLOT_SCHEMA] {
            if cursor.remaining() < 4 {
                return Err(PacketError::PacketTooShort(bytes.len()));
            }
            Some(cursor.get_u32())
        } else {
            None
        };

        Ok(Self {
            version,
            compressed: flags[SLOT_COMPRESSED],
            crc32_present,
            schema_id,
            data_size: cursor.remaining(),
        })
    }
}

/// Schema-aware packet serializer/deserializer.
///
/// Owns its [`SchemaRegistry`]; shares the injected object coder and
/// compression strategy with the caller. All methods are synchronous and
/// compute-bound. Nothing here locks: share a serializer across threads
/// behind external synchronization.
pub struct PacketSerializer {
    registry: SchemaRegistry,
    coder: Arc<dyn ObjectCoder>,
    compression: Option<Compressor>,
    use_crc32: bool,
    compression_threshold: usize,
}

impl Default for PacketSerializer {
    fn default() -> Self {
        Self::new(SerializerOptions::default())
    }
}

impl PacketSerializer {
    /// Creates a serializer with the default MessagePack coder.
    pub fn new(options: SerializerOptions) -> Self {
        Self::with_coder(Arc::new(MessagePackCoder::new()), options)
    }

    /// Creates a serializer around a caller-provided object coder.
    pub fn with_coder(coder: Arc<dyn ObjectCoder>, options: SerializerOptions) -> Self {
        Self {
            registry: SchemaRegistry::new(),
            coder,
            compression: options.compression,
            use_crc32: options.use_crc32,
            compression_threshold: DEFAULT_COMPRESSION_THRESHOLD,
        }
    }

    /// Builds a serializer from a validated [`CodecConfig`].
    pub fn from_config(config: &CodecConfig) -> Result<Self> {
        config.validate_strict()?;
        let mut serializer = Self::new(SerializerOptions {
            compression: config.compression.map(Compressor::of_kind),
            use_crc32: config.use_crc32,
        });
        serializer.compression_threshold = config.compression_threshold_bytes;
        Ok(serializer)
    }

    // ---- registry operations -------------------------------------------

    /// Registers a schema. See [`SchemaRegistry::register`].
    pub fn register_schema<S: AsRef<str>>(&mut self, id: u32, fields: &[S]) -> Result<()> {
        self.registry.register(id, fields)
    }

    /// Replaces a schema's fields. See [`SchemaRegistry::update`].
    pub fn update_schema<S: AsRef<str>>(&mut self, id: u32, fields: &[S]) -> Result<()> {
        self.registry.update(id, fields)
    }

    /// Removes a schema. See [`SchemaRegistry::unregister`].
    pub fn unregister_schema(&mut self, id: u32) -> Result<()> {
        self.registry.unregister(id)
    }

    /// Whether a schema id is registered.
    pub fn has_schema(&self, id: u32) -> bool {
        self.registry.has(id)
    }

    /// Copy of a schema's sorted field list.
    pub fn schema(&self, id: u32) -> Option<Vec<String>> {
        self.registry.get(id)
    }

    /// Copies of all registered schemas, keyed by id.
    pub fn schemas(&self) -> IndexMap<u32, Vec<String>> {
        self.registry.all()
    }

    /// All registered schema ids, sorted ascending.
    pub fn schema_ids(&self) -> Vec<u32> {
        self.registry.ids()
    }

    // ---- configuration -------------------------------------------------

    /// Minimum encoded-payload size before compression is applied.
    pub fn compression_threshold(&self) -> usize {
        self.compression_threshold
    }

    /// Sets the compression threshold in bytes.
    pub fn set_compression_threshold(&mut self, threshold: usize) {
        self.compression_threshold = threshold;
    }

    // ---- serialize -----------------------------------------------------

    /// Serializes a map-shaped payload, auto-detecting a schema.
    ///
    /// The registry is scanned in registration order for a schema whose
    /// field set equals the payload's key set; the first match is used.
    /// With no match the payload is encoded self-describing.
    pub fn serialize(&self, payload: &Value) -> Result<Vec<u8>> {
        self.serialize_inner(payload, None)
    }

    /// Serializes with an explicit schema reference.
    ///
    /// An id that is not registered is not an error here: the payload
    /// degrades to the self-describing encoding and the packet's schema
    /// flag stays clear. Only a packet that *claims* a schema binds its
    /// consumer to have it.
    pub fn serialize_with(&self, payload: &Value, schema: SchemaRef) -> Result<Vec<u8>> {
        self.serialize_inner(payload, Some(schema.id()))
    }

    fn serialize_inner(&self, payload: &Value, explicit: Option<u32>) -> Result<Vec<u8>> {
        let Value::Map(entries) = payload else {
            return Err(PacketError::InvalidPayload(constants::ERR_NOT_A_MAP));
        };

        let mut keys = Vec::with_capacity(entries.len());
        let mut by_key: HashMap<&str, &Value> = HashMap::with_capacity(entries.len());
        for (key, value) in entries {
            let key = key
                .as_str()
                .ok_or(PacketError::InvalidPayload(constants::ERR_NON_STRING_KEY))?;
            keys.push(key);
            by_key.insert(key, value);
        }

        let schema_id = match explicit {
            Some(id) => {
                if self.registry.has(id) {
                    Some(id)
                } else {
                    trace!(id, "explicit schema not registered, encoding self-describing");
                    None
                }
            }
            None => {
                let mut sorted = keys.clone();
                sorted.sort_unstable();
                self.registry.find_matching(&sorted)
            }
        };

        let body = match schema_id {
            Some(id) => {
                // Registered ids always resolve; guard for totality.
                let fields = self
                    .registry
                    .fields(id)
                    .ok_or(PacketError::SchemaNotFound(id))?;
                let ordered = reorder_by_schema(&keys, &by_key, fields)?;
                self.coder.encode(&Value::Array(ordered))?
            }
            None => self.coder.encode(payload)?,
        };

        let mut compressed = false;
        let body = match &self.compression {
            Some(strategy) if body.len() >= self.compression_threshold => {
                compressed = true;
                strategy.compress(&body)?
            }
            _ => body,
        };

        let mut flags = [false; FLAG_SLOTS];
        flags[SLOT_COMPRESSED] = compressed;
        flags[SLOT_CRC32] = self.use_crc32;
        flags[SLOT_SCHEMA] = schema_id.is_some();

        let mut packet = BytesMut::with_capacity(10 + body.len());
        packet.put_u8(PROTOCOL_VERSION);
        packet.put_u8(pack_flags(flags));
        if self.use_crc32 {
            packet.put_u32(crc32(&body));
        }
        if let Some(id) = schema_id {
            packet.put_u32(id);
        }
        packet.put_slice(&body);

        debug!(
            ?schema_id,
            compressed,
            crc32 = self.use_crc32,
            size = packet.len(),
            "serialized packet"
        );
        Ok(packet.into())
    }

    // ---- deserialize ---------------------------------------------------

    /// Parses a packet back into its payload value.
    ///
    /// Checks run in wire order: version, header fields, CRC32 over the
    /// payload bytes as received, decompression, decoding, and finally
    /// schema reconstruction. A packet claiming a schema this registry
    /// does not hold is a hard `SchemaNotFound`.
    pub fn deserialize(&self, bytes: &[u8]) -> Result<Value> {
        if bytes.len() < 2 {
            return Err(PacketError::PacketTooShort(bytes.len()));
        }
        let mut cursor = bytes;

        let version = cursor.get_u8();
        if version != PROTOCOL_VERSION {
            return Err(PacketError::VersionMismatch {
                expected: PROTOCOL_VERSION,
                actual: version,
            });
        }

        let flags = unpack_flags(cursor.get_u8());
        let compressed = flags[SLOT_COMPRESSED];

        let stored_crc = if flags[SLOT_CRC32] {
            if cursor.remaining() < 4 {
                return Err(PacketError::PacketTooShort(bytes.len()));
            }
            Some(cursor.get_u32())
        } else {
            None
        };

        let schema_fields = if flags[SLOT_SCHEMA] {
            if cursor.remaining() < 4 {
                return Err(PacketError::PacketTooShort(bytes.len()));
            }
            let id = cursor.get_u32();
            let fields = self
                .registry
                .fields(id)
                .ok_or(PacketError::SchemaNotFound(id))?;
            Some(fields)
        } else {
            None
        };

        // Everything after the header is the payload, exactly as framed.
        let payload = cursor;

        if let Some(stored) = stored_crc {
            verify_crc32(payload, stored)?;
        }

        let decoded = if compressed {
            let strategy = self
                .compression
                .as_ref()
                .ok_or(PacketError::MissingCompressor)?;
            let body = strategy.decompress(payload)?;
            self.coder.decode(&body)?
        } else {
            self.coder.decode(payload)?
        };

        match schema_fields {
            Some(fields) => {
                let Value::Array(values) = decoded else {
                    return Err(PacketError::MalformedSchemaPayload);
                };
                if values.len() != fields.len() {
                    return Err(PacketError::SchemaArity {
                        expected: fields.len(),
                        actual: values.len(),
                    });
                }
                // Zip positionally against the sorted field order, so the
                // reconstructed map's key order is deterministic.
                let entries = fields
                    .iter()
                    .map(|f| Value::from(f.as_str()))
                    .zip(values)
                    .collect();
                Ok(Value::Map(entries))
            }
            None => Ok(decoded),
        }
    }

    /// Reads a packet's header without touching its payload.
    pub fn packet_info(&self, bytes: &[u8]) -> Result<PacketInfo> {
        PacketInfo::parse(bytes)
    }
}

/// Pulls payload values into the schema's sorted field order, reporting
/// every mismatch by name.
fn reorder_by_schema(
    keys: &[&str],
    by_key: &HashMap<&str, &Value>,
    fields: &[String],
) -> Result<Vec<Value>> {
    if keys.len() != fields.len() {
        return Err(PacketError::SchemaValidation(format!(
            "expected {} fields, got {}",
            fields.len(),
            keys.len()
        )));
    }

    let mut ordered = Vec::with_capacity(fields.len());
    let mut missing = Vec::new();
    for field in fields {
        match by_key.get(field.as_str()) {
            Some(value) => ordered.push((*value).clone()),
            None => missing.push(field.as_str()),
        }
    }
    if !missing.is_empty() {
        return Err(PacketError::SchemaValidation(format!(
            "missing fields: {}",
            missing.join(", ")
        )));
    }

    let unexpected: Vec<&str> = keys
        .iter()
        .copied()
        .filter(|k| fields.binary_search_by(|f| f.as_str().cmp(k)).is_err())
        .collect();
    if !unexpected.is_empty() {
        return Err(PacketError::SchemaValidation(format!(
            "unexpected fields: {}",
            unexpected.join(", ")
        )));
    }

    Ok(ordered)
}
