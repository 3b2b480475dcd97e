//! # Object Coder
//!
//! The structured-value codec behind the packet layer.
//!
//! The packet serializer only needs two operations from its coder: turn a
//! [`Value`] into bytes and back. That contract is the [`ObjectCoder`]
//! trait; the default implementation is [`MessagePackCoder`], a thin layer
//! over `rmpv`'s value-level MessagePack encoding.
//!
//! ## Custom types
//! Application types that are not native MessagePack values survive the
//! packet layer through extension codecs: a numeric tag (0-127, the user
//! range), a match predicate, and an encode/decode pair. On encode the
//! value tree is walked and matching values are replaced with
//! `Value::Ext(tag, bytes)`; on decode the replacement is reversed.
//! MessagePack's reserved negative tags (the timestamp type among them)
//! pass through untouched.
//!
//! The extension table is per-instance. Two coders never share
//! registrations, so tests and embedded sub-systems stay isolated.

use crate::error::{PacketError, Result};
use rmpv::Value;
use std::fmt;

/// Byte codec for structured values.
///
/// Implementations must be deterministic: encoding the same value twice
/// yields the same bytes.
pub trait ObjectCoder: Send + Sync {
    /// Encodes a value to bytes.
    fn encode(&self, value: &Value) -> Result<Vec<u8>>;

    /// Decodes bytes back to a value.
    fn decode(&self, bytes: &[u8]) -> Result<Value>;
}

type MatchFn = Box<dyn Fn(&Value) -> bool + Send + Sync>;
type ExtEncodeFn = Box<dyn Fn(&Value) -> Result<Vec<u8>> + Send + Sync>;
type ExtDecodeFn = Box<dyn Fn(&[u8]) -> Result<Value> + Send + Sync>;

struct Extension {
    tag: i8,
    matches: MatchFn,
    encode: ExtEncodeFn,
    decode: ExtDecodeFn,
}

impl fmt::Debug for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extension").field("tag", &self.tag).finish()
    }
}

/// MessagePack implementation of [`ObjectCoder`] with per-instance
/// extension codecs.
#[derive(Debug, Default)]
pub struct MessagePackCoder {
    extensions: Vec<Extension>,
}

impl MessagePackCoder {
    /// Creates a coder with no extensions registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an extension codec under a user-range tag.
    ///
    /// `matches` decides which values the extension claims, `encode`
    /// produces the extension payload, `decode` reverses it. When several
    /// extensions match the same value, the earliest registration wins.
    ///
    /// # Errors
    /// - `InvalidExtensionTag` if `tag` is negative (tags below zero are
    ///   reserved by MessagePack itself)
    pub fn register_extension<M, E, D>(
        &mut self,
        tag: i8,
        matches: M,
        encode: E,
        decode: D,
    ) -> Result<()>
    where
        M: Fn(&Value) -> bool + Send + Sync + 'static,
        E: Fn(&Value) -> Result<Vec<u8>> + Send + Sync + 'static,
        D: Fn(&[u8]) -> Result<Value> + Send + Sync + 'static,
    {
        if tag < 0 {
            return Err(PacketError::InvalidExtensionTag(tag));
        }
        self.extensions.push(Extension {
            tag,
            matches: Box::new(matches),
            encode: Box::new(encode),
            decode: Box::new(decode),
        });
        Ok(())
    }

    /// Replaces extension-claimed values with `Value::Ext` nodes, walking
    /// arrays and maps. Values an extension produced are not revisited.
    fn lower(&self, value: &Value) -> Result<Value> {
        if let Some(ext) = self.extensions.iter().find(|e| (e.matches)(value)) {
            return Ok(Value::Ext(ext.tag, (ext.encode)(value)?));
        }
        match value {
            Value::Array(items) => items
                .iter()
                .map(|v| self.lower(v))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            Value::Map(entries) => entries
                .iter()
                .map(|(k, v)| Ok((self.lower(k)?, self.lower(v)?)))
                .collect::<Result<Vec<_>>>()
                .map(Value::Map),
            other => Ok(other.clone()),
        }
    }

    /// Restores extension-claimed values from their `Value::Ext` nodes.
    /// Unregistered tags pass through unchanged.
    fn raise(&self, value: Value) -> Result<Value> {
        match value {
            Value::Ext(tag, data) => {
                match self.extensions.iter().find(|e| e.tag == tag) {
                    Some(ext) => (ext.decode)(&data),
                    None => Ok(Value::Ext(tag, data)),
                }
            }
            Value::Array(items) => items
                .into_iter()
                .map(|v| self.raise(v))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            Value::Map(entries) => entries
                .into_iter()
                .map(|(k, v)| Ok((self.raise(k)?, self.raise(v)?)))
                .collect::<Result<Vec<_>>>()
                .map(Value::Map),
            other => Ok(other),
        }
    }
}

impl ObjectCoder for MessagePackCoder {
    fn encode(&self, value: &Value) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        if self.extensions.is_empty() {
            rmpv::encode::write_value(&mut bytes, value)
                .map_err(|e| PacketError::EncodeError(e.to_string()))?;
        } else {
            let lowered = self.lower(value)?;
            rmpv::encode::write_value(&mut bytes, &lowered)
                .map_err(|e| PacketError::EncodeError(e.to_string()))?;
        }
        Ok(bytes)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Value> {
        let mut cursor = bytes;
        let value = rmpv::decode::read_value(&mut cursor)
            .map_err(|e| PacketError::DecodeError(e.to_string()))?;
        if self.extensions.is_empty() {
            Ok(value)
        } else {
            self.raise(value)
        }
    }
}
