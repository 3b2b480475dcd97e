//! # Schema Registry
//!
//! In-memory mapping of schema id to canonical field list.
//!
//! A schema names the fields a payload must carry. At registration the
//! field list is stored as a sorted copy: the sorted order is the wire
//! order for schema-encoded payloads, so it must be deterministic and
//! independent of the caller's insertion order. Sorting is
//! byte-lexicographic (`Ord for str`), never locale-aware.
//!
//! The registry is insertion-ordered. Auto-detection scans schemas in
//! registration order and the first field-set match wins, so two schemas
//! with identical field sets resolve deterministically to whichever was
//! registered first.

use crate::error::{constants, PacketError, Result};
use indexmap::IndexMap;
use tracing::debug;

/// Registry of schema id to sorted field-name list.
///
/// Lifetime is tied to the owning serializer; nothing is persisted.
#[derive(Debug, Default, Clone)]
pub struct SchemaRegistry {
    schemas: IndexMap<u32, Vec<String>>,
}

impl SchemaRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new schema.
    ///
    /// The field list is validated, sorted, and stored as a copy; the
    /// caller's slice is never aliased.
    ///
    /// # Errors
    /// - `InvalidSchemaFields` if the list is empty or any name is empty
    /// - `DuplicateSchemaId` if the id is already registered
    pub fn register<S: AsRef<str>>(&mut self, id: u32, fields: &[S]) -> Result<()> {
        let fields = validate_fields(fields)?;
        if self.schemas.contains_key(&id) {
            return Err(PacketError::DuplicateSchemaId(id));
        }
        debug!(id, field_count = fields.len(), "registered schema");
        self.schemas.insert(id, fields);
        Ok(())
    }

    /// Replaces the field list of an existing schema.
    ///
    /// # Errors
    /// - `SchemaNotFound` if the id is not registered
    /// - `InvalidSchemaFields` if the new list fails validation
    pub fn update<S: AsRef<str>>(&mut self, id: u32, fields: &[S]) -> Result<()> {
        if !self.schemas.contains_key(&id) {
            return Err(PacketError::SchemaNotFound(id));
        }
        let fields = validate_fields(fields)?;
        debug!(id, field_count = fields.len(), "updated schema");
        self.schemas.insert(id, fields);
        Ok(())
    }

    /// Removes a schema.
    ///
    /// # Errors
    /// - `SchemaNotFound` if the id is not registered
    pub fn unregister(&mut self, id: u32) -> Result<()> {
        // shift_remove keeps the remaining registration order intact so
        // auto-detection stays deterministic after removals.
        self.schemas
            .shift_remove(&id)
            .map(|_| ())
            .ok_or(PacketError::SchemaNotFound(id))
    }

    /// Whether the id is registered.
    pub fn has(&self, id: u32) -> bool {
        self.schemas.contains_key(&id)
    }

    /// Returns a copy of the schema's sorted field list, if registered.
    /// Mutating the returned list does not affect the registry.
    pub fn get(&self, id: u32) -> Option<Vec<String>> {
        self.schemas.get(&id).cloned()
    }

    /// Returns copies of every registered schema, keyed by id.
    pub fn all(&self) -> IndexMap<u32, Vec<String>> {
        self.schemas.clone()
    }

    /// Returns all registered ids, sorted ascending.
    pub fn ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.schemas.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Number of registered schemas.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Finds the first schema whose sorted field list equals `sorted_keys`.
    ///
    /// Scans in registration order; with two identical field sets the
    /// earlier registration wins.
    pub fn find_matching(&self, sorted_keys: &[&str]) -> Option<u32> {
        self.schemas
            .iter()
            .find(|(_, fields)| {
                fields.len() == sorted_keys.len()
                    && fields.iter().zip(sorted_keys).all(|(f, k)| f == k)
            })
            .map(|(&id, _)| id)
    }

    /// Borrow of a schema's sorted field list, for internal use on the
    /// serialize/deserialize paths.
    pub(crate) fn fields(&self, id: u32) -> Option<&[String]> {
        self.schemas.get(&id).map(Vec::as_slice)
    }
}

/// Validates a field list and returns its sorted, owned copy.
fn validate_fields<S: AsRef<str>>(fields: &[S]) -> Result<Vec<String>> {
    if fields.is_empty() {
        return Err(PacketError::InvalidSchemaFields(
            constants::ERR_EMPTY_FIELD_LIST,
        ));
    }
    if fields.iter().any(|f| f.as_ref().is_empty()) {
        return Err(PacketError::InvalidSchemaFields(
            constants::ERR_EMPTY_FIELD_NAME,
        ));
    }
    let mut fields: Vec<String> = fields.iter().map(|f| f.as_ref().to_owned()).collect();
    fields.sort_unstable();
    Ok(fields)
}
