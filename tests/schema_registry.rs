#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
//! Schema registry behavior: canonical sorting, lifecycle operations, and
//! copy semantics of everything the registry hands out.

use wirepack::{PacketError, SchemaRegistry};

#[test]
fn test_fields_stored_sorted_lexicographically() {
    let mut registry = SchemaRegistry::new();
    registry.register(1, &["b", "a", "c"]).unwrap();
    assert_eq!(registry.get(1).unwrap(), vec!["a", "b", "c"]);
}

#[test]
fn test_sorting_is_byte_order_not_locale() {
    let mut registry = SchemaRegistry::new();
    // Uppercase sorts before lowercase in byte order.
    registry.register(1, &["b", "A", "a"]).unwrap();
    assert_eq!(registry.get(1).unwrap(), vec!["A", "a", "b"]);
}

#[test]
fn test_duplicate_id_rejected() {
    let mut registry = SchemaRegistry::new();
    registry.register(1, &["a"]).unwrap();
    let result = registry.register(1, &["b"]);
    assert!(matches!(result, Err(PacketError::DuplicateSchemaId(1))));
    // Original registration is untouched.
    assert_eq!(registry.get(1).unwrap(), vec!["a"]);
}

#[test]
fn test_update_replaces_and_resorts() {
    let mut registry = SchemaRegistry::new();
    registry.register(1, &["a", "b"]).unwrap();
    registry.update(1, &["z", "m", "k"]).unwrap();
    assert_eq!(registry.get(1).unwrap(), vec!["k", "m", "z"]);
}

#[test]
fn test_update_unknown_id_fails() {
    let mut registry = SchemaRegistry::new();
    let result = registry.update(7, &["a"]);
    assert!(matches!(result, Err(PacketError::SchemaNotFound(7))));
}

#[test]
fn test_unregister_removes_in_point() {
    let mut registry = SchemaRegistry::new();
    registry.register(1, &["a"]).unwrap();
    registry.register(2, &["b"]).unwrap();
    registry.unregister(1).unwrap();

    assert!(!registry.has(1));
    assert!(registry.has(2));
    assert!(matches!(
        registry.unregister(1),
        Err(PacketError::SchemaNotFound(1))
    ));
}

#[test]
fn test_get_unknown_id_is_none() {
    let registry = SchemaRegistry::new();
    assert_eq!(registry.get(404), None);
}

#[test]
fn test_get_returns_detached_copy() {
    let mut registry = SchemaRegistry::new();
    registry.register(1, &["a", "b"]).unwrap();

    let mut fields = registry.get(1).unwrap();
    fields.push("sneaky".to_string());
    fields[0] = "mutated".to_string();

    assert_eq!(registry.get(1).unwrap(), vec!["a", "b"]);
}

#[test]
fn test_all_returns_detached_copies() {
    let mut registry = SchemaRegistry::new();
    registry.register(1, &["a"]).unwrap();

    let mut all = registry.all();
    all.get_mut(&1).unwrap().push("sneaky".to_string());

    assert_eq!(registry.get(1).unwrap(), vec!["a"]);
}

#[test]
fn test_registering_does_not_alias_caller_list() {
    let mut registry = SchemaRegistry::new();
    let mut fields = vec!["b".to_string(), "a".to_string()];
    registry.register(1, &fields).unwrap();

    fields[0] = "mutated".to_string();
    fields.push("extra".to_string());

    assert_eq!(registry.get(1).unwrap(), vec!["a", "b"]);
}

#[test]
fn test_ids_sorted_ascending_regardless_of_insertion() {
    let mut registry = SchemaRegistry::new();
    registry.register(5, &["a"]).unwrap();
    registry.register(1, &["b"]).unwrap();
    registry.register(3, &["c"]).unwrap();
    assert_eq!(registry.ids(), vec![1, 3, 5]);
}

#[test]
fn test_empty_field_list_rejected() {
    let mut registry = SchemaRegistry::new();
    let none: [&str; 0] = [];
    assert!(matches!(
        registry.register(1, &none),
        Err(PacketError::InvalidSchemaFields(_))
    ));
    assert!(!registry.has(1));
}

#[test]
fn test_empty_field_name_rejected_on_register_and_update() {
    let mut registry = SchemaRegistry::new();
    assert!(matches!(
        registry.register(1, &["ok", ""]),
        Err(PacketError::InvalidSchemaFields(_))
    ));

    registry.register(1, &["ok"]).unwrap();
    assert!(matches!(
        registry.update(1, &[""]),
        Err(PacketError::InvalidSchemaFields(_))
    ));
    assert_eq!(registry.get(1).unwrap(), vec!["ok"]);
}

#[test]
fn test_len_and_is_empty() {
    let mut registry = SchemaRegistry::new();
    assert!(registry.is_empty());
    registry.register(1, &["a"]).unwrap();
    registry.register(2, &["b"]).unwrap();
    assert_eq!(registry.len(), 2);
    assert!(!registry.is_empty());
}
