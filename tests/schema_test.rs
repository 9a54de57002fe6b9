//! Integration tests for schema resolution through the public API.

mod common;

use common::Product;
use querybridge::error::SchemaError;
use querybridge::schema::{SearchableModel, ValueKind};

#[test]
fn test_resolve_paths() -> Result<(), SchemaError> {
    let schema = Product::schema();

    assert_eq!(schema.resolve_value_kind("Name")?, ValueKind::String);
    assert_eq!(schema.resolve_value_kind("TestNullableInt")?, ValueKind::Int);
    assert_eq!(schema.resolve_value_kind("TestEnumProperty")?, ValueKind::Int);
    assert_eq!(schema.resolve_value_kind("Items.Count")?, ValueKind::Int);
    assert_eq!(schema.resolve_value_kind("Items.Category")?, ValueKind::String);
    Ok(())
}

#[test]
fn test_resolve_failures() {
    let schema = Product::schema();

    assert!(matches!(
        schema.resolve_value_kind("Items.Colour"),
        Err(SchemaError::UnknownMember { member, .. }) if member == "Colour"
    ));
    assert!(matches!(
        schema.resolve_value_kind("Describe"),
        Err(SchemaError::NotAccessible { .. })
    ));
    assert!(matches!(schema.resolve_value_kind("Items"), Err(SchemaError::NotAValue { .. })));
    assert!(matches!(schema.resolve_value_kind("Name.Length"), Err(SchemaError::UnknownMember { .. })));
}

#[test]
fn test_metadata_reads() {
    let schema = Product::schema();

    assert_eq!(schema.index_name(), Some("products"));
    assert_eq!(schema.key_property_name(), Some("Id"));
    assert_eq!(schema.searchable_property_names(), vec!["Name", "Description"]);
    assert_eq!(schema.facetable_property_names(), vec!["Price", "Brand"]);
    assert_eq!(
        schema.property("Price").unwrap().map(|p| p.facetable_ranges.clone()),
        Some(vec![10.0, 100.0])
    );
    assert!(schema.property("Items.Category").unwrap().is_some_and(|p| p.is_facetable));
}
