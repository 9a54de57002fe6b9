//! Schema module for QueryBridge.
//!
//! Models describe their members and search attributes through a static
//! [`ModelSchema`]; translators consult it to encode literals and to pick
//! searchable, facetable and selectable fields.

pub mod field;
#[allow(clippy::module_inception)]
pub mod schema;

pub use field::{
    MemberDescriptor, MemberKind, SearchableProperty, TypeDescriptor, ValueKind,
};
pub use schema::{ModelSchema, ModelSchemaBuilder, SchemaSummary, SearchableModel};
