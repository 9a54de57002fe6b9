//! Models shared by the integration tests.

#![allow(dead_code)]

use lazy_static::lazy_static;
use serde::Deserialize;

use querybridge::schema::{MemberDescriptor, ModelSchema, SearchableModel, SearchableProperty, TypeDescriptor};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Item {
    pub category: String,
    pub count: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub test_nullable_int: Option<i32>,
    #[serde(default)]
    pub items: Vec<Item>,
}

lazy_static! {
    static ref ITEM_SCHEMA: ModelSchema = ModelSchema::builder("Item")
        .property(
            "Category",
            TypeDescriptor::string(),
            SearchableProperty::new().filterable(true).facetable(true),
        )
        .property(
            "Count",
            TypeDescriptor::nullable(TypeDescriptor::int()),
            SearchableProperty::new().filterable(true),
        )
        .build()
        .unwrap();

    static ref PRODUCT_SCHEMA: ModelSchema = ModelSchema::builder("Product")
        .index_name("products")
        .property("Id", TypeDescriptor::string(), SearchableProperty::new().key(true).filterable(true))
        .property(
            "Name",
            TypeDescriptor::string(),
            SearchableProperty::new().searchable(true).with_boost(2.0).sortable(true),
        )
        .property("Description", TypeDescriptor::string(), SearchableProperty::new().searchable(true))
        .property("IsActive", TypeDescriptor::bool(), SearchableProperty::new().filterable(true))
        .property(
            "Price",
            TypeDescriptor::double(),
            SearchableProperty::new()
                .filterable(true)
                .sortable(true)
                .facetable(true)
                .with_facetable_ranges([10.0, 100.0]),
        )
        .property(
            "Brand",
            TypeDescriptor::string(),
            SearchableProperty::new().filterable(true).facetable(true),
        )
        .property("Stock", TypeDescriptor::int(), SearchableProperty::new())
        .property(
            "TestNullableInt",
            TypeDescriptor::nullable(TypeDescriptor::int()),
            SearchableProperty::new().filterable(true),
        )
        .property(
            "TestEnumProperty",
            TypeDescriptor::enumeration("TestEnum"),
            SearchableProperty::new().filterable(true),
        )
        .property("Created", TypeDescriptor::datetime(), SearchableProperty::new().filterable(true))
        .property(
            "Items",
            TypeDescriptor::list(TypeDescriptor::object::<ItemModel>()),
            SearchableProperty::new().nested(true),
        )
        .member(MemberDescriptor::property("Secret", TypeDescriptor::string()).ignored(true))
        .member(MemberDescriptor::method("Describe"))
        .build()
        .unwrap();
}

/// Schema handle for [`Item`].
pub struct ItemModel;

impl SearchableModel for ItemModel {
    fn schema() -> &'static ModelSchema {
        &ITEM_SCHEMA
    }
}

impl SearchableModel for Product {
    fn schema() -> &'static ModelSchema {
        &PRODUCT_SCHEMA
    }
}

/// Initialize logging once per test binary.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
