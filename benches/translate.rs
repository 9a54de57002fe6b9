//! Criterion benchmarks for filter translation and the query-string codec.

use std::hint::black_box;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use lazy_static::lazy_static;
use querybridge::config::SearchServiceConfig;
use querybridge::filter::{
    FilterNode, FilterOperator, deserialize_filters_query_string, serialize_filters_to_query_string,
};
use querybridge::request::{FacetInfoRequest, SearchRequest};
use querybridge::schema::{ModelSchema, SearchableModel, SearchableProperty, TypeDescriptor};
use querybridge::{azure, elastic};

struct Item;
struct Product;

lazy_static! {
    static ref ITEM: ModelSchema = ModelSchema::builder("Item")
        .property("Category", TypeDescriptor::string(), SearchableProperty::new().facetable(true))
        .property("Count", TypeDescriptor::nullable(TypeDescriptor::int()), SearchableProperty::new())
        .build()
        .unwrap();
    static ref PRODUCT: ModelSchema = ModelSchema::builder("Product")
        .index_name("products")
        .property("Id", TypeDescriptor::string(), SearchableProperty::new().key(true))
        .property("Name", TypeDescriptor::string(), SearchableProperty::new().searchable(true).with_boost(2.0))
        .property("Price", TypeDescriptor::double(), SearchableProperty::new().facetable(true))
        .property("IsActive", TypeDescriptor::bool(), SearchableProperty::new().filterable(true))
        .property("Brand", TypeDescriptor::string(), SearchableProperty::new().facetable(true))
        .property(
            "Items",
            TypeDescriptor::list(TypeDescriptor::object::<Item>()),
            SearchableProperty::new().nested(true),
        )
        .build()
        .unwrap();
}

impl SearchableModel for Item {
    fn schema() -> &'static ModelSchema {
        &ITEM
    }
}

impl SearchableModel for Product {
    fn schema() -> &'static ModelSchema {
        &PRODUCT
    }
}

/// Generate `count` top-level filters, each with a small connector chain.
fn generate_filters(count: usize) -> Vec<FilterNode> {
    (0..count)
        .map(|i| {
            FilterNode::new("Price", FilterOperator::Ge, i as f64).and(
                FilterNode::new("Brand", FilterOperator::Eq, format!("brand-{i}"))
                    .or_where("Items.Category", FilterOperator::Eq, "shoes")
                    .or_where("IsActive", FilterOperator::Eq, i % 2 == 0),
            )
        })
        .collect()
}

fn bench_query_string(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_string");

    for count in [1, 10, 100] {
        let filters = generate_filters(count);
        let encoded = serialize_filters_to_query_string(&filters, None, None).unwrap();
        group.throughput(Throughput::Elements(count as u64));

        group.bench_function(format!("serialize_{count}"), |b| {
            b.iter(|| serialize_filters_to_query_string(black_box(&filters), None, None).unwrap())
        });
        group.bench_function(format!("deserialize_{count}"), |b| {
            b.iter(|| deserialize_filters_query_string(black_box(&encoded)).unwrap())
        });
    }

    group.finish();
}

fn bench_translation(c: &mut Criterion) {
    let mut group = c.benchmark_group("translation");
    let config = SearchServiceConfig::default();
    let mut request = SearchRequest::new()
        .with_search_text("trail shoes")
        .with_facet(FacetInfoRequest::new("Brand"))
        .with_facet(FacetInfoRequest::new("Items.Category"));
    request.filters = generate_filters(20);

    group.bench_function("azure_render_filters", |b| {
        b.iter(|| azure::render_filters(Product::schema(), black_box(&request.filters)).unwrap())
    });
    group.bench_function("azure_search_body", |b| {
        b.iter(|| azure::build_search_body(Product::schema(), Product::schema(), black_box(&request), &config).unwrap())
    });
    group.bench_function("elastic_group_filters", |b| {
        b.iter(|| elastic::group_filters(Product::schema(), black_box(&request.filters)).unwrap())
    });
    group.bench_function("elastic_search_body", |b| {
        b.iter(|| elastic::build_search_body(Product::schema(), black_box(&request), &config).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_query_string, bench_translation);
criterion_main!(benches);
