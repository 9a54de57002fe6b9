//! Facet aggregations: construction and bucket parsing.

use std::collections::HashMap;

use log::warn;
use serde_json::{Map, Value, json};

use crate::elastic::filter::{FilterClauses, nested_path};
use crate::error::SchemaError;
use crate::request::{FacetInfoRequest, SearchRequest};
use crate::result::FacetStats;
use crate::schema::ModelSchema;

/// Filter aggregation wrapping a nested facet.
pub const FILTERED_AGGREGATION: &str = "filtered";
/// Reverse-nested aggregation counting root documents per bucket.
pub const ROOT_AGGREGATION: &str = "to_root";

/// Range boundaries of a facet: the property's declared ranges, else the
/// request's explicit values.
pub fn facet_ranges(schema: &ModelSchema, facet: &FacetInfoRequest) -> Result<Vec<f64>, SchemaError> {
    let declared = schema
        .property(&facet.facet_name)?
        .map(|p| p.facetable_ranges.clone())
        .unwrap_or_default();

    Ok(if declared.is_empty() {
        facet.values.clone()
    } else {
        declared
    })
}

/// Build the `aggs` object for the requested facets.
pub fn build_aggregations(
    schema: &ModelSchema,
    request: &SearchRequest,
    clauses: &FilterClauses,
) -> Result<Option<Value>, SchemaError> {
    let mut aggs = Map::new();

    for facet in &request.facet_info_to_return {
        let ranges = facet_ranges(schema, facet)?;
        let aggregation = match nested_path(&facet.facet_name) {
            None => leaf_aggregation(facet, &ranges, false),
            Some(path) => {
                let filter = match clauses.nested_clause(path) {
                    Some(query) => json!({"query_string": {"query": query}}),
                    None => json!({"match_all": {}}),
                };
                json!({
                    "nested": {"path": path},
                    "aggs": {
                        FILTERED_AGGREGATION: {
                            "filter": filter,
                            "aggs": {facet.facet_name.as_str(): leaf_aggregation(facet, &ranges, true)}
                        }
                    }
                })
            }
        };
        aggs.insert(facet.facet_name.clone(), aggregation);
    }

    Ok((!aggs.is_empty()).then_some(Value::Object(aggs)))
}

/// Range aggregation when boundaries are given, terms aggregation otherwise.
fn leaf_aggregation(facet: &FacetInfoRequest, ranges: &[f64], nested: bool) -> Value {
    let mut sub = Map::new();
    if nested {
        sub.insert(ROOT_AGGREGATION.to_string(), json!({"reverse_nested": {}}));
    }

    let mut aggregation = Map::new();
    if ranges.is_empty() {
        aggregation.insert(
            "terms".to_string(),
            json!({
                "field": facet.facet_name,
                "size": facet.count,
                "order": {"_count": "desc"},
            }),
        );
        if let Some(field) = &facet.sum_by_field {
            sub.insert(field.clone(), json!({"sum": {"field": field}}));
        }
    } else {
        aggregation.insert(
            "range".to_string(),
            json!({"field": facet.facet_name, "ranges": range_buckets(ranges)}),
        );
    }

    if !sub.is_empty() {
        aggregation.insert("aggs".to_string(), Value::Object(sub));
    }
    Value::Object(aggregation)
}

/// `[-inf, r0)`, `[r0, r1)`, ..., `[r(n-1), rn)`: one bucket per boundary.
fn range_buckets(ranges: &[f64]) -> Vec<Value> {
    ranges
        .iter()
        .enumerate()
        .map(|(i, to)| match i {
            0 => json!({"to": to}),
            _ => json!({"from": ranges[i - 1], "to": to}),
        })
        .collect()
}

/// Read facet buckets from the `aggregations` object of a response.
pub fn parse_aggregations(
    schema: &ModelSchema,
    request: &SearchRequest,
    aggregations: &Value,
) -> HashMap<String, Vec<FacetStats>> {
    let mut stats = HashMap::new();

    for facet in &request.facet_info_to_return {
        let name = facet.facet_name.as_str();
        let Some(outer) = aggregations.get(name) else {
            warn!("no aggregation returned for facet '{name}'");
            continue;
        };

        let leaf = match nested_path(name) {
            None => Some(outer),
            Some(_) => outer.get(FILTERED_AGGREGATION).and_then(|f| f.get(name)),
        };
        let Some(buckets) = leaf.and_then(|l| l.get("buckets")) else {
            warn!("aggregation for facet '{name}' has no buckets");
            continue;
        };

        let is_range = facet_ranges(schema, facet).map(|r| !r.is_empty()).unwrap_or(false);
        let buckets: Vec<&Value> = match buckets {
            Value::Array(items) => items.iter().collect(),
            Value::Object(keyed) => keyed.values().collect(),
            _ => Vec::new(),
        };

        let parsed = buckets
            .into_iter()
            .map(|bucket| parse_bucket(facet, bucket, is_range))
            .collect();
        stats.insert(name.to_string(), parsed);
    }

    stats
}

fn parse_bucket(facet: &FacetInfoRequest, bucket: &Value, is_range: bool) -> FacetStats {
    let count = bucket
        .get(ROOT_AGGREGATION)
        .and_then(|r| r.get("doc_count"))
        .or_else(|| bucket.get("doc_count"))
        .and_then(Value::as_i64);

    if is_range {
        return FacetStats::range(
            bucket.get("from").and_then(Value::as_f64),
            bucket.get("to").and_then(Value::as_f64),
            count,
        );
    }

    let mut stats = FacetStats::term(bucket.get("key").cloned().unwrap_or(Value::Null), count);
    if let Some(field) = &facet.sum_by_field {
        stats.sum_by_field = Some(field.clone());
        stats.sum_by_value = bucket.get(field).and_then(|s| s.get("value")).and_then(Value::as_f64);
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{SearchableProperty, TypeDescriptor};

    fn schema() -> ModelSchema {
        ModelSchema::builder("Product")
            .property("Brand", TypeDescriptor::string(), SearchableProperty::new().facetable(true))
            .property(
                "Price",
                TypeDescriptor::double(),
                SearchableProperty::new().facetable(true).with_facetable_ranges([10.0, 50.0]),
            )
            .property("Stock", TypeDescriptor::int(), SearchableProperty::new())
            .build()
            .unwrap()
    }

    #[test]
    fn test_terms_aggregation_with_sum() {
        let request = SearchRequest::new().with_facet(
            FacetInfoRequest::new("Brand")
                .with_count(5)
                .with_sum_by_field("Stock"),
        );
        let aggs = build_aggregations(&schema(), &request, &FilterClauses::default())
            .unwrap()
            .unwrap();

        assert_eq!(
            aggs["Brand"],
            json!({
                "terms": {"field": "Brand", "size": 5, "order": {"_count": "desc"}},
                "aggs": {"Stock": {"sum": {"field": "Stock"}}}
            })
        );
    }

    #[test]
    fn test_range_aggregation() {
        let request = SearchRequest::new().with_facet(FacetInfoRequest::new("Price"));
        let aggs = build_aggregations(&schema(), &request, &FilterClauses::default())
            .unwrap()
            .unwrap();

        assert_eq!(
            aggs["Price"]["range"]["ranges"],
            json!([{"to": 10.0}, {"from": 10.0, "to": 50.0}])
        );
    }

    #[test]
    fn test_no_facets() {
        let aggs = build_aggregations(&schema(), &SearchRequest::new(), &FilterClauses::default()).unwrap();
        assert!(aggs.is_none());
    }

    #[test]
    fn test_unknown_facet_fails() {
        let request = SearchRequest::new().with_facet(FacetInfoRequest::new("Color"));
        assert!(build_aggregations(&schema(), &request, &FilterClauses::default()).is_err());
    }

    #[test]
    fn test_parse_buckets() {
        let request = SearchRequest::new()
            .with_facet(FacetInfoRequest::new("Brand").with_sum_by_field("Stock"))
            .with_facet(FacetInfoRequest::new("Price"));
        let aggregations = json!({
            "Brand": {"buckets": [{"key": "acme", "doc_count": 4, "Stock": {"value": 12.0}}]},
            "Price": {"buckets": [
                {"key": "*-10.0", "to": 10.0, "doc_count": 1},
                {"key": "10.0-50.0", "from": 10.0, "to": 50.0, "doc_count": 2}
            ]}
        });

        let stats = parse_aggregations(&schema(), &request, &aggregations);

        let brand = &stats["Brand"][0];
        assert_eq!(brand.value, Some(json!("acme")));
        assert_eq!(brand.count, Some(4));
        assert_eq!(brand.sum_by_field.as_deref(), Some("Stock"));
        assert_eq!(brand.sum_by_value, Some(12.0));

        assert_eq!(stats["Price"][0], FacetStats::range(None, Some(10.0), Some(1)));
        assert_eq!(stats["Price"][1], FacetStats::range(Some(10.0), Some(50.0), Some(2)));
    }
}
