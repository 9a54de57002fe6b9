//! Parsing of `_search` responses.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::backend::NativeResponse;
use crate::elastic::aggregation::parse_aggregations;
use crate::error::QueryError;
use crate::request::SearchRequest;
use crate::result::{SearchResult, SearchResultRecord, deserialize_record, normalize_total};
use crate::schema::ModelSchema;

/// Parse hits, total and aggregations of a `_search` response.
///
/// Highlight fragments are copied as returned; the engine already wraps them
/// in the configured tags.
pub fn parse_search_response<R: DeserializeOwned>(
    schema: &ModelSchema,
    request: &SearchRequest,
    response: &NativeResponse,
    index_name: &str,
) -> Result<SearchResult<R>, QueryError> {
    let hits = response
        .body
        .get("hits")
        .ok_or_else(|| QueryError::malformed("missing 'hits'"))?;

    let mut result = SearchResult::new(index_name);
    result.total_records_found = Some(normalize_total(total_hits(hits)));

    let items = match hits.get("hits") {
        Some(Value::Array(items)) => items.as_slice(),
        Some(_) => return Err(QueryError::malformed("'hits.hits' is not an array")),
        None => &[],
    };

    let key_property = schema.key_property_name();
    for (position, hit) in items.iter().enumerate() {
        let source = hit
            .get("_source")
            .cloned()
            .ok_or_else(|| QueryError::malformed(format!("hit #{position} has no '_source'")))?;

        result.records.push(SearchResultRecord {
            score: hit.get("_score").and_then(Value::as_f64).unwrap_or(0.0),
            highlights: highlights(hit),
            record: deserialize_record(source, position, key_property)?,
        });
    }

    if let Some(aggregations) = response.body.get("aggregations") {
        result.facets_stats = parse_aggregations(schema, request, aggregations);
    }

    Ok(result)
}

/// `hits.total` as a number or as `{"value": n}`.
fn total_hits(hits: &Value) -> Option<i64> {
    match hits.get("total")? {
        Value::Number(n) => n.as_i64(),
        total => total.get("value").and_then(Value::as_i64),
    }
}

fn highlights(hit: &Value) -> HashMap<String, Vec<String>> {
    let Some(Value::Object(fields)) = hit.get("highlight") else {
        return HashMap::new();
    };

    fields
        .iter()
        .map(|(field, fragments)| {
            let fragments = fragments
                .as_array()
                .map(|f| f.iter().filter_map(Value::as_str).map(str::to_string).collect())
                .unwrap_or_default();
            (field.clone(), fragments)
        })
        .collect()
}
