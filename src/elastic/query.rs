//! Search body for the Elasticsearch `_search` endpoint.

use serde_json::{Map, Value, json};

use crate::config::SearchServiceConfig;
use crate::elastic::aggregation::build_aggregations;
use crate::elastic::filter::group_filters;
use crate::error::SchemaError;
use crate::request::SearchRequest;
use crate::schema::ModelSchema;

/// Build a `_search` body: a bool query with the free-text query in `must`
/// and the rendered filters in `filter`, plus sort, aggregations and
/// highlighting.
pub fn build_search_body(
    schema: &ModelSchema,
    request: &SearchRequest,
    config: &SearchServiceConfig,
) -> Result<Value, SchemaError> {
    let clauses = group_filters(schema, &request.filters)?;

    let mut filter = Vec::new();
    if let Some(root) = &clauses.root {
        filter.push(json!({"query_string": {"query": root}}));
    }
    for (path, query) in &clauses.nested {
        filter.push(json!({
            "nested": {"path": path, "query": {"query_string": {"query": query}}}
        }));
    }

    let mut bool_query = Map::new();
    bool_query.insert("must".to_string(), json!([text_query(schema, request)]));
    if !filter.is_empty() {
        bool_query.insert("filter".to_string(), Value::Array(filter));
    }

    let mut body = Map::new();
    body.insert("from".to_string(), json!(request.offset));
    body.insert("size".to_string(), json!(request.limit));
    body.insert("query".to_string(), json!({"bool": bool_query}));

    if !request.order_by.is_empty() {
        let sort: Vec<Value> = request
            .order_by
            .iter()
            .map(|(field, order)| json!({field.as_str(): {"order": order.as_str()}}))
            .collect();
        body.insert("sort".to_string(), Value::Array(sort));
    }

    if let Some(aggs) = build_aggregations(schema, request, &clauses)? {
        body.insert("aggs".to_string(), aggs);
    }

    let highlight_fields = highlight_fields(schema, request);
    if !highlight_fields.is_empty() {
        body.insert(
            "highlight".to_string(),
            json!({
                "pre_tags": [config.highlight_pre_tag],
                "post_tags": [config.highlight_post_tag],
                "number_of_fragments": 0,
                "encoder": "html",
                "fields": highlight_fields,
            }),
        );
    }

    Ok(Value::Object(body))
}

/// `match_all` for `*`, else a query string over the searchable properties.
fn text_query(schema: &ModelSchema, request: &SearchRequest) -> Value {
    if request.is_match_all() {
        return json!({"match_all": {}});
    }

    let fields: Vec<String> = schema
        .searchable_properties()
        .into_iter()
        .map(|(name, attrs)| {
            if attrs.searchable_boost > 0.0 {
                format!("{name}^{}", attrs.searchable_boost)
            } else {
                name.to_string()
            }
        })
        .collect();

    let mut query = Map::new();
    query.insert("query".to_string(), json!(request.search_text));
    if !fields.is_empty() {
        query.insert("fields".to_string(), json!(fields));
    }
    json!({"query_string": query})
}

/// Searchable properties followed by any other requested fields.
fn highlight_fields(schema: &ModelSchema, request: &SearchRequest) -> Map<String, Value> {
    let mut fields = Map::new();
    for name in schema.searchable_property_names() {
        fields.insert(name.to_string(), json!({}));
    }
    for name in &request.fields_to_highlight {
        fields.entry(name.clone()).or_insert_with(|| json!({}));
    }
    fields
}
