//! Parsing of Azure search and suggest responses.

use std::collections::HashMap;

use log::warn;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::backend::NativeResponse;
use crate::error::QueryError;
use crate::request::SearchRequest;
use crate::result::{
    FacetStats, SearchResult, SearchResultRecord, SuggestionResultRecord, deserialize_record, normalize_total,
};

/// Response header carrying the search id.
pub const SEARCH_ID_HEADER: &str = "x-ms-azs-searchid";

const SCORE: &str = "@search.score";
const HIGHLIGHTS: &str = "@search.highlights";
const SUGGEST_TEXT: &str = "@search.text";

/// Parse a `docs/search` response.
pub fn parse_search_response<R: DeserializeOwned>(
    request: &SearchRequest,
    response: &NativeResponse,
    index_name: &str,
    key_property: Option<&str>,
    pre_tag: &str,
    post_tag: &str,
) -> Result<SearchResult<R>, QueryError> {
    let body = &response.body;
    let mut result = SearchResult::new(index_name);
    result.search_id = response.header(SEARCH_ID_HEADER).map(str::to_string);
    result.total_records_found = Some(normalize_total(body.get("@odata.count").and_then(Value::as_i64)));

    for (position, item) in documents(body)?.iter().enumerate() {
        let Value::Object(fields) = item else {
            return Err(QueryError::malformed(format!("search result #{position} is not an object")));
        };
        let mut document = fields.clone();

        let score = document.remove(SCORE).and_then(|s| s.as_f64()).unwrap_or(0.0);
        let highlights = document
            .remove(HIGHLIGHTS)
            .map(|h| expand_highlights(&h, &document, pre_tag, post_tag))
            .unwrap_or_default();
        document.retain(|k, _| !k.starts_with("@search."));

        let record = deserialize_record(Value::Object(document), position, key_property)?;
        result.records.push(SearchResultRecord {
            score,
            highlights,
            record,
        });
    }

    if let Some(Value::Object(facets)) = body.get("@search.facets") {
        result.facets_stats = parse_facets(request, facets);
    }

    Ok(result)
}

/// Parse a `docs/suggest` response.
pub fn parse_suggest_response<T: DeserializeOwned>(
    response: &NativeResponse,
    key_property: Option<&str>,
) -> Result<Vec<SuggestionResultRecord<T>>, QueryError> {
    let mut suggestions = Vec::new();

    for (position, item) in documents(&response.body)?.iter().enumerate() {
        let Value::Object(fields) = item else {
            return Err(QueryError::malformed(format!("suggestion #{position} is not an object")));
        };
        let mut document = fields.clone();
        let text = match document.remove(SUGGEST_TEXT) {
            Some(Value::String(text)) => text,
            _ => String::new(),
        };
        document.retain(|k, _| !k.starts_with("@search."));

        suggestions.push(SuggestionResultRecord {
            record: deserialize_record(Value::Object(document), position, key_property)?,
            text_with_highlights: text,
        });
    }

    Ok(suggestions)
}

fn documents(body: &Value) -> Result<&Vec<Value>, QueryError> {
    match body.get("value") {
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(QueryError::malformed("'value' is not an array")),
        None => Err(QueryError::malformed("missing 'value'")),
    }
}

/// Re-wrap highlighted fragments inside the full field text.
///
/// Each fragment is located in the document value with its tags stripped and
/// replaced by the tagged fragment, yielding one entry per field. Fields that
/// are not text in the document keep the fragments as returned.
fn expand_highlights(
    highlights: &Value,
    document: &Map<String, Value>,
    pre_tag: &str,
    post_tag: &str,
) -> HashMap<String, Vec<String>> {
    let Value::Object(fields) = highlights else {
        return HashMap::new();
    };

    let mut expanded = HashMap::new();
    for (field, fragments) in fields {
        let fragments: Vec<&str> = fragments
            .as_array()
            .map(|f| f.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        let Some(source) = field_text(document, field) else {
            warn!("highlighted field '{field}' has no text in the document");
            expanded.insert(field.clone(), fragments.iter().map(|f| f.to_string()).collect());
            continue;
        };

        let mut text = source.to_string();
        for fragment in fragments {
            let plain = fragment.replace(pre_tag, "").replace(post_tag, "");
            if !plain.is_empty() {
                text = text.replace(&plain, fragment);
            }
        }
        expanded.insert(field.clone(), vec![text]);
    }

    expanded
}

/// Text value of a `/`-separated field path.
fn field_text<'a>(document: &'a Map<String, Value>, field: &str) -> Option<&'a str> {
    let mut segments = field.split('/');
    let mut current = document.get(segments.next()?)?;
    for segment in segments {
        current = current.get(segment)?;
    }
    current.as_str()
}

fn parse_facets(request: &SearchRequest, facets: &Map<String, Value>) -> HashMap<String, Vec<FacetStats>> {
    let mut stats = HashMap::new();

    for (name, buckets) in facets {
        let facet_name = request
            .facet_info_to_return
            .iter()
            .map(|f| f.facet_name.as_str())
            .find(|f| f.replace('.', "/") == *name);
        let Some(facet_name) = facet_name else {
            warn!("ignoring facet '{name}' that was not requested");
            continue;
        };

        let buckets = buckets
            .as_array()
            .map(|b| b.iter().map(parse_bucket).collect())
            .unwrap_or_default();
        stats.insert(facet_name.to_string(), buckets);
    }

    stats
}

fn parse_bucket(bucket: &Value) -> FacetStats {
    FacetStats {
        value: bucket.get("value").filter(|v| !v.is_null()).cloned(),
        count: bucket.get("count").and_then(Value::as_i64),
        from: bucket.get("from").and_then(Value::as_f64),
        to: bucket.get("to").and_then(Value::as_f64),
        ..Default::default()
    }
}
