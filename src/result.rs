//! Normalized search results shared by every backend.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::QueryError;

/// One bucket of a facet.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FacetStats {
    /// Bucket key for term facets.
    pub value: Option<Value>,
    pub count: Option<i64>,
    /// Lower bound of a range bucket.
    pub from: Option<f64>,
    /// Upper bound of a range bucket.
    pub to: Option<f64>,
    /// Property summed within the bucket.
    pub sum_by_field: Option<String>,
    pub sum_by_value: Option<f64>,
}

impl FacetStats {
    /// A term bucket.
    pub fn term(value: Value, count: Option<i64>) -> Self {
        FacetStats {
            value: Some(value),
            count,
            ..Default::default()
        }
    }

    /// A range bucket.
    pub fn range(from: Option<f64>, to: Option<f64>, count: Option<i64>) -> Self {
        FacetStats {
            from,
            to,
            count,
            ..Default::default()
        }
    }

    pub fn is_range(&self) -> bool {
        self.from.is_some() || self.to.is_some()
    }
}

/// A matched record with its score and highlights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResultRecord<T> {
    pub score: f64,
    /// Highlighted fragments per field.
    pub highlights: HashMap<String, Vec<String>>,
    pub record: T,
}

impl<T> SearchResultRecord<T> {
    pub fn new(record: T, score: f64) -> Self {
        SearchResultRecord {
            score,
            highlights: HashMap::new(),
            record,
        }
    }

    /// First highlighted fragment of a field.
    pub fn highlighted_text(&self, field: &str) -> Option<&str> {
        self.highlights
            .get(field)
            .and_then(|fragments| fragments.first())
            .map(String::as_str)
    }
}

/// Result of a search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult<T> {
    /// Backend-issued identifier of the search (Azure only).
    pub search_id: Option<String>,
    pub index_name: String,
    pub records: Vec<SearchResultRecord<T>>,
    pub total_records_found: Option<i64>,
    pub facets_stats: HashMap<String, Vec<FacetStats>>,
}

impl<T> SearchResult<T> {
    pub fn new<S: Into<String>>(index_name: S) -> Self {
        SearchResult {
            search_id: None,
            index_name: index_name.into(),
            records: Vec::new(),
            total_records_found: Some(0),
            facets_stats: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Facet buckets for a facet name.
    pub fn facet(&self, name: &str) -> Option<&[FacetStats]> {
        self.facets_stats.get(name).map(Vec::as_slice)
    }
}

/// A suggestion: the matched record and the suggested text with highlights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionResultRecord<T> {
    pub record: T,
    pub text_with_highlights: String,
}

/// Deserialize the document at `position` of a result set.
///
/// Failures name the record position and, when the model declares one, the
/// record's key value.
pub(crate) fn deserialize_record<R: DeserializeOwned>(
    document: Value,
    position: usize,
    key_property: Option<&str>,
) -> Result<R, QueryError> {
    let key = key_property
        .and_then(|k| document.get(k))
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        });

    serde_json::from_value(document).map_err(|e| QueryError::ResultDeserializationFailed {
        record: position,
        key,
        reason: e.to_string(),
    })
}

/// Normalize a backend total: negative counts mean "unknown" and become `0`.
pub(crate) fn normalize_total(total: Option<i64>) -> i64 {
    total.filter(|t| *t >= 0).unwrap_or(0)
}
