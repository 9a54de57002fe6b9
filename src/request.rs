//! Search requests and their query-string form.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FormatError;
use crate::filter::{
    FilterNode, deserialize_filters_query_string, serialize_filters_to_query_string, url_decode,
    url_encode,
};

/// Default number of records returned.
pub const DEFAULT_LIMIT: usize = 50;

/// Search text matching every document.
pub const MATCH_ALL: &str = "*";

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl FromStr for SortOrder {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(FormatError::shape(format!("unknown sort order '{s}'"))),
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A facet to compute alongside the hits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetInfoRequest {
    /// Facetable property path.
    pub facet_name: String,
    /// Facet ordering, `count` for most frequent first.
    pub sort: String,
    /// Maximum number of buckets.
    pub count: usize,
    /// Explicit bucket boundaries.
    pub values: Vec<f64>,
    /// Property summed per bucket.
    pub sum_by_field: Option<String>,
}

impl FacetInfoRequest {
    /// Create a facet request sorted by count with up to 1000 buckets.
    pub fn new<S: Into<String>>(facet_name: S) -> Self {
        FacetInfoRequest {
            facet_name: facet_name.into(),
            sort: "count".to_string(),
            count: 1000,
            values: Vec::new(),
            sum_by_field: None,
        }
    }

    pub fn with_sort<S: Into<String>>(mut self, sort: S) -> Self {
        self.sort = sort.into();
        self
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    pub fn with_values<I: IntoIterator<Item = f64>>(mut self, values: I) -> Self {
        self.values = values.into_iter().collect();
        self
    }

    pub fn with_sum_by_field<S: Into<String>>(mut self, field: S) -> Self {
        self.sum_by_field = Some(field.into());
        self
    }
}

/// A backend-agnostic search request.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub limit: usize,
    pub offset: usize,
    /// Free text; `*` matches everything.
    pub search_text: String,
    /// Ordering as `(property, direction)` pairs, most significant first.
    pub order_by: Vec<(String, SortOrder)>,
    pub fields_to_highlight: Vec<String>,
    /// Azure scoring profile.
    pub scoring_profile: Option<String>,
    pub facet_info_to_return: Vec<FacetInfoRequest>,
    /// Top-level filters, implicitly joined with AND.
    pub filters: Vec<FilterNode>,
}

impl Default for SearchRequest {
    fn default() -> Self {
        SearchRequest {
            limit: DEFAULT_LIMIT,
            offset: 0,
            search_text: MATCH_ALL.to_string(),
            order_by: Vec::new(),
            fields_to_highlight: Vec::new(),
            scoring_profile: None,
            facet_info_to_return: Vec::new(),
            filters: Vec::new(),
        }
    }
}

/// Values replacing the request's own when writing a query string.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryStringOverrides<'a> {
    pub search_text: Option<&'a str>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub order_by: Option<&'a [(String, SortOrder)]>,
    pub filter_to_add: Option<&'a FilterNode>,
    pub filter_tag_to_remove: Option<&'a str>,
}

impl SearchRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search_text<S: Into<String>>(mut self, text: S) -> Self {
        self.search_text = text.into();
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Add an ordering; an existing entry for the property is replaced in place.
    pub fn with_order_by<S: Into<String>>(mut self, property: S, order: SortOrder) -> Self {
        insert_order(&mut self.order_by, property.into(), order);
        self
    }

    pub fn with_highlight<S: Into<String>>(mut self, field: S) -> Self {
        let field = field.into();
        if !self.fields_to_highlight.contains(&field) {
            self.fields_to_highlight.push(field);
        }
        self
    }

    pub fn with_scoring_profile<S: Into<String>>(mut self, profile: S) -> Self {
        self.scoring_profile = Some(profile.into());
        self
    }

    pub fn with_facet(mut self, facet: FacetInfoRequest) -> Self {
        self.facet_info_to_return.push(facet);
        self
    }

    pub fn with_filter(mut self, filter: FilterNode) -> Self {
        self.filters.push(filter);
        self
    }

    /// Whether the search text matches every document.
    pub fn is_match_all(&self) -> bool {
        let text = self.search_text.trim();
        text.is_empty() || text == MATCH_ALL
    }

    /// Serialize the filters, optionally adding one and dropping a tag.
    pub fn serialize_filters_to_query_string(
        &self,
        filter_to_add: Option<&FilterNode>,
        filter_tag_to_remove: Option<&str>,
    ) -> Result<String, FormatError> {
        serialize_filters_to_query_string(&self.filters, filter_to_add, filter_tag_to_remove)
    }

    /// Replace the filters with those read from a query-string value.
    ///
    /// An empty value leaves the filters unchanged.
    pub fn deserialize_filters_query_string(&mut self, encoded: &str) -> Result<(), FormatError> {
        if encoded.is_empty() {
            return Ok(());
        }
        self.filters = deserialize_filters_query_string(encoded)?;
        Ok(())
    }

    /// Append the orderings read from a query-string value.
    pub fn deserialize_order_by_query_string(&mut self, order_by: &str) {
        for (property, order) in deserialize_order_by_query_string(order_by) {
            insert_order(&mut self.order_by, property, order);
        }
    }

    /// Write the request as `&filters=…&limit=…&offset=…&orderBy=…&searchText=…`.
    pub fn serialize_to_query_string(
        &self,
        overrides: &QueryStringOverrides<'_>,
    ) -> Result<String, FormatError> {
        let filters = self.serialize_filters_to_query_string(
            overrides.filter_to_add,
            overrides.filter_tag_to_remove,
        )?;
        let order_by = serialize_order_by_to_query_string(overrides.order_by.unwrap_or(&self.order_by));
        let search_text = overrides.search_text.unwrap_or(&self.search_text);

        Ok(format!(
            "&filters={}&limit={}&offset={}&orderBy={}&searchText={}",
            filters,
            overrides.limit.unwrap_or(self.limit),
            overrides.offset.unwrap_or(self.offset),
            url_encode(&order_by),
            url_encode(search_text),
        ))
    }

    /// Read a request written by [`serialize_to_query_string`](Self::serialize_to_query_string).
    ///
    /// Unknown parameters are ignored and missing ones keep their defaults.
    pub fn from_query_string(query: &str) -> Result<Self, FormatError> {
        let mut request = SearchRequest::default();
        let query = query.trim_start_matches(['?', '&']);

        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            match key {
                "filters" => request.deserialize_filters_query_string(value)?,
                "limit" => request.limit = parse_count("limit", value)?,
                "offset" => request.offset = parse_count("offset", value)?,
                "orderBy" => request.deserialize_order_by_query_string(&url_decode(value)?),
                "searchText" => {
                    let text = url_decode(value)?;
                    if !text.is_empty() {
                        request.search_text = text;
                    }
                }
                _ => {}
            }
        }

        Ok(request)
    }
}

fn parse_count(name: &str, value: &str) -> Result<usize, FormatError> {
    value
        .parse()
        .map_err(|_| FormatError::shape(format!("{name} must be a non-negative integer, found '{value}'")))
}

fn insert_order(order_by: &mut Vec<(String, SortOrder)>, property: String, order: SortOrder) {
    match order_by.iter_mut().find(|(p, _)| *p == property) {
        Some(entry) => entry.1 = order,
        None => order_by.push((property, order)),
    }
}

/// Join orderings as `"<property> <asc|desc>"` pairs separated by `,`.
pub fn serialize_order_by_to_query_string(order_by: &[(String, SortOrder)]) -> String {
    order_by
        .iter()
        .map(|(property, order)| format!("{property} {order}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Split orderings written by [`serialize_order_by_to_query_string`].
///
/// Entries that are not exactly two space-separated tokens, or whose direction
/// is unknown, are dropped.
pub fn deserialize_order_by_query_string(order_by: &str) -> Vec<(String, SortOrder)> {
    order_by
        .split(',')
        .filter_map(|entry| {
            let parts: Vec<&str> = entry.split(' ').collect();
            match parts.as_slice() {
                [property, order] if !property.is_empty() => order
                    .parse()
                    .ok()
                    .map(|order| (property.to_string(), order)),
                _ => None,
            }
        })
        .collect()
}
