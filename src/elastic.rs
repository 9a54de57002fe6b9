//! Elasticsearch-style translator.
//!
//! Filters render to Lucene query-string syntax. Conditions on nested paths
//! are grouped into `nested` queries, and facets on nested paths into
//! `nested` aggregations that count root documents through `reverse_nested`.

pub mod aggregation;
pub mod filter;
pub mod query;
pub mod response;

pub use aggregation::{build_aggregations, parse_aggregations};
pub use filter::{FilterClauses, group_filters, nested_path, render_condition};
pub use query::build_search_body;
pub use response::parse_search_response;

use serde::de::DeserializeOwned;

use crate::backend::{NativeRequest, NativeResponse, RequestKind, SearchBackend};
use crate::config::SearchServiceConfig;
use crate::error::{QueryError, Result};
use crate::request::SearchRequest;
use crate::result::{SearchResult, SuggestionResultRecord};
use crate::schema::SearchableModel;

/// Translator for Elasticsearch.
#[derive(Debug, Clone, Copy, Default)]
pub struct ElasticBackend;

impl ElasticBackend {
    pub fn new() -> Self {
        ElasticBackend
    }
}

impl SearchBackend for ElasticBackend {
    fn name(&self) -> &'static str {
        "elasticsearch"
    }

    fn build_query<T, R>(&self, request: &SearchRequest, config: &SearchServiceConfig) -> Result<NativeRequest>
    where
        T: SearchableModel,
        R: SearchableModel,
    {
        let body = build_search_body(T::schema(), request, config)?;
        Ok(NativeRequest::new(RequestKind::Search, body))
    }

    fn parse_response<T, R>(
        &self,
        request: &SearchRequest,
        response: NativeResponse,
        index_name: &str,
        _config: &SearchServiceConfig,
    ) -> Result<SearchResult<R>>
    where
        T: SearchableModel,
        R: SearchableModel + DeserializeOwned,
    {
        Ok(parse_search_response(T::schema(), request, &response, index_name)?)
    }

    fn build_suggest<T>(
        &self,
        _search_text: &str,
        _suggester_name: &str,
        _fuzzy: bool,
        _config: &SearchServiceConfig,
    ) -> Result<NativeRequest>
    where
        T: SearchableModel,
    {
        Err(QueryError::unsupported(self.name(), "suggest").into())
    }

    fn parse_suggest<T>(&self, _response: NativeResponse) -> Result<Vec<SuggestionResultRecord<T>>>
    where
        T: SearchableModel + DeserializeOwned,
    {
        Err(QueryError::unsupported(self.name(), "suggest").into())
    }
}
