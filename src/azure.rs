//! Azure-style translator.
//!
//! Requests become bodies for the Azure Search REST API: an OData `filter`,
//! `select`/`facets`/`orderby` parameters and fixed search options. Responses
//! are read from the `value`, `@odata.count` and `@search.facets` members.

pub mod filter;
pub mod query;
pub mod response;

pub use filter::{render_condition, render_filters, render_value};
pub use query::{build_search_body, build_suggest_body, facet_expression};
pub use response::{SEARCH_ID_HEADER, parse_search_response, parse_suggest_response};

use serde::de::DeserializeOwned;

use crate::backend::{NativeRequest, NativeResponse, RequestKind, SearchBackend};
use crate::config::SearchServiceConfig;
use crate::error::Result;
use crate::request::SearchRequest;
use crate::result::{SearchResult, SuggestionResultRecord};
use crate::schema::SearchableModel;

/// Request header asking the service to return a search id.
pub const RETURN_SEARCH_ID_HEADER: &str = "x-ms-azs-return-searchid";

/// Translator for Azure Search.
#[derive(Debug, Clone, Copy, Default)]
pub struct AzureBackend;

impl AzureBackend {
    pub fn new() -> Self {
        AzureBackend
    }
}

impl SearchBackend for AzureBackend {
    fn name(&self) -> &'static str {
        "azure"
    }

    fn build_query<T, R>(&self, request: &SearchRequest, config: &SearchServiceConfig) -> Result<NativeRequest>
    where
        T: SearchableModel,
        R: SearchableModel,
    {
        let body = build_search_body(T::schema(), R::schema(), request, config)?;
        Ok(NativeRequest::new(RequestKind::Search, body).with_header(RETURN_SEARCH_ID_HEADER, "true"))
    }

    fn parse_response<T, R>(
        &self,
        request: &SearchRequest,
        response: NativeResponse,
        index_name: &str,
        config: &SearchServiceConfig,
    ) -> Result<SearchResult<R>>
    where
        T: SearchableModel,
        R: SearchableModel + DeserializeOwned,
    {
        Ok(parse_search_response(
            request,
            &response,
            index_name,
            T::schema().key_property_name(),
            &config.highlight_pre_tag,
            &config.highlight_post_tag,
        )?)
    }

    fn build_suggest<T>(
        &self,
        search_text: &str,
        suggester_name: &str,
        fuzzy: bool,
        config: &SearchServiceConfig,
    ) -> Result<NativeRequest>
    where
        T: SearchableModel,
    {
        let body = build_suggest_body(T::schema(), search_text, suggester_name, fuzzy, config);
        Ok(NativeRequest::new(RequestKind::Suggest, body))
    }

    fn parse_suggest<T>(&self, response: NativeResponse) -> Result<Vec<SuggestionResultRecord<T>>>
    where
        T: SearchableModel + DeserializeOwned,
    {
        Ok(parse_suggest_response(&response, T::schema().key_property_name())?)
    }
}
