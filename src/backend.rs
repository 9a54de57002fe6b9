//! Backend plumbing shared by every translator.
//!
//! A [`SearchBackend`] turns requests into provider-native bodies and parses
//! the provider's answers. Network I/O is delegated to a [`QueryExecutor`]
//! collaborator and index handles to an [`IndexResolver`]; the
//! [`SearchService`] ties them together with an [`IndexCache`].

pub mod executor;
pub mod index_cache;
pub mod service;

pub use executor::{
    BackendError, IndexHandle, IndexResolver, NativeRequest, NativeResponse, QueryExecutor, RequestKind,
};
pub use index_cache::IndexCache;
pub use service::SearchService;

use serde::de::DeserializeOwned;

use crate::config::SearchServiceConfig;
use crate::error::Result;
use crate::request::SearchRequest;
use crate::result::{SearchResult, SuggestionResultRecord};
use crate::schema::SearchableModel;

/// A provider-specific translator.
///
/// Implementations are stateless: building the same request twice yields the
/// same native body.
pub trait SearchBackend: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Build the native search body for model `T`, projecting into `R`.
    fn build_query<T, R>(&self, request: &SearchRequest, config: &SearchServiceConfig) -> Result<NativeRequest>
    where
        T: SearchableModel,
        R: SearchableModel;

    /// Parse a successful native search response.
    fn parse_response<T, R>(
        &self,
        request: &SearchRequest,
        response: NativeResponse,
        index_name: &str,
        config: &SearchServiceConfig,
    ) -> Result<SearchResult<R>>
    where
        T: SearchableModel,
        R: SearchableModel + DeserializeOwned;

    /// Build the native suggestion body.
    fn build_suggest<T>(
        &self,
        search_text: &str,
        suggester_name: &str,
        fuzzy: bool,
        config: &SearchServiceConfig,
    ) -> Result<NativeRequest>
    where
        T: SearchableModel;

    /// Parse a successful native suggestion response.
    fn parse_suggest<T>(&self, response: NativeResponse) -> Result<Vec<SuggestionResultRecord<T>>>
    where
        T: SearchableModel + DeserializeOwned;
}
