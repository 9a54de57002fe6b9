//! The search service: index resolution, execution and parsing.

use std::sync::Arc;

use log::{debug, info};
use serde::de::DeserializeOwned;

use crate::backend::SearchBackend;
use crate::backend::executor::{IndexHandle, IndexResolver, NativeRequest, NativeResponse, QueryExecutor};
use crate::backend::index_cache::IndexCache;
use crate::config::SearchServiceConfig;
use crate::error::{QueryError, Result};
use crate::request::SearchRequest;
use crate::result::{SearchResult, SuggestionResultRecord};
use crate::schema::SearchableModel;

/// Runs typed queries through a backend translator.
///
/// The service holds no per-query state besides the index cache and can be
/// shared across tasks behind an `Arc`.
pub struct SearchService<B: SearchBackend> {
    backend: B,
    executor: Arc<dyn QueryExecutor>,
    resolver: Arc<dyn IndexResolver>,
    config: SearchServiceConfig,
    cache: IndexCache,
}

impl<B: SearchBackend> std::fmt::Debug for SearchService<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchService")
            .field("backend", &self.backend.name())
            .field("config", &self.config)
            .field("cached_indexes", &self.cache.len())
            .finish()
    }
}

impl<B: SearchBackend> SearchService<B> {
    pub fn new(
        backend: B,
        executor: Arc<dyn QueryExecutor>,
        resolver: Arc<dyn IndexResolver>,
        config: SearchServiceConfig,
    ) -> Self {
        SearchService {
            backend,
            executor,
            resolver,
            config,
            cache: IndexCache::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> &SearchServiceConfig {
        &self.config
    }

    pub fn cache(&self) -> &IndexCache {
        &self.cache
    }

    /// Physical index name of model `T`.
    ///
    /// Falls back to the model name when the schema declares no index.
    pub fn index_name<T: SearchableModel>(&self) -> String {
        let schema = T::schema();
        let declared = schema.index_name().unwrap_or(schema.name());
        self.config.physical_index_name(declared).to_string()
    }

    fn index_handle<T: SearchableModel>(&self) -> Result<IndexHandle> {
        let name = self.index_name::<T>();
        Ok(self.cache.get_or_resolve(&name, self.resolver.as_ref())?)
    }

    /// Search the index of model `T`, returning records of type `R`.
    pub async fn query<T, R>(&self, request: &SearchRequest) -> Result<SearchResult<R>>
    where
        T: SearchableModel,
        R: SearchableModel + DeserializeOwned,
    {
        let handle = self.index_handle::<T>()?;
        let native = self.backend.build_query::<T, R>(request, &self.config)?;
        debug!("{} query on '{}': {}", self.backend.name(), handle.name, native.body);

        let response = self.execute(&handle, native).await?;
        let result = self
            .backend
            .parse_response::<T, R>(request, response, &handle.name, &self.config)?;

        if self.config.track_queries {
            info!(
                "search index={} search_id={} query={:?} results={} scoring_profile={}",
                result.index_name,
                result.search_id.as_deref().unwrap_or("-"),
                request.search_text,
                result.total_records_found.unwrap_or(0),
                request.scoring_profile.as_deref().unwrap_or("-"),
            );
        }

        Ok(result)
    }

    /// Suggestions for `search_text` from the named suggester.
    pub async fn suggest<T>(
        &self,
        search_text: &str,
        suggester_name: &str,
        fuzzy: bool,
    ) -> Result<Vec<SuggestionResultRecord<T>>>
    where
        T: SearchableModel + DeserializeOwned,
    {
        let native = self
            .backend
            .build_suggest::<T>(search_text, suggester_name, fuzzy, &self.config)?;
        let handle = self.index_handle::<T>()?;
        debug!("{} suggest on '{}': {}", self.backend.name(), handle.name, native.body);

        let response = self.execute(&handle, native).await?;
        self.backend.parse_suggest::<T>(response)
    }

    /// Execute under the configured timeout, mapping failure statuses.
    async fn execute(&self, handle: &IndexHandle, request: NativeRequest) -> Result<NativeResponse> {
        let timeout = self.config.request_timeout;
        let response = tokio::time::timeout(timeout, self.executor.execute(handle, request))
            .await
            .map_err(|_| QueryError::Timeout(timeout))?
            .map_err(|e| e.into_query_error(&handle.name))?;

        if !response.is_success() {
            let body = match &response.body {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            return Err(QueryError::rejected(response.status, body).into());
        }

        Ok(response)
    }
}
