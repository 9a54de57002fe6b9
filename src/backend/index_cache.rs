//! Cache of resolved index handles.

use ahash::AHashMap;
use log::debug;
use parking_lot::RwLock;

use crate::backend::executor::{IndexHandle, IndexResolver};
use crate::error::QueryError;

/// Index handles keyed by physical index name.
///
/// Lookups take the read lock; a miss resolves the handle under the write
/// lock after checking again, so concurrent first access resolves it once.
#[derive(Debug, Default)]
pub struct IndexCache {
    handles: RwLock<AHashMap<String, IndexHandle>>,
}

impl IndexCache {
    pub fn new() -> Self {
        IndexCache::default()
    }

    /// Cached handle for `index_name`, if any.
    pub fn get(&self, index_name: &str) -> Option<IndexHandle> {
        self.handles.read().get(index_name).cloned()
    }

    /// Return the cached handle or resolve and insert it.
    pub fn get_or_resolve(&self, index_name: &str, resolver: &dyn IndexResolver) -> Result<IndexHandle, QueryError> {
        if let Some(handle) = self.get(index_name) {
            return Ok(handle);
        }

        let mut handles = self.handles.write();
        if let Some(handle) = handles.get(index_name) {
            return Ok(handle.clone());
        }

        debug!("index cache miss for '{index_name}'");
        let handle = resolver.index_handle(index_name)?;
        handles.insert(index_name.to_string(), handle.clone());
        Ok(handle)
    }

    pub fn len(&self) -> usize {
        self.handles.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.read().is_empty()
    }

    /// Drop every cached handle.
    pub fn clear(&self) {
        self.handles.write().clear();
    }
}
