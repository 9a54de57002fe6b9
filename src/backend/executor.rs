//! Collaborator interfaces for issuing native queries.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::error::QueryError;

/// Which provider endpoint a native request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    Search,
    Suggest,
}

/// A provider-native request body plus the headers it must carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NativeRequest {
    pub kind: RequestKind,
    pub body: Value,
    pub headers: Vec<(String, String)>,
}

impl NativeRequest {
    pub fn new(kind: RequestKind, body: Value) -> Self {
        NativeRequest {
            kind,
            body,
            headers: Vec::new(),
        }
    }

    /// Add a request header.
    pub fn with_header<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// The raw structured answer of a provider.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NativeResponse {
    pub status: u16,
    /// Response headers with lower-cased names.
    pub headers: HashMap<String, String>,
    pub body: Value,
}

impl NativeResponse {
    /// A `200` response with the given body.
    pub fn ok(body: Value) -> Self {
        NativeResponse {
            status: 200,
            headers: HashMap::new(),
            body,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn with_header<K: AsRef<str>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.headers.insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A connection-scoped handle on one physical index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexHandle {
    /// Physical index name.
    pub name: String,
    /// Where the executor should send requests for this index.
    pub location: String,
}

impl IndexHandle {
    pub fn new<N: Into<String>, L: Into<String>>(name: N, location: L) -> Self {
        IndexHandle {
            name: name.into(),
            location: location.into(),
        }
    }
}

/// Failure reported by a [`QueryExecutor`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    /// The provider answered with an error status.
    #[error("status {status}: {body}")]
    Status { status: u16, body: String },

    /// No answer was received.
    #[error("transport failure: {0}")]
    Transport(String),
}

impl BackendError {
    /// Map into the query error surfaced to callers.
    pub fn into_query_error(self, index: &str) -> QueryError {
        match self {
            BackendError::Status { status, body } => QueryError::rejected(status, body),
            BackendError::Transport(reason) => QueryError::IndexUnavailable {
                index: index.to_string(),
                reason,
            },
        }
    }
}

/// Issues already-built native requests against a provider.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use serde_json::json;
/// use querybridge::backend::{BackendError, IndexHandle, NativeRequest, NativeResponse, QueryExecutor};
///
/// struct Canned;
///
/// #[async_trait]
/// impl QueryExecutor for Canned {
///     async fn execute(&self, _index: &IndexHandle, _request: NativeRequest) -> Result<NativeResponse, BackendError> {
///         Ok(NativeResponse::ok(json!({"value": []})))
///     }
/// }
/// ```
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn execute(&self, index: &IndexHandle, request: NativeRequest) -> Result<NativeResponse, BackendError>;
}

/// Resolves physical index names to handles.
pub trait IndexResolver: Send + Sync {
    fn index_handle(&self, index_name: &str) -> Result<IndexHandle, QueryError>;
}
