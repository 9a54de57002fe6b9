//! Configuration for the search service.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{QueryBridgeError, Result};

/// Default opening tag wrapped around highlighted text.
pub const DEFAULT_HIGHLIGHT_PRE_TAG: &str = "<span class=\"highlight\">";

/// Default closing tag wrapped around highlighted text.
pub const DEFAULT_HIGHLIGHT_POST_TAG: &str = "</span>";

/// Configuration for [`SearchService`](crate::backend::SearchService).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchServiceConfig {
    /// Maps a model's declared index name to the physical index to query.
    pub index_mapping: HashMap<String, String>,

    /// Timeout applied to every backend call.
    #[serde(with = "duration_millis")]
    pub request_timeout: Duration,

    /// Opening highlight tag.
    pub highlight_pre_tag: String,

    /// Closing highlight tag.
    pub highlight_post_tag: String,

    /// Maximum number of suggestions requested from the backend.
    pub suggestion_top: usize,

    /// Whether executed queries are logged at info level.
    pub track_queries: bool,
}

impl Default for SearchServiceConfig {
    fn default() -> Self {
        Self {
            index_mapping: HashMap::new(),
            request_timeout: Duration::from_secs(30),
            highlight_pre_tag: DEFAULT_HIGHLIGHT_PRE_TAG.to_string(),
            highlight_post_tag: DEFAULT_HIGHLIGHT_POST_TAG.to_string(),
            suggestion_top: 8,
            track_queries: false,
        }
    }
}

impl SearchServiceConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from a JSON document. Missing keys keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Check the configuration for values the service cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.request_timeout.is_zero() {
            return Err(QueryBridgeError::config("request_timeout must be greater than zero"));
        }
        if self.suggestion_top == 0 {
            return Err(QueryBridgeError::config("suggestion_top must be greater than zero"));
        }
        if let Some((from, _)) = self.index_mapping.iter().find(|(_, to)| to.is_empty()) {
            return Err(QueryBridgeError::config(format!(
                "index mapping for '{from}' points to an empty index name"
            )));
        }
        Ok(())
    }

    /// Remap an index name through `index_mapping`.
    pub fn physical_index_name<'a>(&'a self, index_name: &'a str) -> &'a str {
        self.index_mapping
            .get(index_name)
            .map(String::as_str)
            .unwrap_or(index_name)
    }

    /// Add an index name mapping.
    pub fn with_index_mapping<F: Into<String>, T: Into<String>>(mut self, from: F, to: T) -> Self {
        self.index_mapping.insert(from.into(), to.into());
        self
    }

    /// Set the backend call timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the highlight tags.
    pub fn with_highlight_tags<P: Into<String>, S: Into<String>>(mut self, pre: P, post: S) -> Self {
        self.highlight_pre_tag = pre.into();
        self.highlight_post_tag = post.into();
        self
    }

    /// Set the number of suggestions requested.
    pub fn with_suggestion_top(mut self, top: usize) -> Self {
        self.suggestion_top = top;
        self
    }

    /// Set whether executed queries are logged.
    pub fn with_track_queries(mut self, track: bool) -> Self {
        self.track_queries = track;
        self
    }
}

mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
