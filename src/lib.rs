//! # QueryBridge
//!
//! Backend-agnostic search queries for Rust, translated to Azure Search and
//! Elasticsearch.
//!
//! ## Features
//!
//! - Static, declarative model schemas with searchable property metadata
//! - A filter model with a URL-safe query-string format
//! - Predicate compiler over a small expression AST or a textual mini-language
//! - Azure Search (OData filters, facet strings, highlight expansion)
//! - Elasticsearch (Lucene query strings, nested filters, term/range aggregations)
//! - A normalized result model shared by both backends

pub mod azure;
pub mod backend;
pub mod config;
pub mod elastic;
pub mod error;
pub mod filter;
pub mod predicate;
pub mod request;
pub mod result;
pub mod schema;

pub mod prelude {
    pub use crate::azure::AzureBackend;
    pub use crate::backend::{
        IndexHandle, IndexResolver, NativeRequest, NativeResponse, QueryExecutor, SearchBackend,
        SearchService,
    };
    pub use crate::config::SearchServiceConfig;
    pub use crate::elastic::ElasticBackend;
    pub use crate::error::{QueryBridgeError, Result};
    pub use crate::filter::{FilterConnector, FilterLogic, FilterNode, FilterOperator, FilterValue};
    pub use crate::predicate::{Expr, Predicate, compile, member, parse_predicate};
    pub use crate::request::{FacetInfoRequest, SearchRequest, SortOrder};
    pub use crate::result::{FacetStats, SearchResult, SearchResultRecord, SuggestionResultRecord};
    pub use crate::schema::{ModelSchema, SearchableModel, SearchableProperty, ValueKind};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
