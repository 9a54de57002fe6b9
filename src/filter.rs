//! Backend-agnostic filter model.
//!
//! A [`FilterNode`] holds one condition and links to sibling conditions
//! through [`FilterConnector`]s. Lists of filters can be carried in URLs with
//! [`serialize_filters_to_query_string`].

pub mod node;
pub mod query_string;
pub mod value;

pub use node::{FilterConnector, FilterLogic, FilterNode, FilterOperator};
pub use query_string::{
    deserialize_filters_query_string, serialize_filters_to_query_string, url_decode, url_encode,
};
pub use value::FilterValue;
