//! Error types for the querybridge library.
//!
//! Errors are grouped by the stage that produces them:
//!
//! - [`SchemaError`]: a model schema is malformed or a property path does not resolve.
//! - [`CompileError`]: a predicate cannot be lowered into the filter model.
//! - [`QueryError`]: a backend call or its response failed.
//! - [`FormatError`]: a serialized filter/query string is malformed.
//!
//! All of them convert into [`QueryBridgeError`], which is what the crate level
//! [`Result`] alias carries.
//!
//! # Examples
//!
//! ```
//! use querybridge::error::{QueryBridgeError, QueryError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(QueryError::unsupported("elasticsearch", "suggest").into())
//! }
//!
//! match example_operation() {
//!     Err(QueryBridgeError::Query(QueryError::Unsupported { backend, .. })) => {
//!         assert_eq!(backend, "elasticsearch")
//!     }
//!     _ => unreachable!(),
//! }
//! ```

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Errors raised while describing or resolving a model schema.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// A path segment does not name a member of the model.
    #[error("Unknown member '{member}' on model '{model}'")]
    UnknownMember { member: String, model: String },

    /// A path segment names a method, constructor or event.
    #[error("Member '{member}' of model '{model}' is not a field or property and cannot be searched")]
    NotAccessible { member: String, model: String },

    /// More than one property of a model is marked as key.
    #[error("Model '{model}' declares more than one key property ('{first}' and '{second}')")]
    AmbiguousKey {
        model: String,
        first: String,
        second: String,
    },

    /// Two members of a model share a name.
    #[error("Model '{model}' declares member '{member}' twice")]
    DuplicateMember { model: String, member: String },

    /// The path ends on a member whose type has no primitive value kind.
    #[error("Path '{path}' on model '{model}' does not end on a primitive value")]
    NotAValue { path: String, model: String },

    /// An empty property path was given.
    #[error("Property path on model '{model}' cannot be empty")]
    EmptyPath { model: String },
}

impl SchemaError {
    /// Create a new unknown member error.
    pub fn unknown_member<M: Into<String>, S: Into<String>>(member: M, model: S) -> Self {
        SchemaError::UnknownMember {
            member: member.into(),
            model: model.into(),
        }
    }

    /// Create a new not accessible error.
    pub fn not_accessible<M: Into<String>, S: Into<String>>(member: M, model: S) -> Self {
        SchemaError::NotAccessible {
            member: member.into(),
            model: model.into(),
        }
    }
}

/// Errors raised while compiling a predicate into a filter.
#[derive(Error, Debug)]
pub enum CompileError {
    /// The expression node kind is not part of the supported subset.
    #[error("Unsupported expression: {0}")]
    UnsupportedExpression(String),

    /// The left side of a comparison is not a member access.
    #[error("Left operand of a comparison must be a member access, found {0}")]
    UnsupportedLeftOperand(String),

    /// A value could not be coerced to the conversion's target type.
    #[error("Cannot convert {value} to {target}")]
    InvalidConversion { value: String, target: String },

    /// A method embedded in the predicate failed.
    #[error("Method '{method}' failed: {source}")]
    MethodFailed {
        method: String,
        #[source]
        source: anyhow::Error,
    },

    /// The textual predicate could not be parsed.
    #[error("Syntax error at position {position}: {message}")]
    Syntax { position: usize, message: String },

    /// The compared member does not exist on the model.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl CompileError {
    /// Create a new unsupported expression error.
    pub fn unsupported<S: Into<String>>(msg: S) -> Self {
        CompileError::UnsupportedExpression(msg.into())
    }

    /// Create a new syntax error.
    pub fn syntax<S: Into<String>>(position: usize, msg: S) -> Self {
        CompileError::Syntax {
            position,
            message: msg.into(),
        }
    }
}

/// Errors raised while executing a query against a backend.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    /// The backend answered with a non-success status.
    #[error("Backend rejected the query with status {status}: {body}")]
    BackendRejected { status: u16, body: String },

    /// The backend does not implement the requested capability.
    #[error("{capability} is not supported by the {backend} backend")]
    Unsupported {
        backend: String,
        capability: String,
    },

    /// A returned record could not be deserialized into the requested type.
    #[error("Failed to deserialize result record #{record}{}: {reason}", .key.as_ref().map(|k| format!(" (key {k})")).unwrap_or_default())]
    ResultDeserializationFailed {
        record: usize,
        key: Option<String>,
        reason: String,
    },

    /// The backend response does not have the expected shape.
    #[error("Malformed backend response: {0}")]
    MalformedResponse(String),

    /// The backend did not answer in time.
    #[error("Backend call timed out after {0:?}")]
    Timeout(Duration),

    /// The index handle could not be resolved.
    #[error("Index '{index}' is unavailable: {reason}")]
    IndexUnavailable { index: String, reason: String },
}

impl QueryError {
    /// Create a new backend rejected error.
    pub fn rejected<S: Into<String>>(status: u16, body: S) -> Self {
        QueryError::BackendRejected {
            status,
            body: body.into(),
        }
    }

    /// Create a new unsupported capability error.
    pub fn unsupported<B: Into<String>, C: Into<String>>(backend: B, capability: C) -> Self {
        QueryError::Unsupported {
            backend: backend.into(),
            capability: capability.into(),
        }
    }

    /// Create a new malformed response error.
    pub fn malformed<S: Into<String>>(msg: S) -> Self {
        QueryError::MalformedResponse(msg.into())
    }
}

/// Errors raised while decoding serialized filters.
#[derive(Error, Debug)]
pub enum FormatError {
    /// The payload is not valid JSON once unescaped.
    #[error("Invalid filter JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The JSON is valid but not shaped like a filter list.
    #[error("Invalid filter shape: {0}")]
    InvalidShape(String),

    /// The payload is not valid URL encoding.
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),
}

impl FormatError {
    /// Create a new invalid shape error.
    pub fn shape<S: Into<String>>(msg: S) -> Self {
        FormatError::InvalidShape(msg.into())
    }
}

/// The main error type for querybridge operations.
#[derive(Error, Debug)]
pub enum QueryBridgeError {
    /// Schema errors.
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Predicate compilation errors.
    #[error("Compile error: {0}")]
    Compile(#[from] CompileError),

    /// Backend query errors.
    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    /// Serialized filter format errors.
    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    /// Configuration errors.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// I/O errors (configuration files).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for operations that may fail with QueryBridgeError.
pub type Result<T> = std::result::Result<T, QueryBridgeError>;

impl QueryBridgeError {
    /// Create a new configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        QueryBridgeError::Config(msg.into())
    }
}
