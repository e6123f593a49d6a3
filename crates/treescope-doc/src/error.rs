use thiserror::Error;
use treescope_core::TreeError;

#[derive(Debug, Error)]
/// Error type for reading, validating, building and caching tree documents.
pub enum DocumentError {
    #[error("failed to read or write tree file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse tree JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{path}: missing required field '{field}'")]
    MissingField { path: String, field: &'static str },

    #[error("{path}: field '{field}' {reason}")]
    InvalidField {
        path: String,
        field: &'static str,
        reason: String,
    },

    #[error("{path}: expected an object")]
    NotAnObject { path: String },

    #[error("cache key '{key}' may only contain ASCII letters, digits, '-' and '_'")]
    InvalidCacheKey { key: String },

    #[error(transparent)]
    Tree(#[from] TreeError),
}
