//! Error types for docaccess

use thiserror::Error;

/// The main error type for docaccess operations
#[derive(Debug, Error)]
pub enum AccessError {
    /// An ACL arrived without a single rule to evaluate
    #[error("acl {acl_id} has no rules")]
    AclWithoutRules { acl_id: String },

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("invalid patch: {0}")]
    InvalidPatch(String),

    /// A role name or id with no match in the account roles
    #[error("unknown role: {0}")]
    UnknownRole(String),

    #[error("config error: {0}")]
    Config(String),

    /// The service answered with a non-success status
    #[error("http {status}: {body}")]
    Http { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for docaccess operations
pub type Result<T> = std::result::Result<T, AccessError>;

/// Convert any transport-level error to AccessError
pub fn err<E: std::fmt::Display>(e: E) -> AccessError {
    AccessError::Transport(e.to_string())
}
