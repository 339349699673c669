//! Provider error types
//!
//! Errors that callers need to tell apart. Everything else travels as
//! `anyhow::Error` with context attached at each boundary.

use thiserror::Error;

/// Errors raised by the provider and its resource handlers
#[derive(Error, Debug)]
pub enum ProviderError {
    /// One or more configuration problems found before any API call
    #[error("invalid configuration: {}", .0.join("; "))]
    InvalidConfig(Vec<String>),

    /// A resource with this ID already exists upstream and must be imported
    #[error(
        "a resource with the ID {id:?} already exists - to be managed it needs to be imported into the state as {resource_type:?}"
    )]
    AlreadyExists { resource_type: String, id: String },

    /// The resource does not exist upstream
    #[error("cannot import non-existent remote object {id:?}")]
    NotFound { id: String },

    /// The returned entity is not the concrete variant the resource manages
    #[error("classifying {kind} {id}: Expected: {expected:?} Received: {received:?}")]
    SchemaMismatch {
        kind: String,
        id: String,
        expected: String,
        received: String,
    },

    #[error("parsing resource ID: {0}")]
    InvalidId(String),

    #[error("{operation} did not complete within {seconds}s")]
    Timeout { operation: String, seconds: u64 },

    #[error("unknown resource type: {0}")]
    UnknownResource(String),
}

impl ProviderError {
    /// Shorthand for a single configuration problem
    pub fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(vec![message.into()])
    }
}
