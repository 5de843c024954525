//! Common error types for penwright.
//!
//! This module provides shared error types that are used across multiple crates.

use thiserror::Error;

/// A result type using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core errors that can occur throughout penwright.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A document type name is not part of the catalogue.
    #[error("unknown document type: {0}")]
    UnknownDocType(String),

    /// A persisted user record could not be decoded.
    #[error("malformed user record: {0}")]
    MalformedUser(#[from] serde_json::Error),
}
