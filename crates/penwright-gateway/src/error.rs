//! Gateway error types.
//!
//! Every failed call is classified into one of these kinds. Classification
//! decides which notice (if any) is shown; the error is always returned to the
//! caller afterwards.

use thiserror::Error;

/// A result type using `GatewayError`.
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Errors produced by gateway calls.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// No response arrived before the request deadline.
    #[error("request timed out")]
    Timeout,

    /// The request never produced a response for another reason.
    #[error("connection failed: {0}")]
    Connect(String),

    /// The server rejected the credential (401).
    #[error("unauthorized")]
    Unauthorized,

    /// The server rejected the request (400).
    #[error("bad request: {message}")]
    BadRequest {
        /// Message extracted from the response body.
        message: String,
    },

    /// The resource does not exist (404).
    #[error("resource not found")]
    NotFound,

    /// The service is temporarily down (503).
    #[error("service unavailable")]
    ServiceUnavailable,

    /// Any other 5xx response.
    #[error("server error ({status}): {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the response body.
        message: String,
    },

    /// A status the gateway does not handle itself (e.g. 403, 409, 422).
    #[error("unexpected status {status}")]
    Unclassified {
        /// HTTP status code.
        status: u16,
        /// Response body, when it was JSON.
        body: Option<serde_json::Value>,
    },

    /// A successful response body could not be decoded.
    #[error("failed to parse response: {0}")]
    Decode(String),

    /// A request body could not be encoded.
    #[error("failed to encode request: {0}")]
    Encode(String),

    /// The request URL could not be built from the configured base URL.
    #[error("invalid request URL: {0}")]
    InvalidUrl(String),

    /// The HTTP client could not be constructed.
    #[error("HTTP client setup failed: {0}")]
    Setup(String),
}

impl GatewayError {
    /// The HTTP status behind this error, if a response was received.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::BadRequest { .. } => Some(400),
            Self::NotFound => Some(404),
            Self::ServiceUnavailable => Some(503),
            Self::Server { status, .. } | Self::Unclassified { status, .. } => Some(*status),
            Self::Timeout
            | Self::Connect(_)
            | Self::Decode(_)
            | Self::Encode(_)
            | Self::InvalidUrl(_)
            | Self::Setup(_) => None,
        }
    }

    /// Returns `true` if no response was received at all.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Timeout | Self::Connect(_))
    }
}
