//! Authentication error types.

use thiserror::Error;

use penwright_core::CoreError;
use penwright_gateway::GatewayError;
use penwright_store::StoreError;

/// A result type using `AuthError`.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Errors that can occur while managing the session.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The login or registration call failed. The gateway has already
    /// shown any notice for it.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// The persisted session could not be read or written.
    #[error("session store error: {0}")]
    Store(#[from] StoreError),

    /// The user profile could not be encoded for persistence.
    #[error("profile encoding failed: {0}")]
    Encode(#[from] CoreError),
}

impl AuthError {
    /// Returns `true` if the server rejected the credentials or token.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Gateway(GatewayError::Unauthorized))
    }
}
