//! Auth endpoint client for login and registration.
//!
//! This module wraps the two auth endpoints of the writing server. Calls go
//! through the shared [`HttpGateway`], so failures are classified and
//! notified there before reaching the caller.

use penwright_core::{AuthResponse, LoginRequest, RegisterRequest};
use penwright_gateway::{GatewayError, HttpGateway};

/// Login endpoint, relative to the API base.
pub const LOGIN_PATH: &str = "/auth/login";

/// Registration endpoint, relative to the API base.
pub const REGISTER_PATH: &str = "/auth/register";

/// Client for the auth endpoints.
#[derive(Debug, Clone)]
pub struct AuthClient {
    gateway: HttpGateway,
}

impl AuthClient {
    /// Create a client that sends through `gateway`.
    #[must_use]
    pub fn new(gateway: HttpGateway) -> Self {
        Self { gateway }
    }

    /// The gateway used for calls.
    #[must_use]
    pub fn gateway(&self) -> &HttpGateway {
        &self.gateway
    }

    /// Authenticate with username and password.
    ///
    /// # Errors
    ///
    /// Returns the classified gateway failure, e.g.
    /// `GatewayError::Unauthorized` for wrong credentials.
    pub async fn login(&self, req: &LoginRequest) -> Result<AuthResponse, GatewayError> {
        tracing::debug!(username = %req.username, "Logging in");
        self.gateway.post_json(LOGIN_PATH, req).await
    }

    /// Create an account and authenticate as it.
    ///
    /// # Errors
    ///
    /// Returns the classified gateway failure, e.g.
    /// `GatewayError::BadRequest` when the username is taken.
    pub async fn register(&self, req: &RegisterRequest) -> Result<AuthResponse, GatewayError> {
        tracing::debug!(username = %req.username, "Registering");
        self.gateway.post_json(REGISTER_PATH, req).await
    }
}
