//! The auth controller.
//!
//! Wires an [`AuthState`] to an [`HttpGateway`]: the state is the gateway's
//! credential source and its unauthorized listener, and the controller drives
//! login and registration through the gateway.

use std::sync::Arc;

use tokio::sync::broadcast;

use penwright_core::{
    CredentialSource, LoginRequest, RegisterRequest, Session, SessionEvent, SessionState,
    UserProfile,
};
use penwright_gateway::{GatewayConfig, HttpGateway, Notifier};
use penwright_store::SessionStore;

use crate::client::AuthClient;
use crate::error::Result;
use crate::state::AuthState;

/// Owns the live session and mediates login, registration and logout.
pub struct AuthController {
    state: Arc<AuthState>,
    client: AuthClient,
}

impl AuthController {
    /// Build a controller and its gateway.
    ///
    /// The session is reconstructed from `store`; call
    /// [`AuthController::restore_user`] afterwards to load the cached profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or the HTTP client cannot
    /// be built.
    pub fn new(
        config: GatewayConfig,
        store: Arc<dyn SessionStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let state = Arc::new(AuthState::load(store)?);
        let gateway = HttpGateway::new(config, state.clone(), notifier)?;
        gateway.on_unauthorized(state.clone());

        Ok(Self {
            state,
            client: AuthClient::new(gateway),
        })
    }

    /// The gateway carrying this session's credential.
    #[must_use]
    pub fn gateway(&self) -> &HttpGateway {
        self.client.gateway()
    }

    /// The session as a credential source, for route guards.
    #[must_use]
    pub fn credentials(&self) -> Arc<dyn CredentialSource> {
        self.state.clone()
    }

    /// Subscribe to session events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.state.subscribe()
    }

    /// Returns `true` iff a non-empty token is held.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated()
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state.state()
    }

    /// A snapshot of the current session.
    #[must_use]
    pub fn session(&self) -> Session {
        self.state.session()
    }

    /// The cached user profile, if loaded.
    #[must_use]
    pub fn current_user(&self) -> Option<UserProfile> {
        self.state.current_user()
    }

    /// Install a session and persist it. See [`AuthState::set_auth`].
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be persisted.
    pub fn set_auth(&self, token: &str, user: UserProfile) -> Result<()> {
        self.state.set_auth(token, user)
    }

    /// End the session. See [`AuthState::logout`].
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn logout(&self) -> Result<()> {
        self.state.logout()
    }

    /// Load the cached profile. See [`AuthState::restore_user`].
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    pub fn restore_user(&self) -> Result<Option<UserProfile>> {
        self.state.restore_user()
    }

    /// Log in and install the returned session.
    ///
    /// # Errors
    ///
    /// Returns the gateway failure unchanged (its notice has already been
    /// shown), or a store error if the session cannot be persisted.
    pub async fn login(&self, username: &str, password: &str) -> Result<UserProfile> {
        let req = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let resp = self.client.login(&req).await?;
        self.state.set_auth(&resp.token, resp.user.clone())?;
        Ok(resp.user)
    }

    /// Register and install the returned session.
    ///
    /// # Errors
    ///
    /// Returns the gateway failure unchanged (its notice has already been
    /// shown), or a store error if the session cannot be persisted.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        display_name: &str,
    ) -> Result<UserProfile> {
        let req = RegisterRequest {
            username: username.to_string(),
            password: password.to_string(),
            display_name: display_name.to_string(),
        };
        let resp = self.client.register(&req).await?;
        self.state.set_auth(&resp.token, resp.user.clone())?;
        Ok(resp.user)
    }
}
