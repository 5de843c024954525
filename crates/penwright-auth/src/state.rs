//! The live session and its synchronization with the persisted store.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::broadcast;

use penwright_core::{CredentialSource, Session, SessionEvent, SessionState, UserProfile};
use penwright_gateway::UnauthorizedListener;
use penwright_store::{keys, SessionStore};

use crate::error::Result;

/// Capacity of the session event channel.
const EVENT_CAPACITY: usize = 16;

/// Owner of the in-memory session.
///
/// Every mutation of the session goes through this type, which keeps the
/// persisted store in step with memory and publishes a [`SessionEvent`] for
/// each transition.
pub struct AuthState {
    store: Arc<dyn SessionStore>,
    session: RwLock<Session>,
    events: broadcast::Sender<SessionEvent>,
}

impl AuthState {
    /// Reconstruct the session from `store`.
    ///
    /// The session starts logged in iff a token was persisted. The profile is
    /// left unloaded; see [`AuthState::restore_user`].
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn load(store: Arc<dyn SessionStore>) -> Result<Self> {
        let token = store.get(keys::TOKEN)?.unwrap_or_default();
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        let session = Session::new(token, None);
        tracing::debug!(state = ?session.state(), "Loaded persisted session");

        Ok(Self {
            store,
            session: RwLock::new(session),
            events,
        })
    }

    /// A snapshot of the current session.
    #[must_use]
    pub fn session(&self) -> Session {
        self.session.read().clone()
    }

    /// Returns `true` iff the token is non-empty.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.read().is_authenticated()
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.session.read().state()
    }

    /// The cached user profile, if loaded.
    #[must_use]
    pub fn current_user(&self) -> Option<UserProfile> {
        self.session.read().user.clone()
    }

    /// Subscribe to session events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Install a new session and persist it.
    ///
    /// The token is stored as a plain string under `token` and the profile as
    /// JSON under `user`. Memory is only updated once both writes succeed.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile cannot be encoded or the store cannot
    /// be written. A failed write ends any previous session, in memory and in
    /// the store, so the two never disagree.
    pub fn set_auth(&self, token: &str, user: UserProfile) -> Result<()> {
        let record = user.encode()?;

        if let Err(err) = self.persist(token, &record) {
            self.abandon();
            return Err(err);
        }

        *self.session.write() = Session::new(token, Some(user.clone()));

        tracing::info!(user_id = user.id, username = %user.username, "Session established");
        self.publish(SessionEvent::LoggedIn(user));
        Ok(())
    }

    /// End the session and remove it from the store.
    ///
    /// Safe to call when already logged out; the end state is the same.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written. Memory is cleared
    /// regardless.
    pub fn logout(&self) -> Result<()> {
        let was_active = self.clear_memory();
        self.clear_store()?;

        if was_active {
            tracing::info!("Session ended");
            self.publish(SessionEvent::LoggedOut);
        }
        Ok(())
    }

    /// Load the persisted profile into memory.
    ///
    /// Does nothing unless both a non-empty token and a persisted record
    /// exist. A record that fails to decode is treated as a corrupted session
    /// and triggers a full [`AuthState::logout`].
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    pub fn restore_user(&self) -> Result<Option<UserProfile>> {
        if !self.is_authenticated() {
            return Ok(None);
        }

        let record = match self.store.get(keys::USER)? {
            Some(record) if !record.is_empty() => record,
            _ => return Ok(None),
        };

        match UserProfile::decode(&record) {
            Ok(user) => {
                self.session.write().user = Some(user.clone());
                tracing::debug!(user_id = user.id, "Restored user profile");
                Ok(Some(user))
            }
            Err(err) => {
                tracing::warn!(error = %err, "Persisted user record is corrupted, resetting session");
                self.logout()?;
                Ok(None)
            }
        }
    }

    /// Tear down after the server rejected the token.
    fn expire(&self) {
        self.clear_memory();
        if let Err(err) = self.clear_store() {
            tracing::warn!(error = %err, "Failed to clear persisted session after 401");
        }

        tracing::info!("Session expired");
        self.publish(SessionEvent::Expired);
    }

    fn persist(&self, token: &str, record: &str) -> Result<()> {
        self.store.set(keys::TOKEN, token)?;
        self.store.set(keys::USER, record)?;
        Ok(())
    }

    /// Log out after a partial write.
    fn abandon(&self) {
        let was_active = self.clear_memory();
        if let Err(err) = self.clear_store() {
            tracing::warn!(error = %err, "Failed to roll back partial session write");
        }

        if was_active {
            tracing::info!("Session ended after failed write");
            self.publish(SessionEvent::LoggedOut);
        }
    }

    /// Clear memory; returns whether anything was held.
    fn clear_memory(&self) -> bool {
        let mut session = self.session.write();
        let was_active = session.is_authenticated() || session.user.is_some();
        *session = Session::default();
        was_active
    }

    /// Remove every session key, attempting all of them before reporting the
    /// first failure.
    fn clear_store(&self) -> Result<()> {
        let mut first_err = None;
        for key in keys::SESSION_KEYS {
            if let Err(err) = self.store.remove(key) {
                first_err.get_or_insert(err);
            }
        }
        match first_err {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }

    fn publish(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

impl CredentialSource for AuthState {
    fn bearer_token(&self) -> Option<String> {
        let session = self.session.read();
        session
            .is_authenticated()
            .then(|| session.token.clone())
    }
}

impl UnauthorizedListener for AuthState {
    fn on_unauthorized(&self) {
        self.expire();
    }
}
