//! The client-held session and the contracts around it.

use crate::types::UserProfile;

/// The current authenticated identity and credential.
///
/// `user` is only meaningful while `token` is non-empty. A token without a
/// user is a valid transient state: the profile may not have been restored
/// yet, or restoring it may have failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// Bearer token; empty when logged out.
    pub token: String,
    /// Cached profile of the signed-in user.
    pub user: Option<UserProfile>,
}

impl Session {
    /// Create a session from a token and an optional profile.
    #[must_use]
    pub fn new(token: impl Into<String>, user: Option<UserProfile>) -> Self {
        Self {
            token: token.into(),
            user,
        }
    }

    /// Returns `true` iff the token is non-empty.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        !self.token.is_empty()
    }

    /// The coarse lifecycle state of this session.
    #[must_use]
    pub fn state(&self) -> SessionState {
        if self.is_authenticated() {
            SessionState::LoggedIn
        } else {
            SessionState::LoggedOut
        }
    }
}

/// Session lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// No token held.
    LoggedOut,
    /// A token is held; the profile may or may not be loaded.
    LoggedIn,
}

/// Notifications published when the session changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A login or registration succeeded.
    LoggedIn(UserProfile),
    /// The session was ended explicitly.
    LoggedOut,
    /// The server rejected the token; the session has been torn down and the
    /// user must sign in again.
    Expired,
}

/// Something that can supply the bearer token for outgoing calls.
pub trait CredentialSource: Send + Sync {
    /// The current token, or `None` when no session is held.
    fn bearer_token(&self) -> Option<String>;

    /// Returns `true` when a token is present.
    fn has_token(&self) -> bool {
        self.bearer_token().is_some()
    }
}
