//! Route authorization guard.
//!
//! The guard only looks at whether a token is held locally. It never asks the
//! server, so an expired token passes here and is caught later by the
//! gateway's 401 handling.

use crate::routes::{RouteDescriptor, LOGIN_PATH};

/// Outcome of a guard check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Navigation continues to the requested route.
    Proceed,
    /// Navigation is replaced by the given path.
    Redirect(&'static str),
}

/// Redirects navigation to protected routes when no token is held.
#[derive(Debug, Clone, Copy)]
pub struct RouteGuard {
    login_path: &'static str,
}

impl RouteGuard {
    /// A guard that redirects to `login_path`.
    #[must_use]
    pub const fn new(login_path: &'static str) -> Self {
        Self { login_path }
    }

    /// The path unauthenticated navigation is sent to.
    #[must_use]
    pub const fn login_path(&self) -> &'static str {
        self.login_path
    }

    /// Decide whether navigation to `route` may proceed.
    #[must_use]
    pub fn check(&self, route: &RouteDescriptor, has_token: bool) -> GuardDecision {
        if route.is_public() || has_token {
            GuardDecision::Proceed
        } else {
            tracing::debug!(route = route.name, "No session, redirecting to login");
            GuardDecision::Redirect(self.login_path)
        }
    }
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::new(LOGIN_PATH)
    }
}
