//! Navigation state.
//!
//! The navigator owns the current location. Every navigation is resolved
//! through the route table and checked by the guard; session events can force
//! a navigation to the login route.

use std::sync::Arc;

use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};

use penwright_core::{CredentialSource, SessionEvent};

use crate::guard::{GuardDecision, RouteGuard};
use crate::routes::{RouteTable, View};

/// Where the navigator currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// Resolved path.
    pub path: String,
    /// Route name.
    pub name: &'static str,
    /// Screen being shown.
    pub view: View,
}

/// Result of a navigation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// The requested route was entered.
    Entered(Location),
    /// The guard sent navigation somewhere else.
    Redirected {
        /// Path that was asked for.
        requested: String,
        /// Where navigation ended up.
        location: Location,
    },
}

impl Navigation {
    /// The location navigation ended at.
    #[must_use]
    pub fn location(&self) -> &Location {
        match self {
            Self::Entered(location) | Self::Redirected { location, .. } => location,
        }
    }

    /// Returns `true` if the guard redirected.
    #[must_use]
    pub const fn was_redirected(&self) -> bool {
        matches!(self, Self::Redirected { .. })
    }
}

/// Client-side router.
pub struct Navigator {
    table: RouteTable,
    guard: RouteGuard,
    credentials: Arc<dyn CredentialSource>,
    current: Option<Location>,
    history: Vec<Location>,
}

impl Navigator {
    /// A navigator over the standard table and guard.
    #[must_use]
    pub fn new(credentials: Arc<dyn CredentialSource>) -> Self {
        Self::with_table(RouteTable::standard(), RouteGuard::default(), credentials)
    }

    /// A navigator over a custom table and guard.
    #[must_use]
    pub fn with_table(
        table: RouteTable,
        guard: RouteGuard,
        credentials: Arc<dyn CredentialSource>,
    ) -> Self {
        Self {
            table,
            guard,
            credentials,
            current: None,
            history: Vec::new(),
        }
    }

    /// The current location, if navigation has happened.
    #[must_use]
    pub fn current(&self) -> Option<&Location> {
        self.current.as_ref()
    }

    /// Previously visited locations, oldest first.
    #[must_use]
    pub fn history(&self) -> &[Location] {
        &self.history
    }

    /// The route table.
    #[must_use]
    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Navigate to `path`.
    ///
    /// The guard runs synchronously against the current token presence. A
    /// redirect replaces the navigation; it is not an error.
    pub fn navigate(&mut self, path: &str) -> Navigation {
        let resolved = self.table.resolve(path);
        let has_token = self.credentials.has_token();

        match self.guard.check(resolved.route, has_token) {
            GuardDecision::Proceed => {
                let location = Location {
                    path: resolved.path,
                    name: resolved.route.name,
                    view: resolved.route.view,
                };
                self.enter(location.clone());
                Navigation::Entered(location)
            }
            GuardDecision::Redirect(to) => {
                let requested = resolved.path;
                let target = self.table.resolve(to);
                let location = Location {
                    path: target.path,
                    name: target.route.name,
                    view: target.route.view,
                };
                tracing::info!(requested = %requested, to = %location.path, "Navigation redirected");
                self.enter(location.clone());
                Navigation::Redirected {
                    requested,
                    location,
                }
            }
        }
    }

    /// Go to the login route unconditionally.
    pub fn force_login(&mut self) -> Location {
        let target = self.table.resolve(self.guard.login_path());
        let location = Location {
            path: target.path,
            name: target.route.name,
            view: target.route.view,
        };
        self.enter(location.clone());
        location
    }

    /// React to a session event. Returns the new location if navigation
    /// happened.
    pub fn handle_event(&mut self, event: &SessionEvent) -> Option<Location> {
        match event {
            SessionEvent::Expired => {
                tracing::info!("Session expired, forcing login");
                Some(self.force_login())
            }
            SessionEvent::LoggedIn(_) | SessionEvent::LoggedOut => None,
        }
    }

    /// Apply every event already queued on `events` without waiting.
    ///
    /// Returns the last location navigated to, if any.
    pub fn drain_events(
        &mut self,
        events: &mut broadcast::Receiver<SessionEvent>,
    ) -> Option<Location> {
        let mut last = None;
        loop {
            match events.try_recv() {
                Ok(event) => {
                    if let Some(location) = self.handle_event(&event) {
                        last = Some(location);
                    }
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Session events lagged");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
        last
    }

    /// Apply session events until the channel closes.
    pub async fn follow(&mut self, mut events: broadcast::Receiver<SessionEvent>) {
        loop {
            match events.recv().await {
                Ok(event) => {
                    self.handle_event(&event);
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Session events lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    }

    fn enter(&mut self, location: Location) {
        if let Some(previous) = self.current.replace(location) {
            self.history.push(previous);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;
    use crate::routes::LOGIN_PATH;

    #[derive(Default)]
    struct Toggle(AtomicBool);

    impl CredentialSource for Toggle {
        fn bearer_token(&self) -> Option<String> {
            self.0.load(Ordering::SeqCst).then(|| "tok".to_string())
        }
    }

    fn navigator(logged_in: bool) -> (Navigator, Arc<Toggle>) {
        let creds = Arc::new(Toggle(AtomicBool::new(logged_in)));
        (Navigator::new(creds.clone()), creds)
    }

    #[test]
    fn protected_route_without_token_goes_to_login() {
        let (mut nav, _) = navigator(false);
        let result = nav.navigate("/chat");

        assert!(result.was_redirected());
        assert_eq!(result.location().path, LOGIN_PATH);
        assert_eq!(nav.current().unwrap().view, View::Login);
    }

    #[test]
    fn public_routes_need_no_token() {
        let (mut nav, _) = navigator(false);
        assert_eq!(nav.navigate("/login").location().view, View::Login);

        let result = nav.navigate("/nowhere");
        assert!(!result.was_redirected());
        assert_eq!(result.location().view, View::NotFound);
        assert_eq!(result.location().name, "NotFound");
    }

    #[test]
    fn token_presence_lets_navigation_through() {
        let (mut nav, creds) = navigator(false);
        assert!(nav.navigate("/").was_redirected());

        creds.0.store(true, Ordering::SeqCst);
        let result = nav.navigate("/");
        assert_eq!(
            result,
            Navigation::Entered(Location {
                path: "/materials".to_string(),
                name: "Materials",
                view: View::MaterialManager,
            })
        );
        assert_eq!(nav.history().len(), 1);
    }

    #[test]
    fn expired_event_forces_login() {
        let (mut nav, creds) = navigator(true);
        nav.navigate("/settings");

        let (tx, mut rx) = broadcast::channel(4);
        creds.0.store(false, Ordering::SeqCst);
        tx.send(SessionEvent::LoggedOut).unwrap();
        tx.send(SessionEvent::Expired).unwrap();

        let location = nav.drain_events(&mut rx).unwrap();
        assert_eq!(location.path, LOGIN_PATH);
        assert_eq!(nav.current().unwrap().view, View::Login);
        assert_eq!(nav.history().last().unwrap().view, View::Settings);
    }

    #[test]
    fn non_expiry_events_do_not_navigate() {
        let (mut nav, _) = navigator(true);
        nav.navigate("/chat");

        let (tx, mut rx) = broadcast::channel(4);
        tx.send(SessionEvent::LoggedOut).unwrap();
        assert!(nav.drain_events(&mut rx).is_none());
        assert_eq!(nav.current().unwrap().view, View::WritingChat);
    }

    #[tokio::test]
    async fn follow_runs_until_channel_closes() {
        let (mut nav, _) = navigator(true);
        nav.navigate("/history");

        let (tx, rx) = broadcast::channel(4);
        tx.send(SessionEvent::Expired).unwrap();
        drop(tx);

        nav.follow(rx).await;
        assert_eq!(nav.current().unwrap().path, LOGIN_PATH);
    }
}
