//! Route table configuration.
//!
//! The table is built once at startup and never changes.

/// Path of the login route.
pub const LOGIN_PATH: &str = "/login";

/// Maximum redirect hops followed while resolving a path.
const MAX_REDIRECTS: usize = 8;

/// The screen a route renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    /// Sign-in and registration form.
    Login,
    /// Reference material management.
    MaterialManager,
    /// Drafting conversation.
    WritingChat,
    /// User preferences.
    Settings,
    /// Previously exported documents.
    ExportHistory,
    /// Fallback for unknown paths.
    NotFound,
}

/// Whether a route needs a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// Reachable without a token.
    Public,
    /// Requires a token.
    Protected,
}

/// A navigable route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDescriptor {
    /// Path matched exactly (after normalization).
    pub path: &'static str,
    /// Route name.
    pub name: &'static str,
    /// Screen to render.
    pub view: View,
    /// Access requirement.
    pub visibility: Visibility,
}

impl RouteDescriptor {
    /// Returns `true` if the route is reachable without a token.
    #[must_use]
    pub const fn is_public(&self) -> bool {
        matches!(self.visibility, Visibility::Public)
    }
}

/// A path that forwards to another path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    /// Source path.
    pub from: &'static str,
    /// Destination path.
    pub to: &'static str,
}

/// The result of resolving a path against the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<'a> {
    /// Path after normalization and redirects.
    pub path: String,
    /// Matching route; the fallback when nothing else matched.
    pub route: &'a RouteDescriptor,
}

/// The static route table.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<RouteDescriptor>,
    redirects: Vec<Redirect>,
    fallback: RouteDescriptor,
}

impl RouteTable {
    /// Create a table.
    #[must_use]
    pub fn new(
        routes: Vec<RouteDescriptor>,
        redirects: Vec<Redirect>,
        fallback: RouteDescriptor,
    ) -> Self {
        Self {
            routes,
            redirects,
            fallback,
        }
    }

    /// The application's route table.
    ///
    /// # Routes
    ///
    /// ## Public
    /// - `/login` - Login
    /// - anything unmatched - `NotFound`
    ///
    /// ## Protected
    /// - `/` - redirects to `/materials`
    /// - `/materials` - Materials
    /// - `/chat` - Chat
    /// - `/settings` - Settings
    /// - `/history` - History
    #[must_use]
    pub fn standard() -> Self {
        let protected = |path, name, view| RouteDescriptor {
            path,
            name,
            view,
            visibility: Visibility::Protected,
        };

        Self::new(
            vec![
                RouteDescriptor {
                    path: LOGIN_PATH,
                    name: "Login",
                    view: View::Login,
                    visibility: Visibility::Public,
                },
                protected("/materials", "Materials", View::MaterialManager),
                protected("/chat", "Chat", View::WritingChat),
                protected("/settings", "Settings", View::Settings),
                protected("/history", "History", View::ExportHistory),
            ],
            vec![Redirect {
                from: "/",
                to: "/materials",
            }],
            RouteDescriptor {
                path: "/:pathMatch(.*)*",
                name: "NotFound",
                view: View::NotFound,
                visibility: Visibility::Public,
            },
        )
    }

    /// All routes except the fallback.
    #[must_use]
    pub fn routes(&self) -> &[RouteDescriptor] {
        &self.routes
    }

    /// Look a route up by name.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&RouteDescriptor> {
        self.routes
            .iter()
            .chain(std::iter::once(&self.fallback))
            .find(|route| route.name == name)
    }

    /// Resolve `path`, following redirects.
    ///
    /// Unknown paths resolve to the fallback route with the path kept as
    /// requested.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Resolved<'_> {
        let mut path = normalize(path);

        for _ in 0..MAX_REDIRECTS {
            match self.redirects.iter().find(|r| r.from == path) {
                Some(redirect) => path = redirect.to.to_string(),
                None => break,
            }
        }

        let route = self
            .routes
            .iter()
            .find(|route| route.path == path)
            .unwrap_or(&self.fallback);

        Resolved { path, route }
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Strip query and fragment, ensure a leading slash and drop a trailing one.
fn normalize(path: &str) -> String {
    let path = path
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim();

    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}
