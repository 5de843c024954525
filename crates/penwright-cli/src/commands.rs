//! Subcommands.

use chrono::NaiveDateTime;
use clap::Subcommand;
use tokio::sync::broadcast;

use penwright_auth::AuthController;
use penwright_core::{DocType, MaterialQuery, SessionEvent};
use penwright_router::{Navigation, Navigator};

/// Placeholder for columns the server left empty.
const UNKNOWN: &str = "-";

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in and persist the session.
    Login {
        /// Account name.
        username: String,
        /// Account password.
        #[arg(long, env = "PENWRIGHT_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account and sign in.
    Register {
        /// Account name.
        username: String,
        /// Name shown in the interface.
        #[arg(long)]
        display_name: String,
        /// Account password.
        #[arg(long, env = "PENWRIGHT_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Drop the persisted session.
    Logout,
    /// Show the signed-in user.
    Whoami,
    /// Resolve a path through the route guard.
    Open {
        /// Application path, e.g. `/chat`.
        path: String,
    },
    /// List reference materials.
    Materials {
        /// Only materials of this document type.
        #[arg(long)]
        doc_type: Option<DocType>,
        /// Only materials whose title or keywords contain this text.
        #[arg(long)]
        keyword: Option<String>,
        /// Offset into the result list.
        #[arg(long)]
        skip: Option<u32>,
        /// Maximum number of results.
        #[arg(long)]
        limit: Option<u32>,
    },
    /// List drafting conversations.
    Sessions,
    /// List exported documents.
    History {
        /// Offset into the result list.
        #[arg(long, default_value_t = 0)]
        skip: u32,
        /// Maximum number of results.
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
    /// Show or change preferences.
    Prefs {
        #[command(subcommand)]
        action: Option<PrefsAction>,
    },
}

/// Preference actions.
#[derive(Subcommand, Debug)]
pub enum PrefsAction {
    /// Print every stored preference.
    Show,
    /// Store one preference.
    Set {
        /// Preference key.
        key: String,
        /// Preference value.
        value: String,
    },
}

/// Run `command` against the restored session.
///
/// A 401 from any call tears the session down; the user is told once the
/// command finishes.
pub async fn run(command: Command, auth: &AuthController) -> anyhow::Result<()> {
    let mut events = auth.subscribe();
    let result = execute(command, auth).await;
    follow_expiry(auth, &mut events);
    result
}

async fn execute(command: Command, auth: &AuthController) -> anyhow::Result<()> {
    match command {
        Command::Login { username, password } => {
            let user = auth.login(&username, &password).await?;
            println!("Signed in as {} ({})", user.display_name, user.username);
        }
        Command::Register {
            username,
            display_name,
            password,
        } => {
            let user = auth.register(&username, &password, &display_name).await?;
            println!("Registered and signed in as {}", user.display_name);
        }
        Command::Logout => {
            auth.logout()?;
            println!("Signed out");
        }
        Command::Whoami => match auth.current_user() {
            Some(user) => println!(
                "{} ({}) id={} department={}",
                user.display_name, user.username, user.id, user.department
            ),
            None if auth.is_authenticated() => println!("Signed in, profile not cached"),
            None => println!("Not signed in"),
        },
        Command::Open { path } => open(auth, &path),
        Command::Materials {
            doc_type,
            keyword,
            skip,
            limit,
        } => {
            let query = MaterialQuery {
                doc_type,
                keyword,
                skip,
                limit,
            };
            for material in auth.gateway().list_materials(&query).await? {
                println!(
                    "{:>6}  {}  [{}]  {} chars",
                    material.id,
                    material.title,
                    material.doc_type.as_deref().unwrap_or(UNKNOWN),
                    material.char_count
                );
            }
        }
        Command::Sessions => {
            for session in auth.gateway().list_chat_sessions().await? {
                println!(
                    "{:>6}  {}  {}  {}",
                    session.id,
                    timestamp(session.created_at),
                    session.status.as_deref().unwrap_or(UNKNOWN),
                    session.title
                );
            }
        }
        Command::History { skip, limit } => {
            for doc in auth.gateway().list_exports(skip, limit).await? {
                println!(
                    "{:>6}  v{}  {}  [{}]  {}",
                    doc.id,
                    doc.version.unwrap_or(1),
                    timestamp(doc.created_at),
                    doc.doc_type.as_deref().unwrap_or(UNKNOWN),
                    doc.title
                );
            }
        }
        Command::Prefs { action } => match action.unwrap_or(PrefsAction::Show) {
            PrefsAction::Show => {
                for (key, value) in auth.gateway().get_preferences().await? {
                    println!("{key} = {value}");
                }
            }
            PrefsAction::Set { key, value } => {
                let resp = auth.gateway().set_preference(&key, &value).await?;
                println!("{}", resp.message);
            }
        },
    }
    Ok(())
}

fn timestamp(at: Option<NaiveDateTime>) -> String {
    at.map_or_else(
        || UNKNOWN.to_string(),
        |at| at.format("%Y-%m-%d %H:%M").to_string(),
    )
}

fn open(auth: &AuthController, path: &str) {
    let mut navigator = Navigator::new(auth.credentials());
    match navigator.navigate(path) {
        Navigation::Entered(location) => {
            println!("{} -> {:?} ({})", location.path, location.view, location.name);
        }
        Navigation::Redirected {
            requested,
            location,
        } => {
            println!(
                "{requested} requires sign-in, redirected to {} ({:?})",
                location.path, location.view
            );
        }
    }
}

fn follow_expiry(auth: &AuthController, events: &mut broadcast::Receiver<SessionEvent>) {
    let mut navigator = Navigator::new(auth.credentials());
    if let Some(location) = navigator.drain_events(events) {
        eprintln!("Session expired, sign in again ({})", location.path);
    }
}
