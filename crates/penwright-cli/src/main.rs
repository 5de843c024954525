//! Penwright CLI - command-line client for the writing server.
//!
//! This is the entry point for the `penwright` binary.

mod commands;
mod console;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use penwright_auth::AuthController;
use penwright_gateway::GatewayConfig;
use penwright_store::FileStore;

use commands::Command;
use console::ConsoleNotifier;

/// Session file location under the home directory.
const STATE_FILE: &str = ".penwright/session.json";

/// Penwright CLI - command-line client for the writing server.
#[derive(Parser, Debug)]
#[command(name = "penwright")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server API base URL.
    #[arg(
        long,
        env = "PENWRIGHT_API_URL",
        default_value = "http://localhost:8000/api"
    )]
    api_url: String,

    /// Where the session is persisted. Defaults to ~/.penwright/session.json.
    #[arg(long, env = "PENWRIGHT_STATE_FILE")]
    state_file: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(long, default_value = "false")]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig::with_base_url(&self.api_url)
    }

    fn state_file(&self) -> anyhow::Result<PathBuf> {
        match &self.state_file {
            Some(path) => Ok(path.clone()),
            None => std::env::var_os("HOME")
                .map(|home| PathBuf::from(home).join(STATE_FILE))
                .context("HOME is not set; pass --state-file"),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.debug {
        tracing_subscriber::fmt()
            .with_env_filter("penwright=debug,warn")
            .with_writer(std::io::stderr)
            .init();
    }

    let state_file = args.state_file()?;
    tracing::debug!(path = %state_file.display(), api = %args.api_url, "Opening session store");
    let store = FileStore::open(&state_file)
        .with_context(|| format!("failed to open session file {}", state_file.display()))?;

    let auth = AuthController::new(
        args.gateway_config(),
        Arc::new(store),
        Arc::new(ConsoleNotifier),
    )?;
    auth.restore_user()?;

    commands::run(args.command, &auth).await
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;
    use commands::PrefsAction;

    #[test]
    fn args_are_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn explicit_state_file_wins() {
        let args = Args::try_parse_from([
            "penwright",
            "--state-file",
            "/tmp/s.json",
            "--api-url",
            "http://example.test/api",
            "whoami",
        ])
        .unwrap();

        assert_eq!(args.state_file().unwrap(), PathBuf::from("/tmp/s.json"));
        assert_eq!(args.gateway_config().base_url, "http://example.test/api");
        assert!(matches!(args.command, Command::Whoami));
    }

    #[test]
    fn request_timeout_is_fixed() {
        let args = Args::try_parse_from(["penwright", "logout"]).unwrap();
        assert_eq!(args.gateway_config().request_timeout_seconds, 60);

        assert!(Args::try_parse_from(["penwright", "--timeout", "5", "logout"]).is_err());
    }

    #[test]
    fn materials_accepts_doc_type_names() {
        let args =
            Args::try_parse_from(["penwright", "materials", "--doc-type", "通知", "--limit", "5"])
                .unwrap();
        match args.command {
            Command::Materials {
                doc_type, limit, ..
            } => {
                assert_eq!(doc_type.map(|d| d.as_str()), Some("通知"));
                assert_eq!(limit, Some(5));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn prefs_set_parses() {
        let args =
            Args::try_parse_from(["penwright", "prefs", "set", "default_tone", "formal"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Prefs {
                action: Some(PrefsAction::Set { .. })
            }
        ));
    }
}
