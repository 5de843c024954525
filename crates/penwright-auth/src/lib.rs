//! Session ownership for penwright.
//!
//! This crate owns the client's session and keeps it in step with the
//! persisted store:
//!
//! - Login and registration through the shared gateway
//! - Logout and restoring the cached profile on start
//! - Teardown when the gateway reports a 401
//! - Session events for the routing layer
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────────┐
//! │  AuthController  │────▶│   AuthClient     │──── POST /auth/login
//! │  (login/logout)  │     │   (endpoints)    │     POST /auth/register
//! └────────┬─────────┘     └────────┬─────────┘
//!          │                        │
//!          ▼                        ▼
//! ┌──────────────────┐     ┌──────────────────┐
//! │    AuthState     │◀────│   HttpGateway    │
//! │  token + user    │ 401 │  bearer header   │
//! └────────┬─────────┘     └──────────────────┘
//!          │ SessionEvent
//!          ▼
//!   routing layer (Navigator)
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use penwright_auth::AuthController;
//! use penwright_gateway::{GatewayConfig, TracingNotifier};
//! use penwright_store::FileStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(FileStore::open("/tmp/penwright/session.json")?);
//! let auth = AuthController::new(GatewayConfig::default(), store, Arc::new(TracingNotifier))?;
//! auth.restore_user()?;
//!
//! if !auth.is_authenticated() {
//!     let user = auth.login("zhang", "secret").await?;
//!     println!("Signed in as {}", user.display_name);
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod client;
pub mod controller;
pub mod error;
pub mod state;

pub use client::{AuthClient, LOGIN_PATH, REGISTER_PATH};
pub use controller::AuthController;
pub use error::{AuthError, Result};
pub use state::AuthState;
