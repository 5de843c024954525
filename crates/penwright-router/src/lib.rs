//! Client-side routing for penwright.
//!
//! This crate holds the static route table, the authorization guard that runs
//! before every navigation, and a [`Navigator`] that tracks the current
//! location and follows session events.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use penwright_core::CredentialSource;
//! use penwright_router::{Navigator, View};
//!
//! struct NoSession;
//!
//! impl CredentialSource for NoSession {
//!     fn bearer_token(&self) -> Option<String> {
//!         None
//!     }
//! }
//!
//! let mut nav = Navigator::new(Arc::new(NoSession));
//! let result = nav.navigate("/chat");
//! assert!(result.was_redirected());
//! assert_eq!(result.location().view, View::Login);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod guard;
pub mod navigator;
pub mod routes;

pub use guard::{GuardDecision, RouteGuard};
pub use navigator::{Location, Navigation, Navigator};
pub use routes::{Redirect, Resolved, RouteDescriptor, RouteTable, View, Visibility, LOGIN_PATH};
