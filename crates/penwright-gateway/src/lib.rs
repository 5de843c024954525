//! HTTP gateway for penwright.
//!
//! This crate is the single choke point for calls to the writing server. It
//! handles:
//!
//! - Bearer credential injection from a [`CredentialSource`](penwright_core::CredentialSource)
//! - A uniform request deadline
//! - Failure classification and user-facing notices
//! - The unauthorized signal that lets the session owner tear down on 401
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐      ┌──────────────────┐
//! │  Callers         │─────▶│   HttpGateway    │──── Authorization: Bearer
//! │  (CLI, views)    │      │   send()         │─────────────▶ server
//! └──────────────────┘      └────────┬─────────┘
//!                                    │ on failure
//!                  ┌─────────────────┼──────────────────┐
//!                  ▼                 ▼                  ▼
//!           ┌────────────┐   ┌──────────────┐   ┌──────────────┐
//!           │  Notifier  │   │ Unauthorized │   │ GatewayError │
//!           │  (notice)  │   │  listeners   │   │ to caller    │
//!           └────────────┘   └──────────────┘   └──────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use penwright_core::CredentialSource;
//! use penwright_gateway::{GatewayConfig, HttpGateway, TracingNotifier};
//!
//! struct Anonymous;
//!
//! impl CredentialSource for Anonymous {
//!     fn bearer_token(&self) -> Option<String> {
//!         None
//!     }
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let gateway = HttpGateway::new(
//!     GatewayConfig::default(),
//!     Arc::new(Anonymous),
//!     Arc::new(TracingNotifier),
//! )?;
//!
//! let sessions = gateway.list_chat_sessions().await?;
//! println!("{} conversations", sessions.len());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod notice;
pub mod request;

pub use client::{HttpGateway, UnauthorizedListener};
pub use config::GatewayConfig;
pub use error::{GatewayError, Result};
pub use notice::{Notice, NoticeLevel, Notifier, TracingNotifier};
pub use request::{OutboundRequest, Upload};
pub use reqwest::{Method, Response};

#[cfg(any(test, feature = "test-utils"))]
pub use notice::RecordingNotifier;
