//! Core types and contracts for penwright.
//!
//! This crate provides the foundational types shared by every other crate:
//!
//! - **Type contracts**: serde shapes for users, chat sessions, materials and
//!   export records exchanged with the writing server
//! - **Session**: the client-held credential and profile, plus the events
//!   published when it changes
//! - **Error types**: Common error definitions shared across crates
//!
//! # Example
//!
//! ```
//! use penwright_core::{DocType, Session, UserProfile};
//!
//! let user = UserProfile {
//!     id: 1,
//!     username: "zhang".to_string(),
//!     display_name: "Zhang Wei".to_string(),
//!     department: "Traffic".to_string(),
//! };
//!
//! let session = Session::new("token-abc", Some(user));
//! assert!(session.is_authenticated());
//!
//! let doc_type: DocType = "报告".parse().unwrap();
//! assert_eq!(doc_type, DocType::Report);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod session;
pub mod types;

pub use error::{CoreError, Result};
pub use session::{CredentialSource, Session, SessionEvent, SessionState};
pub use types::{
    AuthResponse, BatchClassifyRequest, BatchDeleteRequest, BatchPreferences, ChatMessage,
    ChatReply, ChatSession, CreateSessionRequest, CreatedSession, DocType, ExportDoc,
    ExportRequest, LoginRequest, Material, MaterialQuery, MessageId, MessageResponse,
    Preferences, RegisterRequest, ReviewReport, ReviewRequest, SearchHit, SearchHitMetadata,
    SendMessageRequest, SetPreferenceRequest, UploadedMaterial, UserProfile,
};
