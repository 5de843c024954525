//! Key names used in the session store.
//!
//! These names are the on-disk layout; changing them orphans existing
//! sessions.

/// Bearer token, stored as a plain string.
pub const TOKEN: &str = "token";

/// User profile, stored as a JSON record.
pub const USER: &str = "user";

/// Every key owned by the session.
pub const SESSION_KEYS: [&str; 2] = [TOKEN, USER];
