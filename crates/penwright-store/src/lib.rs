//! Persisted session storage for penwright.
//!
//! This crate provides the durable key/value store that keeps the auth token
//! and cached user profile across restarts. Two keys are used:
//!
//! - `token`: the bearer token as a plain string
//! - `user`: the user profile as a JSON record
//!
//! # Backends
//!
//! - [`MemoryStore`]: process-local, for tests and ephemeral sessions
//! - [`FileStore`]: a single JSON file on disk
//!
//! # Example
//!
//! ```
//! use penwright_store::{keys, MemoryStore, SessionStore};
//!
//! let store = MemoryStore::new();
//! store.set(keys::TOKEN, "abc").unwrap();
//! assert_eq!(store.get(keys::TOKEN).unwrap().as_deref(), Some("abc"));
//!
//! store.remove(keys::TOKEN).unwrap();
//! assert!(store.get(keys::TOKEN).unwrap().is_none());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod file;
pub mod keys;
pub mod memory;

pub use error::{Result, StoreError};
pub use file::FileStore;
pub use memory::MemoryStore;

/// The storage trait for persisted session entries.
///
/// Values are opaque strings; encoding structured records is the caller's job.
/// Implementations must tolerate removing a key that is not present.
pub trait SessionStore: Send + Sync {
    /// Get the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<()>;

    /// Returns `true` if a value is stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }
}
