//! User-facing notices emitted when a call fails.

use std::fmt;

/// Text shown when the request deadline elapses.
pub const TIMEOUT_TEXT: &str = "Request timed out, please try again later";

/// Text shown when no response was received for any other reason.
pub const CONNECTION_TEXT: &str = "Network connection failed";

/// Text shown for 404 responses.
pub const NOT_FOUND_TEXT: &str = "Resource not found";

/// Text shown for 503 responses.
pub const UNAVAILABLE_TEXT: &str = "Service temporarily unavailable, please try again later";

/// Fallback when an error body carries no usable message.
pub const DEFAULT_TEXT: &str = "Request failed";

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeLevel {
    /// The request was rejected; the user can fix it.
    Warning,
    /// The request failed for reasons outside the user's control.
    Error,
}

impl NoticeLevel {
    /// Lower-case name of the level.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// A message for the user about a failed call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity.
    pub level: NoticeLevel,
    /// Text to show.
    pub text: String,
}

impl Notice {
    /// A warning-level notice.
    #[must_use]
    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            text: text.into(),
        }
    }

    /// An error-level notice.
    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level.as_str(), self.text)
    }
}

/// Receives notices from the gateway.
pub trait Notifier: Send + Sync {
    /// Present `notice` to the user.
    fn notify(&self, notice: &Notice);
}

/// A notifier that logs notices through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: &Notice) {
        match notice.level {
            NoticeLevel::Warning => tracing::warn!(text = %notice.text, "Request notice"),
            NoticeLevel::Error => tracing::error!(text = %notice.text, "Request notice"),
        }
    }
}

/// Pull a human-readable message out of an error body.
///
/// Tries the `error` and `message` fields, then `detail`, and falls back to
/// [`DEFAULT_TEXT`]. Empty strings and non-string values are skipped.
#[must_use]
pub fn server_message(body: Option<&serde_json::Value>) -> String {
    body.and_then(|body| {
        ["error", "message", "detail"]
            .into_iter()
            .filter_map(|field| body.get(field).and_then(serde_json::Value::as_str))
            .find(|text| !text.is_empty())
    })
    .unwrap_or(DEFAULT_TEXT)
    .to_string()
}

/// A notifier that records every notice, for tests.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: parking_lot::Mutex<Vec<Notice>>,
}

#[cfg(any(test, feature = "test-utils"))]
impl RecordingNotifier {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Notices received so far, oldest first.
    #[must_use]
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }

    /// Forget recorded notices.
    pub fn clear(&self) {
        self.notices.lock().clear();
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl Notifier for RecordingNotifier {
    fn notify(&self, notice: &Notice) {
        self.notices.lock().push(notice.clone());
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn message_fallback_chain() {
        let body = json!({"error": "duplicate user", "detail": "ignored"});
        assert_eq!(server_message(Some(&body)), "duplicate user");

        let body = json!({"message": "bad field"});
        assert_eq!(server_message(Some(&body)), "bad field");

        let body = json!({"error": "", "detail": "from detail"});
        assert_eq!(server_message(Some(&body)), "from detail");

        // FastAPI validation errors carry a list in `detail`.
        let body = json!({"detail": [{"loc": ["body"], "msg": "x"}]});
        assert_eq!(server_message(Some(&body)), DEFAULT_TEXT);

        assert_eq!(server_message(None), DEFAULT_TEXT);
    }

    #[test]
    fn notice_display() {
        assert_eq!(
            Notice::warning(NOT_FOUND_TEXT).to_string(),
            "[warning] Resource not found"
        );
        assert_eq!(Notice::error("boom").level, NoticeLevel::Error);
    }

    #[test]
    fn recorder_keeps_order() {
        let recorder = RecordingNotifier::new();
        recorder.notify(&Notice::warning("a"));
        recorder.notify(&Notice::error("b"));
        let texts: Vec<_> = recorder.notices().into_iter().map(|n| n.text).collect();
        assert_eq!(texts, vec!["a", "b"]);

        recorder.clear();
        assert!(recorder.notices().is_empty());
    }
}
