//! Gateway configuration types.
//!
//! This module defines the configuration for the outbound HTTP gateway.

use std::time::Duration;

use serde::Deserialize;

/// Configuration for the HTTP gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Base API URL every request path is appended to
    /// (e.g., "http://localhost:8000/api").
    #[serde(default = "GatewayConfig::default_base_url")]
    pub base_url: String,

    /// Request deadline in seconds, applied uniformly to every call.
    #[serde(default = "GatewayConfig::default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl GatewayConfig {
    fn default_base_url() -> String {
        "http://localhost:8000/api".to_string()
    }

    const fn default_request_timeout() -> u64 {
        60
    }

    /// Create a configuration for `base_url` with the default deadline.
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Get the request timeout as a `Duration`.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// Join a request path onto the base URL.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            request_timeout_seconds: Self::default_request_timeout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = GatewayConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000/api");
        assert_eq!(config.request_timeout(), Duration::from_millis(60_000));
    }

    #[test]
    fn partial_config_uses_defaults() {
        let config: GatewayConfig =
            serde_json::from_str(r#"{"base_url": "https://writer.example/api"}"#).unwrap();
        assert_eq!(config.base_url, "https://writer.example/api");
        assert_eq!(config.request_timeout_seconds, 60);
    }

    #[test]
    fn url_joining() {
        let config = GatewayConfig::with_base_url("http://host/api/");
        assert_eq!(config.url("/auth/login"), "http://host/api/auth/login");
        assert_eq!(config.url("materials"), "http://host/api/materials");
    }
}
