//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for both
//! components. All types derive Serde traits for deserialization from
//! config files; every field has a default so an empty file is valid.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Relay proxy settings.
    pub relay: RelayConfig,

    /// Content server settings.
    pub content: ContentConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Relay proxy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Bind address (e.g., "0.0.0.0:3001").
    pub bind_address: String,

    /// Upper bound for TCP connect plus TLS handshake, in seconds.
    pub connect_timeout_secs: u64,

    /// Upper bound for receiving the upstream response head, in seconds.
    pub response_timeout_secs: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3001".to_string(),
            connect_timeout_secs: 10,
            response_timeout_secs: 30,
        }
    }
}

impl RelayConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn response_timeout(&self) -> Duration {
        Duration::from_secs(self.response_timeout_secs)
    }
}

/// A document advertised on the 404 page.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct EntryPoint {
    /// File name relative to the content root.
    pub path: String,

    /// Short human description.
    pub description: String,
}

impl EntryPoint {
    fn new(path: &str, description: &str) -> Self {
        Self {
            path: path.to_string(),
            description: description.to_string(),
        }
    }
}

/// Content server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Directory files are served from.
    pub root: PathBuf,

    /// Document served for `/`.
    pub default_document: String,

    /// File name of the document rewritten from the registration state.
    pub designated_document: String,

    /// Documents listed on the not-found page.
    pub entry_points: Vec<EntryPoint>,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            root: PathBuf::from("."),
            default_document: "monitor.html".to_string(),
            designated_document: "mock-ecav.html".to_string(),
            entry_points: vec![
                EntryPoint::new("monitor.html", "Main monitor"),
                EntryPoint::new("mock-ecav.html", "Mock ECAV site"),
                EntryPoint::new("test-website.html", "Test site"),
                EntryPoint::new("test-suite.html", "Test suite"),
            ],
            request_timeout_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
