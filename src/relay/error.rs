//! Relay error types.

use std::time::Duration;

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Failures of a single relayed fetch.
///
/// Every variant renders as `500 Proxy error: <message>`.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Protocol \"{0}:\" not supported")]
    UnsupportedScheme(String),

    #[error("URL has no host")]
    MissingHost,

    #[error("connect {host}: {source}")]
    Connect {
        host: String,
        #[source]
        source: std::io::Error,
    },

    #[error("connect {host}: timed out after {}s", .timeout.as_secs())]
    ConnectTimeout { host: String, timeout: Duration },

    #[error("Invalid TLS server name: {0}")]
    InvalidServerName(String),

    #[error("TLS handshake with {host} failed: {source}")]
    Tls {
        host: String,
        #[source]
        source: std::io::Error,
    },

    #[error("TLS setup failed: {0}")]
    TlsSetup(#[from] rustls::Error),

    #[error("Invalid upstream request: {0}")]
    Request(#[from] axum::http::Error),

    #[error("HTTP handshake failed: {0}")]
    Handshake(#[source] hyper::Error),

    #[error("{0}")]
    Upstream(#[source] hyper::Error),

    #[error("no response within {}s", .0.as_secs())]
    ResponseTimeout(Duration),
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain")],
            format!("Proxy error: {self}"),
        )
            .into_response()
    }
}
