//! Relay proxy server setup.
//!
//! # Responsibilities
//! - Build the outbound transport (TLS roots, timeouts)
//! - Create the Axum router with CORS, request ID, tracing and metrics layers
//! - Serve until the shutdown coordinator fires

use std::net::SocketAddr;

use axum::{middleware, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::RelayConfig;
use crate::http::{headers::cors_layers, UuidRequestId};
use crate::lifecycle::shutdown;
use crate::observability::metrics::track_requests;
use crate::relay::error::RelayError;
use crate::relay::handler::{relay, RelayState};
use crate::relay::transport::Upstream;

/// HTTP server for the relay proxy.
pub struct RelayServer {
    router: Router,
    config: RelayConfig,
}

impl RelayServer {
    pub fn new(config: RelayConfig) -> Result<Self, RelayError> {
        let state = RelayState {
            upstream: Upstream::new(&config)?,
            usage: usage_message(&config.bind_address).into(),
        };
        let router = Self::build_router(state);
        Ok(Self { router, config })
    }

    /// Every path lands on the relay handler; only the query matters.
    fn build_router(state: RelayState) -> Router {
        let [allow_origin, allow_methods, allow_headers] = cors_layers();
        Router::new()
            .fallback(relay)
            .with_state(state)
            .layer(middleware::from_fn_with_state("relay", track_requests))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
            .layer(allow_origin)
            .layer(allow_methods)
            .layer(allow_headers)
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "CORS relay proxy running");
        tracing::info!(
            "Usage: http://localhost:{}/?url=https://www.unige.ch/droit/ecav/examen-final/inscription",
            addr.port()
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown))
            .await?;

        tracing::info!("Relay proxy stopped");
        Ok(())
    }
}

fn usage_message(bind_address: &str) -> String {
    let port = bind_address
        .parse::<SocketAddr>()
        .map(|addr| addr.port())
        .unwrap_or(3001);
    format!("Missing url parameter. Usage: http://localhost:{port}/?url=https://example.com")
}
