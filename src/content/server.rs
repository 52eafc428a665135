//! Content server setup.
//!
//! # Responsibilities
//! - Route the mock-state endpoints ahead of file lookup
//! - Wire up middleware (request ID, tracing, timeout, metrics)
//! - Serve until the shutdown coordinator fires

use std::sync::Arc;
use std::time::Duration;

use axum::{middleware, routing::any, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ContentConfig;
use crate::content::handlers::{favicon, get_state, serve_file, set_state, ContentState};
use crate::content::state::StateCell;
use crate::http::UuidRequestId;
use crate::lifecycle::shutdown;
use crate::observability::metrics::track_requests;

pub const STATE_PATH: &str = "/__mock/state";
pub const SET_STATE_PATH: &str = "/__mock/set";

/// HTTP server for mock content.
pub struct ContentServer {
    router: Router,
    config: Arc<ContentConfig>,
}

impl ContentServer {
    /// `cell` is shared with whoever else needs to observe the state.
    pub fn new(config: ContentConfig, cell: Arc<StateCell>) -> Self {
        let config = Arc::new(config);
        let state = ContentState {
            cell,
            config: config.clone(),
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    #[allow(deprecated)]
    fn build_router(config: &ContentConfig, state: ContentState) -> Router {
        Router::new()
            .route(STATE_PATH, any(get_state))
            .route(SET_STATE_PATH, any(set_state))
            .route("/favicon.ico", any(favicon))
            .fallback(serve_file)
            .with_state(state)
            .layer(middleware::from_fn_with_state("content", track_requests))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &ContentConfig {
        &self.config
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        let port = addr.port();
        tracing::info!(address = %addr, root = %self.config.root.display(), "Content server running");
        for line in banner(&self.config, port) {
            tracing::info!("{line}");
        }

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown))
            .await?;

        tracing::info!("Content server stopped");
        Ok(())
    }
}

/// Startup hints: one URL per entry point, then the state endpoints.
fn banner(config: &ContentConfig, port: u16) -> Vec<String> {
    let mut lines: Vec<String> = config
        .entry_points
        .iter()
        .map(|entry| format!("{}: http://localhost:{port}/{}", entry.description, entry.path))
        .collect();
    lines.push(format!(
        "Mock state: http://localhost:{port}{STATE_PATH} (set via {SET_STATE_PATH}?state=open|closed|warning)"
    ));
    lines
}
