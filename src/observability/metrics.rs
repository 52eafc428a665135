//! Metrics collection and exposition.
//!
//! # Metrics
//! - `registration_watch_requests_total` (counter): by component, method, status
//! - `registration_watch_request_duration_seconds` (histogram): by component
//! - `registration_watch_upstream_errors_total` (counter): relay transport failures
//! - `registration_watch_state_changes_total` (counter): by new state
//!
//! Recording is a no-op until `init_metrics` installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(component: &'static str, method: &str, status: u16, start: Instant) {
    metrics::counter!(
        "registration_watch_requests_total",
        "component" => component,
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!(
        "registration_watch_request_duration_seconds",
        "component" => component
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_upstream_error() {
    metrics::counter!("registration_watch_upstream_errors_total").increment(1);
}

pub fn record_state_change(state: &'static str) {
    metrics::counter!("registration_watch_state_changes_total", "state" => state).increment(1);
}

/// Middleware recording every request under the component name it was
/// installed with.
pub async fn track_requests(
    State(component): State<&'static str>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let response = next.run(request).await;
    record_request(component, method.as_str(), response.status().as_u16(), start);
    response
}
