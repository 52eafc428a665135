//! The relay request handler.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{RawQuery, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
};
use hyper::body::Incoming;

use crate::http::headers::ALLOW_ORIGIN;
use crate::http::{request_id, QueryParams};
use crate::observability::metrics;
use crate::relay::transport::Upstream;

/// Content type used when the upstream does not declare one.
pub const DEFAULT_CONTENT_TYPE: &str = "text/html";

/// State injected into the relay handler.
#[derive(Clone)]
pub struct RelayState {
    pub upstream: Upstream,
    /// Body of the 400 response for a missing `url`.
    pub usage: Arc<str>,
}

/// Relay one request: preflight → method check → `url` check → fetch → stream.
pub async fn relay(
    State(state): State<RelayState>,
    method: Method,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Response {
    if method == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }

    if method != Method::GET {
        return plain(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed".to_string());
    }

    let params = QueryParams::parse(query.as_deref());
    let target = match params.get("url") {
        Some(target) if !target.is_empty() => target.to_string(),
        _ => return plain(StatusCode::BAD_REQUEST, state.usage.to_string()),
    };

    let request_id = request_id(&headers);
    tracing::info!(request_id = %request_id, target = %target, "Proxying request");

    match state.upstream.fetch(&target).await {
        Ok(response) => {
            tracing::debug!(
                request_id = %request_id,
                status = %response.status(),
                "Upstream responded"
            );
            forward(response)
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, target = %target, error = %e, "Proxy error");
            metrics::record_upstream_error();
            e.into_response()
        }
    }
}

/// Re-frame the upstream response: same status, upstream content type
/// (or the default), open origin, and the body streamed as it arrives.
fn forward(response: hyper::Response<Incoming>) -> Response {
    let (parts, body) = response.into_parts();
    let content_type = parts
        .headers
        .get(header::CONTENT_TYPE)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_CONTENT_TYPE));

    let mut forwarded = Response::new(Body::new(body));
    *forwarded.status_mut() = parts.status;
    forwarded.headers_mut().insert(header::CONTENT_TYPE, content_type);
    forwarded.headers_mut().insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static(ALLOW_ORIGIN),
    );
    forwarded
}

fn plain(status: StatusCode, body: String) -> Response {
    (status, [(header::CONTENT_TYPE, "text/plain")], body).into_response()
}
