//! Content server handlers: mock-state API and file serving.

use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::{RawQuery, State},
    http::{header, HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::config::ContentConfig;
use crate::content::files::{self, FileError, ResolvedPath};
use crate::content::mime;
use crate::content::rewrite::{self, RewriteContext};
use crate::content::state::{RegistrationState, StateCell};
use crate::http::headers::{no_cache, no_store};
use crate::http::{request_id, QueryParams};
use crate::observability::metrics;

/// State injected into content handlers.
#[derive(Clone)]
pub struct ContentState {
    pub cell: Arc<StateCell>,
    pub config: Arc<ContentConfig>,
}

impl ContentState {
    fn is_designated(&self, resolved: &ResolvedPath) -> bool {
        resolved.file_name() == Some(self.config.designated_document.as_str())
    }
}

#[derive(Debug, Serialize)]
pub struct StateBody {
    pub state: RegistrationState,
}

#[derive(Debug, Serialize)]
pub struct SetStateBody {
    pub ok: bool,
    pub state: RegistrationState,
}

#[derive(Debug, Serialize)]
pub struct SetStateError {
    pub ok: bool,
    pub error: &'static str,
}

pub async fn get_state(State(state): State<ContentState>) -> impl IntoResponse {
    (
        no_store(),
        Json(StateBody {
            state: state.cell.get(),
        }),
    )
}

pub async fn set_state(
    State(state): State<ContentState>,
    RawQuery(query): RawQuery,
) -> Response {
    let params = QueryParams::parse(query.as_deref());
    match params.get("state").map(str::parse::<RegistrationState>) {
        Some(Ok(next)) => {
            let previous = state.cell.set(next);
            tracing::info!(state = %next, previous = %previous, "Registration state set");
            metrics::record_state_change(next.as_str());
            (no_store(), Json(SetStateBody { ok: true, state: next })).into_response()
        }
        _ => (
            StatusCode::BAD_REQUEST,
            Json(SetStateError {
                ok: false,
                error: "invalid state",
            }),
        )
            .into_response(),
    }
}

pub async fn favicon() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// Serve a file from the root, rewriting the designated document.
pub async fn serve_file(
    State(state): State<ContentState>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let config = &state.config;
    let resolved = files::resolve(&config.root, uri.path(), &config.default_document);
    tracing::info!(
        request_id = %request_id(&headers),
        path = %resolved.relative,
        "Serving"
    );

    let content = match files::read(&resolved.full).await {
        Ok(content) => content,
        Err(FileError::NotFound) => {
            return (
                StatusCode::NOT_FOUND,
                [(header::CONTENT_TYPE, "text/html")],
                files::not_found_page(&resolved.relative, &config.entry_points),
            )
                .into_response();
        }
        Err(FileError::Other(e)) => {
            tracing::warn!(path = %resolved.full.display(), error = %e, "Failed to read file");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/plain")],
                format!("Server Error: {}", files::error_code(&e)),
            )
                .into_response();
        }
    };

    let body = if state.is_designated(&resolved) {
        let ctx = RewriteContext::resolve(state.cell.get(), &QueryParams::parse(uri.query()));
        tracing::debug!(
            state = %ctx.state,
            override_flag = ?ctx.override_flag,
            "Rewriting designated document"
        );
        rewrite::render(&content, &ctx).into_owned()
    } else {
        content
    };

    (
        StatusCode::OK,
        [(
            header::CONTENT_TYPE,
            mime::content_type_for(Path::new(&resolved.relative)),
        )],
        no_cache(),
        body,
    )
        .into_response()
}
