//! Gateway routes
//!
//! HTTP handlers for model file streaming, session authorization
//! resolution, and the catalog endpoints consumed by the viewer UI.

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tokio_util::io::ReaderStream;

use super::error::GatewayError;
use super::server::GatewayState;

/// Query parameters for the file endpoint
#[derive(Debug, Deserialize)]
pub struct FileParams {
    /// Absolute filesystem path of the requested model file
    pub path: Option<String>,
}

/// Query parameters for session resolution
#[derive(Debug, Deserialize)]
pub struct SessionParams {
    /// Bearer token candidate carried in the page URL
    pub token: Option<String>,
}

/// Stream a model file from the allowed roots
///
/// Route: GET /file?path=<absolute path>
///
/// The request path runs through the full validation pipeline before any
/// filesystem access; on success the file bytes are streamed with an exact
/// `Content-Length` and `Cache-Control: no-store`.
pub async fn serve_file(
    State(state): State<GatewayState>,
    Query(params): Query<FileParams>,
) -> Response {
    let raw = params.path.unwrap_or_default();
    match stream_file(&state, &raw).await {
        Ok(response) => response,
        Err(err) => {
            tracing::debug!(error = %err, "file request rejected");
            err.into_response()
        }
    }
}

async fn stream_file(state: &GatewayState, raw: &str) -> Result<Response, GatewayError> {
    let resolved = state.roots.resolve_request(raw)?;

    // Stat failures of any kind read as absent so filesystem structure
    // never leaks through error detail.
    let metadata = tokio::fs::metadata(&resolved)
        .await
        .map_err(|_| GatewayError::NotFound)?;
    if !metadata.is_file() {
        return Err(GatewayError::NotAFile);
    }

    let file = tokio::fs::File::open(&resolved)
        .await
        .map_err(|_| GatewayError::NotFound)?;

    // The handle is owned by the body stream; dropping the response,
    // including on client disconnect, closes it.
    let body = Body::from_stream(ReaderStream::new(file));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(header::CONTENT_LENGTH, metadata.len())
        .header(header::CACHE_CONTROL, "no-store")
        .body(body)
        .map_err(|e| GatewayError::Internal {
            reason: e.to_string(),
        })
}

/// Resolve session authorization for the viewer shell
///
/// Route: GET /session?token=<token>
///
/// The token candidate comes from the query string; absent that, the gate
/// falls back to its persisted token. The response never exposes why a
/// resolution was denied.
pub async fn resolve_session(
    State(state): State<GatewayState>,
    Query(params): Query<SessionParams>,
) -> impl IntoResponse {
    let outcome = state.gate.resolve(params.token.as_deref()).await;
    Json(json!({ "authorized": outcome.is_authorized() }))
}

/// List the configured models
///
/// Route: GET /models
pub async fn list_models(State(state): State<GatewayState>) -> impl IntoResponse {
    Json(state.catalog.models().to_vec())
}

/// List the warehouse map nodes
///
/// Route: GET /map/nodes
pub async fn list_map_nodes(State(state): State<GatewayState>) -> impl IntoResponse {
    Json(state.catalog.map_nodes().to_vec())
}
