//! HTTP Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use genui_nodes::{NodeDescriptor, NodeError, UiPayload};

use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub nodes: usize,
}

#[derive(Debug, Serialize)]
pub struct ExecuteResponse {
    pub outputs: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ui: Option<UiPayload>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, code: &str, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            code: code.into(),
        }),
    )
}

fn node_error(e: &NodeError) -> ApiError {
    match e {
        NodeError::UnknownNode(_) => api_error(StatusCode::NOT_FOUND, "UNKNOWN_NODE", e.to_string()),
        e if e.is_input_error() => api_error(StatusCode::BAD_REQUEST, "INVALID_INPUT", e.to_string()),
        e => {
            tracing::error!(error = %e, "Node execution failed");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "NODE_ERROR", e.to_string())
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ViewQuery {
    pub filename: String,
    #[serde(default)]
    pub subfolder: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub allow_html: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        nodes: state.registry.len(),
    })
}

/// Node descriptors in registration order
pub async fn list_nodes(State(state): State<AppState>) -> Json<Vec<NodeDescriptor>> {
    Json(state.registry.descriptors().await)
}

/// Execute one node with JSON inputs
pub async fn execute_node(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(inputs): Json<Map<String, Value>>,
) -> Result<Json<ExecuteResponse>, ApiError> {
    tracing::info!(node = %name, "Executing node");
    let output = state
        .registry
        .execute_json(&name, &inputs)
        .await
        .map_err(|e| node_error(&e))?;

    Ok(Json(ExecuteResponse {
        outputs: output.values.iter().map(genui_nodes::NodeValue::to_json).collect(),
        ui: output.ui,
    }))
}

fn content_type(filename: &str) -> &'static str {
    let ext = filename.rsplit_once('.').map(|(_, e)| e.to_ascii_lowercase()).unwrap_or_default();
    match ext.as_str() {
        "html" | "htm" => "text/html; charset=utf-8",
        "txt" | "log" | "md" => "text/plain; charset=utf-8",
        "json" => "application/json",
        "csv" => "text/csv; charset=utf-8",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

fn is_plain_segment(segment: &str) -> bool {
    !segment.is_empty() && segment != "." && segment != ".."
}

/// Serve a file from the output directory
pub async fn view_file(State(state): State<AppState>, Query(query): Query<ViewQuery>) -> Result<Response, ApiError> {
    if query.kind.as_deref().is_some_and(|k| k != "output") {
        return Err(api_error(StatusCode::BAD_REQUEST, "INVALID_TYPE", "only type=output is served"));
    }
    if !is_plain_segment(&query.filename) || query.filename.contains(['/', '\\']) {
        return Err(api_error(StatusCode::BAD_REQUEST, "INVALID_PATH", "invalid filename"));
    }

    let mut path = state.config.output_dir.clone();
    for segment in query.subfolder.split(['/', '\\']).filter(|s| !s.is_empty()) {
        if !is_plain_segment(segment) {
            return Err(api_error(StatusCode::BAD_REQUEST, "INVALID_PATH", "invalid subfolder"));
        }
        path.push(segment);
    }
    path.push(&query.filename);

    let content_type = content_type(&query.filename);
    if content_type.starts_with("text/html") && query.allow_html.as_deref() != Some("1") {
        return Err(api_error(StatusCode::FORBIDDEN, "HTML_NOT_ALLOWED", "set allow_html=1 to view HTML"));
    }

    match tokio::fs::read(&path).await {
        Ok(bytes) => Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(api_error(StatusCode::NOT_FOUND, "NOT_FOUND", "file not found"))
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Cannot read file");
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, "READ_ERROR", "cannot read file"))
        }
    }
}
