use axum::{
    Json,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

use crate::state::AppState;

/// Serve the most recent audio artifact
///
/// Only completed artifacts are candidates; in-progress writes live in the
/// store's staging area and are never visible here.
pub async fn latest_handler(State(state): State<Arc<AppState>>) -> Response {
    let artifact = match state.store.latest() {
        Ok(Some(artifact)) => artifact,
        Ok(None) => {
            info!("Latest artifact requested but the store is empty");
            return (
                StatusCode::NOT_FOUND,
                Json(json!({"message": "No audio yet"})),
            )
                .into_response();
        }
        Err(e) => {
            error!("Failed to scan artifact store: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Failed to scan artifact store"})),
            )
                .into_response();
        }
    };

    let bytes = match tokio::fs::read(&artifact.path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            error!(
                "Failed to read artifact {}: {}",
                artifact.path.display(),
                e
            );
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Failed to read artifact"})),
            )
                .into_response();
        }
    };

    info!(
        path = %artifact.path.display(),
        bytes = bytes.len(),
        "Serving latest artifact"
    );

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(artifact.format.content_type()),
    );
    if let Ok(len) = HeaderValue::from_str(&bytes.len().to_string()) {
        headers.insert(header::CONTENT_LENGTH, len);
    }

    (StatusCode::OK, headers, bytes).into_response()
}
