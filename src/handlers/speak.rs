use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use crate::core::synthesizer::SynthesisRequest;
use crate::core::text::DEFAULT_MAX_CHARS;
use crate::errors::{AppError, AppResult};
use crate::state::AppState;

/// Request body for the /tts endpoint
#[derive(Debug, Deserialize)]
pub struct TtsRequest {
    /// The text to synthesize. Defaulted so an absent field reaches the
    /// empty-text validation (400) rather than a deserialization rejection.
    #[serde(default)]
    pub text: String,
    /// Split long text into bounded segments instead of truncating.
    #[serde(default)]
    pub chunk: bool,
    /// Per-segment character budget; defaults to 600.
    pub max_chars: Option<usize>,
}

/// Handler for the /tts endpoint
///
/// Synthesizes the request text and responds with the audio bytes of the
/// last produced segment. Earlier segments remain retrievable through the
/// artifact directory.
pub async fn tts_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TtsRequest>,
) -> AppResult<Response> {
    if request.text.trim().is_empty() {
        return Err(AppError::BadRequest("Missing 'text'".to_string()));
    }

    info!(
        chars = request.text.chars().count(),
        chunk = request.chunk,
        "TTS request received"
    );

    let synthesis = SynthesisRequest {
        text: request.text,
        chunk: request.chunk,
        max_chars: request.max_chars.unwrap_or(DEFAULT_MAX_CHARS),
    };

    let artifact = state.synthesizer.speak(&synthesis).await?;

    let bytes = tokio::fs::read(&artifact.path)
        .await
        .map_err(|e| AppError::Internal(format!("failed to read artifact: {e}")))?;

    info!(
        path = %artifact.path.display(),
        bytes = bytes.len(),
        "TTS request complete"
    );

    Ok((
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                artifact.format.content_type().to_string(),
            ),
            (header::CONTENT_LENGTH, bytes.len().to_string()),
        ],
        bytes,
    )
        .into_response())
}
