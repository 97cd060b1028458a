//! ElevenLabs TTS provider implementation.
//!
//! # API Reference
//!
//! - Endpoint: `POST https://api.elevenlabs.io/v1/text-to-speech/{voice_id}`
//! - Auth: `xi-api-key` header
//! - Response: raw MP3 bytes (`Accept: audio/mpeg`)

use std::time::Duration;

use reqwest::StatusCode;
use serde_json::json;
use tracing::info;

use super::config::ElevenLabsConfig;
use crate::core::store::{ArtifactStore, AudioArtifact, AudioFormat};
use crate::core::tts::base::{BaseTTS, TTSError, TTSResult};

/// ElevenLabs TTS API endpoint
pub const ELEVENLABS_TTS_URL: &str = "https://api.elevenlabs.io/v1/text-to-speech";

/// Synthesis model sent with every request.
const ELEVENLABS_MODEL_ID: &str = "eleven_monolingual_v1";

/// Upper bound on a single synthesis round trip. A timed-out call surfaces
/// as `TTSError::Timeout`; no artifact is written until the full response
/// body has arrived, so cancellation leaves nothing behind.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Cloud provider adapter backed by the ElevenLabs REST API.
pub struct ElevenLabsTTS {
    client: reqwest::Client,
    config: ElevenLabsConfig,
    store: ArtifactStore,
    base_url: String,
}

impl ElevenLabsTTS {
    pub fn new(config: ElevenLabsConfig, store: ArtifactStore) -> TTSResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| TTSError::ProviderUnavailable(format!("http client: {e}")))?;
        Ok(Self {
            client,
            config,
            store,
            base_url: ELEVENLABS_TTS_URL.to_string(),
        })
    }

    /// Point the adapter at a different endpoint base. Used by tests to
    /// target a mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Build the synthesis HTTP request for `text`.
    fn build_request(&self, text: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", self.base_url, self.config.voice_id);
        let body = json!({
            "text": text,
            "model_id": ELEVENLABS_MODEL_ID,
            "voice_settings": self.config.voice_settings,
        });
        self.client
            .post(url)
            .header("xi-api-key", &self.config.api_key)
            .header("Accept", "audio/mpeg")
            .json(&body)
    }
}

#[async_trait::async_trait]
impl BaseTTS for ElevenLabsTTS {
    fn name(&self) -> &'static str {
        "elevenlabs"
    }

    async fn synthesize(&self, text: &str) -> TTSResult<AudioArtifact> {
        info!(
            voice_id = %self.config.voice_id,
            chars = text.chars().count(),
            "ElevenLabs synthesis request"
        );

        let response = self.build_request(text).send().await.map_err(|e| {
            if e.is_timeout() {
                TTSError::Timeout(format!("ElevenLabs request exceeded {REQUEST_TIMEOUT:?}"))
            } else {
                TTSError::ProviderUnavailable(format!("ElevenLabs request failed: {e}"))
            }
        })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(TTSError::RateLimited(
                "ElevenLabs returned 429 Too Many Requests".to_string(),
            ));
        }
        if !status.is_success() {
            return Err(TTSError::ProviderUnavailable(format!(
                "ElevenLabs returned HTTP {status}"
            )));
        }

        let bytes = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                TTSError::Timeout(format!("ElevenLabs response exceeded {REQUEST_TIMEOUT:?}"))
            } else {
                TTSError::ProviderUnavailable(format!("ElevenLabs response read failed: {e}"))
            }
        })?;

        let artifact = self.store.persist_bytes(&bytes, AudioFormat::Mp3)?;
        info!(
            path = %artifact.path.display(),
            bytes = bytes.len(),
            "ElevenLabs synthesis complete"
        );
        Ok(artifact)
    }
}
