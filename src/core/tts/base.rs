//! Provider seam for text-to-speech backends.
//!
//! Defines the [`BaseTTS`] trait every provider implements, the boxed
//! trait-object alias [`BoxedTTS`], and the crate's TTS failure model
//! ([`TTSError`]/[`TTSResult`]).

use async_trait::async_trait;

use crate::core::store::AudioArtifact;

/// TTS failure model for the bridge.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TTSError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Synthesis failed: {0}")]
    SynthesisFailed(String),

    #[error("Store error: {0}")]
    StoreError(String),
}

impl From<std::io::Error> for TTSError {
    fn from(err: std::io::Error) -> Self {
        TTSError::StoreError(err.to_string())
    }
}

/// Result alias for TTS operations.
pub type TTSResult<T> = Result<T, TTSError>;

/// A synthesis backend: produces an audio artifact from text.
#[async_trait]
pub trait BaseTTS: Send + Sync {
    /// Short, stable name for logging and diagnostics.
    fn name(&self) -> &'static str;

    /// Synthesize `text`, returning the staged audio artifact.
    async fn synthesize(&self, text: &str) -> TTSResult<AudioArtifact>;
}

/// Boxed, dynamically-dispatched TTS provider.
pub type BoxedTTS = Box<dyn BaseTTS>;
