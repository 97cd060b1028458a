//! Synthesis orchestrator: provider selection and fallback.
//!
//! Per segment the flow is `TRY_CLOUD (if configured) → TRY_LOCAL`. The
//! cloud provider is attempted at most once per segment; rate limiting and
//! any other cloud failure both fall back to the local provider. A local
//! failure is terminal for the request.

use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::core::store::{ArtifactStore, AudioArtifact};
use crate::core::text::{self, DEFAULT_MAX_CHARS};
use crate::core::tts::elevenlabs::{ElevenLabsConfig, ElevenLabsTTS, VoiceSettings};
use crate::core::tts::system::{SystemTTS, SystemTTSConfig};
use crate::core::tts::{BoxedTTS, TTSError, TTSResult};

/// One HTTP call's synthesis parameters. Built from the request body and
/// dropped once the response is produced.
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    pub text: String,
    pub chunk: bool,
    pub max_chars: usize,
}

impl SynthesisRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            chunk: false,
            max_chars: DEFAULT_MAX_CHARS,
        }
    }
}

/// Chooses a provider per segment and applies the fallback policy.
pub struct Synthesizer {
    cloud: Option<BoxedTTS>,
    fallback: BoxedTTS,
}

impl Synthesizer {
    /// Wire providers from the process configuration. The cloud provider
    /// exists only when both ElevenLabs credentials are present.
    pub fn from_config(config: &ServerConfig, store: &ArtifactStore) -> TTSResult<Self> {
        let cloud: Option<BoxedTTS> = match (&config.elevenlabs_api_key, &config.elevenlabs_voice_id)
        {
            (Some(api_key), Some(voice_id)) => {
                let eleven = ElevenLabsTTS::new(
                    ElevenLabsConfig {
                        api_key: api_key.clone(),
                        voice_id: voice_id.clone(),
                        voice_settings: VoiceSettings {
                            stability: config.stability,
                            similarity_boost: config.similarity,
                            style: config.style,
                        },
                    },
                    store.clone(),
                )?;
                Some(Box::new(eleven))
            }
            _ => None,
        };

        let fallback: BoxedTTS = Box::new(SystemTTS::new(
            SystemTTSConfig {
                voice: config.say_voice.clone(),
            },
            store.clone(),
        ));

        Ok(Self { cloud, fallback })
    }

    /// Assemble an orchestrator from explicit providers. Primarily a test
    /// seam; `from_config` is the production path.
    pub fn with_providers(cloud: Option<BoxedTTS>, fallback: BoxedTTS) -> Self {
        Self { cloud, fallback }
    }

    pub fn cloud_configured(&self) -> bool {
        self.cloud.is_some()
    }

    /// Synthesize a full request: normalize the text, then run one synthesis
    /// per segment. Returns the final segment's artifact; any segment
    /// failure aborts the request immediately.
    pub async fn speak(&self, request: &SynthesisRequest) -> TTSResult<AudioArtifact> {
        if request.max_chars == 0 {
            return Err(TTSError::InvalidInput(
                "max_chars must be a positive integer".to_string(),
            ));
        }

        let text = text::prepare(&request.text)?;
        let total_chars = text.chars().count();

        if request.chunk && total_chars > request.max_chars {
            let mut last = None;
            let mut segments = 0usize;
            for segment in text::chunk(&text, request.max_chars) {
                last = Some(self.synthesize_segment(&segment).await?);
                segments += 1;
            }
            info!(segments, "chunked synthesis complete");
            // `prepare` guarantees non-empty text, so at least one segment
            // was produced.
            last.ok_or_else(|| TTSError::SynthesisFailed("no segments produced".to_string()))
        } else {
            let bounded = if request.chunk {
                text.as_str()
            } else {
                text::truncate_chars(&text, request.max_chars)
            };
            self.synthesize_segment(bounded).await
        }
    }

    /// One segment through the provider state machine.
    async fn synthesize_segment(&self, text: &str) -> TTSResult<AudioArtifact> {
        if let Some(cloud) = &self.cloud {
            match cloud.synthesize(text).await {
                Ok(artifact) => return Ok(artifact),
                // No cloud retry within a request: the caller may retry at
                // the HTTP layer once the quota window passes.
                Err(TTSError::RateLimited(msg)) => {
                    warn!("{} rate-limited ({msg}); falling back to {}", cloud.name(), self.fallback.name());
                }
                Err(e) => {
                    warn!("{} failed ({e}); falling back to {}", cloud.name(), self.fallback.name());
                }
            }
        }

        self.fallback.synthesize(text).await.map_err(|e| match e {
            TTSError::InvalidInput(_) => e,
            other => TTSError::SynthesisFailed(other.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::AudioFormat;
    use crate::core::tts::BaseTTS;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// Provider double that counts invocations and either succeeds through
    /// the real store or fails with a fixed error.
    struct ScriptedTTS {
        name: &'static str,
        calls: Arc<AtomicUsize>,
        store: Option<ArtifactStore>,
        failure: Option<TTSError>,
    }

    #[async_trait::async_trait]
    impl BaseTTS for ScriptedTTS {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn synthesize(&self, text: &str) -> TTSResult<AudioArtifact> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(err) = &self.failure {
                return Err(err.clone());
            }
            let store = self.store.as_ref().expect("succeeding mock needs a store");
            Ok(store
                .persist_bytes(text.as_bytes(), AudioFormat::Mp3)
                .unwrap())
        }
    }

    fn succeeding(
        name: &'static str,
        store: &ArtifactStore,
    ) -> (Box<ScriptedTTS>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let tts = Box::new(ScriptedTTS {
            name,
            calls: calls.clone(),
            store: Some(store.clone()),
            failure: None,
        });
        (tts, calls)
    }

    fn failing(name: &'static str, failure: TTSError) -> (Box<ScriptedTTS>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let tts = Box::new(ScriptedTTS {
            name,
            calls: calls.clone(),
            store: None,
            failure: Some(failure),
        });
        (tts, calls)
    }

    fn test_store() -> (TempDir, ArtifactStore) {
        let tmp = TempDir::new().unwrap();
        let store = ArtifactStore::open(tmp.path().join("audio")).unwrap();
        (tmp, store)
    }

    #[tokio::test]
    async fn test_unconfigured_cloud_uses_fallback_once() {
        let (_tmp, store) = test_store();
        let (fallback, fallback_calls) = succeeding("local", &store);
        let synth = Synthesizer::with_providers(None, fallback);

        let artifact = synth
            .speak(&SynthesisRequest::new("Hello world."))
            .await
            .unwrap();
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 1);
        assert!(artifact.path.exists());
    }

    #[tokio::test]
    async fn test_cloud_success_skips_fallback() {
        let (_tmp, store) = test_store();
        let (cloud, cloud_calls) = succeeding("cloud", &store);
        let (fallback, fallback_calls) = failing(
            "local",
            TTSError::ProviderUnavailable("should not run".to_string()),
        );
        let synth = Synthesizer::with_providers(Some(cloud), fallback);

        synth
            .speak(&SynthesisRequest::new("Hello world."))
            .await
            .unwrap();
        assert_eq!(cloud_calls.load(Ordering::SeqCst), 1);
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_rate_limited_cloud_not_retried_and_falls_back() {
        let (_tmp, store) = test_store();
        let (cloud, cloud_calls) = failing("cloud", TTSError::RateLimited("429".to_string()));
        let (fallback, fallback_calls) = succeeding("local", &store);
        let synth = Synthesizer::with_providers(Some(cloud), fallback);

        synth
            .speak(&SynthesisRequest::new("Hello world."))
            .await
            .unwrap();
        assert_eq!(cloud_calls.load(Ordering::SeqCst), 1);
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cloud_error_falls_back() {
        let (_tmp, store) = test_store();
        let (cloud, _) = failing(
            "cloud",
            TTSError::ProviderUnavailable("HTTP 503".to_string()),
        );
        let (fallback, fallback_calls) = succeeding("local", &store);
        let synth = Synthesizer::with_providers(Some(cloud), fallback);

        let artifact = synth
            .speak(&SynthesisRequest::new("Hello world."))
            .await
            .unwrap();
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 1);
        assert!(artifact.path.exists());
    }

    #[tokio::test]
    async fn test_fallback_failure_is_synthesis_failed() {
        let (fallback, _) = failing(
            "local",
            TTSError::ProviderUnavailable("'say' not found".to_string()),
        );
        let synth = Synthesizer::with_providers(None, fallback);

        let err = synth
            .speak(&SynthesisRequest::new("Hello world."))
            .await
            .unwrap_err();
        assert!(matches!(err, TTSError::SynthesisFailed(_)));
    }

    #[tokio::test]
    async fn test_label_is_stripped_before_providers() {
        let (_tmp, store) = test_store();
        let (fallback, _) = succeeding("local", &store);
        let synth = Synthesizer::with_providers(None, fallback);

        let artifact = synth
            .speak(&SynthesisRequest::new("LAURA: Hello world."))
            .await
            .unwrap();
        // The mock writes the received text as the artifact body.
        let spoken = std::fs::read_to_string(&artifact.path).unwrap();
        assert_eq!(spoken, "Hello world.");
    }

    #[tokio::test]
    async fn test_unchunked_long_text_truncated() {
        let (_tmp, store) = test_store();
        let (fallback, _) = succeeding("local", &store);
        let synth = Synthesizer::with_providers(None, fallback);

        let mut request = SynthesisRequest::new("a".repeat(700));
        request.max_chars = 600;
        let artifact = synth.speak(&request).await.unwrap();
        let spoken = std::fs::read_to_string(&artifact.path).unwrap();
        assert_eq!(spoken.chars().count(), 600);
    }

    #[tokio::test]
    async fn test_chunked_request_synthesizes_each_segment_in_order() {
        let (_tmp, store) = test_store();
        let (fallback, fallback_calls) = succeeding("local", &store);
        let synth = Synthesizer::with_providers(None, fallback);

        let sentence = "This sentence is repeated to exceed the segment budget.";
        let text = std::iter::repeat(sentence)
            .take(30)
            .collect::<Vec<_>>()
            .join(" ");
        assert!(text.chars().count() > 1500);

        let request = SynthesisRequest {
            text: text.clone(),
            chunk: true,
            max_chars: 600,
        };
        let artifact = synth.speak(&request).await.unwrap();

        let calls = fallback_calls.load(Ordering::SeqCst);
        assert!(calls >= 3, "expected >= 3 segments, got {calls}");
        // The response artifact is the final segment's.
        let spoken = std::fs::read_to_string(&artifact.path).unwrap();
        assert!(text.ends_with(&spoken));
    }

    #[tokio::test]
    async fn test_chunked_segment_failure_propagates() {
        let (fallback, calls) = failing(
            "local",
            TTSError::ProviderUnavailable("down".to_string()),
        );
        let synth = Synthesizer::with_providers(None, fallback);

        let request = SynthesisRequest {
            text: "One. Two. Three.".repeat(100),
            chunk: true,
            max_chars: 100,
        };
        let err = synth.speak(&request).await.unwrap_err();
        assert!(matches!(err, TTSError::SynthesisFailed(_)));
        // First segment fails; no further segments are attempted.
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_max_chars_rejected() {
        let (fallback, _) = failing("local", TTSError::ProviderUnavailable("x".to_string()));
        let synth = Synthesizer::with_providers(None, fallback);

        let request = SynthesisRequest {
            text: "hello".to_string(),
            chunk: false,
            max_chars: 0,
        };
        let err = synth.speak(&request).await.unwrap_err();
        assert!(matches!(err, TTSError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_empty_text_rejected() {
        let (fallback, calls) = failing("local", TTSError::ProviderUnavailable("x".to_string()));
        let synth = Synthesizer::with_providers(None, fallback);

        let err = synth
            .speak(&SynthesisRequest::new("   "))
            .await
            .unwrap_err();
        assert!(matches!(err, TTSError::InvalidInput(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
