pub mod store;
pub mod synthesizer;
pub mod text;
pub mod tts;

// Re-export commonly used types for convenience
pub use store::{ArtifactStore, AudioArtifact, AudioFormat};
pub use synthesizer::{SynthesisRequest, Synthesizer};
pub use text::{DEFAULT_MAX_CHARS, chunk, prepare, truncate_chars};
pub use tts::{
    BaseTTS, BoxedTTS, ELEVENLABS_TTS_URL, ElevenLabsConfig, ElevenLabsTTS, SystemTTS,
    SystemTTSConfig, TTSError, TTSResult, VoiceSettings,
};
