pub mod config;
pub mod provider;

pub use config::{
    DEFAULT_SIMILARITY, DEFAULT_STABILITY, DEFAULT_STYLE, ElevenLabsConfig, VoiceSettings,
};
pub use provider::{ELEVENLABS_TTS_URL, ElevenLabsTTS};
