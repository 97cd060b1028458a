mod base;
pub mod elevenlabs;
pub mod system;

pub use base::{BaseTTS, BoxedTTS, TTSError, TTSResult};
pub use elevenlabs::{ELEVENLABS_TTS_URL, ElevenLabsConfig, ElevenLabsTTS, VoiceSettings};
pub use system::{SystemTTS, SystemTTSConfig};
