//! ElevenLabs provider configuration.

use serde::Serialize;

/// Default voice-shaping parameters, matching the bridge's historical
/// tuning for its default voice.
pub const DEFAULT_STABILITY: f32 = 0.45;
pub const DEFAULT_SIMILARITY: f32 = 0.70;
pub const DEFAULT_STYLE: f32 = 0.15;

/// Voice-shaping parameters sent with every synthesis request.
///
/// All three are in `[0.0, 1.0]`; range validation happens at configuration
/// load, not here.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct VoiceSettings {
    pub stability: f32,
    pub similarity_boost: f32,
    pub style: f32,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            stability: DEFAULT_STABILITY,
            similarity_boost: DEFAULT_SIMILARITY,
            style: DEFAULT_STYLE,
        }
    }
}

/// Immutable ElevenLabs credentials and voice settings, derived once at
/// startup.
#[derive(Debug, Clone)]
pub struct ElevenLabsConfig {
    /// ElevenLabs API key (`xi-api-key` header).
    pub api_key: String,
    /// Voice identifier appended to the endpoint path.
    pub voice_id: String,
    /// Voice-shaping parameters.
    pub voice_settings: VoiceSettings,
}
