//! Configuration module for the AutoSpeak bridge.
//!
//! Configuration is read once at startup from environment variables (with
//! `.env` support via `dotenvy`, loaded in `main.rs`) and is immutable for
//! the process lifetime. There is no ambient lookup after startup: the
//! resulting [`ServerConfig`] is passed explicitly to every component that
//! needs it.

use std::env;
use std::path::PathBuf;

use crate::core::tts::elevenlabs::{DEFAULT_SIMILARITY, DEFAULT_STABILITY, DEFAULT_STYLE};

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 5005;

/// Default artifact directory, relative to the working directory.
pub const DEFAULT_AUDIO_DIR: &str = "./audio";

/// The bridge serves a single local caller and only ever binds loopback.
const LOOPBACK_HOST: &str = "127.0.0.1";

/// Server configuration
///
/// Contains everything needed to run the bridge:
/// - Server settings (port; the host is always loopback)
/// - Artifact store location
/// - ElevenLabs credentials and voice-shaping parameters
/// - Local fallback voice selection
/// - Log verbosity
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub audio_dir: PathBuf,
    /// Tracing filter directive (e.g. "info", "debug").
    pub log_level: String,

    /// ElevenLabs API key. `None` (or blank in the environment) disables the
    /// cloud provider for the process lifetime.
    pub elevenlabs_api_key: Option<String>,
    /// ElevenLabs voice identifier; required alongside the API key.
    pub elevenlabs_voice_id: Option<String>,
    /// Voice-shaping parameters, each in [0, 1].
    pub stability: f32,
    pub similarity: f32,
    pub style: f32,

    /// Optional system voice for the local `say` fallback.
    pub say_voice: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Blank credential values are treated as unset. Voice-shaping
    /// parameters outside [0, 1] are a startup error.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let port = match env::var("PORT") {
            Ok(value) => value
                .parse::<u16>()
                .map_err(|e| format!("Invalid PORT '{value}': {e}"))?,
            Err(_) => DEFAULT_PORT,
        };

        let audio_dir = env::var("AUDIO_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_AUDIO_DIR));

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let elevenlabs_api_key = env_trimmed("ELEVENLABS_API_KEY");
        let elevenlabs_voice_id = env_trimmed("ELEVENLABS_VOICE_ID");

        let stability = env_f32("STABILITY", DEFAULT_STABILITY)?;
        let similarity = env_f32("SIMILARITY", DEFAULT_SIMILARITY)?;
        let style = env_f32("STYLE", DEFAULT_STYLE)?;
        for (name, value) in [
            ("STABILITY", stability),
            ("SIMILARITY", similarity),
            ("STYLE", style),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{name} must be in [0, 1], got {value}").into());
            }
        }

        let say_voice = env_trimmed("SAY_VOICE");

        Ok(Self {
            port,
            audio_dir,
            log_level,
            elevenlabs_api_key,
            elevenlabs_voice_id,
            stability,
            similarity,
            style,
            say_voice,
        })
    }

    /// The loopback address the server binds.
    pub fn address(&self) -> String {
        format!("{LOOPBACK_HOST}:{}", self.port)
    }

    /// Whether the cloud provider can be used at all this process lifetime.
    pub fn has_cloud_credentials(&self) -> bool {
        self.elevenlabs_api_key.is_some() && self.elevenlabs_voice_id.is_some()
    }
}

/// Read an environment variable, treating blank values as unset.
fn env_trimmed(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_f32(name: &str, default: f32) -> Result<f32, Box<dyn std::error::Error>> {
    match env::var(name) {
        Ok(value) => value
            .parse::<f32>()
            .map_err(|e| format!("Invalid {name} '{value}': {e}").into()),
        Err(_) => Ok(default),
    }
}
