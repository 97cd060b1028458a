//! Local OS-voice fallback provider.
//!
//! Drives the macOS voice stack: `say` synthesizes to AIFF, `afconvert`
//! compresses to MP3 when available, `afplay` plays the result. Only the
//! synthesis step is required; conversion and playback degrade softly.

use std::ffi::OsString;
use std::path::Path;

use tokio::process::Command;
use tracing::{info, warn};

use super::config::SystemTTSConfig;
use crate::core::store::{ArtifactStore, AudioArtifact, AudioFormat};
use crate::core::tts::base::{BaseTTS, TTSError, TTSResult};

const SYNTH_BIN: &str = "say";
const CONVERT_BIN: &str = "afconvert";
const PLAYER_BIN: &str = "afplay";

/// Fallback provider backed by the operating system's voice synthesizer.
pub struct SystemTTS {
    config: SystemTTSConfig,
    store: ArtifactStore,
}

impl SystemTTS {
    pub fn new(config: SystemTTSConfig, store: ArtifactStore) -> Self {
        Self { config, store }
    }

    /// Arguments for the `say` invocation writing `out`.
    fn synth_args(&self, out: &Path, text: &str) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-o".into(), out.into()];
        if let Some(voice) = &self.config.voice {
            args.push("-v".into());
            args.push(voice.into());
        }
        args.push(text.into());
        args
    }

    /// Run `say`, producing the staged AIFF. A missing binary or a non-zero
    /// exit makes the whole provider unavailable.
    async fn run_synthesizer(&self, aiff: &Path, text: &str) -> TTSResult<()> {
        let status = Command::new(SYNTH_BIN)
            .args(self.synth_args(aiff, text))
            .status()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    TTSError::ProviderUnavailable(format!(
                        "'{SYNTH_BIN}' not found (macOS only); configure ElevenLabs instead"
                    ))
                } else {
                    TTSError::ProviderUnavailable(format!("'{SYNTH_BIN}' failed to start: {e}"))
                }
            })?;
        if !status.success() {
            return Err(TTSError::ProviderUnavailable(format!(
                "'{SYNTH_BIN}' exited with {status}"
            )));
        }
        Ok(())
    }

    /// Best-effort AIFF→MP3 conversion. Returns whether it succeeded; a
    /// missing or failing converter is a warning, never an error.
    async fn try_convert(&self, aiff: &Path, mp3: &Path) -> bool {
        let result = Command::new(CONVERT_BIN)
            .arg(aiff)
            .arg(mp3)
            .args(["-f", "MP3", "-d", "ae32"])
            .status()
            .await;
        match result {
            Ok(status) if status.success() => true,
            Ok(status) => {
                warn!("'{CONVERT_BIN}' exited with {status}; serving AIFF instead of MP3");
                false
            }
            Err(e) => {
                warn!("'{CONVERT_BIN}' not available ({e}); serving AIFF instead of MP3");
                false
            }
        }
    }

    /// Fire-and-forget playback of the committed artifact. The request never
    /// waits on (or fails because of) the player.
    fn spawn_playback(&self, path: &Path) {
        match Command::new(PLAYER_BIN).arg(path).spawn() {
            Ok(_child) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(
                    "'{PLAYER_BIN}' not found; skipping auto-playback. File saved: {}",
                    path.display()
                );
            }
            Err(e) => {
                warn!("'{PLAYER_BIN}' failed to start ({e}); skipping auto-playback");
            }
        }
    }
}

#[async_trait::async_trait]
impl BaseTTS for SystemTTS {
    fn name(&self) -> &'static str {
        "system"
    }

    async fn synthesize(&self, text: &str) -> TTSResult<AudioArtifact> {
        info!(chars = text.chars().count(), "system voice synthesis");

        let aiff = self.store.stage(AudioFormat::Aiff);
        self.run_synthesizer(&aiff, text).await?;

        let mp3 = self.store.stage(AudioFormat::Mp3);
        let converted = self.try_convert(&aiff, &mp3).await;

        let artifact = if converted {
            self.store.commit(&mp3)?
        } else {
            self.store.commit(&aiff)?
        };

        self.spawn_playback(&artifact.path);

        if converted {
            // The AIFF was superseded by the MP3; cleanup is best-effort.
            let _ = std::fs::remove_file(&aiff);
        }

        info!(
            path = %artifact.path.display(),
            format = artifact.format.extension(),
            "system voice synthesis complete"
        );
        Ok(artifact)
    }
}
