//! Local OS-voice fallback configuration.

/// Configuration for the local `say` fallback.
#[derive(Debug, Clone, Default)]
pub struct SystemTTSConfig {
    /// System voice passed to `say -v`. `None` uses the OS default voice.
    pub voice: Option<String>,
}
