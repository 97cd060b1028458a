use std::io;
use std::sync::Arc;

use crate::config::ServerConfig;
use crate::core::store::ArtifactStore;
use crate::core::synthesizer::Synthesizer;

/// Application state that can be shared across handlers
pub struct AppState {
    pub config: ServerConfig,
    /// Artifact directory; also reachable through the synthesizer's
    /// providers, which hold clones pointed at the same directory.
    pub store: ArtifactStore,
    /// Synthesis orchestrator wired from the process configuration.
    pub synthesizer: Synthesizer,
}

impl AppState {
    pub fn new(config: ServerConfig) -> io::Result<Arc<Self>> {
        let store = ArtifactStore::open(&config.audio_dir)?;
        let synthesizer =
            Synthesizer::from_config(&config, &store).map_err(|e| io::Error::other(e.to_string()))?;
        Ok(Arc::new(Self {
            config,
            store,
            synthesizer,
        }))
    }
}
