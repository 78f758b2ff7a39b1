//! Process-scoped initialisation: credential, remote clients and the
//! artifact directory.
//!
//! [`Session::init`] runs once at startup and fails when the credential is
//! unusable, before any request is served.  [`Session::shutdown`] removes
//! every downloaded audio file.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tempfile::TempDir;

use crate::config::{load_api_key, AppConfig};
use crate::pipeline::PipelineOrchestrator;
use crate::poem::{GeminiGenerator, PoemGenerator};
use crate::speech::{GradioSynthesizer, SpeechSynthesizer, StagedSynthesizer};

/// Shared clients plus the directory synthesized audio is written to.
pub struct Session {
    config: AppConfig,
    artifacts: TempDir,
    generator: Arc<dyn PoemGenerator>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
}

impl Session {
    /// Read the API key and build the generation and speech clients.
    pub fn init(config: &AppConfig) -> anyhow::Result<Self> {
        let key_file = &config.credentials.api_key_file;
        let api_key = load_api_key(key_file).context("cannot load the API key")?;
        log::info!("session: API key loaded from {}", key_file.display());

        let artifacts = tempfile::Builder::new()
            .prefix("poetry-voice-")
            .tempdir()
            .context("cannot create the audio artifact directory")?;
        log::debug!("session: artifacts in {}", artifacts.path().display());

        let generator: Arc<dyn PoemGenerator> =
            Arc::new(GeminiGenerator::from_config(&config.generation, api_key));
        let synthesizer: Arc<dyn SpeechSynthesizer> = Arc::new(StagedSynthesizer::new(
            GradioSynthesizer::from_config(&config.speech, artifacts.path()),
        ));

        Ok(Self {
            config: config.clone(),
            artifacts,
            generator,
            synthesizer,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn artifacts_dir(&self) -> &Path {
        self.artifacts.path()
    }

    /// A fresh orchestrator over the session's clients.
    pub fn orchestrator(&self) -> PipelineOrchestrator {
        PipelineOrchestrator::new(Arc::clone(&self.generator), Arc::clone(&self.synthesizer))
    }

    /// Delete the artifact directory and everything in it.
    pub fn shutdown(self) {
        let dir = self.artifacts.path().to_path_buf();
        match self.artifacts.close() {
            Ok(()) => log::info!("session: removed {}", dir.display()),
            Err(e) => log::warn!("session: failed to remove {}: {e}", dir.display()),
        }
    }
}
