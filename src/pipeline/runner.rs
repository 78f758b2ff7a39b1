//! Pipeline orchestrator: drives one topic through generation, synthesis
//! and (in console mode) playback.
//!
//! # Pipeline flow
//!
//! ```text
//! topic
//!   └─▶ generator.generate                 [Generating]
//!         ├─ Err → warn, (none, none)       [Done]
//!         └─ Ok  → synthesizer.synthesize   [Synthesizing]
//!                    ├─ Err → warn, (poem, none)          [Done]
//!                    └─ Ok  → (poem, audio)
//!                               └─ console: player.play   [Playing]
//!                                    └─ Err → warn, result unchanged [Done]
//! ```
//!
//! Stage errors never cross a stage boundary: each one is logged and the
//! stage yields nothing.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::playback::AudioPlayer;
use crate::poem::{Poem, PoemGenerator};
use crate::speech::{AudioArtifact, SpeechSynthesizer};

use super::state::{PipelineEvent, PipelineResult, PipelineState};

// ---------------------------------------------------------------------------
// PipelineOrchestrator
// ---------------------------------------------------------------------------

/// Sequences the poem and speech stages for one topic at a time.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use poetry_voice::config::{ApiKey, GenerationConfig, SpeechConfig};
/// use poetry_voice::pipeline::PipelineOrchestrator;
/// use poetry_voice::poem::GeminiGenerator;
/// use poetry_voice::speech::{GradioSynthesizer, StagedSynthesizer};
///
/// # async fn example() {
/// let generator = GeminiGenerator::from_config(&GenerationConfig::default(), ApiKey::new("key"));
/// let synthesizer = StagedSynthesizer::new(GradioSynthesizer::from_config(
///     &SpeechConfig::default(),
///     std::env::temp_dir(),
/// ));
///
/// let orchestrator = PipelineOrchestrator::new(Arc::new(generator), Arc::new(synthesizer));
/// let result = orchestrator.compose("秋天").await;
/// if let Some(poem) = result.poem() {
///     println!("{poem}");
/// }
/// # }
/// ```
pub struct PipelineOrchestrator {
    generator: Arc<dyn PoemGenerator>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    events: Option<mpsc::Sender<PipelineEvent>>,
}

impl PipelineOrchestrator {
    pub fn new(generator: Arc<dyn PoemGenerator>, synthesizer: Arc<dyn SpeechSynthesizer>) -> Self {
        Self {
            generator,
            synthesizer,
            events: None,
        }
    }

    /// Report progress on `tx`.
    ///
    /// Progress events are dropped if the receiver lags.  The `Finished`
    /// event sent by [`serve`](Self::serve) waits for room instead.
    pub fn with_events(mut self, tx: mpsc::Sender<PipelineEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    // -----------------------------------------------------------------------
    // Entry points
    // -----------------------------------------------------------------------

    /// Run generation and synthesis, returning the result pair.
    pub async fn compose(&self, topic: &str) -> PipelineResult {
        let result = self.run_stages(topic).await;
        self.finish(result)
    }

    /// Run the pipeline and then play the audio, blocking until it ends.
    ///
    /// A playback failure is logged and leaves the result untouched.
    pub async fn compose_and_play(&self, topic: &str, player: &dyn AudioPlayer) -> PipelineResult {
        let result = self.run_stages(topic).await;

        if let Some(audio) = result.audio() {
            self.set_state(PipelineState::Playing);
            if let Err(e) = player.play(audio) {
                log::warn!("pipeline: playback failed: {e}");
            }
        }

        self.finish(result)
    }

    /// Handle topics one at a time until `topics` is closed.
    ///
    /// Results are delivered through the event channel.
    pub async fn serve(self, mut topics: mpsc::Receiver<String>) {
        while let Some(topic) = topics.recv().await {
            let result = self.run_stages(&topic).await;
            self.set_state(PipelineState::Done);
            self.deliver(result).await;
        }

        log::info!("pipeline: topic channel closed, orchestrator shutting down");
    }

    // -----------------------------------------------------------------------
    // Stages
    // -----------------------------------------------------------------------

    async fn run_stages(&self, topic: &str) -> PipelineResult {
        log::debug!("pipeline: topic = {topic:?}");

        self.set_state(PipelineState::Generating);
        let Some(poem) = self.generate(topic).await else {
            return PipelineResult::nothing();
        };
        self.emit(PipelineEvent::PoemReady(poem.clone()));

        self.set_state(PipelineState::Synthesizing);
        let audio = self.synthesize(&poem).await;

        PipelineResult::with_poem(poem, audio)
    }

    async fn generate(&self, topic: &str) -> Option<Poem> {
        match self.generator.generate(topic).await {
            Ok(poem) => {
                log::info!("pipeline: generated poem:\n{poem}");
                Some(poem)
            }
            Err(e) => {
                log::warn!("pipeline: poem generation failed: {e}");
                None
            }
        }
    }

    async fn synthesize(&self, poem: &Poem) -> Option<AudioArtifact> {
        match self.synthesizer.synthesize(poem.as_str()).await {
            Ok(artifact) => {
                log::info!("pipeline: audio ready at {}", artifact.path().display());
                Some(artifact)
            }
            Err(e) => {
                log::warn!("pipeline: speech synthesis failed: {e}");
                None
            }
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn finish(&self, result: PipelineResult) -> PipelineResult {
        self.set_state(PipelineState::Done);
        self.emit(PipelineEvent::Finished(result.clone()));
        result
    }

    /// Send the final result, waiting while the channel is full.
    async fn deliver(&self, result: PipelineResult) {
        if let Some(tx) = &self.events {
            if tx.send(PipelineEvent::Finished(result)).await.is_err() {
                log::debug!("pipeline: result receiver gone");
            }
        }
    }

    fn set_state(&self, state: PipelineState) {
        log::debug!("pipeline: → {}", state.label());
        self.emit(PipelineEvent::StateChanged(state));
    }

    fn emit(&self, event: PipelineEvent) {
        if let Some(tx) = &self.events {
            if let Err(e) = tx.try_send(event) {
                log::debug!("pipeline: progress event dropped: {e}");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
