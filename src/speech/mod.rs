//! Speech synthesis module.
//!
//! # Architecture
//!
//! ```text
//! StagedSynthesizer            ← writes the poem to a scoped .txt file
//!   └─ GradioSynthesizer       ← POST text + VoiceSettings to the TTS app
//!        └─ extract_artifact_reference(result[1])
//!             └─ download → AudioArtifact (session artifact dir)
//! ```
//!
//! Everything behind [`SpeechSynthesizer`] returns `Result`; turning an
//! error into "no audio" plus a log line is the orchestrator's job.

pub mod artifact;
pub mod gradio;
pub mod staging;
pub mod synthesizer;
pub mod voice;

// ── Public re-exports ──────────────────────────────────────────────────────

pub use artifact::{extract_artifact_reference, ArtifactReference, AudioArtifact, AUDIO_INDEX};
pub use gradio::GradioSynthesizer;
pub use staging::StagedSynthesizer;
pub use synthesizer::{SpeechSynthesizer, SynthesisError};
pub use voice::{PromptMode, StyleSettings, VoiceSettings};

#[cfg(test)]
pub use synthesizer::MockSynthesizer;
