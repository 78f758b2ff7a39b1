//! Request state machine, result pair and progress events.
//!
//! [`PipelineState`] tracks one request through the stages.  The front end
//! sees it through [`PipelineEvent::StateChanged`] and renders
//! [`PipelineState::label`] in its status line.

use crate::poem::Poem;
use crate::speech::AudioArtifact;

// ---------------------------------------------------------------------------
// PipelineState
// ---------------------------------------------------------------------------

/// States of one theme → poem → speech request.
///
/// ```text
/// Idle ──topic──▶ Generating ──poem──▶ Synthesizing ──▶ Done
///                            ──none──▶ Done
///                                      Synthesizing ──audio──▶ Playing ──▶ Done   (console)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineState {
    /// No request in flight.
    #[default]
    Idle,
    /// Waiting on the language model.
    Generating,
    /// Waiting on the speech service.
    Synthesizing,
    /// Console mode only: blocking on local playback.
    Playing,
    /// The request produced its result.
    Done,
}

impl PipelineState {
    /// Returns `true` while a request is in flight.
    ///
    /// The UI uses this to disable the submit button.
    ///
    /// ```
    /// use poetry_voice::pipeline::PipelineState;
    ///
    /// assert!(!PipelineState::Idle.is_busy());
    /// assert!(PipelineState::Generating.is_busy());
    /// assert!(PipelineState::Synthesizing.is_busy());
    /// assert!(PipelineState::Playing.is_busy());
    /// assert!(!PipelineState::Done.is_busy());
    /// ```
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            PipelineState::Generating | PipelineState::Synthesizing | PipelineState::Playing
        )
    }

    /// Short status text for the UI.
    pub fn label(&self) -> &'static str {
        match self {
            PipelineState::Idle => "等待输入",
            PipelineState::Generating => "正在创作诗歌…",
            PipelineState::Synthesizing => "正在合成语音…",
            PipelineState::Playing => "正在播放…",
            PipelineState::Done => "完成",
        }
    }
}

// ---------------------------------------------------------------------------
// PipelineResult
// ---------------------------------------------------------------------------

/// The `(poem, audio)` pair a request ends with.
///
/// Audio is only ever present alongside a poem; the constructors are the
/// only way to build one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PipelineResult {
    poem: Option<Poem>,
    audio: Option<AudioArtifact>,
}

impl PipelineResult {
    /// Generation produced nothing.
    pub fn nothing() -> Self {
        Self::default()
    }

    /// A poem, with or without synthesized audio.
    pub fn with_poem(poem: Poem, audio: Option<AudioArtifact>) -> Self {
        Self {
            poem: Some(poem),
            audio,
        }
    }

    pub fn poem(&self) -> Option<&Poem> {
        self.poem.as_ref()
    }

    pub fn audio(&self) -> Option<&AudioArtifact> {
        self.audio.as_ref()
    }

    /// Both stages produced output.
    pub fn is_complete(&self) -> bool {
        self.poem.is_some() && self.audio.is_some()
    }

    pub fn into_parts(self) -> (Option<Poem>, Option<AudioArtifact>) {
        (self.poem, self.audio)
    }
}

// ---------------------------------------------------------------------------
// PipelineEvent
// ---------------------------------------------------------------------------

/// Progress notifications sent by the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    StateChanged(PipelineState),
    /// The poem is available before synthesis has finished.
    PoemReady(Poem),
    Finished(PipelineResult),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
