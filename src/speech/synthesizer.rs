//! Core `SpeechSynthesizer` trait and synthesis errors.

use async_trait::async_trait;
use thiserror::Error;

use crate::speech::artifact::AudioArtifact;

// ---------------------------------------------------------------------------
// SynthesisError
// ---------------------------------------------------------------------------

/// Errors that can occur while turning poem text into speech.
#[derive(Debug, Error)]
pub enum SynthesisError {
    /// The per-request staging file could not be written.
    #[error("failed to stage text: {0}")]
    Staging(#[from] std::io::Error),

    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("speech request timed out")]
    Timeout,

    /// The service answered with a non-success status code.
    #[error("speech service returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The HTTP response body was not JSON.
    #[error("failed to parse speech response: {0}")]
    Parse(String),

    /// The result was not a composite of at least two elements.
    #[error("unexpected result shape: {0}")]
    UnexpectedShape(String),

    /// Element 1 of the composite did not name an audio resource.
    #[error("unrecognized audio reference: {0}")]
    UnrecognizedArtifact(String),

    /// The audio resource could not be fetched or stored locally.
    #[error("failed to download audio: {0}")]
    Download(String),
}

impl From<reqwest::Error> for SynthesisError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SynthesisError::Timeout
        } else {
            SynthesisError::Request(e.without_url().to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// SpeechSynthesizer trait
// ---------------------------------------------------------------------------

/// Async trait for text-to-speech backends.
///
/// Implementors must be `Send + Sync` so they can be shared as
/// `Arc<dyn SpeechSynthesizer>`.  Synthesis parameters are fixed at
/// construction; only the text varies per call.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<AudioArtifact, SynthesisError>;
}

// ---------------------------------------------------------------------------
// MockSynthesizer  (test-only)
// ---------------------------------------------------------------------------

/// Test double that returns a fixed artifact (or a shape failure) and
/// records the texts it received.
#[cfg(test)]
pub struct MockSynthesizer {
    artifact: Option<AudioArtifact>,
    texts: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl MockSynthesizer {
    pub fn ok(path: impl Into<std::path::PathBuf>) -> Self {
        Self {
            artifact: Some(AudioArtifact::new(path, "mock://speech")),
            texts: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Behaves like a service that answered with a bare scalar.
    pub fn scalar_result() -> Self {
        Self {
            artifact: None,
            texts: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn texts(&self) -> Vec<String> {
        self.texts.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.texts.lock().unwrap().len()
    }
}

#[cfg(test)]
#[async_trait]
impl SpeechSynthesizer for MockSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<AudioArtifact, SynthesisError> {
        self.texts.lock().unwrap().push(text.to_string());
        match &self.artifact {
            Some(artifact) => Ok(artifact.clone()),
            None => Err(SynthesisError::UnexpectedShape("\"/tmp/a.wav\"".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_records_texts() {
        let synth = MockSynthesizer::ok("/tmp/a.wav");
        synth.synthesize("一").await.unwrap();
        synth.synthesize("二").await.unwrap();
        assert_eq!(synth.texts(), vec!["一".to_string(), "二".to_string()]);
    }

    #[tokio::test]
    async fn mock_scalar_result_is_shape_error() {
        let synth = MockSynthesizer::scalar_result();
        assert!(matches!(
            synth.synthesize("诗").await,
            Err(SynthesisError::UnexpectedShape(_))
        ));
        assert_eq!(synth.calls(), 1);
    }

    #[test]
    fn synthesizer_is_object_safe() {
        let _: Box<dyn SpeechSynthesizer> = Box::new(MockSynthesizer::ok("/tmp/a.wav"));
    }

    #[test]
    fn io_errors_convert_to_staging() {
        let err: SynthesisError = std::io::Error::other("disk full").into();
        assert!(matches!(err, SynthesisError::Staging(_)));
    }
}
