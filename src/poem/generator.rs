//! Core `PoemGenerator` trait, the [`Poem`] value and generation errors.

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Poem
// ---------------------------------------------------------------------------

/// Poem text as returned by a generator: trimmed and never empty.
///
/// No structural checks are made (line count, rhyme, form).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Poem(String);

impl Poem {
    /// Trim `raw` and wrap it, or return `None` when nothing is left.
    ///
    /// ```
    /// use poetry_voice::poem::Poem;
    ///
    /// assert_eq!(Poem::parse("  静夜思\n床前明月光 \n").unwrap().as_str(), "静夜思\n床前明月光");
    /// assert!(Poem::parse(" \n\t").is_none());
    /// ```
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Poem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// GenerationError
// ---------------------------------------------------------------------------

/// Errors that can occur while generating a poem.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("generation request timed out")]
    Timeout,

    /// The service answered with a non-success status code.
    #[error("generation service returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The HTTP response could not be parsed as expected JSON.
    #[error("failed to parse generation response: {0}")]
    Parse(String),

    /// The model refused the prompt.
    #[error("prompt was blocked: {0}")]
    Blocked(String),

    /// The response contained no usable text.
    #[error("model returned an empty response")]
    EmptyResponse,
}

impl From<reqwest::Error> for GenerationError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GenerationError::Timeout
        } else {
            GenerationError::Request(e.without_url().to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// PoemGenerator trait
// ---------------------------------------------------------------------------

/// Async trait for one-shot poem generation.
///
/// Implementors must be `Send + Sync` so they can be shared as
/// `Arc<dyn PoemGenerator>`.  Each call is stateless: no conversation
/// history is carried between topics.
#[async_trait]
pub trait PoemGenerator: Send + Sync {
    async fn generate(&self, topic: &str) -> Result<Poem, GenerationError>;
}

// ---------------------------------------------------------------------------
// MockPoemGenerator  (test-only)
// ---------------------------------------------------------------------------

/// Test double returning a canned response and recording every topic it was
/// asked about.
#[cfg(test)]
pub struct MockPoemGenerator {
    response: Option<String>,
    topics: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl MockPoemGenerator {
    /// Always "responds" with `raw`; the text goes through [`Poem::parse`].
    pub fn ok(raw: impl Into<String>) -> Self {
        Self {
            response: Some(raw.into()),
            topics: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Always fails with a transport error.
    pub fn failing() -> Self {
        Self {
            response: None,
            topics: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn topics(&self) -> Vec<String> {
        self.topics.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl PoemGenerator for MockPoemGenerator {
    async fn generate(&self, topic: &str) -> Result<Poem, GenerationError> {
        self.topics.lock().unwrap().push(topic.to_string());
        match &self.response {
            Some(raw) => Poem::parse(raw).ok_or(GenerationError::EmptyResponse),
            None => Err(GenerationError::Request("connection refused".into())),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
