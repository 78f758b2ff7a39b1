//! Audio artifacts and extraction of the artifact reference from a TTS result.
//!
//! The TTS app answers with a positional composite (`[message, audio, ...]`).
//! The audio sits at index 1 by convention only; the service does not
//! document it.  [`extract_artifact_reference`] is the single place that
//! knows about that convention and fails softly when it does not hold.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::speech::synthesizer::SynthesisError;

/// Position of the audio reference inside the result composite.
pub const AUDIO_INDEX: usize = 1;

/// Synthesized speech stored on the local filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioArtifact {
    path: PathBuf,
    source: String,
}

impl AudioArtifact {
    /// `path` is the local copy; `source` is where it was fetched from.
    pub fn new(path: impl Into<PathBuf>, source: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            source: source.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

/// Where the TTS service says the audio lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactReference {
    /// Absolute URL, fetch as-is.
    Url(String),
    /// Path on the TTS server, served under `{base_url}/file=`.
    ServerPath(String),
}

impl ArtifactReference {
    /// Absolute URL for downloading the artifact.
    pub fn resolve(&self, base_url: &str) -> String {
        match self {
            ArtifactReference::Url(url) => url.clone(),
            ArtifactReference::ServerPath(path) => {
                format!("{}/file={}", base_url.trim_end_matches('/'), path)
            }
        }
    }

    /// File extension of the referenced audio, if it has one.
    pub fn extension(&self) -> Option<&str> {
        let raw = match self {
            ArtifactReference::Url(s) | ArtifactReference::ServerPath(s) => s.as_str(),
        };
        let file = raw.split(['?', '#']).next()?.rsplit('/').next()?;
        let (_, ext) = file.rsplit_once('.')?;
        (!ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric())).then_some(ext)
    }
}

/// Locate the audio reference in a TTS result composite.
///
/// * not an array, or fewer than two elements → [`SynthesisError::UnexpectedShape`]
/// * element 1 a string → URL or server path
/// * element 1 an object → its `url`, else `path`, else `name`
/// * anything else → [`SynthesisError::UnrecognizedArtifact`]
pub fn extract_artifact_reference(result: &Value) -> Result<ArtifactReference, SynthesisError> {
    let elements = match result.as_array() {
        Some(elements) if elements.len() > AUDIO_INDEX => elements,
        _ => return Err(SynthesisError::UnexpectedShape(summarize(result))),
    };

    let element = &elements[AUDIO_INDEX];
    let reference = match element {
        Value::String(s) => Some(s.as_str()),
        Value::Object(map) => ["url", "path", "name"]
            .iter()
            .filter_map(|key| map.get(*key).and_then(Value::as_str))
            .find(|s| !s.is_empty()),
        _ => None,
    };

    match reference {
        Some(r) if r.starts_with("http://") || r.starts_with("https://") => {
            Ok(ArtifactReference::Url(r.to_string()))
        }
        Some(r) if !r.is_empty() => Ok(ArtifactReference::ServerPath(r.to_string())),
        _ => Err(SynthesisError::UnrecognizedArtifact(summarize(element))),
    }
}

/// Short rendering of a JSON value for log lines.
fn summarize(value: &Value) -> String {
    let text = value.to_string();
    if text.chars().count() > 120 {
        let head: String = text.chars().take(120).collect();
        format!("{head}…")
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn string_path_at_index_one() {
        let result = json!(["Success", "/tmp/gradio/abc/audio.wav"]);
        assert_eq!(
            extract_artifact_reference(&result).unwrap(),
            ArtifactReference::ServerPath("/tmp/gradio/abc/audio.wav".into())
        );
    }

    #[test]
    fn string_url_at_index_one() {
        let result = json!(["Success", "https://host/file=/tmp/a.wav"]);
        assert_eq!(
            extract_artifact_reference(&result).unwrap(),
            ArtifactReference::Url("https://host/file=/tmp/a.wav".into())
        );
    }

    #[test]
    fn object_prefers_url_over_name() {
        let result = json!([
            "Success",
            { "name": "/tmp/a.wav", "url": "https://host/file=/tmp/a.wav", "is_file": true }
        ]);
        assert_eq!(
            extract_artifact_reference(&result).unwrap(),
            ArtifactReference::Url("https://host/file=/tmp/a.wav".into())
        );
    }

    #[test]
    fn object_with_name_only() {
        let result = json!(["Success", { "name": "/tmp/a.wav", "data": null, "is_file": true }]);
        assert_eq!(
            extract_artifact_reference(&result).unwrap(),
            ArtifactReference::ServerPath("/tmp/a.wav".into())
        );
    }

    #[test]
    fn extra_elements_are_ignored() {
        let result = json!(["Success", "/tmp/a.wav", 42, null]);
        assert!(extract_artifact_reference(&result).is_ok());
    }

    #[test]
    fn scalar_result_is_unexpected_shape() {
        let err = extract_artifact_reference(&json!("/tmp/a.wav")).unwrap_err();
        assert!(matches!(err, SynthesisError::UnexpectedShape(_)));
        assert!(err.to_string().contains("unexpected result shape"));
    }

    #[test]
    fn single_element_array_is_unexpected_shape() {
        assert!(matches!(
            extract_artifact_reference(&json!(["Success"])),
            Err(SynthesisError::UnexpectedShape(_))
        ));
    }

    #[test]
    fn null_audio_is_unrecognized() {
        assert!(matches!(
            extract_artifact_reference(&json!(["Error: speaker not found", null])),
            Err(SynthesisError::UnrecognizedArtifact(_))
        ));
    }

    #[test]
    fn empty_string_audio_is_unrecognized() {
        assert!(matches!(
            extract_artifact_reference(&json!(["Success", ""])),
            Err(SynthesisError::UnrecognizedArtifact(_))
        ));
    }

    #[test]
    fn server_path_resolves_under_file_route() {
        let r = ArtifactReference::ServerPath("/tmp/a.wav".into());
        assert_eq!(r.resolve("http://host:7860/"), "http://host:7860/file=/tmp/a.wav");
    }

    #[test]
    fn url_resolves_to_itself() {
        let r = ArtifactReference::Url("https://cdn/x.mp3".into());
        assert_eq!(r.resolve("http://ignored"), "https://cdn/x.mp3");
    }

    #[test]
    fn extension_detection() {
        assert_eq!(ArtifactReference::ServerPath("/tmp/a.wav".into()).extension(), Some("wav"));
        assert_eq!(ArtifactReference::Url("https://h/x.mp3?sig=1".into()).extension(), Some("mp3"));
        assert_eq!(ArtifactReference::ServerPath("/tmp/noext".into()).extension(), None);
    }

    #[test]
    fn long_values_are_summarized() {
        let long = "x".repeat(500);
        let err = extract_artifact_reference(&json!(long)).unwrap_err();
        assert!(err.to_string().chars().count() < 200);
    }
}
