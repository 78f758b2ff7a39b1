//! `GradioSynthesizer`: remote TTS through a Gradio app's REST route.
//!
//! ```text
//! POST {base_url}/run/{api_name}   {"data": [text, speaker, ...]}
//!   └─▶ {"data": [message, audio, ...]}
//!         └─▶ audio reference at index 1
//!               └─▶ GET {base_url}/file={path} (or the URL as given)
//!                     └─▶ written into the session artifact directory
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tempfile::NamedTempFile;

use crate::config::SpeechConfig;
use crate::speech::artifact::{extract_artifact_reference, ArtifactReference, AudioArtifact};
use crate::speech::synthesizer::{SpeechSynthesizer, SynthesisError};

/// Calls a Gradio TTS endpoint with the configured [`VoiceSettings`].
///
/// [`VoiceSettings`]: crate::speech::VoiceSettings
pub struct GradioSynthesizer {
    client: reqwest::Client,
    config: SpeechConfig,
    download_dir: PathBuf,
}

impl GradioSynthesizer {
    /// Build a synthesizer that stores fetched audio in `download_dir`.
    pub fn from_config(config: &SpeechConfig, download_dir: impl Into<PathBuf>) -> Self {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(std::time::Duration::from_secs(secs));
        }
        let client = builder.build().unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
            download_dir: download_dir.into(),
        }
    }

    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/run/{}",
            self.base_url(),
            self.config.api_name.trim_start_matches('/')
        )
    }

    /// POST the text and return the result composite.
    async fn predict(&self, text: &str) -> Result<Value, SynthesisError> {
        let body = serde_json::json!({ "data": self.config.voice.request_data(text) });

        let response = self.client.post(self.endpoint()).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(SynthesisError::Status { status, body });
        }

        let mut json: Value = response
            .json()
            .await
            .map_err(|e| SynthesisError::Parse(e.to_string()))?;

        // The composite is wrapped in `data`; a reply without it is judged as-is.
        if json.get("data").is_some() {
            Ok(json["data"].take())
        } else {
            Ok(json)
        }
    }

    /// Fetch the referenced audio into the download directory.
    async fn download(&self, reference: &ArtifactReference) -> Result<AudioArtifact, SynthesisError> {
        let url = reference.resolve(self.base_url());

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SynthesisError::Download(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SynthesisError::Download(format!(
                "{url} returned {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SynthesisError::Download(e.to_string()))?;

        let file = reserve_file(&self.download_dir, reference.extension().unwrap_or("wav"))?;
        let path = save_artifact(file, &bytes).await?;

        log::debug!("speech: saved {} bytes to {}", bytes.len(), path.display());
        Ok(AudioArtifact::new(path, url))
    }
}

/// Create a uniquely named file in `dir`, removed again if dropped.
fn reserve_file(dir: &Path, extension: &str) -> Result<NamedTempFile, SynthesisError> {
    tempfile::Builder::new()
        .prefix("speech-")
        .suffix(&format!(".{extension}"))
        .tempfile_in(dir)
        .map_err(|e| SynthesisError::Download(format!("{}: {e}", dir.display())))
}

/// Write `bytes` into `file` and keep it only once the write succeeded.
async fn save_artifact(file: NamedTempFile, bytes: &[u8]) -> Result<PathBuf, SynthesisError> {
    tokio::fs::write(file.path(), bytes)
        .await
        .map_err(|e| SynthesisError::Download(format!("{}: {e}", file.path().display())))?;

    let (_, path) = file
        .keep()
        .map_err(|e| SynthesisError::Download(e.to_string()))?;
    Ok(path)
}

#[async_trait]
impl SpeechSynthesizer for GradioSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<AudioArtifact, SynthesisError> {
        log::info!("speech: requesting synthesis from {}", self.endpoint());

        let composite = self.predict(text).await?;
        log::debug!("speech: result composite = {composite}");

        let reference = extract_artifact_reference(&composite)?;
        self.download(&reference).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;
    use tempfile::tempdir;

    fn synthesizer_for(base_url: &str, dir: &Path) -> GradioSynthesizer {
        let config = SpeechConfig {
            base_url: base_url.to_string(),
            ..SpeechConfig::default()
        };
        GradioSynthesizer::from_config(&config, dir)
    }

    #[test]
    fn endpoint_uses_run_route() {
        let dir = tempdir().unwrap();
        let synth = synthesizer_for("http://host:7860/", dir.path());
        assert_eq!(synth.endpoint(), "http://host:7860/run/tts_fn");
    }

    #[tokio::test]
    async fn downloads_server_path_into_download_dir() {
        let dir = tempdir().unwrap();
        let mut server = mockito::Server::new_async().await;

        let predict = server
            .mock("POST", "/run/tts_fn")
            .match_body(Matcher::PartialJson(json!({ "data": ["床前明月光", "东雪莲"] })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "data": ["Success", "/tmp/gradio/out.wav"] }).to_string())
            .create_async()
            .await;
        let file = server
            .mock("GET", "/file=/tmp/gradio/out.wav")
            .with_status(200)
            .with_body(b"RIFF....WAVE")
            .create_async()
            .await;

        let synth = synthesizer_for(&server.url(), dir.path());
        let artifact = synth.synthesize("床前明月光").await.unwrap();

        predict.assert_async().await;
        file.assert_async().await;
        assert!(artifact.path().starts_with(dir.path()));
        assert_eq!(artifact.path().extension().unwrap(), "wav");
        assert_eq!(std::fs::read(artifact.path()).unwrap(), b"RIFF....WAVE");
        assert!(artifact.source().ends_with("/file=/tmp/gradio/out.wav"));
    }

    #[tokio::test]
    async fn scalar_result_is_unexpected_shape() {
        let dir = tempdir().unwrap();
        let mut server = mockito::Server::new_async().await;
        let _predict = server
            .mock("POST", "/run/tts_fn")
            .with_status(200)
            .with_body(json!({ "data": "/tmp/gradio/out.wav" }).to_string())
            .create_async()
            .await;

        let err = synthesizer_for(&server.url(), dir.path())
            .synthesize("诗")
            .await
            .unwrap_err();

        assert!(matches!(err, SynthesisError::UnexpectedShape(_)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn service_error_is_status() {
        let dir = tempdir().unwrap();
        let mut server = mockito::Server::new_async().await;
        let _predict = server
            .mock("POST", "/run/tts_fn")
            .with_status(503)
            .with_body("Space is sleeping")
            .create_async()
            .await;

        let err = synthesizer_for(&server.url(), dir.path())
            .synthesize("诗")
            .await
            .unwrap_err();

        assert!(matches!(err, SynthesisError::Status { status: 503, .. }));
    }

    #[tokio::test]
    async fn missing_file_is_download_error() {
        let dir = tempdir().unwrap();
        let mut server = mockito::Server::new_async().await;
        let _predict = server
            .mock("POST", "/run/tts_fn")
            .with_status(200)
            .with_body(json!({ "data": ["Success", { "name": "/tmp/gone.wav" }] }).to_string())
            .create_async()
            .await;
        let _file = server
            .mock("GET", "/file=/tmp/gone.wav")
            .with_status(404)
            .create_async()
            .await;

        let err = synthesizer_for(&server.url(), dir.path())
            .synthesize("诗")
            .await
            .unwrap_err();

        assert!(matches!(err, SynthesisError::Download(_)));
    }

    #[test]
    fn reserved_files_are_unique_and_removed_unless_kept() {
        let dir = tempdir().unwrap();
        let a = reserve_file(dir.path(), "wav").unwrap();
        let b = reserve_file(dir.path(), "wav").unwrap();
        assert_ne!(a.path(), b.path());

        drop(a);
        drop(b);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn saved_artifact_is_kept_with_content() {
        let dir = tempdir().unwrap();
        let file = reserve_file(dir.path(), "wav").unwrap();

        let path = save_artifact(file, b"RIFF").await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"RIFF");
    }

    #[tokio::test]
    async fn failed_write_leaves_no_file_behind() {
        let dir = tempdir().unwrap();
        let artifacts = dir.path().join("artifacts");
        std::fs::create_dir(&artifacts).unwrap();
        let file = reserve_file(&artifacts, "wav").unwrap();
        let reserved = file.path().to_path_buf();

        std::fs::remove_dir_all(&artifacts).unwrap();
        let err = save_artifact(file, b"RIFF").await.unwrap_err();

        assert!(matches!(err, SynthesisError::Download(_)));
        assert!(!reserved.exists());
    }
}
