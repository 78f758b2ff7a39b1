//! Staging wrapper: writes the text to a scoped temporary file around the
//! inner synthesis call.
//!
//! This is a legacy step: the remote API takes the text as a parameter, so
//! nothing reads the staged file.  The file is a
//! [`tempfile::NamedTempFile`] and disappears when the guard is dropped, on
//! success, on error, and if the inner future is dropped mid-flight.

use std::io::Write;
use std::path::PathBuf;

use async_trait::async_trait;
use tempfile::NamedTempFile;

use crate::speech::artifact::AudioArtifact;
use crate::speech::synthesizer::{SpeechSynthesizer, SynthesisError};

/// Wraps any [`SpeechSynthesizer`] with the per-request staging step.
///
/// ```rust
/// use poetry_voice::config::SpeechConfig;
/// use poetry_voice::speech::{GradioSynthesizer, StagedSynthesizer};
///
/// let inner = GradioSynthesizer::from_config(&SpeechConfig::default(), std::env::temp_dir());
/// let synthesizer = StagedSynthesizer::new(inner);
/// ```
pub struct StagedSynthesizer<S: SpeechSynthesizer> {
    inner: S,
    staging_dir: Option<PathBuf>,
}

impl<S: SpeechSynthesizer> StagedSynthesizer<S> {
    /// Stage into the system temp directory.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            staging_dir: None,
        }
    }

    /// Stage into `dir` instead of the system temp directory.
    pub fn with_staging_dir(inner: S, dir: impl Into<PathBuf>) -> Self {
        Self {
            inner,
            staging_dir: Some(dir.into()),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn stage(&self, text: &str) -> Result<NamedTempFile, SynthesisError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("poem-").suffix(".txt");

        let mut file = match &self.staging_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        file.write_all(text.as_bytes())?;
        file.flush()?;
        Ok(file)
    }
}

#[async_trait]
impl<S: SpeechSynthesizer> SpeechSynthesizer for StagedSynthesizer<S> {
    async fn synthesize(&self, text: &str) -> Result<AudioArtifact, SynthesisError> {
        let staged = self.stage(text)?;
        let staged_path = staged.path().to_path_buf();
        log::debug!("speech: staged text at {}", staged_path.display());

        let result = self.inner.synthesize(text).await;

        match staged.close() {
            Ok(()) => log::debug!("speech: removed {}", staged_path.display()),
            Err(e) => log::warn!("speech: failed to remove {}: {e}", staged_path.display()),
        }

        result
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::Mutex;
    use tempfile::tempdir;

    /// Records what the staging directory held while the inner call ran.
    struct Probe {
        dir: PathBuf,
        fail: bool,
        seen: Mutex<Vec<(PathBuf, String)>>,
    }

    impl Probe {
        fn new(dir: &Path, fail: bool) -> Self {
            Self {
                dir: dir.to_path_buf(),
                fail,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl SpeechSynthesizer for Probe {
        async fn synthesize(&self, _text: &str) -> Result<AudioArtifact, SynthesisError> {
            for entry in std::fs::read_dir(&self.dir).unwrap() {
                let path = entry.unwrap().path();
                let content = std::fs::read_to_string(&path).unwrap();
                self.seen.lock().unwrap().push((path, content));
            }
            if self.fail {
                Err(SynthesisError::UnexpectedShape("\"scalar\"".into()))
            } else {
                Ok(AudioArtifact::new("/tmp/out.wav", "probe"))
            }
        }
    }

    fn dir_is_empty(dir: &Path) -> bool {
        std::fs::read_dir(dir).unwrap().next().is_none()
    }

    #[tokio::test]
    async fn staged_file_exists_during_call_and_is_removed_after_success() {
        let dir = tempdir().unwrap();
        let staged = StagedSynthesizer::with_staging_dir(Probe::new(dir.path(), false), dir.path());

        let artifact = staged.synthesize("春眠不觉晓").await.unwrap();
        assert_eq!(artifact.path(), Path::new("/tmp/out.wav"));

        let seen = staged.inner().seen.lock().unwrap().clone();
        assert_eq!(seen.len(), 1);
        let (path, content) = &seen[0];
        assert_eq!(content, "春眠不觉晓");
        assert_eq!(path.extension().unwrap(), "txt");
        assert!(!path.exists());
        assert!(dir_is_empty(dir.path()));
    }

    #[tokio::test]
    async fn staged_file_is_removed_after_failure() {
        let dir = tempdir().unwrap();
        let staged = StagedSynthesizer::with_staging_dir(Probe::new(dir.path(), true), dir.path());

        let err = staged.synthesize("处处闻啼鸟").await.unwrap_err();
        assert!(matches!(err, SynthesisError::UnexpectedShape(_)));

        assert_eq!(staged.inner().seen.lock().unwrap().len(), 1);
        assert!(dir_is_empty(dir.path()));
    }

    #[tokio::test]
    async fn unwritable_staging_dir_fails_before_inner_call() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        let staged = StagedSynthesizer::with_staging_dir(Probe::new(dir.path(), false), &missing);

        let err = staged.synthesize("诗").await.unwrap_err();
        assert!(matches!(err, SynthesisError::Staging(_)));
        assert!(staged.inner().seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn each_request_gets_a_fresh_file() {
        let dir = tempdir().unwrap();
        let staged = StagedSynthesizer::with_staging_dir(Probe::new(dir.path(), false), dir.path());

        staged.synthesize("一").await.unwrap();
        staged.synthesize("二").await.unwrap();

        let seen = staged.inner().seen.lock().unwrap().clone();
        assert_eq!(seen.len(), 2);
        assert_ne!(seen[0].0, seen[1].0);
        assert_eq!(seen[1].1, "二");
    }
}
