//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.
//! Every struct is `#[serde(default)]`, so a settings file only needs the keys
//! it wants to override.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;
use crate::speech::VoiceSettings;

// ---------------------------------------------------------------------------
// GenerationConfig
// ---------------------------------------------------------------------------

/// Settings for the poem generation step (Gemini `generateContent`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Base URL of the Generative Language API.
    pub base_url: String,
    /// API version path segment (e.g. `"v1beta"`).
    pub api_version: String,
    /// Model identifier (e.g. `"gemini-1.5-flash"`).
    pub model: String,
    /// Per-request timeout.  `None` waits for as long as the service takes.
    pub timeout_secs: Option<u64>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".into(),
            api_version: "v1beta".into(),
            model: "gemini-1.5-flash".into(),
            timeout_secs: None,
        }
    }
}

// ---------------------------------------------------------------------------
// SpeechConfig
// ---------------------------------------------------------------------------

/// Settings for the remote text-to-speech step (a Gradio app).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Root URL of the Gradio app, without a trailing slash.
    pub base_url: String,
    /// Gradio endpoint name, without the leading slash (e.g. `"tts_fn"`).
    pub api_name: String,
    /// Per-request timeout.  `None` waits for as long as the service takes.
    pub timeout_secs: Option<u64>,
    /// Fixed synthesis parameters sent with every request.
    pub voice: VoiceSettings,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            base_url: "https://leafleafleaf-azuma-bert-vits2-0-2.hf.space/--replicas/wy9ux".into(),
            api_name: "tts_fn".into(),
            timeout_secs: None,
            voice: VoiceSettings::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// PlaybackConfig
// ---------------------------------------------------------------------------

/// Local audio output settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Output device name; `None` means the system default.
    pub output_device: Option<String>,
}

// ---------------------------------------------------------------------------
// CredentialsConfig
// ---------------------------------------------------------------------------

/// Where to find the API key for the generation service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    /// Path to a text file whose first line is the API key.  Relative paths
    /// resolve against the working directory.
    pub api_key_file: PathBuf,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            api_key_file: PathBuf::from("api_key.txt"),
        }
    }
}

// ---------------------------------------------------------------------------
// UiConfig
// ---------------------------------------------------------------------------

/// egui front-end appearance settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Initial inner window size `(width, height)` in points.
    pub window_size: (f32, f32),
    /// Keep the window floating above all other windows.
    pub always_on_top: bool,
    /// Font size used to render the poem.
    pub poem_font_size: f32,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            window_size: (420.0, 520.0),
            always_on_top: false,
            poem_font_size: 20.0,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// ```rust,no_run
/// use poetry_voice::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
/// assert_eq!(config.generation.model, "gemini-1.5-flash");
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Poem generation settings.
    pub generation: GenerationConfig,
    /// Speech synthesis settings.
    pub speech: SpeechConfig,
    /// Local audio playback settings.
    pub playback: PlaybackConfig,
    /// Credential file location.
    pub credentials: CredentialsConfig,
    /// Front-end window settings.
    pub ui: UiConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path.
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save to an explicit path, creating parent directories as needed.
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::{PromptMode, StyleSettings};
    use tempfile::tempdir;

    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let original = AppConfig::default();
        original.save_to(&path).expect("save");

        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(original.generation.base_url, loaded.generation.base_url);
        assert_eq!(original.generation.model, loaded.generation.model);
        assert_eq!(original.generation.timeout_secs, loaded.generation.timeout_secs);
        assert_eq!(original.speech.base_url, loaded.speech.base_url);
        assert_eq!(original.speech.api_name, loaded.speech.api_name);
        assert_eq!(original.speech.voice, loaded.speech.voice);
        assert_eq!(
            original.credentials.api_key_file,
            loaded.credentials.api_key_file
        );
        assert_eq!(original.ui.window_size, loaded.ui.window_size);
    }

    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        assert_eq!(config.generation.model, "gemini-1.5-flash");
        assert_eq!(config.speech.voice, VoiceSettings::default());
    }

    #[test]
    fn default_values_match_reference_deployment() {
        let cfg = AppConfig::default();

        assert_eq!(cfg.generation.base_url, "https://generativelanguage.googleapis.com");
        assert_eq!(cfg.generation.api_version, "v1beta");
        assert!(cfg.generation.timeout_secs.is_none());
        assert_eq!(cfg.speech.api_name, "tts_fn");
        assert!(cfg.speech.timeout_secs.is_none());
        assert_eq!(cfg.credentials.api_key_file, PathBuf::from("api_key.txt"));
        assert!(cfg.playback.output_device.is_none());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("partial.toml");
        std::fs::write(
            &path,
            "[generation]\nmodel = \"gemini-1.5-pro\"\n\n[speech.voice]\nspeed = 1.0\n",
        )
        .unwrap();

        let cfg = AppConfig::load_from(&path).expect("load");
        assert_eq!(cfg.generation.model, "gemini-1.5-pro");
        assert_eq!(cfg.generation.api_version, "v1beta");
        assert_eq!(cfg.speech.voice.speed, 1.0);
        assert_eq!(cfg.speech.voice.speaker, "东雪莲");
    }

    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("modified.toml");

        let mut cfg = AppConfig::default();
        cfg.generation.timeout_secs = Some(30);
        cfg.speech.base_url = "http://127.0.0.1:7860".into();
        cfg.speech.voice.style = Some(StyleSettings {
            reference_audio: "https://example.org/ref.wav".into(),
            prompt_mode: PromptMode::Audio,
            style_text: "温柔".into(),
            style_weight: 0.7,
        });
        cfg.playback.output_device = Some("USB Speakers".into());
        cfg.credentials.api_key_file = PathBuf::from("/etc/poetry/key");

        cfg.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded.generation.timeout_secs, Some(30));
        assert_eq!(loaded.speech.base_url, "http://127.0.0.1:7860");
        assert_eq!(loaded.speech.voice, cfg.speech.voice);
        assert_eq!(loaded.playback.output_device.as_deref(), Some("USB Speakers"));
        assert_eq!(loaded.credentials.api_key_file, PathBuf::from("/etc/poetry/key"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[generation\nmodel = ").unwrap();

        assert!(AppConfig::load_from(&path).is_err());
    }
}
