//! Configuration module for poetry-voice.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for each subsystem,
//! `AppPaths` for cross-platform config directories, TOML persistence via
//! `AppConfig::load` / `AppConfig::save_to`, and the one-line API key file
//! reader used at startup.

pub mod credentials;
pub mod paths;
pub mod settings;

pub use credentials::{load_api_key, ApiKey, CredentialError};
pub use paths::AppPaths;
pub use settings::{
    AppConfig, CredentialsConfig, GenerationConfig, PlaybackConfig, SpeechConfig, UiConfig,
};
