//! Local audio playback.
//!
//! [`AudioPlayer`] is the seam the console pipeline plays through.
//! [`RodioPlayer`] holds the output stream for the whole process; when no
//! device can be opened, [`open_player`] installs a [`NoDevicePlayer`] so the
//! rest of the app still works.
//!
//! ```rust,no_run
//! use poetry_voice::config::PlaybackConfig;
//! use poetry_voice::playback::open_player;
//! use poetry_voice::speech::AudioArtifact;
//!
//! let player = open_player(&PlaybackConfig::default());
//! let artifact = AudioArtifact::new("/tmp/speech.wav", "local");
//! // Blocks until the clip has finished.
//! let _ = player.play(&artifact);
//! ```

pub mod device;
pub mod player;

pub use device::{output_device_names, select_output_device};
pub use player::{
    decode_artifact, open_player, AudioPlayer, NoDevicePlayer, PlaybackError, PlaybackOutcome,
    RodioPlayer,
};

#[cfg(test)]
pub use player::MockPlayer;
