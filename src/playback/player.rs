//! `AudioPlayer` trait and its implementations.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Duration;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use thiserror::Error;

use crate::config::PlaybackConfig;
use crate::playback::device::select_output_device;
use crate::speech::AudioArtifact;

// ---------------------------------------------------------------------------
// PlaybackError
// ---------------------------------------------------------------------------

/// Errors that can occur while loading or playing an artifact.
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("no audio output device: {0}")]
    NoDevice(String),

    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot decode audio: {0}")]
    Decode(#[from] rodio::decoder::DecoderError),

    #[error("cannot open output stream: {0}")]
    Stream(#[from] rodio::StreamError),

    #[error("cannot start playback: {0}")]
    Play(#[from] rodio::PlayError),
}

/// What a finished playback reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackOutcome {
    /// Length of the clip, when the decoder can tell.
    pub duration: Option<Duration>,
}

// ---------------------------------------------------------------------------
// AudioPlayer trait
// ---------------------------------------------------------------------------

/// Synchronous playback: `play` returns only after the clip has finished.
///
/// No `Send` bound: the rodio output stream is tied to the thread that
/// opened it.
pub trait AudioPlayer {
    fn play(&self, artifact: &AudioArtifact) -> Result<PlaybackOutcome, PlaybackError>;
}

/// Open and decode `artifact`, returning the source and its duration.
pub fn decode_artifact(
    artifact: &AudioArtifact,
) -> Result<(Decoder<BufReader<File>>, Option<Duration>), PlaybackError> {
    let file = File::open(artifact.path()).map_err(|source| PlaybackError::Open {
        path: artifact.path().to_path_buf(),
        source,
    })?;
    let source = Decoder::new(BufReader::new(file))?;
    let duration = source.total_duration();
    Ok((source, duration))
}

// ---------------------------------------------------------------------------
// RodioPlayer
// ---------------------------------------------------------------------------

/// Plays artifacts through a rodio output stream held for the player's
/// lifetime.  Create once per process.
pub struct RodioPlayer {
    _stream: OutputStream,
    handle: OutputStreamHandle,
}

impl RodioPlayer {
    /// Acquire the named output device, or the default one.
    pub fn open(device_name: Option<&str>) -> Result<Self, PlaybackError> {
        let device = select_output_device(device_name)
            .ok_or_else(|| PlaybackError::NoDevice("host reports no output device".into()))?;
        let (stream, handle) = OutputStream::try_from_device(&device)?;
        Ok(Self {
            _stream: stream,
            handle,
        })
    }
}

impl AudioPlayer for RodioPlayer {
    fn play(&self, artifact: &AudioArtifact) -> Result<PlaybackOutcome, PlaybackError> {
        let (source, duration) = decode_artifact(artifact)?;

        match duration {
            Some(d) => log::info!(
                "playback: playing {} ({:.1} s)",
                artifact.path().display(),
                d.as_secs_f32()
            ),
            None => log::info!("playback: playing {}", artifact.path().display()),
        }

        let sink = Sink::try_new(&self.handle)?;
        sink.append(source);
        sink.sleep_until_end();

        log::info!("playback: finished");
        Ok(PlaybackOutcome { duration })
    }
}

// ---------------------------------------------------------------------------
// NoDevicePlayer
// ---------------------------------------------------------------------------

/// Stand-in used when no output device could be opened at startup.
pub struct NoDevicePlayer {
    reason: String,
}

impl NoDevicePlayer {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl AudioPlayer for NoDevicePlayer {
    fn play(&self, _artifact: &AudioArtifact) -> Result<PlaybackOutcome, PlaybackError> {
        Err(PlaybackError::NoDevice(self.reason.clone()))
    }
}

/// Open the configured output device, degrading to [`NoDevicePlayer`].
pub fn open_player(config: &PlaybackConfig) -> Box<dyn AudioPlayer> {
    match RodioPlayer::open(config.output_device.as_deref()) {
        Ok(player) => {
            log::info!("playback: audio output ready");
            Box::new(player)
        }
        Err(e) => {
            log::warn!("playback: audio output unavailable ({e}); audio will not be played");
            Box::new(NoDevicePlayer::new(e.to_string()))
        }
    }
}

// ---------------------------------------------------------------------------
// MockPlayer  (test-only)
// ---------------------------------------------------------------------------

/// Records every artifact it is asked to play; optionally fails each time.
#[cfg(test)]
pub struct MockPlayer {
    fail: bool,
    played: std::sync::Mutex<Vec<PathBuf>>,
}

#[cfg(test)]
impl MockPlayer {
    pub fn ok() -> Self {
        Self {
            fail: false,
            played: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            played: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn played(&self) -> Vec<PathBuf> {
        self.played.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl AudioPlayer for MockPlayer {
    fn play(&self, artifact: &AudioArtifact) -> Result<PlaybackOutcome, PlaybackError> {
        self.played.lock().unwrap().push(artifact.path().to_path_buf());
        if self.fail {
            Err(PlaybackError::Open {
                path: artifact.path().to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidData, "corrupt"),
            })
        } else {
            Ok(PlaybackOutcome {
                duration: Some(Duration::from_secs(1)),
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
