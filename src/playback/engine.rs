use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Errors reported by the playback engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Engine command failed: {0}")]
    Command(String),
    #[error("Playback engine unavailable")]
    Unavailable,
}

/// Position report pushed by the engine
///
/// `version` is the engine's seek counter at the time the position was
/// sampled. Reports stamped below the store's current version predate the
/// last local seek and are discarded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionReport {
    pub seconds: f64,
    pub version: u64,
}

impl PositionReport {
    pub fn new(seconds: f64, version: u64) -> Self {
        Self { seconds, version }
    }
}

/// Engine commands, used to label failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineCommand {
    PlayTrack,
    Resume,
    Pause,
    Seek,
    SetVolume,
    StopTrack,
    Position,
}

impl fmt::Display for EngineCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EngineCommand::PlayTrack => "play_track",
            EngineCommand::Resume => "resume",
            EngineCommand::Pause => "pause",
            EngineCommand::Seek => "seek_track",
            EngineCommand::SetVolume => "set_volume",
            EngineCommand::StopTrack => "stop_track",
            EngineCommand::Position => "get_position",
        };
        f.write_str(name)
    }
}

/// Command surface of the audio engine
///
/// Every command may suspend for an I/O round trip. Position reports are
/// delivered separately, see [`crate::playback::PositionFeed`].
#[async_trait]
pub trait PlaybackEngine: Send + Sync {
    /// Load a track and start playing it. Returns the duration in seconds.
    async fn play_track(&self, path: &str) -> Result<f64, EngineError>;

    async fn resume(&self) -> Result<(), EngineError>;

    async fn pause(&self) -> Result<(), EngineError>;

    async fn seek(&self, seconds: f64) -> Result<(), EngineError>;

    /// `volume` is in `0.0..=1.0`
    async fn set_volume(&self, volume: f32) -> Result<(), EngineError>;

    async fn stop_track(&self) -> Result<(), EngineError>;

    /// Current playback position in seconds, for poll-based feeds
    async fn position(&self) -> Result<f64, EngineError>;
}
