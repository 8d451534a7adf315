pub mod handle;

use crate::playback::engine::EngineCommand;
pub use handle::PlayerEventHandle;
use serde::Serialize;

/// Read-only view of the player for the UI layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerSnapshot {
    pub is_playing: bool,
    pub display_time: f64,
    pub duration: f64,
    pub current_track_path: Option<String>,
    pub title: String,
    pub artist: String,
    pub is_dragging: bool,
    pub volume: u8,
    pub is_muted: bool,
}

impl PlayerSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Updates pushed to subscribers
#[derive(Debug, Clone)]
pub enum PlayerEvent {
    StateChanged {
        snapshot: PlayerSnapshot,
    },
    /// An engine command was rejected. Local state was left as described by
    /// the action that issued it.
    CommandFailed {
        command: EngineCommand,
        message: String,
    },
}
