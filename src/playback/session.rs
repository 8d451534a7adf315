/// Currently loaded track
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaybackSession {
    pub track_path: Option<String>,
    pub title: String,
    pub artist: String,
    /// Seconds; 0 when unknown or nothing is loaded
    pub duration: f64,
    pub playing: bool,
}

impl PlaybackSession {
    pub fn loaded(path: &str, title: &str, artist: &str, duration: f64) -> Self {
        Self {
            track_path: Some(path.to_string()),
            title: if title.is_empty() {
                "Unknown".to_string()
            } else {
                title.to_string()
            },
            artist: artist.to_string(),
            duration,
            playing: true,
        }
    }

    pub fn has_track(&self) -> bool {
        self.track_path.is_some()
    }

    /// Clamp a seek target into the playable range. Returns `None` for
    /// non-finite input.
    pub fn clamp_target(&self, seconds: f64) -> Option<f64> {
        if !seconds.is_finite() {
            return None;
        }
        let seconds = seconds.max(0.0);
        if self.duration > 0.0 {
            Some(seconds.min(self.duration))
        } else {
            Some(seconds)
        }
    }
}

pub const MAX_VOLUME: u8 = 100;
pub const DEFAULT_VOLUME: u8 = 65;

/// Output volume as shown on the volume slider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeState {
    /// 0-100
    pub level: u8,
    pub muted: bool,
}

impl VolumeState {
    pub fn new(level: u8) -> Self {
        Self {
            level: level.min(MAX_VOLUME),
            muted: false,
        }
    }

    /// Gain to send to the engine
    pub fn gain(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            f32::from(self.level) / f32::from(MAX_VOLUME)
        }
    }
}

impl Default for VolumeState {
    fn default() -> Self {
        Self::new(DEFAULT_VOLUME)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipDirection {
    Next,
    Previous,
}
