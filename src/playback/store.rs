use crate::config::PlayerConfig;
use crate::playback::engine::{EngineCommand, EngineError, PlaybackEngine, PositionReport};
use crate::playback::progress::{PlayerEvent, PlayerEventHandle, PlayerSnapshot};
use crate::playback::session::{PlaybackSession, SkipDirection, VolumeState, MAX_VOLUME};
use crate::playback::state::SyncState;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc as tokio_mpsc;
use tracing::{debug, error, info, warn};

struct PlayerState {
    session: PlaybackSession,
    sync: SyncState,
    volume: VolumeState,
}

impl PlayerState {
    fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            is_playing: self.session.playing,
            display_time: self.sync.display_time(),
            duration: self.session.duration,
            current_track_path: self.session.track_path.clone(),
            title: self.session.title.clone(),
            artist: self.session.artist.clone(),
            is_dragging: self.sync.is_dragging(),
            volume: self.volume.level,
            is_muted: self.volume.muted,
        }
    }
}

/// Now-playing state shared by the UI and the position feed
///
/// One store per playback session; construct it at startup and pass it to
/// whatever needs it. Engine failures never surface from these actions: they
/// are logged and published as [`PlayerEvent::CommandFailed`].
#[derive(Clone)]
pub struct PlayerStore {
    state: Arc<Mutex<PlayerState>>,
    engine: Arc<dyn PlaybackEngine>,
    event_tx: tokio_mpsc::UnboundedSender<PlayerEvent>,
    event_handle: PlayerEventHandle,
}

impl PlayerStore {
    pub fn new(
        engine: Arc<dyn PlaybackEngine>,
        config: &PlayerConfig,
        runtime_handle: tokio::runtime::Handle,
    ) -> Self {
        let (event_tx, event_rx) = tokio_mpsc::unbounded_channel();
        let event_handle = PlayerEventHandle::new(event_rx, runtime_handle);

        let state = PlayerState {
            session: PlaybackSession::default(),
            sync: SyncState::new(),
            volume: VolumeState::new(config.default_volume),
        };

        Self {
            state: Arc::new(Mutex::new(state)),
            engine,
            event_tx,
            event_handle,
        }
    }

    pub(crate) fn engine(&self) -> Arc<dyn PlaybackEngine> {
        self.engine.clone()
    }

    pub fn subscribe(&self) -> tokio_mpsc::UnboundedReceiver<PlayerEvent> {
        self.event_handle.subscribe_all()
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        self.lock().snapshot()
    }

    pub fn is_playing(&self) -> bool {
        self.lock().session.playing
    }

    pub fn display_time(&self) -> f64 {
        self.lock().sync.display_time()
    }

    pub fn duration(&self) -> f64 {
        self.lock().session.duration
    }

    pub fn current_track_path(&self) -> Option<String> {
        self.lock().session.track_path.clone()
    }

    pub fn is_dragging(&self) -> bool {
        self.lock().sync.is_dragging()
    }

    pub fn volume(&self) -> VolumeState {
        self.lock().volume
    }

    /// Seek counter of the current track
    pub fn version(&self) -> u64 {
        self.lock().sync.version()
    }

    pub fn preview_position(&self) -> Option<f64> {
        self.lock().sync.preview()
    }

    pub fn committed_position(&self) -> f64 {
        self.lock().sync.committed()
    }

    /// Entry point for position feeds. Returns whether the report was applied.
    pub fn apply_position_report(&self, report: PositionReport) -> bool {
        let applied = self.lock().sync.apply_report(report);
        if applied {
            self.publish();
        }
        applied
    }

    // Drag/preview
    //////////////////////////////////////////////////////////////

    pub fn set_dragging(&self, active: bool) {
        self.lock().sync.set_dragging(active);
        self.publish();
    }

    /// Move the preview while scrubbing. Never touches the committed position
    /// or the engine.
    pub fn preview_seek(&self, seconds: f64) {
        {
            let mut state = self.lock();
            let Some(target) = state.session.clamp_target(seconds) else {
                return;
            };
            state.sync.set_preview(target);
        }
        self.publish();
    }

    // Seeking
    //////////////////////////////////////////////////////////////

    /// Commit a drag release.
    ///
    /// The preview is cleared, the version advanced and the target written as
    /// the committed position before this returns. The returned future only
    /// carries the engine command; a failed seek is not rolled back.
    pub fn commit_seek(&self, seconds: f64) -> impl Future<Output = ()> + Send + 'static {
        let target = {
            let mut state = self.lock();
            if !state.session.has_track() {
                debug!("Ignoring seek commit: no track loaded");
                return self.dispatch_seek(None);
            }
            match state.session.clamp_target(seconds) {
                Some(target) => {
                    let version = state.sync.commit(target);
                    debug!("Committed seek to {:.2}s (version {})", target, version);
                    Some(target)
                }
                None => {
                    state.sync.cancel_drag();
                    None
                }
            }
        };
        self.publish();
        self.dispatch_seek(target)
    }

    /// Programmatic seek (keyboard, buttons). Same ordering as
    /// [`Self::commit_seek`], without ending a drag.
    pub fn seek(&self, seconds: f64) -> impl Future<Output = ()> + Send + 'static {
        let target = {
            let mut state = self.lock();
            if !state.session.has_track() {
                debug!("Ignoring seek: no track loaded");
                None
            } else {
                state.session.clamp_target(seconds).map(|target| {
                    let version = state.sync.seek(target);
                    debug!("Seek to {:.2}s (version {})", target, version);
                    target
                })
            }
        };
        if target.is_some() {
            self.publish();
        }
        self.dispatch_seek(target)
    }

    fn dispatch_seek(&self, target: Option<f64>) -> impl Future<Output = ()> + Send + 'static {
        let store = self.clone();
        async move {
            let Some(target) = target else {
                return;
            };
            if let Err(e) = store.engine.seek(target).await {
                store.report_failure(EngineCommand::Seek, &e);
            }
        }
    }

    // Session lifecycle
    //////////////////////////////////////////////////////////////

    /// Load a track and start playing it. Ends any drag in progress. On
    /// failure the previous session is kept as is.
    pub async fn load_and_play(&self, path: &str, title: &str, artist: &str) {
        info!("Loading track: {}", path);

        let duration = match self.engine.play_track(path).await {
            Ok(duration) => duration,
            Err(e) => {
                self.report_failure(EngineCommand::PlayTrack, &e);
                return;
            }
        };
        let duration = if duration.is_finite() && duration > 0.0 {
            duration
        } else {
            0.0
        };

        {
            let mut state = self.lock();
            state.sync.reset_for_track();
            state.session = PlaybackSession::loaded(path, title, artist, duration);
        }
        info!("Playing {} ({:.1}s)", path, duration);
        self.publish();
    }

    /// Resume or pause. `is_playing` flips only once the engine confirms.
    pub async fn toggle_play(&self) {
        let should_play = {
            let state = self.lock();
            if !state.session.has_track() {
                return;
            }
            !state.session.playing
        };

        let (command, result) = if should_play {
            (EngineCommand::Resume, self.engine.resume().await)
        } else {
            (EngineCommand::Pause, self.engine.pause().await)
        };

        match result {
            Ok(()) => {
                self.lock().session.playing = should_play;
                self.publish();
            }
            Err(e) => self.report_failure(command, &e),
        }
    }

    /// Stop the current track and reset the timeline. Choosing the next track
    /// is up to the caller.
    pub async fn skip(&self, direction: SkipDirection) {
        info!("Skip {:?}", direction);

        if let Err(e) = self.engine.stop_track().await {
            self.report_failure(EngineCommand::StopTrack, &e);
        }

        {
            let mut state = self.lock();
            state.sync.rewind();
            state.session = PlaybackSession::default();
        }
        self.publish();
    }

    // Volume
    //////////////////////////////////////////////////////////////

    pub async fn set_volume_level(&self, level: u8) {
        let gain = {
            let mut state = self.lock();
            state.volume.level = level.min(MAX_VOLUME);
            if state.volume.level > 0 {
                state.volume.muted = false;
            }
            state.volume.gain()
        };
        self.publish();
        self.send_volume(gain).await;
    }

    pub async fn toggle_mute(&self) {
        let gain = {
            let mut state = self.lock();
            state.volume.muted = !state.volume.muted;
            state.volume.gain()
        };
        self.publish();
        self.send_volume(gain).await;
    }

    async fn send_volume(&self, gain: f32) {
        if let Err(e) = self.engine.set_volume(gain).await {
            self.report_failure(EngineCommand::SetVolume, &e);
        }
    }

    //////////////////////////////////////////////////////////////

    fn lock(&self) -> MutexGuard<'_, PlayerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sends happen under the lock so subscribers receive snapshots in the
    /// order the state changed.
    fn publish(&self) {
        let state = self.lock();
        let _ = self.event_tx.send(PlayerEvent::StateChanged {
            snapshot: state.snapshot(),
        });
    }

    fn report_failure(&self, command: EngineCommand, e: &EngineError) {
        match command {
            EngineCommand::PlayTrack => error!("Failed to load track: {}", e),
            _ => warn!("{} failed: {}", command, e),
        }
        let _ = self.event_tx.send(PlayerEvent::CommandFailed {
            command,
            message: e.to_string(),
        });
    }
}
