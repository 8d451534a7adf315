// Test support utilities for both unit and integration tests

use crate::playback::{EngineCommand, EngineError, PlaybackEngine};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

const DEFAULT_TRACK_DURATION: f64 = 180.0;

/// Command received by [`MockEngine`]
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    PlayTrack(String),
    Resume,
    Pause,
    Seek(f64),
    SetVolume(f32),
    StopTrack,
    Position,
}

/// Mock playback engine for testing
///
/// Records every command, fails on demand and can hold seeks or position
/// queries in flight until released.
pub struct MockEngine {
    calls: Mutex<Vec<EngineCall>>,
    failing: Mutex<HashSet<EngineCommand>>,
    disconnected: Mutex<bool>,
    durations: Mutex<HashMap<String, f64>>,
    position: Mutex<f64>,
    seek_gate: Mutex<Option<Arc<Notify>>>,
    position_gate: Mutex<Option<Arc<Notify>>>,
}

impl Default for MockEngine {
    fn default() -> Self {
        MockEngine {
            calls: Mutex::new(Vec::new()),
            failing: Mutex::new(HashSet::new()),
            disconnected: Mutex::new(false),
            durations: Mutex::new(HashMap::new()),
            position: Mutex::new(0.0),
            seek_gate: Mutex::new(None),
            position_gate: Mutex::new(None),
        }
    }
}

impl MockEngine {
    #[allow(unused)] // Used in tests
    pub fn new() -> Self {
        Self::default()
    }

    /// Duration returned when `path` is loaded (default 180s)
    pub fn set_duration(&self, path: &str, seconds: f64) {
        self.durations
            .lock()
            .unwrap()
            .insert(path.to_string(), seconds);
    }

    pub fn fail(&self, command: EngineCommand) {
        self.failing.lock().unwrap().insert(command);
    }

    pub fn succeed(&self, command: EngineCommand) {
        self.failing.lock().unwrap().remove(&command);
    }

    /// Make every command fail as if the engine went away
    pub fn disconnect(&self) {
        *self.disconnected.lock().unwrap() = true;
    }

    /// Position answered to `position()` queries
    pub fn set_position(&self, seconds: f64) {
        *self.position.lock().unwrap() = seconds;
    }

    /// Hold every subsequent seek until the returned gate is notified
    pub fn hold_seeks(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.seek_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    /// Hold every subsequent position query until the returned gate is notified
    pub fn hold_positions(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.position_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn seeks(&self) -> Vec<f64> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                EngineCall::Seek(seconds) => Some(seconds),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: EngineCall, command: EngineCommand) -> Result<(), EngineError> {
        self.calls.lock().unwrap().push(call);
        if *self.disconnected.lock().unwrap() {
            return Err(EngineError::Unavailable);
        }
        if self.failing.lock().unwrap().contains(&command) {
            return Err(EngineError::Command(format!("mock {} failure", command)));
        }
        Ok(())
    }

    async fn wait_gate(gate: &Mutex<Option<Arc<Notify>>>) {
        let gate = gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }
}

#[async_trait::async_trait]
impl PlaybackEngine for MockEngine {
    async fn play_track(&self, path: &str) -> Result<f64, EngineError> {
        self.record(
            EngineCall::PlayTrack(path.to_string()),
            EngineCommand::PlayTrack,
        )?;
        Ok(self
            .durations
            .lock()
            .unwrap()
            .get(path)
            .copied()
            .unwrap_or(DEFAULT_TRACK_DURATION))
    }

    async fn resume(&self) -> Result<(), EngineError> {
        self.record(EngineCall::Resume, EngineCommand::Resume)
    }

    async fn pause(&self) -> Result<(), EngineError> {
        self.record(EngineCall::Pause, EngineCommand::Pause)
    }

    async fn seek(&self, seconds: f64) -> Result<(), EngineError> {
        let result = self.record(EngineCall::Seek(seconds), EngineCommand::Seek);
        Self::wait_gate(&self.seek_gate).await;
        result
    }

    async fn set_volume(&self, volume: f32) -> Result<(), EngineError> {
        self.record(EngineCall::SetVolume(volume), EngineCommand::SetVolume)
    }

    async fn stop_track(&self) -> Result<(), EngineError> {
        self.record(EngineCall::StopTrack, EngineCommand::StopTrack)
    }

    async fn position(&self) -> Result<f64, EngineError> {
        self.record(EngineCall::Position, EngineCommand::Position)?;
        Self::wait_gate(&self.position_gate).await;
        Ok(*self.position.lock().unwrap())
    }
}
