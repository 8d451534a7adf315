#![cfg(feature = "test-utils")]
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;
use tamaureus::playback::{EngineCommand, PlayerEvent, PlayerSnapshot};
use tamaureus::test_support::MockEngine;
use tamaureus::{PlayerConfig, PlayerStore};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{timeout, Instant};
use tracing_subscriber::EnvFilter;

pub fn tracing_init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Store wired to a mock engine, with an event subscription
pub struct StoreFixture {
    pub engine: Arc<MockEngine>,
    pub store: PlayerStore,
    pub events: UnboundedReceiver<PlayerEvent>,
}

impl StoreFixture {
    pub fn new() -> Self {
        Self::with_config(&PlayerConfig::default())
    }

    pub fn with_config(config: &PlayerConfig) -> Self {
        tracing_init();

        let engine = Arc::new(MockEngine::new());
        let store = PlayerStore::new(engine.clone(), config, tokio::runtime::Handle::current());
        let events = store.subscribe();

        Self {
            engine,
            store,
            events,
        }
    }

    /// Fixture with `path` already loaded and playing
    pub async fn loaded(path: &str) -> Self {
        let fixture = Self::new();
        fixture.store.load_and_play(path, "Title", "Artist").await;
        assert_eq!(fixture.store.current_track_path().as_deref(), Some(path));
        fixture
    }

    /// Push the version up with `count` seeks to position 0
    pub async fn bump_version(&self, count: u64) {
        for _ in 0..count {
            self.store.seek(0.0).await;
        }
    }

    /// Wait for a command failure event with timeout
    pub async fn wait_for_failure(
        &mut self,
        timeout_duration: Duration,
    ) -> Option<(EngineCommand, String)> {
        let deadline = Instant::now() + timeout_duration;

        while Instant::now() < deadline {
            match timeout(Duration::from_millis(100), self.events.recv()).await {
                Ok(Some(PlayerEvent::CommandFailed { command, message })) => {
                    return Some((command, message));
                }
                Ok(Some(_)) => continue,
                Ok(None) => break,
                Err(_) => continue,
            }
        }

        None
    }

    /// Wait for a snapshot matching `predicate` with timeout
    pub async fn wait_for_snapshot<F>(
        &mut self,
        predicate: F,
        timeout_duration: Duration,
    ) -> Option<PlayerSnapshot>
    where
        F: Fn(&PlayerSnapshot) -> bool,
    {
        let deadline = Instant::now() + timeout_duration;

        while Instant::now() < deadline {
            match timeout(Duration::from_millis(100), self.events.recv()).await {
                Ok(Some(PlayerEvent::StateChanged { snapshot })) => {
                    if predicate(&snapshot) {
                        return Some(snapshot);
                    }
                }
                Ok(Some(_)) => continue,
                Ok(None) => break,
                Err(_) => continue,
            }
        }

        None
    }
}

/// Yield until `condition` holds, panicking after one second
pub async fn eventually<F>(condition: F)
where
    F: Fn() -> bool,
{
    timeout(Duration::from_secs(1), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}
