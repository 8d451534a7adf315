use crate::playback::engine::PositionReport;
use crate::playback::store::PlayerStore;
use futures::{Stream, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc as tokio_mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, info};

/// Counts of reports a feed handled before it disconnected
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedStats {
    pub accepted: u64,
    pub dropped: u64,
}

/// Applies engine-pushed position reports to a [`PlayerStore`]
pub struct PositionFeed;

impl PositionFeed {
    /// Spawn a task that drains `reports` into the store. The task ends when
    /// the stream does; a disconnected feed just stops advancing the position.
    pub fn spawn<S>(
        store: PlayerStore,
        mut reports: S,
        runtime_handle: tokio::runtime::Handle,
    ) -> JoinHandle<FeedStats>
    where
        S: Stream<Item = PositionReport> + Send + Unpin + 'static,
    {
        runtime_handle.spawn(async move {
            let mut stats = FeedStats::default();
            while let Some(report) = reports.next().await {
                if store.apply_position_report(report) {
                    stats.accepted += 1;
                } else {
                    stats.dropped += 1;
                }
            }
            info!(
                "Position feed disconnected ({} accepted, {} dropped)",
                stats.accepted, stats.dropped
            );
            stats
        })
    }

    pub fn from_channel(
        store: PlayerStore,
        rx: tokio_mpsc::UnboundedReceiver<PositionReport>,
        runtime_handle: tokio::runtime::Handle,
    ) -> JoinHandle<FeedStats> {
        Self::spawn(store, UnboundedReceiverStream::new(rx), runtime_handle)
    }
}

/// Poll-based fallback for engines that do not push positions
///
/// Each poll is stamped with the store version read before the query goes
/// out, so an answer that straddles a local seek is rejected like any other
/// stale report.
pub struct PositionPoller;

impl PositionPoller {
    /// Poll every `interval` until the returned handle is aborted. Ticks are
    /// skipped while dragging or when nothing is playing.
    pub fn spawn(
        store: PlayerStore,
        interval: Duration,
        runtime_handle: tokio::runtime::Handle,
    ) -> JoinHandle<()> {
        runtime_handle.spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                Self::poll_once(&store).await;
            }
        })
    }

    /// Run a single poll. Returns whether a position was applied.
    pub async fn poll_once(store: &PlayerStore) -> bool {
        if store.is_dragging() || !store.is_playing() {
            return false;
        }

        let version = store.version();
        match store.engine().position().await {
            Ok(seconds) => store.apply_position_report(PositionReport::new(seconds, version)),
            Err(e) => {
                debug!("Position poll failed: {}", e);
                false
            }
        }
    }
}
