use crate::playback::engine::PositionReport;
use tracing::{debug, trace};

/// Scrubber interaction phase
///
/// `Committing` only exists inside a commit; callers observe `Idle` or
/// `Dragging`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeekPhase {
    #[default]
    Idle,
    Dragging,
    Committing,
}

/// Committed/preview position bookkeeping for one playback session
#[derive(Debug, Clone, Default)]
pub struct SyncState {
    /// Last authoritative position, from the engine or an optimistic seek
    committed: f64,
    /// Display-only position while the user scrubs
    preview: Option<f64>,
    /// Seek counter used to discard reports from before the last local seek
    version: u64,
    phase: SeekPhase,
}

impl SyncState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn committed(&self) -> f64 {
        self.committed
    }

    pub fn preview(&self) -> Option<f64> {
        self.preview
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn phase(&self) -> SeekPhase {
        self.phase
    }

    pub fn is_dragging(&self) -> bool {
        self.phase == SeekPhase::Dragging
    }

    /// Value the timeline shows: the preview while one exists, otherwise the
    /// committed position
    pub fn display_time(&self) -> f64 {
        display_time(self.preview, self.committed)
    }

    /// Merge an engine position report.
    ///
    /// Returns `true` if the report was applied. Reports are dropped while
    /// dragging and when stamped below the current version.
    pub fn apply_report(&mut self, report: PositionReport) -> bool {
        if self.is_dragging() {
            trace!("Dropping position report while dragging: {:?}", report);
            return false;
        }
        if report.version < self.version {
            debug!(
                "Dropping stale position report {:?} (current version {})",
                report, self.version
            );
            return false;
        }

        self.committed = report.seconds;
        self.version = self.version.max(report.version);
        true
    }

    pub fn set_dragging(&mut self, active: bool) {
        let next = if active {
            SeekPhase::Dragging
        } else {
            SeekPhase::Idle
        };
        self.transition(next);
    }

    pub fn set_preview(&mut self, seconds: f64) {
        self.preview = Some(seconds);
    }

    /// Commit a drag release: clears the preview, advances the version and
    /// writes the target as the committed position. Ends the drag.
    ///
    /// Returns the new version.
    pub fn commit(&mut self, seconds: f64) -> u64 {
        self.transition(SeekPhase::Committing);
        self.advance(seconds);
        self.transition(SeekPhase::Idle);
        self.version
    }

    /// Direct seek. Same writes as [`Self::commit`], but an ongoing drag is
    /// left alone.
    pub fn seek(&mut self, seconds: f64) -> u64 {
        if self.is_dragging() {
            self.advance(seconds);
        } else {
            self.commit(seconds);
        }
        self.version
    }

    fn advance(&mut self, seconds: f64) {
        self.preview = None;
        self.version += 1;
        self.committed = seconds;
    }

    /// End a drag gesture without committing anything
    pub fn cancel_drag(&mut self) {
        self.preview = None;
        self.transition(SeekPhase::Idle);
    }

    /// New track: position and version start over and any drag ends
    pub fn reset_for_track(&mut self) {
        self.version = 0;
        self.preview = None;
        self.committed = 0.0;
        self.transition(SeekPhase::Idle);
    }

    /// Stopped track: position rewinds, version is kept
    pub fn rewind(&mut self) {
        self.preview = None;
        self.committed = 0.0;
    }

    fn transition(&mut self, next: SeekPhase) {
        if self.phase != next {
            trace!("Seek phase {:?} -> {:?}", self.phase, next);
            self.phase = next;
        }
    }
}

/// Resolve the preview and committed positions into the displayed one
pub fn display_time(preview: Option<f64>, committed: f64) -> f64 {
    preview.unwrap_or(committed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_at_version(version: u64) -> SyncState {
        let mut state = SyncState::new();
        for _ in 0..version {
            state.commit(0.0);
        }
        state
    }

    #[test]
    fn test_stale_report_rejected() {
        let mut state = state_at_version(3);
        state.apply_report(PositionReport::new(10.0, 3));

        assert!(!state.apply_report(PositionReport::new(99.0, 2)));
        assert_eq!(state.committed(), 10.0);
    }

    #[test]
    fn test_current_and_newer_reports_accepted() {
        let mut state = state_at_version(3);

        assert!(state.apply_report(PositionReport::new(11.0, 3)));
        assert_eq!(state.committed(), 11.0);

        assert!(state.apply_report(PositionReport::new(12.0, 4)));
        assert_eq!(state.committed(), 12.0);
        assert_eq!(state.version(), 4);

        // Version 3 is now stale
        assert!(!state.apply_report(PositionReport::new(5.0, 3)));
        assert_eq!(state.committed(), 12.0);
    }

    #[test]
    fn test_reapplying_report_is_idempotent() {
        let mut state = SyncState::new();
        let report = PositionReport::new(7.5, 1);

        state.apply_report(report);
        let first = state.clone();
        state.apply_report(report);

        assert_eq!(state.committed(), first.committed());
        assert_eq!(state.version(), first.version());
    }

    #[test]
    fn test_dragging_blocks_all_reports() {
        let mut state = SyncState::new();
        state.set_dragging(true);

        assert!(!state.apply_report(PositionReport::new(30.0, 0)));
        assert!(!state.apply_report(PositionReport::new(31.0, 100)));
        assert_eq!(state.committed(), 0.0);
        assert_eq!(state.version(), 0);

        state.set_dragging(false);
        assert!(state.apply_report(PositionReport::new(32.0, 0)));
        assert_eq!(state.committed(), 32.0);
    }

    #[test]
    fn test_commit_increments_version_every_time() {
        let mut state = SyncState::new();
        let mut last = state.version();
        for target in [5.0, 5.0, 1.0, 200.0] {
            let version = state.commit(target);
            assert_eq!(version, last + 1);
            last = version;
        }
    }

    #[test]
    fn test_direct_seek_keeps_drag() {
        let mut state = SyncState::new();
        state.set_dragging(true);
        state.set_preview(8.0);

        assert_eq!(state.seek(15.0), 1);
        assert!(state.is_dragging());
        assert_eq!(state.preview(), None);
        assert_eq!(state.display_time(), 15.0);

        let mut idle = SyncState::new();
        idle.seek(4.0);
        assert_eq!(idle.phase(), SeekPhase::Idle);
    }

    #[test]
    fn test_preview_overrides_display_until_commit() {
        let mut state = SyncState::new();
        state.apply_report(PositionReport::new(3.0, 0));

        state.set_dragging(true);
        state.set_preview(10.0);
        state.set_preview(20.0);
        assert_eq!(state.display_time(), 20.0);
        assert_eq!(state.committed(), 3.0);

        state.commit(20.0);
        assert_eq!(state.preview(), None);
        assert_eq!(state.display_time(), 20.0);
        assert_eq!(state.phase(), SeekPhase::Idle);
    }

    #[test]
    fn test_reset_for_track_clears_everything() {
        let mut state = state_at_version(5);
        state.apply_report(PositionReport::new(120.0, 5));
        state.set_preview(60.0);

        state.reset_for_track();

        assert_eq!(state.version(), 0);
        assert_eq!(state.preview(), None);
        assert_eq!(state.display_time(), 0.0);
    }

    #[test]
    fn test_reset_for_track_ends_drag() {
        let mut state = SyncState::new();
        state.set_dragging(true);

        state.reset_for_track();

        assert_eq!(state.phase(), SeekPhase::Idle);
        assert!(state.apply_report(PositionReport::new(1.0, 0)));
    }

    #[test]
    fn test_rewind_keeps_version() {
        let mut state = state_at_version(2);
        state.apply_report(PositionReport::new(87.0, 2));

        state.rewind();

        assert_eq!(state.version(), 2);
        assert_eq!(state.display_time(), 0.0);
    }
}
