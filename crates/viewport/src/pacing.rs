//! Render pacing guards.
//!
//! Pure state machines; callers pass `Instant`s in, so tests need no clock.

use std::time::{Duration, Instant};

/// How long marker re-measurement stays open after a thaw.
pub const MARKER_THAW_WINDOW: Duration = Duration::from_millis(400);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum TrackingState {
    Tracking,
    Frozen,
    /// Open until the deadline, then counts as frozen again.
    Thawing { until: Instant },
}

/// Limits continuous marker re-measurement to short settling windows.
///
/// Starts open. Entering polygon-dominated display freezes the gate;
/// leaving it, or receiving fresh point-marker data, thaws it for
/// [`MARKER_THAW_WINDOW`], after which it closes on its own without a
/// further call.
#[derive(Debug, Copy, Clone)]
pub struct MarkerTrackingGate {
    state: TrackingState,
    window: Duration,
}

impl MarkerTrackingGate {
    pub fn new() -> Self {
        Self::with_window(MARKER_THAW_WINDOW)
    }

    pub fn with_window(window: Duration) -> Self {
        Self {
            state: TrackingState::Tracking,
            window,
        }
    }

    pub fn freeze(&mut self) {
        self.state = TrackingState::Frozen;
    }

    /// Open the gate; it closes by itself one window after `now`.
    pub fn thaw(&mut self, now: Instant) {
        self.state = TrackingState::Thawing {
            until: now + self.window,
        };
    }

    pub fn is_frozen(&self, now: Instant) -> bool {
        match self.state {
            TrackingState::Tracking => false,
            TrackingState::Frozen => true,
            TrackingState::Thawing { until } => now >= until,
        }
    }
}

impl Default for MarkerTrackingGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Collapses bursts of camera callbacks into one projection pass per frame.
#[derive(Debug, Default)]
pub struct ProjectionGate {
    scheduled: bool,
}

impl ProjectionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the caller should run a projection pass now; false when one
    /// is already scheduled for this frame.
    pub fn try_schedule(&mut self) -> bool {
        if self.scheduled {
            return false;
        }
        self.scheduled = true;
        true
    }

    /// Re-arms the gate once the scheduled pass has run.
    pub fn finish(&mut self) {
        self.scheduled = false;
    }
}
