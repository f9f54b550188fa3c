//! Marker presence tracking.
//!
//! Turns the camera's per-frame "marker seen / not seen" results into
//! edge-triggered events. Repeated identical frames produce nothing.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info};

/// Current marker visibility and when it last changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerPresence {
    /// Whether the marker is in view
    pub present: bool,
    /// Instant of the last edge (or tracker creation/reset)
    pub since: Instant,
}

/// An edge transition in marker visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerEdge {
    /// Absent -> Present
    Appeared,
    /// Present -> Absent, with how long the marker had been visible
    Disappeared {
        /// Time spent in view
        visible_for: Duration,
    },
}

impl MarkerEdge {
    /// Returns the presence value after this edge.
    #[must_use]
    pub const fn is_present(self) -> bool {
        matches!(self, Self::Appeared)
    }
}

/// Edge detector over camera frame results.
///
/// No hysteresis: a single frame flips the state.
#[derive(Debug)]
pub struct MarkerTracker {
    presence: MarkerPresence,
}

impl MarkerTracker {
    /// Creates a tracker in the `Absent` state.
    #[must_use]
    pub fn new(now: Instant) -> Self {
        Self {
            presence: MarkerPresence {
                present: false,
                since: now,
            },
        }
    }

    /// Feeds one processed camera frame.
    ///
    /// Returns the edge if this frame changed visibility.
    pub fn on_frame_result(&mut self, marker_seen: bool, now: Instant) -> Option<MarkerEdge> {
        if marker_seen == self.presence.present {
            return None;
        }

        let edge = if marker_seen {
            info!("marker appeared");
            MarkerEdge::Appeared
        } else {
            let visible_for = now.saturating_duration_since(self.presence.since);
            info!(visible_ms = visible_for.as_millis(), "marker lost");
            MarkerEdge::Disappeared { visible_for }
        };

        self.presence = MarkerPresence {
            present: marker_seen,
            since: now,
        };
        Some(edge)
    }

    /// Forgets the current presence without emitting an edge.
    ///
    /// Used when capture was paused and the last frame no longer reflects
    /// what the camera would see.
    pub fn reset(&mut self, now: Instant) {
        if self.presence.present {
            debug!("marker presence reset after capture pause");
        }
        self.presence = MarkerPresence {
            present: false,
            since: now,
        };
    }

    /// Returns the current presence.
    #[must_use]
    pub const fn presence(&self) -> MarkerPresence {
        self.presence
    }

    /// Returns whether the marker is currently in view.
    #[must_use]
    pub const fn is_present(&self) -> bool {
        self.presence.present
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn starts_absent() {
        let tracker = MarkerTracker::new(Instant::now());
        assert!(!tracker.is_present());
    }

    #[tokio::test(start_paused = true)]
    async fn emits_only_on_edges() {
        let mut tracker = MarkerTracker::new(Instant::now());

        assert_eq!(tracker.on_frame_result(false, Instant::now()), None);
        assert_eq!(
            tracker.on_frame_result(true, Instant::now()),
            Some(MarkerEdge::Appeared)
        );
        assert_eq!(tracker.on_frame_result(true, Instant::now()), None);
        assert_eq!(tracker.on_frame_result(true, Instant::now()), None);
        assert!(matches!(
            tracker.on_frame_result(false, Instant::now()),
            Some(MarkerEdge::Disappeared { .. })
        ));
        assert_eq!(tracker.on_frame_result(false, Instant::now()), None);
    }

    #[tokio::test(start_paused = true)]
    async fn disappeared_reports_visible_duration() {
        let mut tracker = MarkerTracker::new(Instant::now());
        tracker.on_frame_result(true, Instant::now());
        let appeared_at = tracker.presence().since;

        tokio::time::advance(Duration::from_millis(1500)).await;

        let edge = tracker.on_frame_result(false, Instant::now());
        assert_eq!(
            edge,
            Some(MarkerEdge::Disappeared {
                visible_for: Duration::from_millis(1500)
            })
        );
        assert!(tracker.presence().since > appeared_at);
    }

    #[tokio::test(start_paused = true)]
    async fn single_frame_flicker_flips_state() {
        let mut tracker = MarkerTracker::new(Instant::now());
        let now = Instant::now();
        assert!(tracker.on_frame_result(true, now).is_some());
        assert!(tracker.on_frame_result(false, now).is_some());
        assert!(tracker.on_frame_result(true, now).is_some());
        assert!(tracker.is_present());
    }

    #[tokio::test(start_paused = true)]
    async fn reset_returns_to_absent_silently() {
        let mut tracker = MarkerTracker::new(Instant::now());
        tracker.on_frame_result(true, Instant::now());
        tracker.reset(Instant::now());
        assert!(!tracker.is_present());
        assert_eq!(
            tracker.on_frame_result(true, Instant::now()),
            Some(MarkerEdge::Appeared)
        );
    }

    #[test]
    fn edge_presence_value() {
        assert!(MarkerEdge::Appeared.is_present());
        assert!(
            !MarkerEdge::Disappeared {
                visible_for: Duration::ZERO
            }
            .is_present()
        );
    }
}
