//! Suction controller.
//!
//! Decides when an extraction may be armed, runs it, and lands back in the
//! right state when it completes. States:
//!
//! - `Idle`: no marker in view, arm button hidden
//! - `Armable`: marker in view, no extraction running, arm button shown
//! - `Extracting`: one [`ExtractionSession`] live, motion forwarded
//! - `Frozen`: the match is over; every input is ignored
//!
//! Every operation outside its valid state is a silent no-op.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::device::{Camera, Devices};
use crate::ui::GameUi;

use super::event::GameEvent;
use super::extraction::{ExtractionSession, ShakeEffect};
use super::marker::{MarkerEdge, MarkerTracker};
use super::motion::{AccelerationMonitor, AccelerationSample};
use super::rules::SHAKE_THRESHOLD;
use super::session::{GameSession, Outcome};

/// Controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    /// No marker, button hidden
    Idle,
    /// Marker present, button visible
    Armable,
    /// Extraction running
    Extracting,
    /// Match over
    Frozen,
}

/// How an extraction finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionKind {
    /// The deadline elapsed
    Natural,
    /// A shake hit the floor and ended it early
    Forced,
}

impl CompletionKind {
    /// Label used in logs, events and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Natural => "natural",
            Self::Forced => "forced",
        }
    }
}

/// Record of a finished extraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Completion {
    /// Session id
    pub session: u64,
    /// Natural or forced
    pub kind: CompletionKind,
    /// Remaining duration at completion, in seconds
    pub remaining: f64,
    /// Shakes applied during the session
    pub shakes: u32,
    /// Exterminated count after this completion
    pub exterminated: u32,
    /// Set when this completion ended the match
    pub outcome: Option<Outcome>,
}

/// Result of feeding one motion sample or shake.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShakeOutcome {
    /// Not extracting, or the monitor is inactive
    Ignored,
    /// Magnitude did not exceed the threshold
    BelowThreshold,
    /// Countdown shortened
    Shortened {
        /// Session id
        session: u64,
        /// New remaining duration in seconds
        remaining: f64,
    },
    /// Countdown hit the floor and completed immediately
    Completed(Completion),
}

/// The arming/extraction state machine.
pub struct SuctionController {
    state: ControllerState,
    tracker: MarkerTracker,
    marker_present: bool,
    button_visible: bool,
    session: Option<ExtractionSession>,
    next_session: u64,
    monitor: AccelerationMonitor,
    camera: Arc<dyn Camera>,
    pause_capture: bool,
    ui: Arc<dyn GameUi>,
    events: mpsc::UnboundedSender<GameEvent>,
}

impl SuctionController {
    /// Creates an `Idle` controller.
    ///
    /// `events` is where extraction deadlines are posted.
    #[must_use]
    pub fn new(
        devices: &Devices,
        ui: Arc<dyn GameUi>,
        events: mpsc::UnboundedSender<GameEvent>,
    ) -> Self {
        Self {
            state: ControllerState::Idle,
            tracker: MarkerTracker::new(Instant::now()),
            marker_present: false,
            button_visible: false,
            session: None,
            next_session: 1,
            monitor: AccelerationMonitor::new(Arc::clone(&devices.motion)),
            camera: Arc::clone(&devices.camera),
            pause_capture: devices.pause_capture_during_extraction,
            ui,
            events,
        }
    }

    /// Feeds one camera frame result through the marker tracker.
    ///
    /// Returns the edge, if the frame produced one.
    pub fn on_frame_result(&mut self, marker_seen: bool) -> Option<MarkerEdge> {
        if self.state == ControllerState::Frozen {
            return None;
        }
        let edge = self.tracker.on_frame_result(marker_seen, Instant::now())?;
        self.on_marker_changed(edge.is_present());
        Some(edge)
    }

    /// Applies a marker presence change.
    ///
    /// Presence is always recorded; it only drives a transition between
    /// `Idle` and `Armable`.
    pub fn on_marker_changed(&mut self, present: bool) {
        if self.state == ControllerState::Frozen {
            return;
        }
        self.marker_present = present;
        match self.state {
            ControllerState::Idle | ControllerState::Armable => {
                self.set_state(if present {
                    ControllerState::Armable
                } else {
                    ControllerState::Idle
                });
            }
            ControllerState::Extracting | ControllerState::Frozen => {
                debug!(present, "marker change recorded during extraction");
            }
        }
    }

    /// Arms a new extraction if the controller is `Armable`.
    ///
    /// Returns the new session id.
    pub fn on_arm_requested(&mut self) -> Option<u64> {
        if self.state != ControllerState::Armable {
            debug!(state = ?self.state, "arm request ignored");
            return None;
        }

        let id = self.next_session;
        self.next_session += 1;
        self.session = Some(ExtractionSession::start(
            id,
            Instant::now(),
            self.events.clone(),
        ));
        self.set_state(ControllerState::Extracting);

        if self.pause_capture {
            self.camera.stop_capture();
        }
        self.monitor.activate();

        info!(session = id, "extraction started");
        Some(id)
    }

    /// Feeds one raw motion sample through the acceleration monitor.
    pub fn on_motion_sample(
        &mut self,
        sample: &AccelerationSample,
        game: &mut GameSession,
    ) -> ShakeOutcome {
        match self.monitor.on_sample(sample) {
            Some(magnitude) => self.on_shake(magnitude, game),
            None => ShakeOutcome::Ignored,
        }
    }

    /// Applies one acceleration magnitude to the running extraction.
    pub fn on_shake(&mut self, magnitude: f64, game: &mut GameSession) -> ShakeOutcome {
        if self.state != ControllerState::Extracting {
            return ShakeOutcome::Ignored;
        }
        if magnitude <= SHAKE_THRESHOLD || magnitude.is_nan() {
            return ShakeOutcome::BelowThreshold;
        }
        let Some(session) = self.session.as_mut() else {
            return ShakeOutcome::Ignored;
        };

        match session.shorten() {
            ShakeEffect::Shortened { remaining } => {
                debug!(session = session.id(), remaining, magnitude, "extraction shortened");
                ShakeOutcome::Shortened {
                    session: session.id(),
                    remaining,
                }
            }
            ShakeEffect::Floor => {
                info!(session = session.id(), "extraction floor reached; completing now");
                self.complete(CompletionKind::Forced, game)
                    .map_or(ShakeOutcome::Ignored, ShakeOutcome::Completed)
            }
        }
    }

    /// Handles an extraction deadline posted by the session's timer.
    ///
    /// Deadlines for sessions that are no longer live are dropped.
    pub fn on_deadline(&mut self, session: u64, game: &mut GameSession) -> Option<Completion> {
        if self.state != ControllerState::Extracting {
            debug!(session, "stale deadline ignored");
            return None;
        }
        if self.session.as_ref().map(ExtractionSession::id) != Some(session) {
            debug!(session, "deadline for superseded session ignored");
            return None;
        }
        self.complete(CompletionKind::Natural, game)
    }

    /// Stops everything for the end of the match. Idempotent.
    pub fn freeze(&mut self) {
        if self.state == ControllerState::Frozen {
            return;
        }
        if let Some(mut session) = self.session.take() {
            session.cancel_deadline();
        }
        self.monitor.deactivate();
        self.set_state(ControllerState::Frozen);
        debug!("suction controller frozen");
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> ControllerState {
        self.state
    }

    /// Latest recorded marker presence.
    #[must_use]
    pub const fn marker_present(&self) -> bool {
        self.marker_present
    }

    /// Whether the arm button is currently shown.
    #[must_use]
    pub const fn button_visible(&self) -> bool {
        self.button_visible
    }

    /// The live extraction, if any.
    #[must_use]
    pub const fn session(&self) -> Option<&ExtractionSession> {
        self.session.as_ref()
    }

    /// Whether motion samples are being forwarded.
    #[must_use]
    pub const fn monitor_active(&self) -> bool {
        self.monitor.is_active()
    }

    fn complete(&mut self, kind: CompletionKind, game: &mut GameSession) -> Option<Completion> {
        let mut session = self.session.take()?;
        session.cancel_deadline();
        let (id, remaining, shakes) = (session.id(), session.remaining(), session.shakes());
        drop(session);
        self.monitor.deactivate();

        let outcome = game.on_extermination_complete();
        let exterminated = game.state().exterminated;
        info!(
            session = id,
            completion = kind.as_str(),
            remaining,
            shakes,
            exterminated,
            "extraction complete"
        );

        if outcome.is_some() || game.is_ended() {
            self.freeze();
        } else {
            if self.pause_capture {
                self.tracker.reset(Instant::now());
                self.marker_present = false;
                if let Err(e) = self.camera.start_capture() {
                    warn!(error = %e, "camera failed to resume after extraction");
                }
            }
            self.set_state(if self.marker_present {
                ControllerState::Armable
            } else {
                ControllerState::Idle
            });
        }

        Some(Completion {
            session: id,
            kind,
            remaining,
            shakes,
            exterminated,
            outcome,
        })
    }

    fn set_state(&mut self, next: ControllerState) {
        if next != self.state {
            debug!(from = ?self.state, to = ?next, "suction state");
            self.state = next;
        }
        let visible = next == ControllerState::Armable;
        if visible != self.button_visible {
            self.button_visible = visible;
            self.ui.show_arm_button(visible);
        }
    }
}

impl std::fmt::Debug for SuctionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuctionController")
            .field("state", &self.state)
            .field("marker_present", &self.marker_present)
            .field("session", &self.session.as_ref().map(ExtractionSession::id))
            .finish_non_exhaustive()
    }
}
