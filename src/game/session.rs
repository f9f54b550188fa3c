//! Match aggregate.
//!
//! [`GameSession`] owns the score and the outcome and is the only thing
//! allowed to end the match. Ending is write-once: the first call to
//! [`GameSession::end_game`] stops the clock, releases the hardware and
//! shows the banner; every later call does nothing.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::device::{Camera, MotionSensor};
use crate::ui::GameUi;

use super::rules::{MATCH_SECONDS, MAX_EXTERMINATIONS};

/// How a match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// All ghosts exterminated before time ran out
    Win,
    /// The match clock expired
    Lose,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Win => write!(f, "win"),
            Self::Lose => write!(f, "lose"),
        }
    }
}

/// Score and clock snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MatchState {
    /// Seconds left on the match clock
    pub remaining_seconds: u32,
    /// Completed extractions, at most [`MAX_EXTERMINATIONS`]
    pub exterminated: u32,
    /// Final outcome, set once
    pub outcome: Option<Outcome>,
}

impl Default for MatchState {
    fn default() -> Self {
        Self {
            remaining_seconds: MATCH_SECONDS,
            exterminated: 0,
            outcome: None,
        }
    }
}

/// The match aggregate.
///
/// Holds the collaborators it has to shut down on `end_game`, plus the
/// match timer's stop token.
pub struct GameSession {
    state: MatchState,
    ended: bool,
    timer_stop: CancellationToken,
    camera: Arc<dyn Camera>,
    motion: Arc<dyn MotionSensor>,
    ui: Arc<dyn GameUi>,
}

impl GameSession {
    /// Creates a fresh session.
    #[must_use]
    pub fn new(
        timer_stop: CancellationToken,
        camera: Arc<dyn Camera>,
        motion: Arc<dyn MotionSensor>,
        ui: Arc<dyn GameUi>,
    ) -> Self {
        Self {
            state: MatchState::default(),
            ended: false,
            timer_stop,
            camera,
            motion,
            ui,
        }
    }

    /// Records one completed extraction.
    ///
    /// Returns `Some(Outcome::Win)` if this completion ended the match.
    pub fn on_extermination_complete(&mut self) -> Option<Outcome> {
        if self.ended {
            return None;
        }
        self.state.exterminated = (self.state.exterminated + 1).min(MAX_EXTERMINATIONS);
        info!(
            exterminated = self.state.exterminated,
            max = MAX_EXTERMINATIONS,
            "extermination complete"
        );
        if self.state.exterminated >= MAX_EXTERMINATIONS && self.end_game(Outcome::Win) {
            return Some(Outcome::Win);
        }
        None
    }

    /// Handles match clock expiry.
    ///
    /// Returns `Some(Outcome::Lose)` if this call ended the match.
    pub fn on_time_expired(&mut self) -> Option<Outcome> {
        if self.ended {
            return None;
        }
        self.state.remaining_seconds = 0;
        self.end_game(Outcome::Lose).then_some(Outcome::Lose)
    }

    /// Records the clock value reported by the match timer.
    pub fn record_remaining(&mut self, seconds: u32) {
        if self.ended {
            return;
        }
        self.state.remaining_seconds = seconds;
    }

    /// Ends the match. Returns `true` only for the call that ended it.
    pub fn end_game(&mut self, outcome: Outcome) -> bool {
        if self.ended {
            debug!(%outcome, "end_game ignored; match already over");
            return false;
        }
        self.ended = true;
        self.state.outcome = Some(outcome);

        self.timer_stop.cancel();
        self.camera.stop_capture();
        self.motion.stop();
        self.ui.show_end_banner(outcome);

        info!(
            %outcome,
            exterminated = self.state.exterminated,
            remaining_seconds = self.state.remaining_seconds,
            "match ended"
        );
        true
    }

    /// Returns whether the match is over.
    #[must_use]
    pub const fn is_ended(&self) -> bool {
        self.ended
    }

    /// Returns the current state snapshot.
    #[must_use]
    pub const fn state(&self) -> MatchState {
        self.state
    }

    /// Returns the final outcome, if any.
    #[must_use]
    pub const fn outcome(&self) -> Option<Outcome> {
        self.state.outcome
    }
}

impl fmt::Debug for GameSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameSession")
            .field("state", &self.state)
            .field("ended", &self.ended)
            .finish_non_exhaustive()
    }
}
