//! Extraction countdown.
//!
//! An [`ExtractionSession`] is a single-use countdown. It starts at
//! [`EXTRACTION_SECONDS`], loses [`SHAKE_STEP_SECONDS`] per shake, and
//! never drops below [`EXTRACTION_FLOOR_SECONDS`]. Its deadline is a
//! cancellable timer task that posts [`GameEvent::ExtractionDeadline`] back
//! into the engine's channel.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use super::event::GameEvent;
use super::rules::{EXTRACTION_FLOOR_SECONDS, EXTRACTION_SECONDS, SHAKE_STEP_SECONDS};

/// Cancellable deadline timer.
///
/// Cancellation is synchronous: once [`cancel`](Self::cancel) returns the
/// task will not send. A deadline message already sitting in the channel is
/// filtered out by session id in the controller.
#[derive(Debug)]
pub struct DeadlineHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
    fires_at: Instant,
}

impl DeadlineHandle {
    /// Spawns a timer that reports `session`'s deadline at `fires_at`.
    #[must_use]
    pub fn schedule(
        session: u64,
        fires_at: Instant,
        events: mpsc::UnboundedSender<GameEvent>,
    ) -> Self {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let task = tokio::spawn(async move {
            tokio::select! {
                biased;
                () = token.cancelled() => {
                    trace!(session, "deadline cancelled");
                }
                () = tokio::time::sleep_until(fires_at) => {
                    let _ = events.send(GameEvent::ExtractionDeadline { session });
                }
            }
        });
        Self {
            cancel,
            task,
            fires_at,
        }
    }

    /// Cancels the timer. Idempotent.
    pub fn cancel(&self) {
        self.cancel.cancel();
        self.task.abort();
    }

    /// Returns whether the timer was cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Returns when the deadline fires.
    #[must_use]
    pub const fn fires_at(&self) -> Instant {
        self.fires_at
    }
}

impl Drop for DeadlineHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Effect of one accepted shake on the countdown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShakeEffect {
    /// Countdown shortened; the deadline is unchanged
    Shortened {
        /// New remaining duration in seconds
        remaining: f64,
    },
    /// The step would have crossed the floor; remaining is clamped to it
    Floor,
}

/// The live extraction countdown.
///
/// The deadline is fixed at `armed_at` plus [`EXTRACTION_SECONDS`] and is
/// never moved. Shakes only lower `remaining`; reaching the floor cancels
/// the deadline so the caller can complete on the spot.
#[derive(Debug)]
pub struct ExtractionSession {
    id: u64,
    armed_at: Instant,
    remaining: f64,
    shakes: u32,
    deadline: Option<DeadlineHandle>,
}

impl ExtractionSession {
    /// Creates a session and schedules its deadline.
    #[must_use]
    pub fn start(id: u64, armed_at: Instant, events: mpsc::UnboundedSender<GameEvent>) -> Self {
        let fires_at = armed_at + Duration::from_secs_f64(EXTRACTION_SECONDS);
        debug!(session = id, ?fires_at, "extraction deadline scheduled");
        Self {
            id,
            armed_at,
            remaining: EXTRACTION_SECONDS,
            shakes: 0,
            deadline: Some(DeadlineHandle::schedule(id, fires_at, events)),
        }
    }

    /// Applies one shake.
    ///
    /// On [`ShakeEffect::Floor`] the deadline is cancelled; the caller is
    /// expected to complete the session immediately.
    pub fn shorten(&mut self) -> ShakeEffect {
        self.shakes = self.shakes.saturating_add(1);
        let next = self.remaining - SHAKE_STEP_SECONDS;
        if next < EXTRACTION_FLOOR_SECONDS {
            self.remaining = EXTRACTION_FLOOR_SECONDS;
            self.cancel_deadline();
            return ShakeEffect::Floor;
        }
        self.remaining = next;
        ShakeEffect::Shortened {
            remaining: self.remaining,
        }
    }

    /// Cancels the pending deadline, if any. Idempotent.
    pub fn cancel_deadline(&mut self) {
        if let Some(handle) = self.deadline.take() {
            handle.cancel();
        }
    }

    /// Session id.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Remaining extraction length in seconds.
    #[must_use]
    pub const fn remaining(&self) -> f64 {
        self.remaining
    }

    /// Number of shakes applied.
    #[must_use]
    pub const fn shakes(&self) -> u32 {
        self.shakes
    }

    /// When the session was armed.
    #[must_use]
    pub const fn armed_at(&self) -> Instant {
        self.armed_at
    }

    /// When the deadline fires, or `None` once cancelled.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline.as_ref().map(DeadlineHandle::fires_at)
    }

}

impl Drop for ExtractionSession {
    fn drop(&mut self) {
        self.cancel_deadline();
    }
}
