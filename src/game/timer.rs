//! Match clock.
//!
//! Counts down from [`MATCH_SECONDS`] one second per tick. The ticker is a
//! background task that only posts [`GameEvent::Tick`]; the countdown
//! itself runs inside the engine loop. On reaching zero the timer reports
//! expiry to the session once and never ticks again.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::ui::GameUi;

use super::event::GameEvent;
use super::rules::{MATCH_SECONDS, MATCH_TICK};
use super::session::{GameSession, Outcome};

/// Result of processing one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTick {
    /// Clock advanced; seconds left
    Remaining(u32),
    /// Clock hit zero on this tick
    Expired(Option<Outcome>),
    /// Timer already stopped; tick ignored
    Stopped,
}

/// One-shot match countdown.
pub struct MatchTimer {
    remaining: u32,
    stop: CancellationToken,
    ui: Arc<dyn GameUi>,
}

impl MatchTimer {
    /// Creates a timer at [`MATCH_SECONDS`].
    #[must_use]
    pub fn new(ui: Arc<dyn GameUi>) -> Self {
        Self {
            remaining: MATCH_SECONDS,
            stop: CancellationToken::new(),
            ui,
        }
    }

    /// Token that stops the timer when cancelled.
    #[must_use]
    pub fn stop_handle(&self) -> CancellationToken {
        self.stop.clone()
    }

    /// Seconds left.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Returns whether the timer has stopped (expired or stopped by the session).
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stop.is_cancelled()
    }

    /// Processes one tick.
    pub fn tick(&mut self, session: &mut GameSession) -> TimerTick {
        if self.is_stopped() {
            return TimerTick::Stopped;
        }
        self.remaining = self.remaining.saturating_sub(1);
        self.ui.show_remaining_time(self.remaining);
        session.record_remaining(self.remaining);

        if self.remaining > 0 {
            return TimerTick::Remaining(self.remaining);
        }

        info!("match clock expired");
        self.stop.cancel();
        TimerTick::Expired(session.on_time_expired())
    }

    /// Spawns the 1 Hz ticker feeding `events` until the timer stops.
    pub fn spawn_ticker(&self, events: mpsc::UnboundedSender<GameEvent>) -> JoinHandle<()> {
        let stop = self.stop.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(
                tokio::time::Instant::now() + MATCH_TICK,
                MATCH_TICK,
            );
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    () = stop.cancelled() => {
                        debug!("match ticker stopped");
                        break;
                    }
                    _ = interval.tick() => {
                        if events.send(GameEvent::Tick).is_err() {
                            break;
                        }
                    }
                }
            }
        })
    }
}

impl std::fmt::Debug for MatchTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchTimer")
            .field("remaining", &self.remaining)
            .field("stopped", &self.is_stopped())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::device::{ScriptedCamera, ScriptedMotion};
    use crate::ui::RecordingUi;

    fn setup() -> (MatchTimer, GameSession, Arc<RecordingUi>) {
        let ui = Arc::new(RecordingUi::new());
        let timer = MatchTimer::new(ui.clone());
        let session = GameSession::new(
            timer.stop_handle(),
            Arc::new(ScriptedCamera::new(true)),
            Arc::new(ScriptedMotion::new(true)),
            ui.clone(),
        );
        (timer, session, ui)
    }

    #[test]
    fn expires_exactly_at_tick_180() {
        let (mut timer, mut session, ui) = setup();
        for n in 1..180 {
            assert_eq!(timer.tick(&mut session), TimerTick::Remaining(180 - n));
            assert!(!session.is_ended(), "ended early at tick {n}");
        }
        assert_eq!(
            timer.tick(&mut session),
            TimerTick::Expired(Some(Outcome::Lose))
        );
        assert!(session.is_ended());
        assert_eq!(ui.banners(), vec![Outcome::Lose]);
        assert_eq!(ui.last_remaining_time(), Some(0));
    }

    #[test]
    fn ticks_after_expiry_are_ignored() {
        let (mut timer, mut session, ui) = setup();
        for _ in 0..180 {
            timer.tick(&mut session);
        }
        let calls = ui.calls().len();
        assert_eq!(timer.tick(&mut session), TimerTick::Stopped);
        assert_eq!(timer.tick(&mut session), TimerTick::Stopped);
        assert_eq!(ui.calls().len(), calls);
        assert_eq!(timer.remaining(), 0);
    }

    #[test]
    fn session_end_stops_timer() {
        let (mut timer, mut session, _ui) = setup();
        timer.tick(&mut session);
        session.end_game(Outcome::Win);
        assert!(timer.is_stopped());
        assert_eq!(timer.tick(&mut session), TimerTick::Stopped);
        assert_eq!(timer.remaining(), 179);
    }

    #[tokio::test(start_paused = true)]
    async fn ticker_posts_once_per_second_until_stopped() {
        let (timer, _session, _ui) = setup();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = timer.spawn_ticker(tx);

        tokio::time::sleep(Duration::from_millis(3_500)).await;
        let mut ticks = 0;
        while let Ok(event) = rx.try_recv() {
            assert_eq!(event, GameEvent::Tick);
            ticks += 1;
        }
        assert_eq!(ticks, 3);

        timer.stop_handle().cancel();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("ticker should stop after cancel")
            .unwrap();
    }
}
