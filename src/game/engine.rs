//! The serialized game context.
//!
//! [`GameEngine`] owns every piece of match state and consumes one
//! [`GameEvent`] at a time from a single channel. Producers (camera, motion
//! sensor, button, timers) only ever hold a [`GameHandle`] or a sender, so
//! no two state transitions can interleave.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::device::{Camera, Devices, MotionSensor};
use crate::error::{EngineError, GhostSweepError};
use crate::observability::events::{Event, EventEmitter};
use crate::observability::metrics;
use crate::ui::GameUi;

use super::controller::{Completion, CompletionKind, ShakeOutcome, SuctionController};
use super::event::{GameEvent, GameHandle};
use super::marker::MarkerEdge;
use super::rules::MATCH_SECONDS;
use super::session::{GameSession, Outcome};
use super::timer::{MatchTimer, TimerTick};

/// Summary of a finished (or abandoned) match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchReport {
    /// Unique id of the match
    pub match_id: String,
    /// Script or scenario name
    pub script: String,
    /// Final outcome; `None` if the match was abandoned
    pub outcome: Option<Outcome>,
    /// Ghosts exterminated
    pub exterminated: u32,
    /// Seconds left on the clock
    pub remaining_seconds: u32,
    /// Completed extractions
    pub extractions: u32,
    /// Extractions completed by hitting the floor
    pub forced_extractions: u32,
    /// Shakes that shortened an extraction
    pub shakes: u32,
}

/// Single-consumer game actor.
pub struct GameEngine {
    controller: SuctionController,
    session: GameSession,
    timer: MatchTimer,
    camera: Arc<dyn Camera>,
    motion: Arc<dyn MotionSensor>,
    ui: Arc<dyn GameUi>,
    emitter: Arc<EventEmitter>,
    tx: mpsc::UnboundedSender<GameEvent>,
    rx: mpsc::UnboundedReceiver<GameEvent>,
    cancel: CancellationToken,
    match_id: String,
    script: String,
    extractions: u32,
    forced_extractions: u32,
    shakes: u32,
}

impl GameEngine {
    /// Builds an engine and the handle producers use to feed it.
    ///
    /// Cancelling `cancel` abandons the match without an outcome.
    #[must_use]
    pub fn new(
        devices: Devices,
        ui: Arc<dyn GameUi>,
        emitter: Arc<EventEmitter>,
        cancel: CancellationToken,
    ) -> (Self, GameHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let timer = MatchTimer::new(Arc::clone(&ui));
        let session = GameSession::new(
            timer.stop_handle(),
            Arc::clone(&devices.camera),
            Arc::clone(&devices.motion),
            Arc::clone(&ui),
        );
        let controller = SuctionController::new(&devices, Arc::clone(&ui), tx.clone());
        let handle = GameHandle::new(tx.clone());

        let engine = Self {
            controller,
            session,
            timer,
            camera: devices.camera,
            motion: devices.motion,
            ui,
            emitter,
            tx,
            rx,
            cancel,
            match_id: uuid::Uuid::new_v4().to_string(),
            script: "interactive".to_owned(),
            extractions: 0,
            forced_extractions: 0,
            shakes: 0,
        };
        (engine, handle)
    }

    /// Names the script driving this match, for events and metrics.
    #[must_use]
    pub fn with_script_name(mut self, name: impl Into<String>) -> Self {
        self.script = name.into();
        self
    }

    /// Unique id of this match.
    #[must_use]
    pub fn match_id(&self) -> &str {
        &self.match_id
    }

    /// Runs the match to completion.
    ///
    /// Returns when the match ends (win or lose) or when the cancellation
    /// token fires (outcome `None`).
    ///
    /// # Errors
    ///
    /// Returns [`GhostSweepError::Device`] if the camera cannot start and
    /// [`GhostSweepError::Engine`] if the match ticker task panicked.
    pub async fn run(mut self) -> Result<MatchReport, GhostSweepError> {
        self.camera.start_capture()?;

        info!(match_id = %self.match_id, script = %self.script, "match started");
        self.emitter.emit(Event::MatchStarted {
            timestamp: Utc::now(),
            match_id: self.match_id.clone(),
            script: self.script.clone(),
            duration_seconds: MATCH_SECONDS,
        });
        self.ui.show_remaining_time(MATCH_SECONDS);
        metrics::set_remaining_seconds(MATCH_SECONDS);
        metrics::set_exterminated(0);

        let ticker = self.timer.spawn_ticker(self.tx.clone());
        let cancel = self.cancel.clone();

        while !self.session.is_ended() {
            let next = tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    info!(match_id = %self.match_id, "match abandoned");
                    break;
                }
                event = self.rx.recv() => event,
            };
            let Some(event) = next else {
                break;
            };
            self.handle_event(event);
        }

        self.shutdown();
        if let Err(e) = ticker.await {
            if e.is_panic() {
                return Err(EngineError::TaskFailed(e.to_string()).into());
            }
        }

        let report = self.report();
        self.emitter.emit(Event::MatchEnded {
            timestamp: Utc::now(),
            match_id: report.match_id.clone(),
            outcome: report.outcome,
            exterminated: report.exterminated,
            remaining_seconds: report.remaining_seconds,
        });
        metrics::record_match(report.outcome, &report.script);
        Ok(report)
    }

    fn handle_event(&mut self, event: GameEvent) {
        match event {
            GameEvent::Frame { marker_seen } => self.on_frame(marker_seen),
            GameEvent::Motion(sample) => {
                match self.controller.on_motion_sample(&sample, &mut self.session) {
                    ShakeOutcome::Shortened { session, remaining } => {
                        self.shakes += 1;
                        metrics::record_shake();
                        self.emitter.emit(Event::ExtractionShortened {
                            timestamp: Utc::now(),
                            session,
                            remaining_seconds: remaining,
                        });
                    }
                    ShakeOutcome::Completed(completion) => {
                        metrics::record_shake();
                        self.on_completion(completion);
                    }
                    ShakeOutcome::Ignored | ShakeOutcome::BelowThreshold => {}
                }
            }
            GameEvent::ArmPressed => {
                if let Some(session) = self.controller.on_arm_requested() {
                    self.emitter.emit(Event::ExtractionStarted {
                        timestamp: Utc::now(),
                        session,
                    });
                }
            }
            GameEvent::Tick => match self.timer.tick(&mut self.session) {
                TimerTick::Remaining(seconds) => metrics::set_remaining_seconds(seconds),
                TimerTick::Expired(outcome) => {
                    metrics::set_remaining_seconds(0);
                    if outcome.is_some() {
                        self.controller.freeze();
                    }
                }
                TimerTick::Stopped => debug!("tick after timer stopped"),
            },
            GameEvent::ExtractionDeadline { session } => {
                if let Some(completion) = self.controller.on_deadline(session, &mut self.session) {
                    self.on_completion(completion);
                }
            }
        }
    }

    fn on_frame(&mut self, marker_seen: bool) {
        let Some(edge) = self.controller.on_frame_result(marker_seen) else {
            return;
        };
        let event = match edge {
            MarkerEdge::Appeared => Event::MarkerAppeared {
                timestamp: Utc::now(),
            },
            MarkerEdge::Disappeared { visible_for } => Event::MarkerLost {
                timestamp: Utc::now(),
                visible_ms: u64::try_from(visible_for.as_millis()).unwrap_or(u64::MAX),
            },
        };
        self.emitter.emit(event);
    }

    fn on_completion(&mut self, completion: Completion) {
        self.extractions += 1;
        if completion.kind == CompletionKind::Forced {
            self.forced_extractions += 1;
            self.shakes += 1;
        }
        metrics::record_extraction(completion.kind, completion.remaining);
        metrics::set_exterminated(completion.exterminated);
        self.emitter.emit(Event::ExtractionCompleted {
            timestamp: Utc::now(),
            session: completion.session,
            completion: completion.kind.as_str().to_owned(),
            length_seconds: completion.remaining,
            shakes: completion.shakes,
            exterminated: completion.exterminated,
        });
    }

    fn shutdown(&mut self) {
        self.controller.freeze();
        self.timer.stop_handle().cancel();
        if !self.session.is_ended() {
            self.camera.stop_capture();
            self.motion.stop();
        }
        let pending = std::iter::from_fn(|| self.rx.try_recv().ok()).count();
        if pending > 0 {
            warn!(pending, "dropping events queued after match end");
        }
        self.rx.close();
    }

    fn report(&self) -> MatchReport {
        let state = self.session.state();
        MatchReport {
            match_id: self.match_id.clone(),
            script: self.script.clone(),
            outcome: state.outcome,
            exterminated: state.exterminated,
            remaining_seconds: state.remaining_seconds,
            extractions: self.extractions,
            forced_extractions: self.forced_extractions,
            shakes: self.shakes,
        }
    }
}

impl std::fmt::Debug for GameEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameEngine")
            .field("match_id", &self.match_id)
            .field("script", &self.script)
            .field("controller", &self.controller)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}
