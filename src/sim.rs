//! Scripted play.
//!
//! [`ScriptRunner`] turns a validated [`Script`] into camera frames, motion
//! samples and button presses, and feeds them to a [`GameEngine`] through
//! its [`GameHandle`]. It reads the simulated hardware state each time it
//! produces input: frames flow only while the camera captures, and motion
//! samples only while the sensor runs.

use std::future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::config::schema::{Script, StepAction};
use crate::device::{Devices, ScriptedCamera, ScriptedMotion};
use crate::error::{ConfigError, EngineError, GhostSweepError};
use crate::game::rules::MOTION_SAMPLE_INTERVAL;
use crate::game::{AccelerationSample, GameEngine, GameHandle, MatchReport};
use crate::observability::EventEmitter;
use crate::ui::GameUi;

/// A script step with its durations resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedStep {
    /// Offset from match start
    pub at: Duration,
    /// What happens
    pub action: TimedAction,
}

/// Resolved step action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimedAction {
    /// Marker visibility changes
    Marker(bool),
    /// Arm button pressed
    PressArm,
    /// Device shaken with `sample` for `duration` (zero means one sample)
    Shake {
        /// Reading reported while shaking
        sample: AccelerationSample,
        /// How long the shake lasts
        duration: Duration,
    },
}

/// Drives one match from a script.
pub struct ScriptRunner {
    script: Arc<Script>,
    steps: Vec<TimedStep>,
    frame_interval: Duration,
    camera: Arc<ScriptedCamera>,
    motion: Arc<ScriptedMotion>,
}

impl ScriptRunner {
    /// Resolves a script into a runnable timeline.
    ///
    /// Steps are ordered by time; steps with equal offsets keep their
    /// script order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if a duration does not parse or
    /// a shake step has no acceleration. Scripts from
    /// [`ScriptLoader`](crate::config::ScriptLoader) never fail here.
    pub fn new(script: Arc<Script>) -> Result<Self, ConfigError> {
        let frame_interval = parse_duration(
            "devices.camera.frame_interval",
            &script.devices.camera.frame_interval,
        )?;
        if frame_interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "devices.camera.frame_interval".to_owned(),
                value: script.devices.camera.frame_interval.clone(),
                expected: "a non-zero duration".to_owned(),
            });
        }

        let mut steps = script
            .steps
            .iter()
            .enumerate()
            .map(|(i, step)| {
                let at = parse_duration(&format!("steps[{i}].at"), &step.at)?;
                let action = match step.action {
                    StepAction::ShowMarker => TimedAction::Marker(true),
                    StepAction::HideMarker => TimedAction::Marker(false),
                    StepAction::PressArm => TimedAction::PressArm,
                    StepAction::Shake => {
                        let accel = step.accel.ok_or_else(|| ConfigError::InvalidValue {
                            field: format!("steps[{i}].accel"),
                            value: "none".to_owned(),
                            expected: "an [x, y, z] acceleration".to_owned(),
                        })?;
                        let duration = step
                            .duration
                            .as_deref()
                            .map(|d| parse_duration(&format!("steps[{i}].for"), d))
                            .transpose()?
                            .unwrap_or_default();
                        TimedAction::Shake {
                            sample: accel.into(),
                            duration,
                        }
                    }
                };
                Ok(TimedStep { at, action })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;
        steps.sort_by_key(|s| s.at);

        Ok(Self {
            camera: Arc::new(ScriptedCamera::new(script.devices.camera.available)),
            motion: Arc::new(ScriptedMotion::new(script.devices.motion.available)),
            script,
            steps,
            frame_interval,
        })
    }

    /// The resolved timeline.
    #[must_use]
    pub fn steps(&self) -> &[TimedStep] {
        &self.steps
    }

    /// The simulated hardware the match runs against.
    #[must_use]
    pub fn devices(&self) -> Devices {
        Devices {
            camera: self.camera.clone(),
            motion: self.motion.clone(),
            pause_capture_during_extraction: self.script.devices.camera.pause_during_extraction,
        }
    }

    /// Simulated camera.
    #[must_use]
    pub fn camera(&self) -> &Arc<ScriptedCamera> {
        &self.camera
    }

    /// Simulated motion sensor.
    #[must_use]
    pub fn motion(&self) -> &Arc<ScriptedMotion> {
        &self.motion
    }

    /// Plays the script until the match ends or `cancel` fires.
    ///
    /// Once the timeline is exhausted the runner keeps producing frames and
    /// rest samples, so an unfinished match runs out its clock.
    ///
    /// # Errors
    ///
    /// Returns whatever [`GameEngine::run`] returns, or
    /// [`EngineError::TaskFailed`] if the engine task panicked.
    pub async fn run(
        self,
        ui: Arc<dyn GameUi>,
        emitter: Arc<EventEmitter>,
        cancel: CancellationToken,
    ) -> Result<MatchReport, GhostSweepError> {
        let (engine, handle) = GameEngine::new(self.devices(), ui, emitter, cancel);
        let engine = engine.with_script_name(self.script.name.clone());
        let mut engine_task = tokio::spawn(engine.run());

        let start = Instant::now();
        let mut driver = Driver::new(handle);
        let mut steps = self.steps.iter().peekable();

        let mut frames = tokio::time::interval(self.frame_interval);
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut samples = tokio::time::interval(MOTION_SAMPLE_INTERVAL);
        samples.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            let next_step = steps.peek().map(|s| start + s.at);
            let step_due = async move {
                match next_step {
                    Some(at) => tokio::time::sleep_until(at).await,
                    None => future::pending().await,
                }
            };

            tokio::select! {
                biased;
                result = &mut engine_task => {
                    return result.map_err(|e| EngineError::TaskFailed(e.to_string()))?;
                }
                () = step_due => {
                    if let Some(step) = steps.next() {
                        driver.apply(step);
                    }
                }
                _ = frames.tick() => {
                    if self.camera.is_capturing() {
                        driver.frame();
                    }
                }
                _ = samples.tick() => {
                    if self.motion.is_running() {
                        driver.sample();
                    }
                }
            }
        }
    }
}

impl std::fmt::Debug for ScriptRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptRunner")
            .field("script", &self.script.name)
            .field("steps", &self.steps.len())
            .field("frame_interval", &self.frame_interval)
            .finish_non_exhaustive()
    }
}

/// Simulated player and world state between steps.
struct Driver {
    handle: GameHandle,
    marker_visible: bool,
    shake: Option<(AccelerationSample, Instant)>,
    pending_single: Option<AccelerationSample>,
}

impl Driver {
    const fn new(handle: GameHandle) -> Self {
        Self {
            handle,
            marker_visible: false,
            shake: None,
            pending_single: None,
        }
    }

    fn apply(&mut self, step: &TimedStep) {
        debug!(at = ?step.at, action = ?step.action, "script step");
        match step.action {
            TimedAction::Marker(visible) => self.marker_visible = visible,
            TimedAction::PressArm => {
                let _ = self.handle.press_arm();
            }
            TimedAction::Shake { sample, duration } => {
                if duration.is_zero() {
                    self.pending_single = Some(sample);
                } else {
                    self.shake = Some((sample, Instant::now() + duration));
                }
            }
        }
    }

    fn frame(&self) {
        trace!(marker = self.marker_visible, "frame");
        let _ = self.handle.frame(self.marker_visible);
    }

    fn sample(&mut self) {
        let now = Instant::now();
        let sample = match (self.pending_single.take(), self.shake) {
            (Some(single), _) => single,
            (None, Some((sample, until))) if now < until => sample,
            _ => {
                self.shake = None;
                AccelerationSample::REST
            }
        };
        let _ = self.handle.motion(sample);
    }
}

fn parse_duration(field: &str, value: &str) -> Result<Duration, ConfigError> {
    humantime::parse_duration(value.trim()).map_err(|e| ConfigError::InvalidValue {
        field: field.to_owned(),
        value: value.to_owned(),
        expected: format!("a duration such as '250ms' or '2s' ({e})"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScriptLoader;
    use crate::game::Outcome;
    use crate::ui::RecordingUi;

    fn runner(yaml: &str) -> ScriptRunner {
        let loaded = ScriptLoader::with_defaults()
            .load_from_str(yaml, "<test>")
            .unwrap();
        ScriptRunner::new(loaded.script).unwrap()
    }

    #[test]
    fn steps_are_sorted_and_resolved() {
        let r = runner(
            "name: t\nsteps:\n  - at: 2s\n    action: press_arm\n  - at: 500ms\n    action: show_marker\n  - at: 3s\n    action: shake\n    accel: [0, 2, 0]\n",
        );
        assert_eq!(r.steps()[0].at, Duration::from_millis(500));
        assert_eq!(r.steps()[0].action, TimedAction::Marker(true));
        assert_eq!(r.steps()[1].action, TimedAction::PressArm);
        assert_eq!(
            r.steps()[2].action,
            TimedAction::Shake {
                sample: AccelerationSample::new(0.0, 2.0, 0.0),
                duration: Duration::ZERO,
            }
        );
    }

    #[test]
    fn devices_follow_script() {
        let r = runner(
            "name: t\ndevices:\n  camera:\n    pause_during_extraction: false\n  motion:\n    available: false\n",
        );
        let devices = r.devices();
        assert!(!devices.pause_capture_during_extraction);
        assert!(!devices.motion.is_available());
    }

    #[tokio::test(start_paused = true)]
    async fn empty_script_runs_out_the_clock() {
        let r = runner("name: idle\n");
        let ui = Arc::new(RecordingUi::new());
        let report = r
            .run(ui.clone(), Arc::new(EventEmitter::noop()), CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(report.outcome, Some(Outcome::Lose));
        assert_eq!(report.exterminated, 0);
        assert_eq!(ui.banners(), vec![Outcome::Lose]);
    }

    #[tokio::test(start_paused = true)]
    async fn unavailable_camera_fails_the_match() {
        let r = runner("name: blind\ndevices:\n  camera:\n    available: false\n");
        let err = r
            .run(
                Arc::new(RecordingUi::new()),
                Arc::new(EventEmitter::noop()),
                CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, GhostSweepError::Device(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_abandons() {
        let r = runner("name: idle\n");
        let cancel = CancellationToken::new();
        let task = tokio::spawn(r.run(
            Arc::new(RecordingUi::new()),
            Arc::new(EventEmitter::noop()),
            cancel.clone(),
        ));
        tokio::time::sleep(Duration::from_millis(5_500)).await;
        cancel.cancel();
        let report = task.await.unwrap().unwrap();
        assert_eq!(report.outcome, None);
        assert_eq!(report.remaining_seconds, 175);
    }
}
