//! Shared integration-test harness: an in-process match with scripted
//! hardware and captured events, plus helpers for spawning the binary.

#![allow(dead_code)]

use std::io::Write;
use std::path::PathBuf;
use std::process::Output;
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use ghostsweep::device::{Devices, ScriptedCamera, ScriptedMotion};
use ghostsweep::error::GhostSweepError;
use ghostsweep::game::{AccelerationSample, GameEngine, GameHandle, MatchReport};
use ghostsweep::observability::EventEmitter;
use ghostsweep::ui::RecordingUi;

/// A reading well above the shake threshold.
pub const HARD_SHAKE: AccelerationSample = AccelerationSample {
    x: 0.0,
    y: 2.0,
    z: 0.0,
};

/// In-memory JSONL sink shared with an [`EventEmitter`].
#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<u8>>>);

impl EventLog {
    /// Every event emitted so far, parsed.
    #[allow(clippy::missing_panics_doc)]
    pub fn events(&self) -> Vec<Value> {
        let buf = self.0.lock().unwrap();
        String::from_utf8_lossy(&buf)
            .lines()
            .map(|l| serde_json::from_str(l).expect("event line is JSON"))
            .collect()
    }

    /// Events with the given `type`.
    pub fn of_type(&self, kind: &str) -> Vec<Value> {
        self.events()
            .into_iter()
            .filter(|e| e["type"] == kind)
            .collect()
    }

    /// An emitter writing into this log.
    pub fn emitter(&self) -> Arc<EventEmitter> {
        Arc::new(EventEmitter::new(Box::new(self.clone())))
    }
}

impl Write for EventLog {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// A running in-process match.
pub struct MatchRig {
    pub handle: GameHandle,
    pub ui: Arc<RecordingUi>,
    pub camera: Arc<ScriptedCamera>,
    pub motion: Arc<ScriptedMotion>,
    pub events: EventLog,
    pub cancel: CancellationToken,
    pub task: JoinHandle<Result<MatchReport, GhostSweepError>>,
}

impl MatchRig {
    /// Spawns a match on the current runtime.
    pub fn start(pause_capture: bool, motion_available: bool) -> Self {
        let camera = Arc::new(ScriptedCamera::new(true));
        let motion = Arc::new(ScriptedMotion::new(motion_available));
        let ui = Arc::new(RecordingUi::new());
        let events = EventLog::default();
        let cancel = CancellationToken::new();

        let devices = Devices {
            camera: camera.clone(),
            motion: motion.clone(),
            pause_capture_during_extraction: pause_capture,
        };
        let (engine, handle) =
            GameEngine::new(devices, ui.clone(), events.emitter(), cancel.clone());
        let task = tokio::spawn(engine.with_script_name("harness").run());

        Self {
            handle,
            ui,
            camera,
            motion,
            events,
            cancel,
            task,
        }
    }

    /// Sends `count` hard shakes.
    #[allow(clippy::missing_panics_doc)]
    pub fn shake(&self, count: usize) {
        for _ in 0..count {
            self.handle.motion(HARD_SHAKE).unwrap();
        }
    }

    /// Waits for the match task to finish.
    #[allow(clippy::missing_panics_doc)]
    pub async fn finish(self) -> (MatchReport, Arc<RecordingUi>, EventLog) {
        let report = self.task.await.expect("engine task panicked").expect("match failed");
        (report, self.ui, self.events)
    }

    /// Abandons the match and waits for it.
    pub async fn abandon(self) -> (MatchReport, Arc<RecordingUi>, EventLog) {
        self.cancel.cancel();
        self.finish().await
    }
}

/// Lets spawned tasks (deadlines, ticker, engine) run to quiescence.
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

/// Advances paused time and lets everything react.
pub async fn advance_ms(ms: u64) {
    tokio::time::advance(std::time::Duration::from_millis(ms)).await;
    settle().await;
}

/// Path to a file under `tests/fixtures`.
#[must_use]
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Runs the binary to completion with `args`.
#[allow(clippy::missing_panics_doc)]
pub fn spawn_command(args: &[&str]) -> Output {
    std::process::Command::new(env!("CARGO_BIN_EXE_ghostsweep"))
        .args(args)
        .env_remove("GHOSTSWEEP_SCRIPT")
        .env("NO_COLOR", "1")
        .output()
        .expect("failed to spawn ghostsweep")
}
