//! UI collaborator.
//!
//! The game produces exactly three kinds of output: arm-button visibility,
//! the remaining match time, and the final banner. Rendering is somebody
//! else's problem; [`ConsoleUi`] prints lines, [`RecordingUi`] keeps them.

use std::io::Write;
use std::sync::Mutex;

use crate::game::Outcome;

/// Outbound UI port.
pub trait GameUi: Send + Sync {
    /// Shows or hides the "start extraction" button.
    fn show_arm_button(&self, visible: bool);

    /// Displays the remaining match time in seconds.
    fn show_remaining_time(&self, seconds: u32);

    /// Displays the end-of-match banner.
    fn show_end_banner(&self, outcome: Outcome);
}

/// Human-readable banner text for an outcome.
#[must_use]
pub const fn banner_text(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Win => "All ghosts exterminated! You win!",
        Outcome::Lose => "Time's up! Game over.",
    }
}

/// Line-oriented UI on an arbitrary writer (stdout by default).
///
/// Remaining-time updates are printed every `time_every` seconds and for
/// the last ten seconds, to keep real-time runs readable.
pub struct ConsoleUi {
    writer: Mutex<Box<dyn Write + Send>>,
    time_every: u32,
}

impl std::fmt::Debug for ConsoleUi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleUi")
            .field("time_every", &self.time_every)
            .finish_non_exhaustive()
    }
}

impl ConsoleUi {
    /// Creates a console UI on the given writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>, time_every: u32) -> Self {
        Self {
            writer: Mutex::new(writer),
            time_every: time_every.max(1),
        }
    }

    /// Creates a console UI on stdout, printing the clock every 30 seconds.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()), 30)
    }

    fn line(&self, text: &str) {
        if let Ok(mut w) = self.writer.lock() {
            let _ = writeln!(w, "{text}");
            let _ = w.flush();
        }
    }
}

impl GameUi for ConsoleUi {
    fn show_arm_button(&self, visible: bool) {
        if visible {
            self.line("[button] START EXTRACTION");
        } else {
            self.line("[button] hidden");
        }
    }

    fn show_remaining_time(&self, seconds: u32) {
        if seconds % self.time_every == 0 || seconds <= 10 {
            self.line(&format!("[clock] {seconds}s remaining"));
        }
    }

    fn show_end_banner(&self, outcome: Outcome) {
        self.line(&format!("[banner] {}", banner_text(outcome)));
    }
}

/// A single recorded UI call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCall {
    /// `show_arm_button`
    ArmButton(bool),
    /// `show_remaining_time`
    RemainingTime(u32),
    /// `show_end_banner`
    EndBanner(Outcome),
}

/// UI that records every call in order.
#[derive(Debug, Default)]
pub struct RecordingUi {
    calls: Mutex<Vec<UiCall>>,
}

impl RecordingUi {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all calls so far.
    #[must_use]
    pub fn calls(&self) -> Vec<UiCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Returns the most recent arm-button visibility, if any was shown.
    #[must_use]
    pub fn arm_button_visible(&self) -> Option<bool> {
        self.calls().iter().rev().find_map(|call| match call {
            UiCall::ArmButton(v) => Some(*v),
            _ => None,
        })
    }

    /// Returns the most recent remaining-time value, if any was shown.
    #[must_use]
    pub fn last_remaining_time(&self) -> Option<u32> {
        self.calls().iter().rev().find_map(|call| match call {
            UiCall::RemainingTime(s) => Some(*s),
            _ => None,
        })
    }

    /// Returns every end banner shown, in order.
    #[must_use]
    pub fn banners(&self) -> Vec<Outcome> {
        self.calls()
            .iter()
            .filter_map(|call| match call {
                UiCall::EndBanner(o) => Some(*o),
                _ => None,
            })
            .collect()
    }

    fn push(&self, call: UiCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

impl GameUi for RecordingUi {
    fn show_arm_button(&self, visible: bool) {
        self.push(UiCall::ArmButton(visible));
    }

    fn show_remaining_time(&self, seconds: u32) {
        self.push(UiCall::RemainingTime(seconds));
    }

    fn show_end_banner(&self, outcome: Outcome) {
        self.push(UiCall::EndBanner(outcome));
    }
}
