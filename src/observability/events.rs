//! Structured match event stream.
//!
//! Discrete, typed events emitted while a match runs, serialized as
//! newline-delimited JSON with a monotonically increasing sequence number.

use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::game::Outcome;

// ---------------------------------------------------------------------------
// Event variants
// ---------------------------------------------------------------------------

/// A discrete event emitted during a match.
///
/// Tagged with `"type"` when serialized.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    /// The camera is running and the clock has started.
    MatchStarted {
        /// When the match started.
        timestamp: DateTime<Utc>,
        /// Unique id of this match.
        match_id: String,
        /// Script or scenario name driving the match.
        script: String,
        /// Match length in seconds.
        duration_seconds: u32,
    },

    /// The marker came into view.
    MarkerAppeared {
        /// When the edge was observed.
        timestamp: DateTime<Utc>,
    },

    /// The marker left the view.
    MarkerLost {
        /// When the edge was observed.
        timestamp: DateTime<Utc>,
        /// How long the marker had been visible, in milliseconds.
        visible_ms: u64,
    },

    /// The player armed an extraction.
    ExtractionStarted {
        /// When the extraction was armed.
        timestamp: DateTime<Utc>,
        /// Session id.
        session: u64,
    },

    /// A shake shortened the running extraction.
    ExtractionShortened {
        /// When the shake was applied.
        timestamp: DateTime<Utc>,
        /// Session id.
        session: u64,
        /// New extraction length in seconds.
        remaining_seconds: f64,
    },

    /// An extraction finished.
    ExtractionCompleted {
        /// When it finished.
        timestamp: DateTime<Utc>,
        /// Session id.
        session: u64,
        /// `"natural"` or `"forced"`.
        completion: String,
        /// Countdown value at completion, in seconds.
        length_seconds: f64,
        /// Shakes applied.
        shakes: u32,
        /// Exterminated count after this completion.
        exterminated: u32,
    },

    /// The match is over.
    MatchEnded {
        /// When it ended.
        timestamp: DateTime<Utc>,
        /// Unique id of this match.
        match_id: String,
        /// Final outcome; absent when the match was abandoned.
        outcome: Option<Outcome>,
        /// Ghosts exterminated.
        exterminated: u32,
        /// Seconds left on the clock.
        remaining_seconds: u32,
    },
}

// ---------------------------------------------------------------------------
// Envelope (adds sequence number via serde flatten)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct EventEnvelope {
    sequence: u64,
    #[serde(flatten)]
    event: Event,
}

// ---------------------------------------------------------------------------
// Emitter
// ---------------------------------------------------------------------------

/// Thread-safe, buffered JSONL event writer.
///
/// Serialization or I/O failures are dropped; the event stream never
/// interrupts a match.
pub struct EventEmitter {
    writer: Mutex<BufWriter<Box<dyn Write + Send>>>,
    sequence: AtomicU64,
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("sequence", &self.sequence.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl EventEmitter {
    /// Creates an emitter that writes to the given writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(BufWriter::new(writer)),
            sequence: AtomicU64::new(0),
        }
    }

    /// Creates an emitter that writes to stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    /// Creates an emitter that silently discards all events.
    #[must_use]
    pub fn noop() -> Self {
        Self::new(Box::new(std::io::sink()))
    }

    /// Creates an emitter that writes to a file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::new(Box::new(file)))
    }

    /// Emits an event as a single JSONL line.
    pub fn emit(&self, event: Event) {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        let envelope = EventEnvelope {
            sequence: seq,
            event,
        };

        if let Ok(mut w) = self.writer.lock() {
            if let Ok(line) = serde_json::to_string(&envelope) {
                let _ = writeln!(w, "{line}");
                let _ = w.flush();
            }
        }
    }

    /// Returns the number of events emitted so far.
    #[must_use]
    pub fn event_count(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
