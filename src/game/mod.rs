//! Game core.
//!
//! Marker tracking, the suction (extraction) state machine, the match
//! clock and the score aggregate, all driven by the [`GameEngine`] actor.
//!
//! ```text
//! camera frames ──► MarkerTracker ──► SuctionController ──► GameSession
//! motion samples ─► AccelerationMonitor ─┘        ▲              ▲
//! arm button ─────────────────────────────────────┘              │
//! MatchTimer ────────────────────────────────────────────────────┘
//! ```

pub mod controller;
pub mod engine;
pub mod event;
pub mod extraction;
pub mod marker;
pub mod motion;
pub mod rules;
pub mod session;
pub mod timer;

pub use controller::{Completion, CompletionKind, ControllerState, ShakeOutcome, SuctionController};
pub use engine::{GameEngine, MatchReport};
pub use event::{GameEvent, GameHandle};
pub use extraction::{DeadlineHandle, ExtractionSession, ShakeEffect};
pub use marker::{MarkerEdge, MarkerPresence, MarkerTracker};
pub use motion::{AccelerationMonitor, AccelerationSample};
pub use session::{GameSession, MatchState, Outcome};
pub use timer::{MatchTimer, TimerTick};
