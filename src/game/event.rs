//! Typed inputs to the game engine.
//!
//! Camera frames, motion samples, button presses, clock ticks and
//! extraction deadlines all arrive on one channel and are consumed by the
//! engine loop, so no two state transitions ever run concurrently.

use tokio::sync::mpsc;

use crate::error::EngineError;

use super::motion::AccelerationSample;

/// An input to the serialized game context.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    /// One processed camera frame
    Frame {
        /// Whether a marker was decoded in this frame
        marker_seen: bool,
    },
    /// One accelerometer reading
    Motion(AccelerationSample),
    /// The player pressed the arm button
    ArmPressed,
    /// One second of match time elapsed
    Tick,
    /// An extraction's deadline elapsed
    ExtractionDeadline {
        /// Id of the session the deadline was scheduled for
        session: u64,
    },
}

/// Cloneable producer side of the engine's event channel.
#[derive(Debug, Clone)]
pub struct GameHandle {
    tx: mpsc::UnboundedSender<GameEvent>,
}

impl GameHandle {
    pub(crate) const fn new(tx: mpsc::UnboundedSender<GameEvent>) -> Self {
        Self { tx }
    }

    /// Delivers a raw event.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ChannelClosed`] once the engine has stopped.
    pub fn send(&self, event: GameEvent) -> Result<(), EngineError> {
        self.tx.send(event).map_err(|_| EngineError::ChannelClosed)
    }

    /// Delivers one camera frame result.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ChannelClosed`] once the engine has stopped.
    pub fn frame(&self, marker_seen: bool) -> Result<(), EngineError> {
        self.send(GameEvent::Frame { marker_seen })
    }

    /// Delivers one accelerometer sample.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ChannelClosed`] once the engine has stopped.
    pub fn motion(&self, sample: AccelerationSample) -> Result<(), EngineError> {
        self.send(GameEvent::Motion(sample))
    }

    /// Delivers an arm-button press.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ChannelClosed`] once the engine has stopped.
    pub fn press_arm(&self) -> Result<(), EngineError> {
        self.send(GameEvent::ArmPressed)
    }

    /// Returns whether the engine has stopped consuming events.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
