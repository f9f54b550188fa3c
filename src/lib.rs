//! `GhostSweep` - marker-hunting extraction game engine
//!
//! A camera looks for a marker; while it is in view the player can arm a
//! ten-second extraction, and shaking the device shortens it. Five
//! extractions inside three minutes win the match.
//!
//! The [`game`] core is hardware-agnostic: cameras, accelerometers and
//! displays sit behind the [`device`] and [`ui`] ports, and [`sim`] plays
//! YAML scripts against simulated hardware.

pub mod cli;
pub mod config;
pub mod device;
pub mod error;
pub mod game;
pub mod observability;
pub mod scenarios;
pub mod sim;
pub mod ui;
