// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Live chord rehearsal.
//!
//! This module provides:
//! - LoopContextBuilder: cuts one part out of a song into a short loop
//!   with a single substitutable anchor chord
//! - LoopController: runs the loop on the playback engine and swaps the
//!   anchor chord for whatever the player holds down

pub mod builder;
pub mod context;
pub mod controller;

pub use builder::{BuildError, LoopContextBuilder};
pub use context::LoopContext;
pub use controller::{LoopController, LoopDependencies};

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Number of bars a rehearsal loop is cut to unless configured otherwise
pub const DEFAULT_LOOP_BARS: u32 = 4;

/// Controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoopState {
    Stopped,
    Playing,
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoopState::Stopped => f.write_str("stopped"),
            LoopState::Playing => f.write_str("playing"),
        }
    }
}

/// Why `play()` did not start the loop
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RehearsalError {
    #[error("No MIDI input device is configured. Pick an input device to play chords.")]
    NoInputDevice,

    #[error("The playback engine is busy with another song. Stop it first.")]
    EngineBusy,

    #[error("Nothing to loop. Select a part of the song first.")]
    NothingToLoop,

    #[error("The playback engine did not respond within {0:?}")]
    EngineTimeout(Duration),

    #[error("The playback engine failed: {0}")]
    EngineFailed(String),

    #[error("An unexpected problem prevented the loop from starting")]
    Internal,
}
