// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! loopjam: live chord rehearsal loops.
//!
//! Pick a part of a song, and loopjam cuts it into a short loop with a
//! single chord, plays it, and swaps that chord for whatever you hold
//! down on a MIDI keyboard without stopping the backing.

pub mod arrangement;
pub mod config;
pub mod engine;
pub mod listeners;
pub mod midi;
pub mod music;
pub mod rehearsal;

pub use config::RehearsalConfig;
pub use rehearsal::{LoopContext, LoopContextBuilder, LoopController, LoopDependencies, LoopState, RehearsalError};
