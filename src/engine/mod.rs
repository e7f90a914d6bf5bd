// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Playback engine boundary.
//!
//! This module provides:
//! - The `PlaybackEngine` trait implemented by whatever renders a score to sound
//! - Engine state reporting
//! - Time-bounded engine calls
//! - A headless engine that only logs what it would play

pub mod headless;

pub use headless::HeadlessEngine;

use std::fmt;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::Result;

use crate::arrangement::{Composition, MidiMix};
use crate::listeners::{Listener, SubscriptionId};

/// Transport state reported by a playback engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineState {
    /// No output available (e.g. device lost)
    Disabled,
    Stopped,
    Paused,
    Playing,
}

impl EngineState {
    pub fn is_playing(self) -> bool {
        self == EngineState::Playing
    }
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EngineState::Disabled => "disabled",
            EngineState::Stopped => "stopped",
            EngineState::Paused => "paused",
            EngineState::Playing => "playing",
        };
        f.write_str(name)
    }
}

/// Renders a score and accepts edits to it while playing.
///
/// State changes must be reported to subscribers without holding any
/// lock a subscriber could need to call back into the engine.
pub trait PlaybackEngine: Send + Sync {
    fn state(&self) -> EngineState;

    /// Load a score in live-updatable mode, replacing any previous one
    fn load(&self, composition: &Composition, mix: &MidiMix) -> Result<()>;

    /// Start playback from `from_bar` of the loaded score
    fn start(&self, from_bar: u32) -> Result<()>;

    fn stop(&self) -> Result<()>;

    /// Replace the loaded score without interrupting playback
    fn update(&self, composition: &Composition) -> Result<()>;

    fn subscribe(&self, listener: Listener<EngineState>) -> SubscriptionId;

    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}

/// Outcome of a bounded engine call that did not succeed
#[derive(Debug)]
pub enum CallError {
    /// No answer within the limit; the call may still complete later
    Timeout(Duration),
    Failed(anyhow::Error),
}

impl fmt::Display for CallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallError::Timeout(limit) => write!(f, "no answer within {:?}", limit),
            CallError::Failed(e) => write!(f, "{:#}", e),
        }
    }
}

impl std::error::Error for CallError {}

/// Run `call` on a helper thread and wait at most `timeout` for it
pub fn call_with_timeout<T, F>(timeout: Duration, call: F) -> std::result::Result<T, CallError>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("engine-call".into())
        .spawn(move || {
            // Receiver is gone if the caller already timed out
            let _ = tx.send(call());
        })
        .map_err(|e| CallError::Failed(e.into()))?;

    match rx.recv_timeout(timeout) {
        Ok(result) => result.map_err(CallError::Failed),
        Err(mpsc::RecvTimeoutError::Timeout) => Err(CallError::Timeout(timeout)),
        Err(mpsc::RecvTimeoutError::Disconnected) => Err(CallError::Failed(anyhow::anyhow!(
            "engine call panicked"
        ))),
    }
}
