// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Playback engine without audio output.
//!
//! Keeps the loaded score and logs what it would render. Used by the demo
//! and in tests, where `set_external_state` stands in for a device going away.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use anyhow::{bail, Result};
use tracing::{debug, info};

use super::{EngineState, PlaybackEngine};
use crate::arrangement::{Composition, MidiMix};
use crate::listeners::{Listener, ListenerRegistry, SubscriptionId};

#[derive(Debug)]
struct Loaded {
    composition: Composition,
    mix: MidiMix,
}

#[derive(Debug)]
struct Inner {
    state: EngineState,
    loaded: Option<Loaded>,
    start_bar: u32,
    updates: u64,
}

/// Engine that renders nothing
#[derive(Debug)]
pub struct HeadlessEngine {
    inner: Mutex<Inner>,
    listeners: ListenerRegistry<EngineState>,
    start_delay: Option<Duration>,
}

impl HeadlessEngine {
    /// Create a stopped engine
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: EngineState::Stopped,
                loaded: None,
                start_bar: 0,
                updates: 0,
            }),
            listeners: ListenerRegistry::new(),
            start_delay: None,
        }
    }

    /// Builder: make `start` and `stop` take `delay`, like a slow device
    pub fn with_start_delay(mut self, delay: Duration) -> Self {
        self.start_delay = Some(delay);
        self
    }

    /// Copy of the loaded score as last updated
    pub fn loaded(&self) -> Option<Composition> {
        self.lock().loaded.as_ref().map(|l| l.composition.clone())
    }

    pub fn loaded_mix(&self) -> Option<MidiMix> {
        self.lock().loaded.as_ref().map(|l| l.mix.clone())
    }

    /// Bar playback was last started from
    pub fn start_bar(&self) -> u32 {
        self.lock().start_bar
    }

    /// Number of live updates since the last load
    pub fn update_count(&self) -> u64 {
        self.lock().updates
    }

    /// Change state as if the transport or device did it
    pub fn set_external_state(&self, state: EngineState) {
        self.transition(state);
    }

    fn transition(&self, state: EngineState) {
        let changed = {
            let mut inner = self.lock();
            let changed = inner.state != state;
            inner.state = state;
            changed
        };
        if changed {
            debug!("Headless engine {}", state);
            self.listeners.notify(&state);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn log_render(composition: &Composition) {
        let chords: Vec<String> = composition
            .chord_track()
            .chords()
            .iter()
            .map(|c| format!("{} {}", c.position(), c.symbol()))
            .collect();
        let parts: Vec<String> = composition
            .parts()
            .iter()
            .map(|p| format!("{} {} {}", p.name(), p.bar_range(), p.accompaniment().name()))
            .collect();
        debug!("Rendering parts [{}] chords [{}]", parts.join(", "), chords.join(", "));
    }
}

impl Default for HeadlessEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackEngine for HeadlessEngine {
    fn state(&self) -> EngineState {
        self.lock().state
    }

    fn load(&self, composition: &Composition, mix: &MidiMix) -> Result<()> {
        {
            let mut inner = self.lock();
            if inner.state == EngineState::Disabled {
                bail!("engine is disabled");
            }
            inner.loaded = Some(Loaded {
                composition: composition.clone(),
                mix: mix.clone(),
            });
            inner.updates = 0;
        }
        info!(
            "Loaded '{}' ({} bars, {} parts)",
            composition.name(),
            composition.size_in_bars(),
            composition.parts().len()
        );
        Self::log_render(composition);
        Ok(())
    }

    fn start(&self, from_bar: u32) -> Result<()> {
        if let Some(delay) = self.start_delay {
            thread::sleep(delay);
        }
        {
            let mut inner = self.lock();
            match (&inner.loaded, inner.state) {
                (_, EngineState::Disabled) => bail!("engine is disabled"),
                (None, _) => bail!("nothing loaded"),
                (Some(loaded), _) if from_bar >= loaded.composition.size_in_bars() => {
                    bail!("bar {} is past the end of the score", from_bar)
                }
                _ => {}
            }
            inner.start_bar = from_bar;
        }
        self.transition(EngineState::Playing);
        Ok(())
    }

    fn stop(&self) -> Result<()> {
        if let Some(delay) = self.start_delay {
            thread::sleep(delay);
        }
        if self.state() != EngineState::Disabled {
            self.transition(EngineState::Stopped);
        }
        Ok(())
    }

    fn update(&self, composition: &Composition) -> Result<()> {
        {
            let mut inner = self.lock();
            let Some(loaded) = inner.loaded.as_mut() else {
                bail!("nothing loaded");
            };
            loaded.composition = composition.clone();
            inner.updates += 1;
        }
        Self::log_render(composition);
        Ok(())
    }

    fn subscribe(&self, listener: Listener<EngineState>) -> SubscriptionId {
        self.listeners.subscribe(move |state| listener(state))
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }
}
