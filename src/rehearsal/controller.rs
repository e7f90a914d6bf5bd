// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Rehearsal loop lifecycle.
//!
//! The controller owns at most one `LoopContext`. Held-note changes from
//! the tracker go through the recognizer and replace the loop's anchor
//! chord; parameter edits on the real part are mirrored into the loop;
//! the engine going anywhere but Playing stops the loop.
//!
//! Locking: `lifecycle` serializes `play` and `stop` but is released
//! before state listeners run. `session` guards the working copy and is
//! never held across an engine call. Live updates pass one at a time
//! through `updates`; `stop` clears `playing` and then waits for the
//! update in flight, so none reaches the engine after `stop` returns.
//! An engine that reports a failure from inside `update` is stopped once
//! that call has returned.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, Weak};
use std::thread::{self, ThreadId};
use std::time::Duration;

use tracing::{debug, error, info, trace, warn};

use super::builder::LoopContextBuilder;
use super::context::LoopContext;
use super::{LoopState, RehearsalError};
use crate::arrangement::{ChordSymbolItem, ParameterChange, ParameterValue, PartId, ScoreDocument};
use crate::config::RehearsalConfig;
use crate::engine::{call_with_timeout, CallError, EngineState, PlaybackEngine};
use crate::listeners::{ListenerRegistry, SubscriptionId};
use crate::midi::{NoteCluster, NoteClusterTracker};
use crate::music::{ChordSymbol, HarmonicRecognizer};

/// Collaborators the controller is wired to
#[derive(Clone)]
pub struct LoopDependencies {
    pub document: Arc<dyn ScoreDocument>,
    pub engine: Arc<dyn PlaybackEngine>,
    pub tracker: Arc<NoteClusterTracker>,
    pub recognizer: Arc<dyn HarmonicRecognizer>,
}

struct Subscriptions {
    tracker: SubscriptionId,
    engine: SubscriptionId,
    document: SubscriptionId,
}

/// Thread currently inside `engine.update`, if any
#[derive(Default)]
struct UpdateGate {
    owner: Mutex<Option<ThreadId>>,
    idle: Condvar,
}

/// Shared with the engine-call thread of a `play` so a start that lands
/// after the caller gave up is undone
#[derive(Default)]
struct StartAttempt {
    finished: bool,
    abandoned: bool,
}

/// Runs one rehearsal loop at a time
pub struct LoopController {
    deps: LoopDependencies,
    builder: LoopContextBuilder,
    input_device: Option<String>,
    bass_from_lowest_note: bool,
    engine_timeout: Duration,
    selected: Mutex<Option<PartId>>,
    playing: AtomicBool,
    lifecycle: Mutex<()>,
    session: Mutex<Option<LoopContext>>,
    updates: UpdateGate,
    stop_after_update: AtomicBool,
    state_listeners: ListenerRegistry<LoopState>,
    subscriptions: Mutex<Option<Subscriptions>>,
}

impl LoopController {
    /// Create a stopped controller and subscribe it to the tracker, the
    /// engine and the document. Call `cleanup` before dropping it.
    pub fn new(deps: LoopDependencies, config: &RehearsalConfig) -> Arc<Self> {
        let controller = Arc::new(Self {
            builder: LoopContextBuilder::new(config.loop_bars),
            input_device: config.input_device.clone(),
            bass_from_lowest_note: config.recognizer.bass_from_lowest_note,
            engine_timeout: config.engine_timeout(),
            selected: Mutex::new(None),
            playing: AtomicBool::new(false),
            lifecycle: Mutex::new(()),
            session: Mutex::new(None),
            updates: UpdateGate::default(),
            stop_after_update: AtomicBool::new(false),
            state_listeners: ListenerRegistry::new(),
            subscriptions: Mutex::new(None),
            deps,
        });

        let weak = Arc::downgrade(&controller);
        let tracker = controller
            .deps
            .tracker
            .subscribe(with_controller(&weak, |c, cluster: &NoteCluster| {
                c.on_cluster_changed(cluster)
            }));
        let engine = controller
            .deps
            .engine
            .subscribe(Arc::new(with_controller(&weak, |c, state: &EngineState| {
                c.on_external_engine_state_changed(*state)
            })));
        let document = controller.deps.document.subscribe_parameter_changes(Arc::new(
            with_controller(&weak, |c, change: &ParameterChange| {
                c.on_structural_parameter_changed(change.part, &change.name, change.value.clone())
            }),
        ));

        *lock(&controller.subscriptions) = Some(Subscriptions {
            tracker,
            engine,
            document,
        });
        controller
    }

    /// Choose the song part the next `play` loops
    pub fn select_part(&self, part: PartId) {
        *lock(&self.selected) = Some(part);
    }

    pub fn selected_part(&self) -> Option<PartId> {
        *lock(&self.selected)
    }

    pub fn state(&self) -> LoopState {
        if self.playing.load(Ordering::SeqCst) {
            LoopState::Playing
        } else {
            LoopState::Stopped
        }
    }

    /// Current anchor chord, while a loop exists
    pub fn anchor(&self) -> Option<ChordSymbolItem> {
        lock(&self.session).as_ref().map(|c| c.anchor().clone())
    }

    /// Copy of the working loop, while one exists
    pub fn context_snapshot(&self) -> Option<LoopContext> {
        lock(&self.session).clone()
    }

    pub fn subscribe_state<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&LoopState) + Send + Sync + 'static,
    {
        self.state_listeners.subscribe(listener)
    }

    pub fn unsubscribe_state(&self, id: SubscriptionId) -> bool {
        self.state_listeners.unsubscribe(id)
    }

    /// Build a fresh loop around the selected part and start it.
    /// Does nothing if already playing.
    pub fn play(&self) -> Result<(), RehearsalError> {
        let lifecycle = lock(&self.lifecycle);
        if self.playing.load(Ordering::SeqCst) {
            return Ok(());
        }

        if self.input_device.is_none() {
            return Err(RehearsalError::NoInputDevice);
        }
        let engine_state = self.deps.engine.state();
        if matches!(engine_state, EngineState::Playing | EngineState::Paused) {
            return Err(RehearsalError::EngineBusy);
        }
        let selected = self.selected_part().ok_or(RehearsalError::NothingToLoop)?;
        let composition = self.deps.document.snapshot();
        if composition.part(selected).is_none() {
            return Err(RehearsalError::NothingToLoop);
        }

        let context = self
            .builder
            .build(&composition, &self.deps.document.mix(), selected)
            .map_err(|e| {
                error!(
                    "Building the loop for part {} of '{}' failed: {}",
                    selected,
                    composition.name(),
                    e
                );
                RehearsalError::Internal
            })?;

        self.start_engine(&context).map_err(|e| {
            error!("Engine did not start the loop: {}", e);
            match e {
                CallError::Timeout(limit) => RehearsalError::EngineTimeout(limit),
                CallError::Failed(e) => RehearsalError::EngineFailed(format!("{:#}", e)),
            }
        })?;

        info!(
            "Looping part {} ({} bars, anchor {})",
            selected,
            context.bar_range().size(),
            context.anchor().symbol()
        );
        *lock(&self.session) = Some(context);
        self.playing.store(true, Ordering::SeqCst);
        drop(lifecycle);

        self.state_listeners.notify(&LoopState::Playing);
        Ok(())
    }

    /// Stop the engine and drop the loop. Does nothing if already stopped.
    pub fn stop(&self) {
        // Also keeps engine notifications raised inside `play` from
        // waiting on `lifecycle`
        if !self.playing.load(Ordering::SeqCst) {
            return;
        }
        let lifecycle = lock(&self.lifecycle);
        if !self.playing.swap(false, Ordering::SeqCst) {
            return;
        }

        self.wait_for_updates();
        lock(&self.session).take();
        self.stop_engine();
        drop(lifecycle);

        info!("Rehearsal loop stopped");
        self.state_listeners.notify(&LoopState::Stopped);
    }

    /// Mirror a parameter edit on the looped part into the working copy
    pub fn on_structural_parameter_changed(&self, part: PartId, name: &str, value: ParameterValue) {
        if !self.playing.load(Ordering::SeqCst) {
            return;
        }
        {
            let mut session = lock(&self.session);
            let Some(context) = session.as_mut() else {
                return;
            };
            if context.source_part() != part {
                return;
            }

            if let Err(e) = context.apply_parameter(name, value) {
                error!("Could not mirror parameter {} onto part {}: {}", name, part, e);
                return;
            }
            debug!("Mirrored parameter {} onto the loop", name);
        }
        self.push_update();
    }

    /// Put `candidate` in place of the anchor chord, keeping its position
    /// and hints. Playback keeps running.
    pub fn on_chord_candidate_available(&self, candidate: ChordSymbol) {
        if !self.playing.load(Ordering::SeqCst) {
            return;
        }
        {
            let mut session = lock(&self.session);
            let Some(context) = session.as_mut() else {
                return;
            };
            if context.anchor().symbol() == &candidate {
                trace!("Anchor already {}", candidate);
                return;
            }

            match context.replace_anchor(candidate) {
                Ok(anchor) => debug!("Anchor now {} at {}", anchor.symbol(), anchor.position()),
                Err(e) => {
                    error!("Anchor replacement with {} rejected: {}", candidate, e);
                    return;
                }
            }
        }
        self.push_update();
    }

    /// Stop when the engine leaves Playing on its own
    pub fn on_external_engine_state_changed(&self, state: EngineState) {
        if state.is_playing() {
            return;
        }
        if !self.playing.load(Ordering::SeqCst) {
            return;
        }
        info!("Engine went {}; stopping the loop", state);
        if *lock(&self.updates.owner) == Some(thread::current().id()) {
            // Reported from inside `update`; `push_update` stops on return
            self.stop_after_update.store(true, Ordering::SeqCst);
            return;
        }
        self.stop();
    }

    /// Stop and detach from every source. Later calls do nothing.
    pub fn cleanup(&self) {
        let Some(subscriptions) = lock(&self.subscriptions).take() else {
            return;
        };
        self.stop();

        self.deps.tracker.unsubscribe(subscriptions.tracker);
        self.deps.engine.unsubscribe(subscriptions.engine);
        self.deps
            .document
            .unsubscribe_parameter_changes(subscriptions.document);
        self.state_listeners.clear();
        debug!("Loop controller detached");
    }

    fn on_cluster_changed(&self, cluster: &NoteCluster) {
        if !self.playing.load(Ordering::SeqCst) || !self.deps.recognizer.accepts(cluster.len()) {
            return;
        }
        match self
            .deps
            .recognizer
            .recognize(&cluster.pitches(), self.bass_from_lowest_note)
        {
            Some(chord) => self.on_chord_candidate_available(chord),
            None => trace!("No chord for {:?}", cluster.pitches()),
        }
    }

    /// Load and start the loop within the engine timeout. On timeout the
    /// start is undone, now if it already landed or by the call thread
    /// when it does.
    fn start_engine(&self, context: &LoopContext) -> Result<(), CallError> {
        let engine = Arc::clone(&self.deps.engine);
        let score = context.composition().clone();
        let mix = context.mix().clone();
        let from_bar = context.bar_range().from;
        let attempt = Arc::new(Mutex::new(StartAttempt::default()));
        let shared = Arc::clone(&attempt);

        let result = call_with_timeout(self.engine_timeout, move || {
            engine.load(&score, &mix)?;
            engine.start(from_bar)?;
            let mut attempt = lock(&shared);
            attempt.finished = true;
            if attempt.abandoned {
                drop(attempt);
                warn!("Engine started after the loop was given up; stopping it");
                engine.stop()?;
            }
            Ok(())
        });

        if let Err(CallError::Timeout(_)) = &result {
            let finished = {
                let mut attempt = lock(&attempt);
                attempt.abandoned = true;
                attempt.finished
            };
            if finished {
                self.stop_engine();
            }
        }
        result
    }

    fn stop_engine(&self) {
        let engine = Arc::clone(&self.deps.engine);
        if let Err(e) = call_with_timeout(self.engine_timeout, move || engine.stop()) {
            error!("Engine did not stop cleanly: {}", e);
        }
    }

    /// Send the current working copy to the engine, one update at a time
    fn push_update(&self) {
        let score = {
            let mut owner = lock(&self.updates.owner);
            while owner.is_some() {
                owner = self
                    .updates
                    .idle
                    .wait(owner)
                    .unwrap_or_else(PoisonError::into_inner);
            }
            if !self.playing.load(Ordering::SeqCst) {
                return;
            }
            let Some(score) = lock(&self.session).as_ref().map(|c| c.composition().clone()) else {
                return;
            };
            *owner = Some(thread::current().id());
            score
        };

        if let Err(e) = self.deps.engine.update(&score) {
            warn!("Engine rejected the loop update: {:#}", e);
        }

        *lock(&self.updates.owner) = None;
        self.updates.idle.notify_all();
        if self.stop_after_update.swap(false, Ordering::SeqCst) {
            self.stop();
        }
    }

    /// Block until no other thread is inside `engine.update`
    fn wait_for_updates(&self) {
        let me = thread::current().id();
        let mut owner = lock(&self.updates.owner);
        while owner.is_some_and(|t| t != me) {
            owner = self
                .updates
                .idle
                .wait(owner)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

impl Drop for LoopController {
    fn drop(&mut self) {
        if lock(&self.subscriptions).is_some() {
            warn!("Loop controller dropped without cleanup");
        }
    }
}

impl std::fmt::Debug for LoopController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoopController")
            .field("state", &self.state())
            .field("selected", &self.selected_part())
            .field("builder", &self.builder)
            .finish_non_exhaustive()
    }
}

/// Listener that forwards to the controller while it is alive
fn with_controller<T, F>(weak: &Weak<LoopController>, f: F) -> impl Fn(&T) + Send + Sync + 'static
where
    T: 'static,
    F: Fn(&LoopController, &T) + Send + Sync + 'static,
{
    let weak = weak.clone();
    move |value| {
        if let Some(controller) = weak.upgrade() {
            f(&controller, value);
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
