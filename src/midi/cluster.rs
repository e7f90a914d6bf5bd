// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Currently-held notes.
//!
//! The tracker turns a stream of note-on/note-off events into the set of
//! notes held right now, sorted by pitch so the lowest note is always
//! first. Every event is applied and announced before `on_event` returns,
//! so listeners see the exact net state after each event.

use std::sync::{Mutex, PoisonError};

use tracing::trace;

use super::message::{NoteEvent, NoteEventKind};
use crate::listeners::{ListenerRegistry, SubscriptionId};

/// A held pitch and the velocity it was struck with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeldNote {
    pub pitch: u8,
    pub velocity: u8,
}

/// Held notes, ascending by pitch, no duplicate pitches
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteCluster {
    notes: Vec<HeldNote>,
}

impl NoteCluster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a note before the first note with a higher pitch.
    /// Returns false if the pitch is already held.
    pub fn insert(&mut self, pitch: u8, velocity: u8) -> bool {
        if self.contains(pitch) {
            return false;
        }
        let index = self
            .notes
            .iter()
            .position(|n| n.pitch > pitch)
            .unwrap_or(self.notes.len());
        self.notes.insert(index, HeldNote { pitch, velocity });
        true
    }

    /// Remove the first note with `pitch`. Returns false if absent.
    pub fn remove(&mut self, pitch: u8) -> bool {
        match self.notes.iter().position(|n| n.pitch == pitch) {
            Some(index) => {
                self.notes.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, pitch: u8) -> bool {
        self.notes.iter().any(|n| n.pitch == pitch)
    }

    /// Held notes, lowest first
    pub fn notes(&self) -> &[HeldNote] {
        &self.notes
    }

    /// Held pitches, lowest first
    pub fn pitches(&self) -> Vec<u8> {
        self.notes.iter().map(|n| n.pitch).collect()
    }

    /// Lowest held note
    pub fn lowest(&self) -> Option<HeldNote> {
        self.notes.first().copied()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn clear(&mut self) {
        self.notes.clear();
    }
}

/// Maintains the held-note cluster and notifies listeners on every event.
///
/// The cluster lock is held while listeners run, which keeps notifications
/// in event order when several threads feed the tracker. Listeners must
/// not feed events back into the tracker they observe, and must not block.
#[derive(Debug, Default)]
pub struct NoteClusterTracker {
    cluster: Mutex<NoteCluster>,
    listeners: ListenerRegistry<NoteCluster>,
}

impl NoteClusterTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one event, then hand a snapshot to every listener
    pub fn on_event(&self, event: NoteEvent) {
        let mut cluster = self.cluster.lock().unwrap_or_else(PoisonError::into_inner);
        let changed = match event.kind {
            NoteEventKind::On => cluster.insert(event.pitch, event.velocity),
            NoteEventKind::Off => cluster.remove(event.pitch),
        };
        trace!(?event, changed, held = cluster.len(), "note cluster event");

        let snapshot = cluster.clone();
        self.listeners.notify(&snapshot);
    }

    /// Clear the cluster without notifying
    pub fn reset(&self) {
        self.cluster
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Copy of the current cluster
    pub fn snapshot(&self) -> NoteCluster {
        self.cluster
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Register a change listener
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&NoteCluster) + Send + Sync + 'static,
    {
        self.listeners.subscribe(listener)
    }

    /// Remove a change listener
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}
