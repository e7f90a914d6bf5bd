// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! The document of record and its change notifications.

use std::sync::{PoisonError, RwLock};

use tracing::debug;

use super::composition::Composition;
use super::error::EditError;
use super::mix::MidiMix;
use super::part::{ParameterValue, PartId};
use crate::listeners::{Listener, ListenerRegistry, SubscriptionId};

/// An accompaniment parameter edited on a part
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterChange {
    pub part: PartId,
    pub name: String,
    pub value: ParameterValue,
}

/// Source of the real song, as seen by the rehearsal loop
pub trait ScoreDocument: Send + Sync {
    /// Deep copy of the current composition
    fn snapshot(&self) -> Composition;

    /// Current channel routing
    fn mix(&self) -> MidiMix;

    /// Get notified of every part parameter edit
    fn subscribe_parameter_changes(&self, listener: Listener<ParameterChange>) -> SubscriptionId;

    fn unsubscribe_parameter_changes(&self, id: SubscriptionId) -> bool;
}

/// In-memory document
pub struct SongDocument {
    composition: RwLock<Composition>,
    mix: RwLock<MidiMix>,
    parameter_listeners: ListenerRegistry<ParameterChange>,
}

impl SongDocument {
    pub fn new(composition: Composition, mix: MidiMix) -> Self {
        Self {
            composition: RwLock::new(composition),
            mix: RwLock::new(mix),
            parameter_listeners: ListenerRegistry::new(),
        }
    }

    /// Set a part parameter and notify listeners once the edit is applied
    pub fn set_part_parameter(
        &self,
        part: PartId,
        name: &str,
        value: ParameterValue,
    ) -> Result<(), EditError> {
        self.composition
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .set_part_parameter(part, name, value.clone())?;

        debug!("Part {} parameter {} = {}", part, name, value);
        self.parameter_listeners.notify(&ParameterChange {
            part,
            name: name.to_string(),
            value,
        });
        Ok(())
    }

    /// Apply any other edit to the composition
    pub fn edit<R>(&self, f: impl FnOnce(&mut Composition) -> R) -> R {
        f(&mut self.composition.write().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn set_mix(&self, mix: MidiMix) {
        *self.mix.write().unwrap_or_else(PoisonError::into_inner) = mix;
    }
}

impl ScoreDocument for SongDocument {
    fn snapshot(&self) -> Composition {
        self.composition
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn mix(&self) -> MidiMix {
        self.mix.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn subscribe_parameter_changes(&self, listener: Listener<ParameterChange>) -> SubscriptionId {
        self.parameter_listeners.subscribe(move |change| listener(change))
    }

    fn unsubscribe_parameter_changes(&self, id: SubscriptionId) -> bool {
        self.parameter_listeners.unsubscribe(id)
    }
}

impl std::fmt::Debug for SongDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SongDocument")
            .field("parameter_listeners", &self.parameter_listeners)
            .finish_non_exhaustive()
    }
}
