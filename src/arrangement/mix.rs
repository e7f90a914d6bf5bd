// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Channel routing handed to the playback engine alongside a score.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Instrument assigned to a MIDI channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelSlot {
    /// Instrument or patch name
    pub instrument: String,
    /// MIDI program number (0-127)
    #[serde(default)]
    pub program: u8,
    /// Channel volume (0.0 - 1.0)
    #[serde(default = "default_volume")]
    pub volume: f32,
    #[serde(default)]
    pub muted: bool,
}

fn default_volume() -> f32 {
    0.8
}

impl ChannelSlot {
    pub fn new(instrument: impl Into<String>, program: u8) -> Self {
        Self {
            instrument: instrument.into(),
            program: program.min(127),
            volume: default_volume(),
            muted: false,
        }
    }
}

/// Channel to instrument routing. The rehearsal loop never edits it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MidiMix {
    channels: BTreeMap<u8, ChannelSlot>,
}

impl MidiMix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign `slot` to `channel` (1-16), returning the previous slot.
    /// Channels outside 1-16 are ignored.
    pub fn assign(&mut self, channel: u8, slot: ChannelSlot) -> Option<ChannelSlot> {
        if !(1..=16).contains(&channel) {
            return None;
        }
        self.channels.insert(channel, slot)
    }

    pub fn slot(&self, channel: u8) -> Option<&ChannelSlot> {
        self.channels.get(&channel)
    }

    /// Assigned channels in ascending order
    pub fn channels(&self) -> impl Iterator<Item = (u8, &ChannelSlot)> {
        self.channels.iter().map(|(ch, slot)| (*ch, slot))
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}
