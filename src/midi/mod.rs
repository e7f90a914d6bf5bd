// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! MIDI input side of the rehearsal loop.
//!
//! Raw bytes become `NoteEvent`s, which flow through the pump into the
//! `NoteClusterTracker`. The hardware backend is behind the `device`
//! feature; everything else works with scripted or test input.

pub mod cluster;
#[cfg(feature = "device")]
pub mod input;
pub mod message;
pub mod pump;

pub use cluster::{HeldNote, NoteCluster, NoteClusterTracker};
#[cfg(feature = "device")]
pub use input::{list_sources, print_sources, MidiInputDevice};
pub use message::{MidiMessage, NoteEvent, NoteEventKind};
pub use pump::{note_channel, spawn_note_pump, NoteSender};

/// MIDI message constants
pub mod messages {
    // Channel Voice Messages (upper nibble, lower nibble is channel 0-15)
    pub const NOTE_OFF: u8 = 0x80;
    pub const NOTE_ON: u8 = 0x90;
}
