// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Raw MIDI parsing and the note events fed to the cluster tracker.

use super::messages;

/// Parsed MIDI message types
#[derive(Debug, Clone, PartialEq)]
pub enum MidiMessage {
    /// Note On: channel (0-15), note (0-127), velocity (1-127)
    NoteOn { channel: u8, note: u8, velocity: u8 },
    /// Note Off: channel (0-15), note (0-127), velocity (0-127)
    NoteOff { channel: u8, note: u8, velocity: u8 },
    /// Anything else; not used by the rehearsal loop
    Other(Vec<u8>),
}

impl MidiMessage {
    /// Parse raw MIDI bytes into a MidiMessage
    pub fn parse(data: &[u8]) -> Option<Self> {
        let status = *data.first()?;
        let msg_type = status & 0xF0;
        let channel = status & 0x0F;

        match msg_type {
            messages::NOTE_OFF if data.len() >= 3 => Some(MidiMessage::NoteOff {
                channel,
                note: data[1] & 0x7F,
                velocity: data[2] & 0x7F,
            }),
            messages::NOTE_ON if data.len() >= 3 => {
                let velocity = data[2] & 0x7F;
                // Note On with velocity 0 is equivalent to Note Off
                if velocity == 0 {
                    Some(MidiMessage::NoteOff {
                        channel,
                        note: data[1] & 0x7F,
                        velocity: 0,
                    })
                } else {
                    Some(MidiMessage::NoteOn {
                        channel,
                        note: data[1] & 0x7F,
                        velocity,
                    })
                }
            }
            _ => Some(MidiMessage::Other(data.to_vec())),
        }
    }

    /// Channel (0-15) for channel voice messages
    pub fn channel(&self) -> Option<u8> {
        match self {
            MidiMessage::NoteOn { channel, .. } | MidiMessage::NoteOff { channel, .. } => {
                Some(*channel)
            }
            MidiMessage::Other(_) => None,
        }
    }
}

/// Kind of note event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteEventKind {
    On,
    Off,
}

/// A note-on or note-off, stripped of channel and timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteEvent {
    pub kind: NoteEventKind,
    pub pitch: u8,
    pub velocity: u8,
}

impl NoteEvent {
    /// Note-on event
    pub fn on(pitch: u8, velocity: u8) -> Self {
        Self {
            kind: NoteEventKind::On,
            pitch: pitch & 0x7F,
            velocity: velocity & 0x7F,
        }
    }

    /// Note-off event
    pub fn off(pitch: u8) -> Self {
        Self {
            kind: NoteEventKind::Off,
            pitch: pitch & 0x7F,
            velocity: 0,
        }
    }

    /// Extract a note event from a parsed message
    pub fn from_message(message: &MidiMessage) -> Option<Self> {
        match *message {
            MidiMessage::NoteOn { note, velocity, .. } => Some(Self::on(note, velocity)),
            MidiMessage::NoteOff { note, .. } => Some(Self::off(note)),
            _ => None,
        }
    }

    /// Parse raw bytes straight to a note event, applying an optional
    /// 1-16 channel filter
    pub fn from_bytes(data: &[u8], channel_filter: Option<u8>) -> Option<Self> {
        let message = MidiMessage::parse(data)?;
        if let Some(filter) = channel_filter {
            if message.channel() != Some(filter.saturating_sub(1)) {
                return None;
            }
        }
        Self::from_message(&message)
    }
}
