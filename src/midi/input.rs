// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Hardware MIDI input through midir.
//!
//! The midir callback runs on the backend's own thread; it only parses
//! bytes and forwards note events to the pump channel.

use anyhow::{anyhow, Result};
use midir::{Ignore, MidiInput, MidiInputConnection, MidiInputPort};
use tracing::info;

use super::message::NoteEvent;
use super::pump::NoteSender;

/// An open connection to a MIDI source
pub struct MidiInputDevice {
    name: String,
    _connection: MidiInputConnection<()>,
}

impl MidiInputDevice {
    /// Connect to the first source whose name contains `device_name`
    pub fn open(device_name: &str, channel_filter: Option<u8>, events: NoteSender) -> Result<Self> {
        let midi_in = MidiInput::new("loopjam scanner")
            .map_err(|e| anyhow!("Failed to create MIDI client: {}", e))?;
        let port = midi_in
            .ports()
            .into_iter()
            .find(|p| {
                midi_in
                    .port_name(p)
                    .map_or(false, |n| n.contains(device_name))
            })
            .ok_or_else(|| anyhow!("MIDI source '{}' not found", device_name))?;

        Self::connect(midi_in, port, channel_filter, events)
    }

    /// Connect to a source by index
    pub fn open_index(index: usize, channel_filter: Option<u8>, events: NoteSender) -> Result<Self> {
        let midi_in = MidiInput::new("loopjam scanner")
            .map_err(|e| anyhow!("Failed to create MIDI client: {}", e))?;
        let port = midi_in
            .ports()
            .get(index)
            .cloned()
            .ok_or_else(|| anyhow!("MIDI source {} not found", index))?;

        Self::connect(midi_in, port, channel_filter, events)
    }

    fn connect(
        mut midi_in: MidiInput,
        port: MidiInputPort,
        channel_filter: Option<u8>,
        events: NoteSender,
    ) -> Result<Self> {
        let name = midi_in
            .port_name(&port)
            .unwrap_or_else(|_| "unknown".to_string());

        // Only note traffic matters here
        midi_in.ignore(Ignore::All);

        let connection = midi_in
            .connect(
                &port,
                "loopjam-input",
                move |_timestamp_us, message, _| {
                    if let Some(event) = NoteEvent::from_bytes(message, channel_filter) {
                        let _ = events.send(event);
                    }
                },
                (),
            )
            .map_err(|e| anyhow!("Failed to connect to MIDI source: {}", e))?;

        info!(device = %name, "MIDI input connected");
        Ok(Self {
            name,
            _connection: connection,
        })
    }

    /// Port name of the connected source
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// List all available MIDI sources
pub fn list_sources() -> Result<Vec<(usize, String)>> {
    let midi_in = MidiInput::new("loopjam scanner")
        .map_err(|e| anyhow!("Failed to create MIDI client: {}", e))?;
    Ok(midi_in
        .ports()
        .iter()
        .enumerate()
        .map(|(i, port)| {
            let name = midi_in
                .port_name(port)
                .unwrap_or_else(|_| format!("Unknown {}", i));
            (i, name)
        })
        .collect())
}

/// Print all available MIDI sources to stdout
pub fn print_sources() -> Result<()> {
    let sources = list_sources()?;
    if sources.is_empty() {
        println!("No MIDI sources found.");
    } else {
        println!("Available MIDI sources (inputs):");
        for (i, name) in sources {
            println!("  {}: {}", i, name);
        }
    }
    Ok(())
}
