// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Note event pump.
//!
//! Hardware callbacks push note events into a channel; one task drains the
//! channel and applies each event to the tracker, so the cluster is only
//! ever mutated from that task, in arrival order.

use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::debug;

use super::cluster::NoteClusterTracker;
use super::message::NoteEvent;

/// Sending half handed to note sources
pub type NoteSender = UnboundedSender<NoteEvent>;

/// Create the channel a pump drains
pub fn note_channel() -> (NoteSender, UnboundedReceiver<NoteEvent>) {
    mpsc::unbounded_channel()
}

/// Spawn the pump task. It ends once every sender has been dropped,
/// returning the number of events applied.
pub fn spawn_note_pump(
    mut events: UnboundedReceiver<NoteEvent>,
    tracker: Arc<NoteClusterTracker>,
) -> JoinHandle<u64> {
    tokio::spawn(async move {
        let mut applied = 0u64;
        while let Some(event) = events.recv().await {
            tracker.on_event(event);
            applied += 1;
        }
        debug!(applied, "note pump finished");
        applied
    })
}
