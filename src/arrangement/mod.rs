// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Song data model.
//!
//! This module provides:
//! - Chord track: section markers and chord symbols
//! - Parts: bar runs bound to an accompaniment and its parameters
//! - Composition: the editable song, with validated structural edits
//! - Document: the song of record and its change notifications

pub mod chord_track;
pub mod composition;
pub mod document;
pub mod error;
pub mod mix;
pub mod part;
pub mod position;

pub use chord_track::{
    Accent, ChordSymbolItem, ChordTrack, ChordTrackItem, RenderingHints, SectionMarker,
};
pub use composition::Composition;
pub use document::{ParameterChange, ScoreDocument, SongDocument};
pub use error::EditError;
pub use mix::{ChannelSlot, MidiMix};
pub use part::{Accompaniment, ParameterValue, Part, PartId, Style};
pub use position::{BarRange, Position, TimeSignature};
