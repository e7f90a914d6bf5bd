// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Music theory utilities for loopjam.
//!
//! This module provides pitch classes, chord symbols, and the harmonic
//! recognizer that turns held notes into a chord.

pub mod chord;
pub mod note;
pub mod recognize;

pub use chord::{ChordParseError, ChordQuality, ChordSymbol};
pub use note::{midi_note_name, MidiNote, Note};
pub use recognize::{HarmonicRecognizer, TemplateRecognizer, MIN_RECOGNIZED_PITCHES};
