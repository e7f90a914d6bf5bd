// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Harmonic recognition: held pitches in, chord symbol out.

use super::chord::{ChordQuality, ChordSymbol};
use super::note::{MidiNote, Note};

/// Fewest pitches a cluster needs before recognition is attempted
pub const MIN_RECOGNIZED_PITCHES: usize = 3;

/// Maps a set of held pitches to a single best-guess chord symbol.
pub trait HarmonicRecognizer: Send + Sync {
    /// Largest cluster the recognizer accepts
    fn max_pitches(&self) -> usize;

    /// Recognize a chord from `pitches` (ascending, no duplicates).
    ///
    /// With `bass_is_lowest` the lowest pitch becomes the chord's bass note
    /// when it differs from the root. Returns `None` when the cluster is
    /// outside `MIN_RECOGNIZED_PITCHES..=max_pitches()` or matches nothing.
    fn recognize(&self, pitches: &[MidiNote], bass_is_lowest: bool) -> Option<ChordSymbol>;

    /// Check whether a cluster of `len` pitches is worth submitting
    fn accepts(&self, len: usize) -> bool {
        (MIN_RECOGNIZED_PITCHES..=self.max_pitches()).contains(&len)
    }
}

/// Recognizer matching the exact pitch-class set against chord templates.
///
/// Candidate roots are tried lowest pitch first, so an ambiguous set such
/// as C-E-G-A reads as C6 when C is in the bass and Am7 when A is.
#[derive(Debug, Clone)]
pub struct TemplateRecognizer {
    max_pitches: usize,
}

impl TemplateRecognizer {
    pub fn new(max_pitches: usize) -> Self {
        Self {
            max_pitches: max_pitches.max(MIN_RECOGNIZED_PITCHES),
        }
    }

    fn match_root(mask: u16, root: u8) -> Option<ChordQuality> {
        ChordQuality::ALL.into_iter().find(|quality| {
            let template = quality
                .intervals()
                .iter()
                .fold(0u16, |acc, i| acc | 1 << ((root + i) % 12));
            template == mask
        })
    }
}

impl Default for TemplateRecognizer {
    fn default() -> Self {
        Self::new(6)
    }
}

impl HarmonicRecognizer for TemplateRecognizer {
    fn max_pitches(&self) -> usize {
        self.max_pitches
    }

    fn recognize(&self, pitches: &[MidiNote], bass_is_lowest: bool) -> Option<ChordSymbol> {
        if !self.accepts(pitches.len()) {
            return None;
        }

        let mask = pitches.iter().fold(0u16, |acc, p| acc | 1 << (p % 12));

        // Distinct pitch classes in the order they appear from the bottom
        let mut roots: Vec<u8> = Vec::with_capacity(pitches.len());
        for pc in pitches.iter().map(|p| p % 12) {
            if !roots.contains(&pc) {
                roots.push(pc);
            }
        }
        if roots.len() < MIN_RECOGNIZED_PITCHES {
            return None;
        }

        let lowest = Note::from_midi(pitches[0]);
        roots.into_iter().find_map(|root| {
            Self::match_root(mask, root).map(|quality| {
                let chord = ChordSymbol::new(Note::from_pitch_class(root), quality);
                if bass_is_lowest {
                    chord.with_bass(lowest)
                } else {
                    chord
                }
            })
        })
    }
}
