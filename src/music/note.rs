// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Pitch classes and MIDI note helpers.

use std::fmt;

/// MIDI note number type (0-127)
pub type MidiNote = u8;

/// Note names (pitch classes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Note {
    C,
    Cs, // C# / Db
    D,
    Ds, // D# / Eb
    E,
    F,
    Fs, // F# / Gb
    G,
    Gs, // G# / Ab
    A,
    As, // A# / Bb
    B,
}

impl Note {
    /// All notes in chromatic order
    pub const ALL: [Note; 12] = [
        Note::C,
        Note::Cs,
        Note::D,
        Note::Ds,
        Note::E,
        Note::F,
        Note::Fs,
        Note::G,
        Note::Gs,
        Note::A,
        Note::As,
        Note::B,
    ];

    /// Get the pitch class (0-11) for this note
    pub fn pitch_class(self) -> u8 {
        self as u8
    }

    /// Get note from pitch class
    pub fn from_pitch_class(pc: u8) -> Self {
        Note::ALL[(pc % 12) as usize]
    }

    /// Pitch class of a MIDI note number
    pub fn from_midi(note: MidiNote) -> Self {
        Self::from_pitch_class(note % 12)
    }

    /// Parse note from string (e.g., "C", "C#", "Db", "F#")
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_uppercase();
        match s.as_str() {
            "C" | "B#" => Some(Note::C),
            "C#" | "DB" => Some(Note::Cs),
            "D" => Some(Note::D),
            "D#" | "EB" => Some(Note::Ds),
            "E" | "FB" => Some(Note::E),
            "F" | "E#" => Some(Note::F),
            "F#" | "GB" => Some(Note::Fs),
            "G" => Some(Note::G),
            "G#" | "AB" => Some(Note::Gs),
            "A" => Some(Note::A),
            "A#" | "BB" => Some(Note::As),
            "B" | "CB" => Some(Note::B),
            _ => None,
        }
    }
}

/// Spelling is fixed per pitch class (C#, Eb, F#, Ab, Bb), so a parsed
/// "A#" prints as "Bb".
impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Note::C => "C",
            Note::Cs => "C#",
            Note::D => "D",
            Note::Ds => "Eb",
            Note::E => "E",
            Note::F => "F",
            Note::Fs => "F#",
            Note::G => "G",
            Note::Gs => "Ab",
            Note::A => "A",
            Note::As => "Bb",
            Note::B => "B",
        };
        f.write_str(name)
    }
}

/// Human-readable name of a MIDI note, e.g. 60 -> "C4"
pub fn midi_note_name(note: MidiNote) -> String {
    let octave = (note / 12) as i8 - 1;
    format!("{}{}", Note::from_midi(note), octave)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_pitch_class() {
        assert_eq!(Note::C.pitch_class(), 0);
        assert_eq!(Note::A.pitch_class(), 9);
        assert_eq!(Note::B.pitch_class(), 11);
        assert_eq!(Note::from_midi(61), Note::Cs);
    }

    #[test]
    fn test_note_parse() {
        assert_eq!(Note::parse("C"), Some(Note::C));
        assert_eq!(Note::parse("C#"), Some(Note::Cs));
        assert_eq!(Note::parse("Db"), Some(Note::Cs));
        assert_eq!(Note::parse("Bb"), Some(Note::As));
        assert_eq!(Note::parse("X"), None);
    }

    #[test]
    fn test_note_display_spelling() {
        assert_eq!(Note::parse("A#").map(|n| n.to_string()), Some("Bb".to_string()));
        assert_eq!(Note::parse("Gb").map(|n| n.to_string()), Some("F#".to_string()));
    }

    #[test]
    fn test_midi_note_name() {
        assert_eq!(midi_note_name(60), "C4");
        assert_eq!(midi_note_name(70), "Bb4");
        assert_eq!(midi_note_name(0), "C-1");
    }
}
