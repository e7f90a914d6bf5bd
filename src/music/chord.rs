// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Chord symbols (C, Dm7, G7/B, ...).
//!
//! A chord symbol is a root pitch class, a quality and an optional bass
//! note. Symbols parse from and print to the usual lead-sheet spelling.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::note::Note;

/// Chord qualities understood by the symbol parser and the recognizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChordQuality {
    Major,
    Minor,
    Dominant7,
    Major7,
    Minor7,
    Diminished,
    Diminished7,
    HalfDiminished,
    Augmented,
    Sus2,
    Sus4,
    Major6,
    Minor6,
    Dominant9,
}

impl ChordQuality {
    /// Every quality, most common first
    pub const ALL: [ChordQuality; 14] = [
        ChordQuality::Major,
        ChordQuality::Minor,
        ChordQuality::Dominant7,
        ChordQuality::Major7,
        ChordQuality::Minor7,
        ChordQuality::Diminished,
        ChordQuality::Diminished7,
        ChordQuality::HalfDiminished,
        ChordQuality::Augmented,
        ChordQuality::Sus2,
        ChordQuality::Sus4,
        ChordQuality::Major6,
        ChordQuality::Minor6,
        ChordQuality::Dominant9,
    ];

    /// Intervals in semitones above the root
    pub fn intervals(self) -> &'static [u8] {
        match self {
            ChordQuality::Major => &[0, 4, 7],
            ChordQuality::Minor => &[0, 3, 7],
            ChordQuality::Dominant7 => &[0, 4, 7, 10],
            ChordQuality::Major7 => &[0, 4, 7, 11],
            ChordQuality::Minor7 => &[0, 3, 7, 10],
            ChordQuality::Diminished => &[0, 3, 6],
            ChordQuality::Diminished7 => &[0, 3, 6, 9],
            ChordQuality::HalfDiminished => &[0, 3, 6, 10],
            ChordQuality::Augmented => &[0, 4, 8],
            ChordQuality::Sus2 => &[0, 2, 7],
            ChordQuality::Sus4 => &[0, 5, 7],
            ChordQuality::Major6 => &[0, 4, 7, 9],
            ChordQuality::Minor6 => &[0, 3, 7, 9],
            ChordQuality::Dominant9 => &[0, 2, 4, 7, 10],
        }
    }

    /// Canonical symbol suffix
    pub fn suffix(self) -> &'static str {
        match self {
            ChordQuality::Major => "",
            ChordQuality::Minor => "m",
            ChordQuality::Dominant7 => "7",
            ChordQuality::Major7 => "maj7",
            ChordQuality::Minor7 => "m7",
            ChordQuality::Diminished => "dim",
            ChordQuality::Diminished7 => "dim7",
            ChordQuality::HalfDiminished => "m7b5",
            ChordQuality::Augmented => "aug",
            ChordQuality::Sus2 => "sus2",
            ChordQuality::Sus4 => "sus4",
            ChordQuality::Major6 => "6",
            ChordQuality::Minor6 => "m6",
            ChordQuality::Dominant9 => "9",
        }
    }

    /// Parse a suffix, accepting the common alternate spellings
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        let quality = match suffix {
            "" | "maj" | "M" => ChordQuality::Major,
            "m" | "min" | "-" => ChordQuality::Minor,
            "7" => ChordQuality::Dominant7,
            "maj7" | "M7" | "^7" => ChordQuality::Major7,
            "m7" | "min7" | "-7" => ChordQuality::Minor7,
            "dim" | "°" | "o" => ChordQuality::Diminished,
            "dim7" | "°7" | "o7" => ChordQuality::Diminished7,
            "m7b5" | "ø" | "-7b5" => ChordQuality::HalfDiminished,
            "aug" | "+" => ChordQuality::Augmented,
            "sus2" => ChordQuality::Sus2,
            "sus4" | "sus" => ChordQuality::Sus4,
            "6" => ChordQuality::Major6,
            "m6" | "-6" => ChordQuality::Minor6,
            "9" => ChordQuality::Dominant9,
            _ => return None,
        };
        Some(quality)
    }
}

/// Errors from parsing a chord symbol
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChordParseError {
    #[error("empty chord symbol")]
    Empty,
    #[error("invalid root note in '{0}'")]
    InvalidRoot(String),
    #[error("unknown chord quality '{quality}' in '{symbol}'")]
    UnknownQuality { symbol: String, quality: String },
    #[error("invalid bass note in '{0}'")]
    InvalidBass(String),
}

/// A chord symbol: root, quality and optional bass note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChordSymbol {
    root: Note,
    quality: ChordQuality,
    bass: Option<Note>,
}

impl ChordSymbol {
    /// Create a chord symbol in root position
    pub fn new(root: Note, quality: ChordQuality) -> Self {
        Self {
            root,
            quality,
            bass: None,
        }
    }

    /// Major triad on `root`
    pub fn major_triad(root: Note) -> Self {
        Self::new(root, ChordQuality::Major)
    }

    /// Builder: set a bass note. A bass equal to the root is dropped.
    pub fn with_bass(mut self, bass: Note) -> Self {
        self.bass = (bass != self.root).then_some(bass);
        self
    }

    pub fn root(&self) -> Note {
        self.root
    }

    pub fn quality(&self) -> ChordQuality {
        self.quality
    }

    /// Explicit bass note, if any
    pub fn bass(&self) -> Option<Note> {
        self.bass
    }

    /// Lowest sounding pitch class (bass if set, else root)
    pub fn bass_or_root(&self) -> Note {
        self.bass.unwrap_or(self.root)
    }

    /// Pitch classes of the chord tones, root first
    pub fn pitch_classes(&self) -> Vec<u8> {
        self.quality
            .intervals()
            .iter()
            .map(|i| (self.root.pitch_class() + i) % 12)
            .collect()
    }
}

impl fmt::Display for ChordSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.root, self.quality.suffix())?;
        if let Some(bass) = self.bass {
            write!(f, "/{}", bass)?;
        }
        Ok(())
    }
}

impl FromStr for ChordSymbol {
    type Err = ChordParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let symbol = s.trim();
        if symbol.is_empty() {
            return Err(ChordParseError::Empty);
        }

        let (body, bass) = match symbol.split_once('/') {
            Some((body, bass)) => {
                let bass = Note::parse(bass)
                    .ok_or_else(|| ChordParseError::InvalidBass(symbol.to_string()))?;
                (body, Some(bass))
            }
            None => (symbol, None),
        };

        // Root is a letter plus an optional accidental
        let root_len = match body.as_bytes().get(1) {
            Some(b'#') | Some(b'b') => 2,
            _ => 1.min(body.len()),
        };
        let root = body
            .get(..root_len)
            .and_then(Note::parse)
            .ok_or_else(|| ChordParseError::InvalidRoot(symbol.to_string()))?;

        let suffix = &body[root_len..];
        let quality =
            ChordQuality::from_suffix(suffix).ok_or_else(|| ChordParseError::UnknownQuality {
                symbol: symbol.to_string(),
                quality: suffix.to_string(),
            })?;

        let chord = ChordSymbol::new(root, quality);
        Ok(match bass {
            Some(bass) => chord.with_bass(bass),
            None => chord,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_symbols() {
        let c: ChordSymbol = "C".parse().unwrap();
        assert_eq!(c, ChordSymbol::major_triad(Note::C));

        let dm7: ChordSymbol = "Dm7".parse().unwrap();
        assert_eq!(dm7.root(), Note::D);
        assert_eq!(dm7.quality(), ChordQuality::Minor7);

        let bb: ChordSymbol = "Bbmaj7".parse().unwrap();
        assert_eq!(bb.root(), Note::As);
        assert_eq!(bb.quality(), ChordQuality::Major7);

        let fs: ChordSymbol = "F#m7b5".parse().unwrap();
        assert_eq!(fs.root(), Note::Fs);
        assert_eq!(fs.quality(), ChordQuality::HalfDiminished);
    }

    #[test]
    fn test_parse_slash_chord() {
        let chord: ChordSymbol = "C/E".parse().unwrap();
        assert_eq!(chord.bass(), Some(Note::E));
        assert_eq!(chord.bass_or_root(), Note::E);
        assert_eq!(chord.to_string(), "C/E");

        // Bass equal to the root is not a slash chord
        let chord: ChordSymbol = "G7/G".parse().unwrap();
        assert_eq!(chord.bass(), None);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<ChordSymbol>(), Err(ChordParseError::Empty));
        assert!(matches!(
            "H7".parse::<ChordSymbol>(),
            Err(ChordParseError::InvalidRoot(_))
        ));
        assert!(matches!(
            "Cxyz".parse::<ChordSymbol>(),
            Err(ChordParseError::UnknownQuality { .. })
        ));
        assert!(matches!(
            "C/Q".parse::<ChordSymbol>(),
            Err(ChordParseError::InvalidBass(_))
        ));
    }

    #[test]
    fn test_display_round_trip() {
        for text in ["C", "Dm7", "G7", "Ebmaj7", "Bdim7", "Asus4", "F#m7b5", "C/E"] {
            let chord: ChordSymbol = text.parse().unwrap();
            assert_eq!(chord.to_string(), text);
        }
    }

    #[test]
    fn test_pitch_classes() {
        let g7: ChordSymbol = "G7".parse().unwrap();
        assert_eq!(g7.pitch_classes(), vec![7, 11, 2, 5]);
    }
}
