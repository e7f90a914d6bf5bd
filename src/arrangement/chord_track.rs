// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Chord track: section markers and chord symbols laid out over bars.
//!
//! Invariants kept by every edit:
//! - a section always starts at bar 0
//! - sections are sorted by start bar, with unique bars and names
//! - at most one chord symbol per position, all inside the track

use super::error::EditError;
use super::position::{BarRange, Position, TimeSignature};
use crate::music::ChordSymbol;

/// Start of a named section
#[derive(Debug, Clone, PartialEq)]
pub struct SectionMarker {
    name: String,
    time_signature: TimeSignature,
    start_bar: u32,
}

impl SectionMarker {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn time_signature(&self) -> TimeSignature {
        self.time_signature
    }

    pub fn start_bar(&self) -> u32 {
        self.start_bar
    }

    /// Position of the section's first beat
    pub fn start(&self) -> Position {
        Position::bar_start(self.start_bar)
    }
}

/// Accent hint for the backing on a chord change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Accent {
    #[default]
    None,
    Light,
    Strong,
}

/// How the accompaniment should treat a chord change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderingHints {
    pub accent: Accent,
    /// Hold the chord instead of playing the pattern
    pub hold: bool,
}

/// A chord symbol placed on the chord track
#[derive(Debug, Clone, PartialEq)]
pub struct ChordSymbolItem {
    position: Position,
    symbol: ChordSymbol,
    hints: RenderingHints,
}

impl ChordSymbolItem {
    pub fn new(position: Position, symbol: ChordSymbol) -> Self {
        Self {
            position,
            symbol,
            hints: RenderingHints::default(),
        }
    }

    /// Builder: set rendering hints
    pub fn with_hints(mut self, hints: RenderingHints) -> Self {
        self.hints = hints;
        self
    }

    /// Same position and hints, different chord
    pub fn with_symbol(&self, symbol: ChordSymbol) -> Self {
        Self {
            symbol,
            ..self.clone()
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn symbol(&self) -> &ChordSymbol {
        &self.symbol
    }

    pub fn hints(&self) -> RenderingHints {
        self.hints
    }
}

/// Borrowed view of one chord track item
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChordTrackItem<'a> {
    Section(&'a SectionMarker),
    Chord(&'a ChordSymbolItem),
}

impl ChordTrackItem<'_> {
    pub fn position(&self) -> Position {
        match self {
            ChordTrackItem::Section(section) => section.start(),
            ChordTrackItem::Chord(chord) => chord.position(),
        }
    }
}

/// Sections and chord symbols of a song
#[derive(Debug, Clone, PartialEq)]
pub struct ChordTrack {
    size_in_bars: u32,
    sections: Vec<SectionMarker>,
    chords: Vec<ChordSymbolItem>,
}

impl ChordTrack {
    /// Create a track holding a single section
    pub fn new(first_section: impl Into<String>, time_signature: TimeSignature, size_in_bars: u32) -> Self {
        Self {
            size_in_bars: size_in_bars.max(1),
            sections: vec![SectionMarker {
                name: first_section.into(),
                time_signature,
                start_bar: 0,
            }],
            chords: Vec::new(),
        }
    }

    pub fn size_in_bars(&self) -> u32 {
        self.size_in_bars
    }

    pub fn sections(&self) -> &[SectionMarker] {
        &self.sections
    }

    pub fn section(&self, name: &str) -> Option<&SectionMarker> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Section covering `bar`
    pub fn section_at_bar(&self, bar: u32) -> Option<&SectionMarker> {
        self.section_index_at(bar).map(|i| &self.sections[i])
    }

    /// Bars covered by the named section
    pub fn section_range(&self, name: &str) -> Option<BarRange> {
        let index = self.sections.iter().position(|s| s.name == name)?;
        Some(self.range_of(index))
    }

    /// Add a section starting at `start_bar`
    pub fn add_section(
        &mut self,
        name: impl Into<String>,
        time_signature: TimeSignature,
        start_bar: u32,
    ) -> Result<(), EditError> {
        let name = name.into();
        if start_bar >= self.size_in_bars {
            return Err(EditError::InvalidBarRange {
                from: start_bar,
                to: start_bar,
                size: self.size_in_bars,
            });
        }
        if self.section(&name).is_some() {
            return Err(EditError::DuplicateSection(name));
        }
        if let Some(existing) = self.sections.iter().find(|s| s.start_bar == start_bar) {
            return Err(EditError::SectionBarTaken {
                bar: start_bar,
                existing: existing.name.clone(),
            });
        }

        let index = self
            .sections
            .iter()
            .position(|s| s.start_bar > start_bar)
            .unwrap_or(self.sections.len());
        self.sections.insert(
            index,
            SectionMarker {
                name,
                time_signature,
                start_bar,
            },
        );
        Ok(())
    }

    /// All chord symbols, ordered by position
    pub fn chords(&self) -> &[ChordSymbolItem] {
        &self.chords
    }

    /// Chord symbols inside `range`, ordered by position
    pub fn chords_in(&self, range: BarRange) -> impl Iterator<Item = &ChordSymbolItem> {
        self.chords
            .iter()
            .filter(move |c| range.contains_position(c.position))
    }

    pub fn chord_at(&self, position: Position) -> Option<&ChordSymbolItem> {
        self.chords.iter().find(|c| c.position == position)
    }

    /// Sections and chords merged by position, a section before a chord
    /// at the same position
    pub fn items(&self) -> Vec<ChordTrackItem<'_>> {
        let mut items: Vec<ChordTrackItem<'_>> = self
            .sections
            .iter()
            .map(ChordTrackItem::Section)
            .chain(self.chords.iter().map(ChordTrackItem::Chord))
            .collect();
        // Stable sort keeps sections ahead of chords on ties
        items.sort_by_key(|item| item.position());
        items
    }

    pub fn add_chord(&mut self, item: ChordSymbolItem) -> Result<(), EditError> {
        self.check_position(item.position)?;
        if self.chord_at(item.position).is_some() {
            return Err(EditError::PositionOccupied(item.position));
        }
        let index = self
            .chords
            .iter()
            .position(|c| c.position > item.position)
            .unwrap_or(self.chords.len());
        self.chords.insert(index, item);
        Ok(())
    }

    pub fn remove_chord(&mut self, position: Position) -> Result<ChordSymbolItem, EditError> {
        let index = self
            .chords
            .iter()
            .position(|c| c.position == position)
            .ok_or(EditError::NoChordAt(position))?;
        Ok(self.chords.remove(index))
    }

    /// Move the chord at `from` to `to`
    pub fn move_chord(&mut self, from: Position, to: Position) -> Result<(), EditError> {
        if from == to {
            return self.chord_at(from).map(|_| ()).ok_or(EditError::NoChordAt(from));
        }
        self.check_position(to)?;
        if self.chord_at(to).is_some() {
            return Err(EditError::PositionOccupied(to));
        }
        let mut item = self.remove_chord(from)?;
        item.position = to;
        self.add_chord(item)
    }

    /// Swap in `item` for the chord at the same position, returning the old one
    pub fn replace_chord(&mut self, item: ChordSymbolItem) -> Result<ChordSymbolItem, EditError> {
        let slot = self
            .chords
            .iter_mut()
            .find(|c| c.position == item.position)
            .ok_or(EditError::NoChordAt(item.position))?;
        Ok(std::mem::replace(slot, item))
    }

    /// Insert `count` empty bars before `at_bar`. The new bars extend the
    /// section covering `at_bar - 1`.
    pub fn insert_bars(&mut self, at_bar: u32, count: u32) -> Result<(), EditError> {
        if at_bar == 0 || at_bar > self.size_in_bars {
            return Err(EditError::InvalidBarRange {
                from: at_bar,
                to: at_bar,
                size: self.size_in_bars,
            });
        }
        if count == 0 {
            return Ok(());
        }

        for section in self.sections.iter_mut().filter(|s| s.start_bar >= at_bar) {
            section.start_bar += count;
        }
        for chord in self.chords.iter_mut().filter(|c| c.position.bar() >= at_bar) {
            chord.position = chord.position.with_bar(chord.position.bar() + count);
        }
        self.size_in_bars += count;
        Ok(())
    }

    /// Delete bars `from..=to` with everything in them.
    ///
    /// When the bar right after the range has no section of its own, the
    /// section covering it keeps going from `from`, even if its marker was
    /// inside the range.
    pub fn delete_bars(&mut self, from: u32, to: u32) -> Result<(), EditError> {
        if from > to || to >= self.size_in_bars {
            return Err(EditError::InvalidBarRange {
                from,
                to,
                size: self.size_in_bars,
            });
        }
        let count = to - from + 1;
        if count >= self.size_in_bars {
            return Err(EditError::EmptyChordTrack);
        }

        let next = to + 1;
        let carried = if next < self.size_in_bars && !self.sections.iter().any(|s| s.start_bar == next) {
            self.section_index_at(next)
                .filter(|&i| self.sections[i].start_bar >= from)
        } else {
            None
        };

        let sections = std::mem::take(&mut self.sections);
        for (index, mut section) in sections.into_iter().enumerate() {
            if Some(index) == carried {
                section.start_bar = from;
            } else if section.start_bar > to {
                section.start_bar -= count;
            } else if section.start_bar >= from {
                continue;
            }
            self.sections.push(section);
        }

        self.chords.retain(|c| !(from..=to).contains(&c.position.bar()));
        for chord in self.chords.iter_mut().filter(|c| c.position.bar() > to) {
            chord.position = chord.position.with_bar(chord.position.bar() - count);
        }
        self.size_in_bars -= count;
        Ok(())
    }

    /// Move the end boundary of a section so it spans `size` bars
    pub fn resize_section(&mut self, name: &str, size: u32) -> Result<(), EditError> {
        let range = self
            .section_range(name)
            .ok_or_else(|| EditError::UnknownSection(name.to_string()))?;
        if size == 0 {
            return Err(EditError::InvalidSectionSize {
                section: name.to_string(),
                size,
            });
        }

        let current = range.size();
        if size > current {
            self.insert_bars(range.to + 1, size - current)
        } else if size < current {
            self.delete_bars(range.from + size, range.to)
        } else {
            Ok(())
        }
    }

    /// New track holding only the named sections, laid out back to back
    /// in the order given, each with its own chords
    pub fn extract_sections(&self, names: &[&str]) -> Result<ChordTrack, EditError> {
        let (first, rest) = names.split_first().ok_or(EditError::EmptyChordTrack)?;
        let index = self.section_index(first)?;
        let marker = &self.sections[index];
        let mut track = ChordTrack::new(marker.name.clone(), marker.time_signature, self.range_of(index).size());
        track.copy_chords_from(self, self.range_of(index), 0);

        for name in rest {
            if track.section(name).is_some() {
                return Err(EditError::DuplicateSection(name.to_string()));
            }
            let index = self.section_index(name)?;
            let range = self.range_of(index);
            let start_bar = track.size_in_bars;
            track.sections.push(SectionMarker {
                start_bar,
                ..self.sections[index].clone()
            });
            track.size_in_bars += range.size();
            track.copy_chords_from(self, range, start_bar);
        }
        Ok(track)
    }

    fn copy_chords_from(&mut self, other: &ChordTrack, range: BarRange, start_bar: u32) {
        for chord in other.chords_in(range) {
            let bar = chord.position.bar() - range.from + start_bar;
            self.chords.push(ChordSymbolItem {
                position: chord.position.with_bar(bar),
                ..chord.clone()
            });
        }
    }

    fn section_index(&self, name: &str) -> Result<usize, EditError> {
        self.sections
            .iter()
            .position(|s| s.name == name)
            .ok_or_else(|| EditError::UnknownSection(name.to_string()))
    }

    fn section_index_at(&self, bar: u32) -> Option<usize> {
        if bar >= self.size_in_bars {
            return None;
        }
        self.sections.iter().rposition(|s| s.start_bar <= bar)
    }

    fn range_of(&self, index: usize) -> BarRange {
        let start = self.sections[index].start_bar;
        let end = self
            .sections
            .get(index + 1)
            .map(|next| next.start_bar)
            .unwrap_or(self.size_in_bars);
        BarRange::new(start, end - 1)
    }

    fn check_position(&self, position: Position) -> Result<(), EditError> {
        let section = self
            .section_at_bar(position.bar())
            .ok_or(EditError::PositionOutOfRange(position))?;
        if position.beat() >= section.time_signature.beats_per_bar() {
            return Err(EditError::PositionOutOfRange(position));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::music::{ChordSymbol, Note};

    fn chord(text: &str) -> ChordSymbol {
        text.parse().unwrap()
    }

    /// Intro 0-3, Verse 4-11, Chorus 12-15
    fn song_track() -> ChordTrack {
        let mut track = ChordTrack::new("Intro", TimeSignature::FOUR_FOUR, 16);
        track.add_section("Verse", TimeSignature::FOUR_FOUR, 4).unwrap();
        track.add_section("Chorus", TimeSignature::FOUR_FOUR, 12).unwrap();
        track.add_chord(ChordSymbolItem::new(Position::bar_start(0), chord("C"))).unwrap();
        track.add_chord(ChordSymbolItem::new(Position::bar_start(4), chord("Am7"))).unwrap();
        track.add_chord(ChordSymbolItem::new(Position::new(6, 2.0), chord("D7"))).unwrap();
        track.add_chord(ChordSymbolItem::new(Position::bar_start(12), chord("F"))).unwrap();
        track
    }

    fn section_layout(track: &ChordTrack) -> Vec<(String, u32)> {
        track
            .sections()
            .iter()
            .map(|s| (s.name().to_string(), s.start_bar()))
            .collect()
    }

    #[test]
    fn test_section_ranges() {
        let track = song_track();
        assert_eq!(track.section_range("Intro"), Some(BarRange::new(0, 3)));
        assert_eq!(track.section_range("Verse"), Some(BarRange::new(4, 11)));
        assert_eq!(track.section_range("Chorus"), Some(BarRange::new(12, 15)));
        assert_eq!(track.section_at_bar(7).map(|s| s.name()), Some("Verse"));
        assert!(track.section_at_bar(16).is_none());
    }

    #[test]
    fn test_add_section_rejections() {
        let mut track = song_track();
        assert!(matches!(
            track.add_section("Verse", TimeSignature::FOUR_FOUR, 8),
            Err(EditError::DuplicateSection(_))
        ));
        assert!(matches!(
            track.add_section("Bridge", TimeSignature::FOUR_FOUR, 4),
            Err(EditError::SectionBarTaken { bar: 4, .. })
        ));
        assert!(matches!(
            track.add_section("Outro", TimeSignature::FOUR_FOUR, 16),
            Err(EditError::InvalidBarRange { .. })
        ));
    }

    #[test]
    fn test_chord_edits() {
        let mut track = song_track();

        assert!(matches!(
            track.add_chord(ChordSymbolItem::new(Position::bar_start(4), chord("G"))),
            Err(EditError::PositionOccupied(_))
        ));
        assert!(matches!(
            track.add_chord(ChordSymbolItem::new(Position::new(5, 4.0), chord("G"))),
            Err(EditError::PositionOutOfRange(_))
        ));

        track.move_chord(Position::new(6, 2.0), Position::bar_start(5)).unwrap();
        assert_eq!(track.chord_at(Position::bar_start(5)).map(|c| c.symbol().to_string()), Some("D7".to_string()));

        let old = track
            .replace_chord(ChordSymbolItem::new(Position::bar_start(5), chord("G7")))
            .unwrap();
        assert_eq!(old.symbol().to_string(), "D7");

        let removed = track.remove_chord(Position::bar_start(5)).unwrap();
        assert_eq!(removed.symbol().root(), Note::G);
        assert!(track.remove_chord(Position::bar_start(5)).is_err());
    }

    #[test]
    fn test_items_are_ordered() {
        let track = song_track();
        let positions: Vec<Position> = track.items().iter().map(|i| i.position()).collect();
        let mut sorted = positions.clone();
        sorted.sort();
        assert_eq!(positions, sorted);
        // Section marker first on a shared position
        assert!(matches!(track.items()[0], ChordTrackItem::Section(_)));
        assert!(matches!(track.items()[1], ChordTrackItem::Chord(_)));
    }

    #[test]
    fn test_insert_bars_extends_previous_section() {
        let mut track = song_track();
        track.insert_bars(12, 2).unwrap();

        assert_eq!(track.size_in_bars(), 18);
        assert_eq!(track.section_range("Verse"), Some(BarRange::new(4, 13)));
        assert_eq!(track.section("Chorus").map(|s| s.start_bar()), Some(14));
        assert!(track.chord_at(Position::bar_start(14)).is_some());
        assert!(track.insert_bars(0, 1).is_err());
    }

    #[test]
    fn test_delete_bars_drops_contents() {
        let mut track = song_track();
        track.delete_bars(6, 11).unwrap();

        assert_eq!(track.size_in_bars(), 10);
        assert_eq!(track.section_range("Verse"), Some(BarRange::new(4, 5)));
        assert_eq!(track.section("Chorus").map(|s| s.start_bar()), Some(6));
        // D7 at bar 6 was deleted, F moved from 12 to 6
        let symbols: Vec<String> = track.chords().iter().map(|c| c.symbol().to_string()).collect();
        assert_eq!(symbols, vec!["C", "Am7", "F"]);
    }

    #[test]
    fn test_delete_bars_carries_covering_section() {
        let mut track = song_track();
        // Delete from the middle of Intro into the middle of Verse
        track.delete_bars(2, 7).unwrap();

        assert_eq!(
            section_layout(&track),
            vec![("Intro".into(), 0), ("Verse".into(), 2), ("Chorus".into(), 6)]
        );
        assert_eq!(track.size_in_bars(), 10);
    }

    #[test]
    fn test_delete_leading_bars_keeps_bar_zero_section() {
        let mut track = song_track();
        track.delete_bars(0, 5).unwrap();

        assert_eq!(track.sections()[0].start_bar(), 0);
        assert_eq!(track.sections()[0].name(), "Verse");
        assert!(matches!(track.delete_bars(0, 9), Err(EditError::EmptyChordTrack)));
    }

    #[test]
    fn test_resize_section() {
        let mut track = song_track();
        track.resize_section("Verse", 4).unwrap();
        assert_eq!(track.section_range("Verse"), Some(BarRange::new(4, 7)));
        assert_eq!(track.size_in_bars(), 12);

        track.resize_section("Chorus", 6).unwrap();
        assert_eq!(track.section_range("Chorus"), Some(BarRange::new(8, 13)));
        assert_eq!(track.size_in_bars(), 14);

        assert!(matches!(
            track.resize_section("Verse", 0),
            Err(EditError::InvalidSectionSize { .. })
        ));
        assert!(matches!(
            track.resize_section("Bridge", 2),
            Err(EditError::UnknownSection(_))
        ));
    }

    #[test]
    fn test_extract_sections() {
        let track = song_track();
        let verse = track.extract_sections(&["Verse"]).unwrap();

        assert_eq!(section_layout(&verse), vec![("Verse".into(), 0)]);
        assert_eq!(verse.size_in_bars(), 8);
        let symbols: Vec<String> = verse.chords().iter().map(|c| c.symbol().to_string()).collect();
        assert_eq!(symbols, vec!["Am7", "D7"]);
        assert_eq!(verse.chords()[1].position(), Position::new(2, 2.0));
    }

    #[test]
    fn test_extract_sections_reorders() {
        let track = song_track();
        let swapped = track.extract_sections(&["Chorus", "Intro"]).unwrap();

        assert_eq!(
            section_layout(&swapped),
            vec![("Chorus".into(), 0), ("Intro".into(), 4)]
        );
        assert_eq!(swapped.size_in_bars(), 8);
        let chords: Vec<(String, u32)> = swapped
            .chords()
            .iter()
            .map(|c| (c.symbol().to_string(), c.position().bar()))
            .collect();
        assert_eq!(chords, vec![("F".into(), 0), ("C".into(), 4)]);

        assert!(matches!(track.extract_sections(&[]), Err(EditError::EmptyChordTrack)));
        assert!(matches!(
            track.extract_sections(&["Intro", "Intro"]),
            Err(EditError::DuplicateSection(_))
        ));
        assert!(matches!(
            track.extract_sections(&["Bridge"]),
            Err(EditError::UnknownSection(_))
        ));
    }
}
