// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! A whole song: chord track plus the parts that play it.
//!
//! Each part's length is its section's length, and parts are laid out
//! back to back from bar 0. Every structural edit re-derives both.

use std::collections::BTreeMap;

use super::chord_track::{ChordSymbolItem, ChordTrack};
use super::error::EditError;
use super::part::{Accompaniment, ParameterValue, Part, PartId};
use super::position::Position;

/// An editable song
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    name: String,
    chord_track: ChordTrack,
    parts: Vec<Part>,
    next_part_id: u32,
}

impl Composition {
    /// Create a composition with no parts
    pub fn new(name: impl Into<String>, chord_track: ChordTrack) -> Self {
        Self {
            name: name.into(),
            chord_track,
            parts: Vec::new(),
            next_part_id: 1,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn chord_track(&self) -> &ChordTrack {
        &self.chord_track
    }

    /// Parts in playing order
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn part(&self, id: PartId) -> Option<&Part> {
        self.parts.iter().find(|p| p.id == id)
    }

    /// Part playing at `bar`
    pub fn part_at_bar(&self, bar: u32) -> Option<&Part> {
        self.parts.iter().find(|p| p.bar_range().contains(bar))
    }

    /// Total length of all parts
    pub fn size_in_bars(&self) -> u32 {
        self.parts.iter().map(|p| p.bar_count).sum()
    }

    /// Append a part playing `section` with `accompaniment`
    pub fn add_part(
        &mut self,
        name: impl Into<String>,
        section: &str,
        accompaniment: Accompaniment,
    ) -> Result<PartId, EditError> {
        let id = PartId(self.next_part_id);
        let part = Part {
            id,
            name: name.into(),
            section: section.to_string(),
            start_bar: 0,
            bar_count: 0,
            accompaniment,
            parameters: BTreeMap::new(),
        };
        self.push_part(part)?;
        Ok(id)
    }

    /// Append an existing part (typically a clone from another copy of the
    /// song), keeping its id and parameters
    pub fn push_part(&mut self, part: Part) -> Result<(), EditError> {
        if self.part(part.id).is_some() {
            return Err(EditError::DuplicatePart(part.id));
        }
        self.check_fits_section(&part)?;
        self.next_part_id = self.next_part_id.max(part.id.0 + 1);
        self.parts.push(part);
        self.relayout()
    }

    pub fn remove_part(&mut self, id: PartId) -> Result<Part, EditError> {
        let index = self
            .parts
            .iter()
            .position(|p| p.id == id)
            .ok_or(EditError::UnknownPart(id))?;
        let part = self.parts.remove(index);
        self.relayout()?;
        Ok(part)
    }

    /// Remove every part, returning them in playing order
    pub fn clear_parts(&mut self) -> Vec<Part> {
        std::mem::take(&mut self.parts)
    }

    pub fn set_part_parameter(
        &mut self,
        id: PartId,
        name: &str,
        value: ParameterValue,
    ) -> Result<(), EditError> {
        let part = self
            .parts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(EditError::UnknownPart(id))?;
        part.set_parameter(name, value);
        Ok(())
    }

    /// Move a section's end boundary; parts playing it follow
    pub fn resize_section(&mut self, section: &str, size: u32) -> Result<(), EditError> {
        self.chord_track.resize_section(section, size)?;
        self.relayout()
    }

    /// Cut the chord track down to the named sections, in that order.
    /// Parts must only refer to kept sections.
    pub fn isolate_sections(&mut self, keep: &[&str]) -> Result<(), EditError> {
        if let Some(part) = self.parts.iter().find(|p| !keep.contains(&p.section.as_str())) {
            return Err(EditError::DanglingPart {
                part: part.id,
                section: part.section.clone(),
            });
        }
        self.chord_track = self.chord_track.extract_sections(keep)?;
        self.relayout()
    }

    pub fn add_chord(&mut self, item: ChordSymbolItem) -> Result<(), EditError> {
        self.chord_track.add_chord(item)
    }

    pub fn remove_chord(&mut self, position: Position) -> Result<ChordSymbolItem, EditError> {
        self.chord_track.remove_chord(position)
    }

    pub fn move_chord(&mut self, from: Position, to: Position) -> Result<(), EditError> {
        self.chord_track.move_chord(from, to)
    }

    pub fn replace_chord(&mut self, item: ChordSymbolItem) -> Result<ChordSymbolItem, EditError> {
        self.chord_track.replace_chord(item)
    }

    fn check_fits_section(&self, part: &Part) -> Result<(), EditError> {
        let section = self
            .chord_track
            .section(&part.section)
            .ok_or_else(|| EditError::UnknownSection(part.section.clone()))?;
        if section.time_signature() != part.accompaniment.time_signature() {
            return Err(EditError::TimeSignatureMismatch {
                section: part.section.clone(),
                section_time_signature: section.time_signature(),
                accompaniment: part.accompaniment.time_signature(),
            });
        }
        Ok(())
    }

    /// Re-derive part lengths from their sections and lay parts out
    /// back to back
    fn relayout(&mut self) -> Result<(), EditError> {
        let mut start_bar = 0;
        for part in &mut self.parts {
            let range = self
                .chord_track
                .section_range(&part.section)
                .ok_or_else(|| EditError::DanglingPart {
                    part: part.id,
                    section: part.section.clone(),
                })?;
            part.start_bar = start_bar;
            part.bar_count = range.size();
            start_bar += part.bar_count;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrangement::{BarRange, Style, TimeSignature};

    /// Intro (4 bars), Verse (8 bars), Chorus (4 bars), parts I-V-C-V
    fn song() -> (Composition, Vec<PartId>) {
        let mut track = ChordTrack::new("Intro", TimeSignature::FOUR_FOUR, 16);
        track.add_section("Verse", TimeSignature::FOUR_FOUR, 4).unwrap();
        track.add_section("Chorus", TimeSignature::FOUR_FOUR, 12).unwrap();

        let mut song = Composition::new("Test", track);
        let pop = Accompaniment::primary("Pop", TimeSignature::FOUR_FOUR);
        let ids = ["Intro", "Verse", "Chorus", "Verse"]
            .iter()
            .map(|s| song.add_part(*s, s, pop.clone()).unwrap())
            .collect();
        (song, ids)
    }

    #[test]
    fn test_parts_are_laid_out_back_to_back() {
        let (song, ids) = song();
        let ranges: Vec<BarRange> = song.parts().iter().map(|p| p.bar_range()).collect();
        assert_eq!(
            ranges,
            vec![
                BarRange::new(0, 3),
                BarRange::new(4, 11),
                BarRange::new(12, 15),
                BarRange::new(16, 23)
            ]
        );
        assert_eq!(song.size_in_bars(), 24);
        assert_eq!(song.part_at_bar(13).map(|p| p.id()), Some(ids[2]));
    }

    #[test]
    fn test_add_part_validation() {
        let (mut song, _) = song();
        let waltz = Accompaniment::primary("Waltz", TimeSignature::THREE_FOUR);
        assert!(matches!(
            song.add_part("Bad", "Verse", waltz),
            Err(EditError::TimeSignatureMismatch { .. })
        ));
        let pop = Accompaniment::primary("Pop", TimeSignature::FOUR_FOUR);
        assert!(matches!(
            song.add_part("Bad", "Bridge", pop),
            Err(EditError::UnknownSection(_))
        ));
    }

    #[test]
    fn test_remove_part_relayouts() {
        let (mut song, ids) = song();
        let removed = song.remove_part(ids[1]).unwrap();
        assert_eq!(removed.section(), "Verse");

        assert_eq!(song.part(ids[2]).map(|p| p.start_bar()), Some(4));
        assert!(matches!(song.remove_part(ids[1]), Err(EditError::UnknownPart(_))));
    }

    #[test]
    fn test_resize_section_resizes_every_part_playing_it() {
        let (mut song, ids) = song();
        song.resize_section("Verse", 2).unwrap();

        assert_eq!(song.part(ids[1]).map(|p| p.bar_count()), Some(2));
        assert_eq!(song.part(ids[3]).map(|p| p.bar_range()), Some(BarRange::new(10, 11)));
    }

    #[test]
    fn test_push_part_keeps_identity() {
        let (mut song, ids) = song();
        song.set_part_parameter(ids[1], "intensity", ParameterValue::Float(0.8)).unwrap();
        let verse = song.part(ids[1]).cloned().unwrap();

        let parts = song.clear_parts();
        assert_eq!(parts.len(), 4);
        song.push_part(verse.clone()).unwrap();
        assert!(matches!(song.push_part(verse), Err(EditError::DuplicatePart(_))));

        let part = song.part(ids[1]).unwrap();
        assert_eq!(part.start_bar(), 0);
        assert_eq!(part.parameter("intensity"), Some(&ParameterValue::Float(0.8)));

        // New ids never collide with pushed ones
        let new_id = song
            .add_part("Chorus", "Chorus", Accompaniment::Primary(Style::new("Pop", TimeSignature::FOUR_FOUR)))
            .unwrap();
        assert!(new_id > ids[3]);
    }

    #[test]
    fn test_isolate_sections_refuses_dangling_parts() {
        let (mut song, ids) = song();
        assert!(matches!(
            song.isolate_sections(&["Verse"]),
            Err(EditError::DanglingPart { .. })
        ));

        song.remove_part(ids[0]).unwrap();
        song.remove_part(ids[2]).unwrap();
        song.isolate_sections(&["Verse"]).unwrap();
        assert_eq!(song.chord_track().size_in_bars(), 8);
        assert_eq!(song.size_in_bars(), 16);
        assert_eq!(song.chord_track().sections()[0].name(), "Verse");
    }
}
