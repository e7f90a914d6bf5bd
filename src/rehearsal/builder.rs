// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Loop construction.
//!
//! Builds a detached copy of a song holding only the selected part (plus,
//! for an adapted accompaniment, one part playing its source style) with a
//! single anchor chord at the start of the selected section.

use thiserror::Error;
use tracing::{debug, warn};

use super::context::LoopContext;
use super::DEFAULT_LOOP_BARS;
use crate::arrangement::{
    ChordSymbolItem, Composition, EditError, MidiMix, Part, PartId, Position,
};
use crate::music::{ChordSymbol, Note};

/// Loop construction hit a state that valid input cannot produce
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    #[error("part {0} is not in the composition")]
    UnknownPart(PartId),

    #[error("adapted part {part} shares section '{section}' with its source part")]
    SharedSection { part: PartId, section: String },

    #[error("no anchor chord at the start of section '{0}'")]
    MissingAnchor(String),

    #[error("structural edit rejected: {0}")]
    Edit(#[from] EditError),
}

/// Cuts rehearsal loops out of a composition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopContextBuilder {
    target_bar_count: u32,
}

impl LoopContextBuilder {
    /// Builder for loops of `target_bar_count` bars (at least 1)
    pub fn new(target_bar_count: u32) -> Self {
        Self {
            target_bar_count: target_bar_count.max(1),
        }
    }

    pub fn target_bar_count(&self) -> u32 {
        self.target_bar_count
    }

    /// Build a loop around `selected`. `composition` is never modified.
    pub fn build(
        &self,
        composition: &Composition,
        mix: &MidiMix,
        selected: PartId,
    ) -> Result<LoopContext, BuildError> {
        let mut copy = composition.clone();
        let part = copy
            .part(selected)
            .cloned()
            .ok_or(BuildError::UnknownPart(selected))?;
        let section = part.section().to_string();

        match Self::find_source_part(composition, &part) {
            Some(source) => self.isolate_adapted(&mut copy, part, source)?,
            None => self.isolate(&mut copy, part)?,
        }

        let anchor = normalize_anchor(&mut copy, &section)?;
        let bar_range = copy
            .part(selected)
            .map(|p| p.bar_range())
            .ok_or(BuildError::UnknownPart(selected))?;

        debug!(
            "Loop for part {}: {} parts, {} bars, anchor {} at {}",
            selected,
            copy.parts().len(),
            copy.size_in_bars(),
            anchor.symbol(),
            anchor.position()
        );
        Ok(LoopContext::new(copy, mix.clone(), bar_range, selected, anchor))
    }

    /// First other part playing the style `part` is adapted from
    fn find_source_part(composition: &Composition, part: &Part) -> Option<Part> {
        let style = part.accompaniment().source()?;
        let source = composition
            .parts()
            .iter()
            .find(|p| p.id() != part.id() && p.accompaniment().is_primary_of(style))
            .cloned();
        if source.is_none() {
            warn!(
                "Part {} adapts '{}' but no part plays it; looping it on its own",
                part.id(),
                style.name()
            );
        }
        source
    }

    /// Keep only `part`, sized to the target length
    fn isolate(&self, copy: &mut Composition, part: Part) -> Result<(), BuildError> {
        let section = part.section().to_string();
        let bar_count = part.bar_count();

        copy.clear_parts();
        copy.push_part(part)?;
        copy.isolate_sections(&[&section])?;
        if bar_count != self.target_bar_count {
            copy.resize_section(&section, self.target_bar_count)?;
        }
        Ok(())
    }

    /// Keep `part` followed by `source`. Only the selected part's section
    /// is shortened; the source part's bars stay whole.
    fn isolate_adapted(&self, copy: &mut Composition, part: Part, source: Part) -> Result<(), BuildError> {
        if part.section() == source.section() {
            return Err(BuildError::SharedSection {
                part: part.id(),
                section: part.section().to_string(),
            });
        }
        let section = part.section().to_string();
        let source_section = source.section().to_string();
        let bar_count = part.bar_count();

        copy.clear_parts();
        copy.push_part(part)?;
        copy.push_part(source)?;
        copy.isolate_sections(&[&section, &source_section])?;
        if bar_count > self.target_bar_count {
            copy.resize_section(&section, self.target_bar_count)?;
        }
        Ok(())
    }
}

impl Default for LoopContextBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_LOOP_BARS)
    }
}

/// Leave exactly one chord in `section`, at its first beat. The earliest
/// chord moves there; with no chord at all a C major triad is added.
fn normalize_anchor(copy: &mut Composition, section: &str) -> Result<ChordSymbolItem, BuildError> {
    let range = copy
        .chord_track()
        .section_range(section)
        .ok_or_else(|| EditError::UnknownSection(section.to_string()))?;
    let start = Position::bar_start(range.from);
    let positions: Vec<Position> = copy
        .chord_track()
        .chords_in(range)
        .map(|c| c.position())
        .collect();

    match positions.split_first() {
        None => {
            copy.add_chord(ChordSymbolItem::new(start, ChordSymbol::major_triad(Note::C)))?;
        }
        Some((&earliest, rest)) => {
            for &position in rest {
                copy.remove_chord(position)?;
            }
            if earliest != start {
                copy.move_chord(earliest, start)?;
            }
        }
    }

    copy.chord_track()
        .chord_at(start)
        .cloned()
        .ok_or_else(|| BuildError::MissingAnchor(section.to_string()))
}
