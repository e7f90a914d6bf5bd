// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! The working loop handed between builder, controller and engine.

use crate::arrangement::{
    BarRange, ChordSymbolItem, Composition, EditError, MidiMix, ParameterValue, PartId,
};
use crate::music::ChordSymbol;

/// Working copy of one song part, set up for looping.
///
/// The anchor is the only chord in the looped section and the only one
/// ever replaced while the loop plays.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopContext {
    composition: Composition,
    mix: MidiMix,
    bar_range: BarRange,
    source_part: PartId,
    anchor: ChordSymbolItem,
}

impl LoopContext {
    pub(crate) fn new(
        composition: Composition,
        mix: MidiMix,
        bar_range: BarRange,
        source_part: PartId,
        anchor: ChordSymbolItem,
    ) -> Self {
        Self {
            composition,
            mix,
            bar_range,
            source_part,
            anchor,
        }
    }

    pub fn composition(&self) -> &Composition {
        &self.composition
    }

    pub fn mix(&self) -> &MidiMix {
        &self.mix
    }

    /// Bars of the looped part within the working copy
    pub fn bar_range(&self) -> BarRange {
        self.bar_range
    }

    /// Part of the real song the loop was cut from. The working copy's
    /// part keeps the same id.
    pub fn source_part(&self) -> PartId {
        self.source_part
    }

    pub fn anchor(&self) -> &ChordSymbolItem {
        &self.anchor
    }

    /// Swap the anchor's chord, keeping its position and hints
    pub fn replace_anchor(&mut self, symbol: ChordSymbol) -> Result<&ChordSymbolItem, EditError> {
        let replacement = self.anchor.with_symbol(symbol);
        self.composition.replace_chord(replacement.clone())?;
        self.anchor = replacement;
        Ok(&self.anchor)
    }

    /// Mirror a parameter edit made on the source part
    pub fn apply_parameter(&mut self, name: &str, value: ParameterValue) -> Result<(), EditError> {
        self.composition
            .set_part_parameter(self.source_part, name, value)
    }
}
