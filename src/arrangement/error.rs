// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use thiserror::Error;

use super::part::PartId;
use super::position::{Position, TimeSignature};

/// A structural edit the score refused to apply
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditError {
    #[error("no section named '{0}'")]
    UnknownSection(String),

    #[error("a section named '{0}' already exists")]
    DuplicateSection(String),

    #[error("bar {bar} already starts section '{existing}'")]
    SectionBarTaken { bar: u32, existing: String },

    #[error("bar range {from}..={to} is invalid for a {size}-bar chord track")]
    InvalidBarRange { from: u32, to: u32, size: u32 },

    #[error("the edit would leave the chord track without bars")]
    EmptyChordTrack,

    #[error("section '{section}' cannot be resized to {size} bars")]
    InvalidSectionSize { section: String, size: u32 },

    #[error("position {0} is outside the chord track")]
    PositionOutOfRange(Position),

    #[error("a chord symbol already sits at {0}")]
    PositionOccupied(Position),

    #[error("no chord symbol at {0}")]
    NoChordAt(Position),

    #[error("no part with id {0}")]
    UnknownPart(PartId),

    #[error("part id {0} is already used")]
    DuplicatePart(PartId),

    #[error("part {part} refers to missing section '{section}'")]
    DanglingPart { part: PartId, section: String },

    #[error("accompaniment in {accompaniment} does not fit section '{section}' in {section_time_signature}")]
    TimeSignatureMismatch {
        section: String,
        section_time_signature: TimeSignature,
        accompaniment: TimeSignature,
    },

    #[error("an adapted accompaniment needs a time signature different from its source ({0})")]
    AdaptationTimeSignature(TimeSignature),
}
