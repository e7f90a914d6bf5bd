// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Positions, time signatures and bar ranges.

use std::cmp::Ordering;
use std::fmt;

/// A point in the score: 0-indexed bar plus a beat offset within it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    bar: u32,
    beat: f32,
}

impl Position {
    /// Create a position. Negative and NaN beats clamp to 0.
    pub fn new(bar: u32, beat: f32) -> Self {
        let beat = if beat > 0.0 { beat } else { 0.0 };
        Self { bar, beat }
    }

    /// Beat 0 of `bar`
    pub fn bar_start(bar: u32) -> Self {
        Self::new(bar, 0.0)
    }

    pub fn bar(&self) -> u32 {
        self.bar
    }

    pub fn beat(&self) -> f32 {
        self.beat
    }

    /// Check if this is the first beat of its bar
    pub fn is_bar_start(&self) -> bool {
        self.beat == 0.0
    }

    /// Same beat, different bar
    pub fn with_bar(self, bar: u32) -> Self {
        Self { bar, ..self }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::bar_start(0)
    }
}

// Beats are never NaN, so equality is total
impl Eq for Position {}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.bar
            .cmp(&other.bar)
            .then_with(|| self.beat.total_cmp(&other.beat))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 1-based like a transport display
        write!(f, "{}:{}", self.bar + 1, self.beat + 1.0)
    }
}

/// Time signature (e.g. 3/4)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeSignature {
    upper: u8,
    lower: u8,
}

impl TimeSignature {
    pub const FOUR_FOUR: TimeSignature = TimeSignature { upper: 4, lower: 4 };
    pub const THREE_FOUR: TimeSignature = TimeSignature { upper: 3, lower: 4 };
    pub const SIX_EIGHT: TimeSignature = TimeSignature { upper: 6, lower: 8 };

    pub fn new(upper: u8, lower: u8) -> Self {
        Self {
            upper: upper.max(1),
            lower: lower.max(1),
        }
    }

    pub fn upper(&self) -> u8 {
        self.upper
    }

    pub fn lower(&self) -> u8 {
        self.lower
    }

    /// Beats per bar, counted in the signature's own unit
    pub fn beats_per_bar(&self) -> f32 {
        self.upper as f32
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self::FOUR_FOUR
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.upper, self.lower)
    }
}

/// Inclusive range of bars
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BarRange {
    pub from: u32,
    pub to: u32,
}

impl BarRange {
    /// Create a range; `to` is raised to `from` if smaller
    pub fn new(from: u32, to: u32) -> Self {
        Self {
            from,
            to: to.max(from),
        }
    }

    /// Range of `size` bars starting at `from` (size 0 is treated as 1)
    pub fn with_size(from: u32, size: u32) -> Self {
        Self::new(from, from + size.max(1) - 1)
    }

    /// Number of bars in the range
    pub fn size(&self) -> u32 {
        self.to - self.from + 1
    }

    pub fn contains(&self, bar: u32) -> bool {
        (self.from..=self.to).contains(&bar)
    }

    /// Check if `position` falls in the range
    pub fn contains_position(&self, position: Position) -> bool {
        self.contains(position.bar())
    }
}

impl fmt::Display for BarRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}-{}]", self.from, self.to)
    }
}
