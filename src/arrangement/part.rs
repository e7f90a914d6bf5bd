// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Song parts and the accompaniments bound to them.
//!
//! A Part plays one section of the chord track with one accompaniment and
//! its parameter values. Parts follow each other without gaps.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::EditError;
use super::position::{BarRange, TimeSignature};

/// Stable identifier of a part within a composition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartId(pub(crate) u32);

impl PartId {
    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for PartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An accompaniment pattern as written, in its native time signature
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Style {
    name: String,
    time_signature: TimeSignature,
}

impl Style {
    pub fn new(name: impl Into<String>, time_signature: TimeSignature) -> Self {
        Self {
            name: name.into(),
            time_signature,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn time_signature(&self) -> TimeSignature {
        self.time_signature
    }
}

/// The backing bound to a part.
///
/// An `Adapted` accompaniment replays its source style under another time
/// signature, and needs a part using the source style to render.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Accompaniment {
    Primary(Style),
    Adapted {
        source: Style,
        time_signature: TimeSignature,
    },
}

impl Accompaniment {
    pub fn primary(name: impl Into<String>, time_signature: TimeSignature) -> Self {
        Accompaniment::Primary(Style::new(name, time_signature))
    }

    /// Adapt `source` to `time_signature`, which must differ from the source's
    pub fn adapted(source: Style, time_signature: TimeSignature) -> Result<Self, EditError> {
        if source.time_signature == time_signature {
            return Err(EditError::AdaptationTimeSignature(time_signature));
        }
        Ok(Accompaniment::Adapted {
            source,
            time_signature,
        })
    }

    /// Display name; adapted ones carry their time signature
    pub fn name(&self) -> String {
        match self {
            Accompaniment::Primary(style) => style.name.clone(),
            Accompaniment::Adapted {
                source,
                time_signature,
            } => format!("{} ({})", source.name, time_signature),
        }
    }

    pub fn time_signature(&self) -> TimeSignature {
        match self {
            Accompaniment::Primary(style) => style.time_signature,
            Accompaniment::Adapted { time_signature, .. } => *time_signature,
        }
    }

    pub fn is_adapted(&self) -> bool {
        matches!(self, Accompaniment::Adapted { .. })
    }

    /// Source style of an adapted accompaniment
    pub fn source(&self) -> Option<&Style> {
        match self {
            Accompaniment::Primary(_) => None,
            Accompaniment::Adapted { source, .. } => Some(source),
        }
    }

    /// Check if this is `style` played natively
    pub fn is_primary_of(&self, style: &Style) -> bool {
        matches!(self, Accompaniment::Primary(own) if own == style)
    }
}

/// Accompaniment parameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterValue::Bool(v) => write!(f, "{}", v),
            ParameterValue::Int(v) => write!(f, "{}", v),
            ParameterValue::Float(v) => write!(f, "{}", v),
            ParameterValue::Text(v) => f.write_str(v),
        }
    }
}

impl From<bool> for ParameterValue {
    fn from(v: bool) -> Self {
        ParameterValue::Bool(v)
    }
}

impl From<i64> for ParameterValue {
    fn from(v: i64) -> Self {
        ParameterValue::Int(v)
    }
}

impl From<f64> for ParameterValue {
    fn from(v: f64) -> Self {
        ParameterValue::Float(v)
    }
}

impl From<&str> for ParameterValue {
    fn from(v: &str) -> Self {
        ParameterValue::Text(v.to_string())
    }
}

/// A contiguous run of bars playing one section with one accompaniment
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    pub(crate) id: PartId,
    pub(crate) name: String,
    pub(crate) section: String,
    pub(crate) start_bar: u32,
    pub(crate) bar_count: u32,
    pub(crate) accompaniment: Accompaniment,
    pub(crate) parameters: BTreeMap<String, ParameterValue>,
}

impl Part {
    pub fn id(&self) -> PartId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the chord track section this part plays
    pub fn section(&self) -> &str {
        &self.section
    }

    pub fn start_bar(&self) -> u32 {
        self.start_bar
    }

    pub fn bar_count(&self) -> u32 {
        self.bar_count
    }

    /// Bars occupied in the song
    pub fn bar_range(&self) -> BarRange {
        BarRange::with_size(self.start_bar, self.bar_count)
    }

    pub fn accompaniment(&self) -> &Accompaniment {
        &self.accompaniment
    }

    pub fn parameters(&self) -> &BTreeMap<String, ParameterValue> {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterValue> {
        self.parameters.get(name)
    }

    pub(crate) fn set_parameter(&mut self, name: impl Into<String>, value: ParameterValue) {
        self.parameters.insert(name.into(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adapted_needs_other_time_signature() {
        let swing = Style::new("Swing", TimeSignature::FOUR_FOUR);
        assert!(matches!(
            Accompaniment::adapted(swing.clone(), TimeSignature::FOUR_FOUR),
            Err(EditError::AdaptationTimeSignature(_))
        ));

        let waltz = Accompaniment::adapted(swing.clone(), TimeSignature::THREE_FOUR).unwrap();
        assert!(waltz.is_adapted());
        assert_eq!(waltz.source(), Some(&swing));
        assert_eq!(waltz.time_signature(), TimeSignature::THREE_FOUR);
        assert_eq!(waltz.name(), "Swing (3/4)");
    }

    #[test]
    fn test_is_primary_of() {
        let swing = Style::new("Swing", TimeSignature::FOUR_FOUR);
        let primary = Accompaniment::Primary(swing.clone());
        let adapted = Accompaniment::adapted(swing.clone(), TimeSignature::THREE_FOUR).unwrap();

        assert!(primary.is_primary_of(&swing));
        assert!(!adapted.is_primary_of(&swing));
        assert!(!Accompaniment::primary("Bossa", TimeSignature::FOUR_FOUR).is_primary_of(&swing));
    }

    #[test]
    fn test_parameter_value_yaml() {
        let values: BTreeMap<String, ParameterValue> =
            serde_yaml::from_str("intensity: 0.5\nvariation: B\nfill: true\nrepeat: 2\n").unwrap();
        assert_eq!(values["intensity"], ParameterValue::Float(0.5));
        assert_eq!(values["variation"], ParameterValue::Text("B".into()));
        assert_eq!(values["fill"], ParameterValue::Bool(true));
        assert_eq!(values["repeat"], ParameterValue::Int(2));
        assert_eq!(values["variation"].to_string(), "B");
    }
}
