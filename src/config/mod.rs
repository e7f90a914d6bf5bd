// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Configuration for loopjam.
//!
//! Rehearsal settings load from YAML or TOML; the file extension picks
//! the format. Every field has a default, so an empty file is valid.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::music::MIN_RECOGNIZED_PITCHES;
use crate::rehearsal::DEFAULT_LOOP_BARS;

/// Rehearsal loop settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RehearsalConfig {
    /// Length the selected part is cut or stretched to
    pub loop_bars: u32,
    /// MIDI source to play chords on (name or part of it)
    pub input_device: Option<String>,
    /// Only listen to this channel (1-16)
    pub input_channel: Option<u8>,
    /// Chord recognition settings
    pub recognizer: RecognizerConfig,
    /// Limit on engine start/stop, in milliseconds
    pub engine_timeout_ms: u64,
}

/// Chord recognition settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RecognizerConfig {
    /// Clusters with more notes than this are not recognized
    pub max_pitches: usize,
    /// Report the lowest held note as the bass (slash chords)
    pub bass_from_lowest_note: bool,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            max_pitches: 6,
            bass_from_lowest_note: true,
        }
    }
}

impl Default for RehearsalConfig {
    fn default() -> Self {
        Self {
            loop_bars: DEFAULT_LOOP_BARS,
            input_device: None,
            input_channel: None,
            recognizer: RecognizerConfig::default(),
            engine_timeout_ms: 3000,
        }
    }
}

impl RehearsalConfig {
    /// Load and validate a YAML (`.yaml`, `.yml`) or TOML (`.toml`) file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml(&contents)?,
            Some("yaml") | Some("yml") => Self::from_yaml(&contents)?,
            other => bail!("Unsupported config format {:?} for {:?}", other, path),
        };
        config
            .validate()
            .with_context(|| format!("Invalid config file: {:?}", path))?;
        Ok(config)
    }

    /// Parse from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse YAML configuration")
    }

    /// Parse from a TOML string
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse TOML configuration")
    }

    /// Serialize to a YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize configuration to YAML")
    }

    pub fn validate(&self) -> Result<()> {
        if self.loop_bars == 0 {
            bail!("loop_bars must be at least 1");
        }
        if self.recognizer.max_pitches < MIN_RECOGNIZED_PITCHES {
            bail!(
                "recognizer.max_pitches must be at least {}, got {}",
                MIN_RECOGNIZED_PITCHES,
                self.recognizer.max_pitches
            );
        }
        if let Some(channel) = self.input_channel {
            if !(1..=16).contains(&channel) {
                bail!("input_channel must be 1-16, got {}", channel);
            }
        }
        Ok(())
    }

    pub fn engine_timeout(&self) -> Duration {
        Duration::from_millis(self.engine_timeout_ms)
    }
}
