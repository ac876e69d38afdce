use datapack_core::{NamingRule, SoundSource, TargetVersion};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::error::{GenerateError, Result};

pub const DEFAULT_INSTRUMENT: &str = "block.note_block.harp";
pub const DEFAULT_OUTPUT_TICKS_PER_QUARTER: u32 = 8;

fn namespace_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-z0-9_]+$").expect("namespace pattern is valid"))
}

/// Everything a generation run needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    pub midi_path: PathBuf,
    /// Directory the `<namespace>_midi_datapack` folder is created in
    pub output_dir: PathBuf,
    /// MIDI channel to convert (0-15)
    pub channel: u8,
    /// Tag marking players whose play head is running
    pub tag: String,
    /// Scoreboard objective holding the play-head position
    pub score: String,
    /// Base sound event name; also the sound filter in stop-sound mode
    pub instrument: String,
    /// Explicit names for the five variants, derived from `instrument` when unset
    pub naming_rule: Option<NamingRule>,
    /// Game ticks per quarter note
    pub output_ticks_per_quarter: u32,
    pub namespace: String,
    /// `None` leaves the stop-sound source filter unset
    pub sound_source: Option<SoundSource>,
    /// Emit `stopsound` instead of `playsound`
    pub stop_sound: bool,
    /// Game ticks between samples of a pitch-bent note
    pub bend_resolution: u32,
    pub target_version: TargetVersion,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        GenerateConfig {
            midi_path: PathBuf::new(),
            output_dir: PathBuf::new(),
            channel: 0,
            tag: String::new(),
            score: String::new(),
            instrument: DEFAULT_INSTRUMENT.to_string(),
            naming_rule: None,
            output_ticks_per_quarter: DEFAULT_OUTPUT_TICKS_PER_QUARTER,
            namespace: String::new(),
            sound_source: Some(SoundSource::Record),
            stop_sound: false,
            bend_resolution: 1,
            target_version: TargetVersion::default(),
        }
    }
}

impl GenerateConfig {
    /// Load a config record from a JSON file; missing fields take defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| GenerateError::io(path, e))?;
        serde_json::from_str(&text).map_err(|source| GenerateError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reject configurations that cannot produce a valid datapack.
    ///
    /// Runs before anything touches the file system.
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.midi_path.as_os_str().is_empty() {
            missing.push("midi_path");
        }
        if self.output_dir.as_os_str().is_empty() {
            missing.push("output_dir");
        }
        if self.tag.trim().is_empty() {
            missing.push("tag");
        }
        if self.score.trim().is_empty() {
            missing.push("score");
        }
        if self.namespace.trim().is_empty() {
            missing.push("namespace");
        }
        if !self.stop_sound && self.instrument.trim().is_empty() && self.naming_rule.is_none() {
            missing.push("instrument");
        }
        if !missing.is_empty() {
            return Err(GenerateError::malformed(format!(
                "missing required fields: {}",
                missing.join(", ")
            )));
        }

        if !namespace_pattern().is_match(self.namespace.trim()) {
            return Err(GenerateError::malformed(format!(
                "namespace '{}' may only contain lowercase letters, digits and underscores",
                self.namespace
            )));
        }
        if self.channel > 15 {
            return Err(GenerateError::malformed(format!(
                "channel {} is outside 0-15",
                self.channel
            )));
        }
        if self.output_ticks_per_quarter == 0 {
            return Err(GenerateError::malformed(
                "game ticks per quarter note must be a positive integer",
            ));
        }
        if self.bend_resolution == 0 {
            return Err(GenerateError::malformed(
                "pitch-bend resolution must be a positive integer",
            ));
        }
        Ok(())
    }

    pub fn naming_rule(&self) -> NamingRule {
        self.naming_rule
            .clone()
            .unwrap_or_else(|| NamingRule::from_base(self.instrument.trim()))
    }

    pub fn namespace(&self) -> &str {
        self.namespace.trim()
    }

    pub fn tag(&self) -> &str {
        self.tag.trim()
    }

    pub fn score(&self) -> &str {
        self.score.trim()
    }
}
