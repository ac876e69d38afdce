use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;
use std::fmt;
use std::str::FromStr;

use crate::tick::round_to;

/// Target selector every generated command runs as
pub const ACTOR: &str = "@s";

/// Sound category used when the configured source is the wildcard
pub const FALLBACK_SOURCE: SoundSource = SoundSource::Record;

/// Minecraft sound category (`playsound <sound> <source> ...`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundSource {
    Ambient,
    Block,
    Hostile,
    Master,
    Music,
    Neutral,
    Player,
    Record,
    Voice,
    Weather,
    /// Matches every category; only meaningful for `stopsound`
    #[serde(rename = "*")]
    Any,
}

impl SoundSource {
    pub const CATEGORIES: [SoundSource; 10] = [
        SoundSource::Ambient,
        SoundSource::Block,
        SoundSource::Hostile,
        SoundSource::Master,
        SoundSource::Music,
        SoundSource::Neutral,
        SoundSource::Player,
        SoundSource::Record,
        SoundSource::Voice,
        SoundSource::Weather,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SoundSource::Ambient => "ambient",
            SoundSource::Block => "block",
            SoundSource::Hostile => "hostile",
            SoundSource::Master => "master",
            SoundSource::Music => "music",
            SoundSource::Neutral => "neutral",
            SoundSource::Player => "player",
            SoundSource::Record => "record",
            SoundSource::Voice => "voice",
            SoundSource::Weather => "weather",
            SoundSource::Any => "*",
        }
    }

    /// Category to use in a `playsound` command
    pub fn for_playback(self) -> SoundSource {
        if self == SoundSource::Any {
            FALLBACK_SOURCE
        } else {
            self
        }
    }
}

impl fmt::Display for SoundSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown sound source '{0}'")]
pub struct UnknownSoundSource(pub String);

impl FromStr for SoundSource {
    type Err = UnknownSoundSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed == "*" {
            return Ok(SoundSource::Any);
        }
        SoundSource::CATEGORIES
            .into_iter()
            .find(|source| source.as_str() == trimmed)
            .ok_or_else(|| UnknownSoundSource(s.to_string()))
    }
}

/// Local (`^x ^y ^z`) offset placing a sound around the listener.
///
/// Pan 0 is hard left, 64 is straight ahead, 127 is hard right.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanOffset {
    pub x: f64,
    pub y: f64,
}

impl PanOffset {
    /// Radius used for notes rendered as a single command
    pub const STATIC_RADIUS: f64 = 5.0;
    /// Radius used for pitch-bend sampled notes
    pub const SAMPLED_RADIUS: f64 = 8.0;

    pub fn from_pan(pan: u8, radius: f64) -> Self {
        let pan_norm = (pan as f64 - 64.0) / 64.0;
        let theta = -pan_norm * FRAC_PI_2;
        let x = round_to(theta.sin() * radius, 4);
        let y = round_to(theta.cos() * radius, 4).max(0.0);
        // + 0.0 folds negative zero so it prints as "0"
        PanOffset {
            x: x + 0.0,
            y: y + 0.0,
        }
    }
}

impl fmt::Display for PanOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "^{} ^{} ^", self.x, self.y)
    }
}

/// A single generated game command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `playsound <sound> <source> @s ^x ^y ^ <volume> <pitch>`
    PlaySound {
        sound: String,
        source: SoundSource,
        offset: PanOffset,
        volume: f64,
        pitch: f64,
    },
    /// `stopsound @s [<source> [<sound>]]`
    StopSound {
        source: Option<SoundSource>,
        sound: Option<String>,
    },
}

impl Command {
    pub fn play(sound: impl Into<String>, source: SoundSource, offset: PanOffset, volume: f64, pitch: f64) -> Self {
        Command::PlaySound {
            sound: sound.into(),
            source: source.for_playback(),
            offset,
            volume,
            pitch,
        }
    }

    /// Build a stop command, dropping filters that match everything.
    ///
    /// A wildcard source without a sound name is the same as no filter.
    pub fn stop(source: Option<SoundSource>, sound: Option<&str>) -> Self {
        let sound = sound
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        match (source, sound) {
            (None, _) | (Some(SoundSource::Any), None) => Command::StopSound {
                source: None,
                sound: None,
            },
            (Some(source), sound) => Command::StopSound {
                source: Some(source),
                sound,
            },
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::PlaySound {
                sound,
                source,
                offset,
                volume,
                pitch,
            } => write!(
                f,
                "playsound {} {} {} {} {} {}",
                sound, source, ACTOR, offset, volume, pitch
            ),
            Command::StopSound { source, sound } => {
                write!(f, "stopsound {}", ACTOR)?;
                if let Some(source) = source {
                    write!(f, " {}", source)?;
                    if let Some(sound) = sound {
                        write!(f, " {}", sound)?;
                    }
                }
                Ok(())
            }
        }
    }
}
