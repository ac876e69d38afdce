use datapack_core::command::FALLBACK_SOURCE;
use datapack_core::{bend_semitones, map_note, round_to, Command, MappedSound, NamingRule, PanOffset};
use datapack_core::{SoundSource, TickScale, TickSchedule};

use crate::config::GenerateConfig;
use crate::pairing::PairedNote;
use crate::timeline::ChannelControls;

const PITCH_EPSILON: f64 = 1e-6;
const VOLUME_EPSILON: f64 = 1e-3;

/// How notes are turned into command text
#[derive(Debug, Clone, PartialEq)]
pub struct SynthSettings {
    pub naming_rule: NamingRule,
    pub source: Option<SoundSource>,
    pub stop_sound: bool,
    /// Sound name filter for `stopsound`
    pub stop_filter: Option<String>,
    pub bend_resolution: u32,
}

impl SynthSettings {
    pub fn from_config(config: &GenerateConfig) -> Self {
        SynthSettings {
            naming_rule: config.naming_rule(),
            source: config.sound_source,
            stop_sound: config.stop_sound,
            stop_filter: Some(config.instrument.trim().to_string()).filter(|s| !s.is_empty()),
            bend_resolution: config.bend_resolution.max(1),
        }
    }

    fn command(&self, mapped: &MappedSound, offset: PanOffset, volume: f64) -> Command {
        if self.stop_sound {
            Command::stop(self.source, self.stop_filter.as_deref())
        } else {
            let source = self.source.unwrap_or(FALLBACK_SOURCE);
            Command::play(mapped.name.as_str(), source, offset, volume, mapped.pitch)
        }
    }
}

/// What became of one note
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteOutcome {
    /// Rendered as one command at the onset
    Static,
    /// Rendered as `commands` samples along a pitch bend
    Sampled { commands: usize },
    /// Pitch-bent note that starts and ends on the same game tick
    TooShort,
    /// No instrument range could play the pitch
    Unmappable,
}

impl NoteOutcome {
    pub fn commands(self) -> usize {
        match self {
            NoteOutcome::Static => 1,
            NoteOutcome::Sampled { commands } => commands,
            NoteOutcome::TooShort | NoteOutcome::Unmappable => 0,
        }
    }
}

/// Acoustic state of one emitted sample, used to skip repeats
#[derive(Debug, Clone, PartialEq)]
struct Voicing {
    name: String,
    pitch: f64,
    pan: u8,
    volume: f64,
}

impl Voicing {
    fn differs_from(&self, previous: &Voicing) -> bool {
        (self.pitch - previous.pitch).abs() > PITCH_EPSILON
            || self.name != previous.name
            || self.pan != previous.pan
            || (self.volume - previous.volume).abs() > VOLUME_EPSILON
    }
}

/// Renders the notes of one channel into a [`TickSchedule`]
pub struct CommandSynthesizer<'a> {
    controls: &'a ChannelControls,
    scale: TickScale,
    settings: &'a SynthSettings,
}

impl<'a> CommandSynthesizer<'a> {
    pub fn new(controls: &'a ChannelControls, scale: TickScale, settings: &'a SynthSettings) -> Self {
        Self {
            controls,
            scale,
            settings,
        }
    }

    pub fn synthesize(&self, note: &PairedNote, schedule: &mut TickSchedule) -> NoteOutcome {
        if self.controls.bend_active(note.start, note.end) {
            self.synthesize_sampled(note, schedule)
        } else {
            self.synthesize_static(note, schedule)
        }
    }

    fn map_at(&self, key: u8, tick: f64) -> Option<MappedSound> {
        let bend = self.controls.bend_at(tick);
        let effective = key as f64 + bend_semitones(bend, self.controls.bend_range);
        map_note(effective, &self.settings.naming_rule)
    }

    fn synthesize_static(&self, note: &PairedNote, schedule: &mut TickSchedule) -> NoteOutcome {
        let onset = note.start as f64;
        let Some(mapped) = self.map_at(note.key, onset) else {
            return NoteOutcome::Unmappable;
        };

        let offset = PanOffset::from_pan(self.controls.pan_at(onset), PanOffset::STATIC_RADIUS);
        let volume = round_to(note.velocity as f64 / 127.0, 3);
        let tick = self.scale.to_output(note.start);

        schedule.push(tick, self.settings.command(&mapped, offset, volume));
        NoteOutcome::Static
    }

    /// Sample the note every `bend_resolution` game ticks, emitting only
    /// samples that sound different from the previous emitted one.
    fn synthesize_sampled(&self, note: &PairedNote, schedule: &mut TickSchedule) -> NoteOutcome {
        let start_gt = self.scale.to_output(note.start);
        let end_gt = self.scale.to_output(note.end);
        if start_gt >= end_gt {
            return match self.map_at(note.key, note.start as f64) {
                Some(_) => NoteOutcome::TooShort,
                None => NoteOutcome::Unmappable,
            };
        }
        let velocity_volume = round_to(note.velocity as f64 / 127.0, 3);

        let mut previous: Option<Voicing> = None;
        let mut emitted = 0;

        for gt in (start_gt..end_gt).step_by(self.settings.bend_resolution as usize) {
            let tick = self.scale.to_source(gt);
            let Some(mapped) = self.map_at(note.key, tick) else {
                continue;
            };

            let pan = self.controls.pan_at(tick);
            let volume = self
                .controls
                .volume_at(tick)
                .map(|v| round_to(v as f64 / 127.0, 3))
                .unwrap_or(velocity_volume);

            let voicing = Voicing {
                name: mapped.name.clone(),
                pitch: mapped.pitch,
                pan,
                volume,
            };
            if previous.as_ref().is_some_and(|prev| !voicing.differs_from(prev)) {
                continue;
            }

            let offset = PanOffset::from_pan(pan, PanOffset::SAMPLED_RADIUS);
            schedule.push(gt, self.settings.command(&mapped, offset, volume));
            previous = Some(voicing);
            emitted += 1;
        }

        // The first mappable step is always emitted
        match emitted {
            0 => NoteOutcome::Unmappable,
            commands => NoteOutcome::Sampled { commands },
        }
    }
}
