//! MIDI to Minecraft datapack converter library
//!
//! Converts one channel of a MIDI performance into `playsound` (or
//! `stopsound`) commands grouped per game tick, plus a binary dispatch tree
//! and the play/pause/stop functions that drive a scoreboard play head.
//!
//! ```no_run
//! use midi_to_datapack::{generate, GenerateConfig};
//!
//! let config = GenerateConfig {
//!     midi_path: "song.mid".into(),
//!     output_dir: "datapacks".into(),
//!     tag: "playing".into(),
//!     score: "song_pos".into(),
//!     namespace: "song".into(),
//!     ..Default::default()
//! };
//! let report = generate(&config).unwrap();
//! println!("{} commands", report.commands);
//! ```

pub mod config;
pub mod error;
pub mod midi;
pub mod pairing;
pub mod synth;
pub mod timeline;
pub mod writer;

use datapack_core::{DispatchTree, TickScale, TickSchedule, UtilityFunctions};
use std::path::PathBuf;
use tracing::{debug, info, instrument, warn};

pub use config::GenerateConfig;
pub use error::{GenerateError, Result};
pub use midi::MidiData;
pub use pairing::{pair_notes, PairedNote};
pub use synth::{CommandSynthesizer, NoteOutcome, SynthSettings};
pub use writer::{DatapackLayout, DatapackWriter};

/// Summary of a finished generation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateReport {
    /// Commands written across all tick functions
    pub commands: usize,
    /// Notes found on the selected channel
    pub notes: usize,
    /// Notes no instrument range could play
    pub dropped_notes: usize,
    /// Pitch-bent notes shorter than one game tick, nothing emitted
    pub too_short_notes: usize,
    /// Notes without a note-off, rendered one tick long
    pub unterminated_notes: usize,
    /// Distinct ticks with at least one command
    pub ticks: usize,
    pub min_tick: u32,
    pub max_tick: u32,
    pub datapack_root: PathBuf,
}

/// Render the selected channel of parsed MIDI data into a schedule.
pub fn synthesize_channel(
    midi: &MidiData,
    config: &GenerateConfig,
) -> (TickSchedule, Vec<PairedNote>, Vec<NoteOutcome>) {
    let scale = TickScale::new(midi.ticks_per_quarter as u32, config.output_ticks_per_quarter);
    let settings = SynthSettings::from_config(config);
    let synth = CommandSynthesizer::new(midi.controls(config.channel), scale, &settings);

    let notes = pair_notes(&midi.notes, config.channel);
    let mut schedule = TickSchedule::new();
    let outcomes = notes
        .iter()
        .map(|note| {
            let outcome = synth.synthesize(note, &mut schedule);
            match outcome {
                NoteOutcome::Unmappable => {
                    debug!(key = note.key, tick = note.start, "note outside every instrument range, dropped")
                }
                NoteOutcome::TooShort => {
                    debug!(key = note.key, tick = note.start, "bent note shorter than one game tick, skipped")
                }
                _ => {}
            }
            outcome
        })
        .collect();

    (schedule, notes, outcomes)
}

/// Convert a MIDI file into a datapack as described by `config`.
#[instrument(skip(config), fields(midi = %config.midi_path.display(), namespace = %config.namespace))]
pub fn generate(config: &GenerateConfig) -> Result<GenerateReport> {
    config.validate()?;

    let midi = MidiData::from_file(&config.midi_path)?;
    let (schedule, notes, outcomes) = synthesize_channel(&midi, config);

    let unterminated_notes = notes.iter().filter(|n| n.unterminated).count();
    if unterminated_notes > 0 {
        warn!(count = unterminated_notes, "notes without a note-off were given a 1-tick duration");
    }
    let dropped_notes = outcomes
        .iter()
        .filter(|o| **o == NoteOutcome::Unmappable)
        .count();
    let too_short_notes = outcomes.iter().filter(|o| **o == NoteOutcome::TooShort).count();

    let writer = DatapackWriter::new(&config.output_dir, config.namespace(), config.target_version);
    writer.prepare()?;
    writer.write_pack_meta()?;
    writer.write_notes(&schedule)?;

    let tree = DispatchTree::build(&schedule.tick_set());
    if let Some(tree) = &tree {
        writer.write_tree(tree, config.score())?;
    }

    writer.write_tags()?;
    let (min_tick, max_tick) = schedule.bounds();
    writer.write_utilities(&UtilityFunctions {
        namespace: config.namespace().to_string(),
        score: config.score().to_string(),
        tag: config.tag().to_string(),
        min_tick,
        max_tick,
        has_tree: tree.is_some(),
    })?;

    let report = GenerateReport {
        commands: schedule.command_count(),
        notes: notes.len(),
        dropped_notes,
        too_short_notes,
        unterminated_notes,
        ticks: schedule.tick_set().len(),
        min_tick,
        max_tick,
        datapack_root: writer.layout().root.clone(),
    };
    info!(
        commands = report.commands,
        notes = report.notes,
        dropped = report.dropped_notes,
        ticks = report.ticks,
        "datapack generated"
    );
    Ok(report)
}
