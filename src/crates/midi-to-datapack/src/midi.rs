use midly::{MidiMessage, Smf, Timing, TrackEventKind};
use std::path::Path;
use tracing::debug;

use crate::error::{GenerateError, Result};
use crate::timeline::{ChannelControls, CHANNEL_COUNT};

/// A note-on or note-off at an absolute MIDI tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteEvent {
    pub tick: u64,
    pub is_on: bool,
    pub channel: u8,
    pub key: u8,
    pub velocity: u8,
}

/// Everything the generator needs from a MIDI file
#[derive(Debug, Clone)]
pub struct MidiData {
    pub ticks_per_quarter: u16,
    pub channels: [ChannelControls; CHANNEL_COUNT],
    /// Note events of all tracks ordered by tick; ties keep track order
    pub notes: Vec<NoteEvent>,
}

impl MidiData {
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(GenerateError::InputNotFound(path.to_path_buf()));
        }
        let data = std::fs::read(path).map_err(|e| GenerateError::io(path, e))?;
        Self::from_bytes(&data)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let smf = Smf::parse(data)?;
        Self::from_smf(&smf)
    }

    pub fn from_smf(smf: &Smf) -> Result<Self> {
        let ticks_per_quarter = match smf.header.timing {
            Timing::Metrical(tpq) if tpq.as_int() > 0 => tpq.as_int(),
            Timing::Metrical(_) => {
                return Err(GenerateError::UnsupportedTiming(
                    "zero ticks per quarter note".to_string(),
                ))
            }
            Timing::Timecode(fps, subframe) => {
                return Err(GenerateError::UnsupportedTiming(format!(
                    "SMPTE timecode ({} fps, {} ticks per frame)",
                    fps.as_int(),
                    subframe
                )))
            }
        };

        let mut channels: [ChannelControls; CHANNEL_COUNT] = Default::default();
        let mut notes = Vec::new();

        for track in &smf.tracks {
            let mut tick = 0u64;
            for event in track {
                tick += event.delta.as_int() as u64;

                let TrackEventKind::Midi { channel, message } = event.kind else {
                    continue;
                };
                let ch = channel.as_int();
                let controls = &mut channels[ch as usize];

                match message {
                    MidiMessage::NoteOn { key, vel } => notes.push(NoteEvent {
                        tick,
                        is_on: vel.as_int() > 0,
                        channel: ch,
                        key: key.as_int(),
                        velocity: vel.as_int(),
                    }),
                    MidiMessage::NoteOff { key, vel } => notes.push(NoteEvent {
                        tick,
                        is_on: false,
                        channel: ch,
                        key: key.as_int(),
                        velocity: vel.as_int(),
                    }),
                    MidiMessage::Controller { controller, value } => {
                        controls.control_change(tick, controller.as_int(), value.as_int())
                    }
                    MidiMessage::PitchBend { bend } => controls.pitch_bend(tick, bend.0.as_int()),
                    _ => {}
                }
            }
        }

        // Stable: events on the same tick stay in file order
        notes.sort_by_key(|e| e.tick);

        debug!(
            ticks_per_quarter,
            tracks = smf.tracks.len(),
            note_events = notes.len(),
            "MIDI timelines extracted"
        );

        Ok(MidiData {
            ticks_per_quarter,
            channels,
            notes,
        })
    }

    /// Channels with at least one sounding note, ascending
    pub fn used_channels(&self) -> Vec<u8> {
        let mut used = [false; CHANNEL_COUNT];
        for event in self.notes.iter().filter(|e| e.is_on) {
            used[event.channel as usize] = true;
        }
        (0..CHANNEL_COUNT as u8).filter(|&ch| used[ch as usize]).collect()
    }

    pub fn controls(&self, channel: u8) -> &ChannelControls {
        &self.channels[channel as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use midly::num::{u14, u15, u28, u4, u7};
    use midly::{Format, Header, MetaMessage, PitchBend, TrackEvent};

    fn midi(delta: u32, channel: u8, message: MidiMessage) -> TrackEvent<'static> {
        TrackEvent {
            delta: u28::new(delta),
            kind: TrackEventKind::Midi {
                channel: u4::new(channel),
                message,
            },
        }
    }

    fn end_of_track() -> TrackEvent<'static> {
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
        }
    }

    fn smf(tracks: Vec<Vec<TrackEvent<'static>>>) -> Smf<'static> {
        let mut smf = Smf::new(Header::new(Format::Parallel, Timing::Metrical(u15::new(96))));
        smf.tracks = tracks;
        smf
    }

    #[test]
    fn test_extracts_notes_and_controls() {
        let data = MidiData::from_smf(&smf(vec![vec![
            midi(0, 1, MidiMessage::Controller { controller: u7::new(10), value: u7::new(0) }),
            midi(10, 1, MidiMessage::NoteOn { key: u7::new(60), vel: u7::new(100) }),
            midi(5, 1, MidiMessage::PitchBend { bend: PitchBend(u14::new(10000)) }),
            midi(5, 1, MidiMessage::NoteOn { key: u7::new(60), vel: u7::new(0) }),
            end_of_track(),
        ]]))
        .unwrap();

        assert_eq!(data.ticks_per_quarter, 96);
        assert_eq!(data.notes.len(), 2);
        assert!(data.notes[0].is_on);
        assert_eq!(data.notes[0].tick, 10);
        assert!(!data.notes[1].is_on);
        assert_eq!(data.notes[1].tick, 20);

        let controls = data.controls(1);
        assert_eq!(controls.pan_at(0.0), 0);
        assert_eq!(controls.bend_at(14.0), 8192);
        assert_eq!(controls.bend_at(15.0), 10000);
        assert_eq!(data.used_channels(), vec![1]);
    }

    #[test]
    fn test_merges_tracks_by_tick() {
        let data = MidiData::from_smf(&smf(vec![
            vec![
                midi(0, 0, MidiMessage::NoteOn { key: u7::new(60), vel: u7::new(90) }),
                midi(20, 0, MidiMessage::NoteOff { key: u7::new(60), vel: u7::new(0) }),
                end_of_track(),
            ],
            vec![
                midi(10, 3, MidiMessage::NoteOn { key: u7::new(72), vel: u7::new(90) }),
                midi(10, 3, MidiMessage::NoteOff { key: u7::new(72), vel: u7::new(0) }),
                end_of_track(),
            ],
        ]))
        .unwrap();

        let ticks: Vec<(u64, u8)> = data.notes.iter().map(|e| (e.tick, e.channel)).collect();
        assert_eq!(ticks, vec![(0, 0), (10, 3), (20, 0), (20, 3)]);
        assert_eq!(data.used_channels(), vec![0, 3]);
    }

    #[test]
    fn test_timecode_rejected() {
        let mut file = smf(vec![]);
        file.header.timing = Timing::Timecode(midly::Fps::Fps25, 40);
        assert!(matches!(
            MidiData::from_smf(&file),
            Err(GenerateError::UnsupportedTiming(_))
        ));
    }

    #[test]
    fn test_garbage_fails_to_parse() {
        assert!(matches!(
            MidiData::from_bytes(b"not a midi file"),
            Err(GenerateError::MidiParse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            MidiData::from_file(Path::new("/nonexistent/song.mid")),
            Err(GenerateError::InputNotFound(_))
        ));
    }
}
