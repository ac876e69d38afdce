use std::collections::HashMap;

use crate::midi::NoteEvent;

/// A note-on matched with its note-off
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairedNote {
    pub channel: u8,
    pub key: u8,
    pub velocity: u8,
    pub start: u64,
    pub end: u64,
    /// No note-off was found; `end` is `start + 1`
    pub unterminated: bool,
}

/// Pair every note-on of `channel` with its note-off.
///
/// `events` must be ordered by tick. Each onset takes the first unused
/// note-off for the same key that comes after it in the list; that
/// note-off cannot close another onset. Onsets without a note-off last a
/// single tick.
pub fn pair_notes(events: &[NoteEvent], channel: u8) -> Vec<PairedNote> {
    // note-off positions per key, in list order
    let mut offs: HashMap<u8, Vec<usize>> = HashMap::new();
    for (idx, event) in events.iter().enumerate() {
        if !event.is_on && event.channel == channel {
            offs.entry(event.key).or_default().push(idx);
        }
    }
    // Offs before the cursor are either consumed or precede every later onset
    let mut cursors: HashMap<u8, usize> = HashMap::new();

    let mut paired = Vec::new();
    for (idx, onset) in events.iter().enumerate() {
        if !onset.is_on || onset.channel != channel {
            continue;
        }

        let off = offs.get(&onset.key).and_then(|positions| {
            let cursor = cursors.entry(onset.key).or_insert(0);
            while *cursor < positions.len() && positions[*cursor] < idx {
                *cursor += 1;
            }
            let found = positions.get(*cursor).map(|&pos| events[pos]);
            if found.is_some() {
                *cursor += 1;
            }
            found
        });

        paired.push(match off {
            Some(off) => PairedNote {
                channel,
                key: onset.key,
                velocity: onset.velocity,
                start: onset.tick,
                end: off.tick,
                unterminated: false,
            },
            None => PairedNote {
                channel,
                key: onset.key,
                velocity: onset.velocity,
                start: onset.tick,
                end: onset.tick + 1,
                unterminated: true,
            },
        });
    }

    paired
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn on(tick: u64, channel: u8, key: u8) -> NoteEvent {
        NoteEvent { tick, is_on: true, channel, key, velocity: 100 }
    }

    fn off(tick: u64, channel: u8, key: u8) -> NoteEvent {
        NoteEvent { tick, is_on: false, channel, key, velocity: 0 }
    }

    #[test]
    fn test_simple_pair() {
        let notes = pair_notes(&[on(0, 0, 60), off(24, 0, 60)], 0);
        assert_eq!(notes.len(), 1);
        assert_eq!((notes[0].start, notes[0].end), (0, 24));
        assert!(!notes[0].unterminated);
    }

    #[test]
    fn test_overlapping_same_key() {
        // two onsets of the same key close in order
        let events = [on(0, 0, 60), on(5, 0, 60), off(10, 0, 60), off(20, 0, 60)];
        let notes = pair_notes(&events, 0);
        assert_eq!((notes[0].start, notes[0].end), (0, 10));
        assert_eq!((notes[1].start, notes[1].end), (5, 20));
    }

    #[test]
    fn test_unterminated_note_lasts_one_tick() {
        let events = [on(0, 0, 60), off(10, 0, 60), on(30, 0, 60)];
        let notes = pair_notes(&events, 0);
        assert_eq!((notes[1].start, notes[1].end), (30, 31));
        assert!(notes[1].unterminated);
    }

    #[test]
    fn test_off_before_onset_in_list_is_skipped() {
        // an off at the same tick but earlier in the list does not close the onset
        let events = [off(10, 0, 60), on(10, 0, 60), off(15, 0, 60)];
        let notes = pair_notes(&events, 0);
        assert_eq!((notes[0].start, notes[0].end), (10, 15));
    }

    #[test]
    fn test_other_channels_ignored() {
        let events = [on(0, 0, 60), on(0, 5, 60), off(10, 0, 60), off(12, 5, 60)];
        let notes = pair_notes(&events, 5);
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].channel, 5);
        assert_eq!((notes[0].start, notes[0].end), (0, 12));
    }

    #[test]
    fn test_keys_pair_independently() {
        let events = [on(0, 0, 60), on(0, 0, 64), off(8, 0, 64), off(16, 0, 60)];
        let notes = pair_notes(&events, 0);
        assert_eq!((notes[0].key, notes[0].end), (60, 16));
        assert_eq!((notes[1].key, notes[1].end), (64, 8));
    }

    /// Direct forward scan, kept as a reference for the indexed version
    fn pair_by_scan(events: &[NoteEvent], channel: u8) -> Vec<(u64, u64)> {
        let mut used = vec![false; events.len()];
        let mut out = Vec::new();
        for (i, e) in events.iter().enumerate() {
            if !e.is_on || e.channel != channel {
                continue;
            }
            let mut end = e.tick + 1;
            for j in i + 1..events.len() {
                let o = events[j];
                if !o.is_on && !used[j] && o.channel == channel && o.key == e.key && o.tick >= e.tick {
                    used[j] = true;
                    end = o.tick;
                    break;
                }
            }
            out.push((e.tick, end));
        }
        out
    }

    proptest! {
        #[test]
        fn matches_forward_scan(
            raw in prop::collection::vec((0u64..50, any::<bool>(), 0u8..2, 60u8..63), 0..60)
        ) {
            let mut events: Vec<NoteEvent> = raw
                .into_iter()
                .map(|(tick, is_on, channel, key)| NoteEvent { tick, is_on, channel, key, velocity: 64 })
                .collect();
            events.sort_by_key(|e| e.tick);

            let indexed: Vec<(u64, u64)> = pair_notes(&events, 0).iter().map(|n| (n.start, n.end)).collect();
            prop_assert_eq!(indexed, pair_by_scan(&events, 0));
        }
    }
}
