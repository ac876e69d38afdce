use serde::{Deserialize, Serialize};
use std::fmt;

use crate::tick::round_to;

/// Two pitch distances closer than this are considered equal.
const PITCH_TIE_EPSILON: f64 = 1e-8;

/// Center of the neutral (no-pitch-bend) MIDI value.
pub const BEND_CENTER: u16 = 8192;

/// One of the five pre-recorded sample variants of an instrument.
///
/// Each variant covers one octave either side of its center note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentRange {
    Low2,
    Low1,
    Mid,
    High1,
    High2,
}

impl InstrumentRange {
    /// All ranges, lowest first. Mapping iterates in this order.
    pub const ALL: [InstrumentRange; 5] = [
        InstrumentRange::Low2,
        InstrumentRange::Low1,
        InstrumentRange::Mid,
        InstrumentRange::High1,
        InstrumentRange::High2,
    ];

    /// MIDI note number at which the variant plays at pitch 1.0
    pub fn center(self) -> u8 {
        match self {
            InstrumentRange::Low2 => 18,
            InstrumentRange::Low1 => 42,
            InstrumentRange::Mid => 66,
            InstrumentRange::High1 => 90,
            InstrumentRange::High2 => 114,
        }
    }

    /// Suffix appended to the base instrument name by the default naming rule
    pub fn suffix(self) -> &'static str {
        match self {
            InstrumentRange::Low2 => "_low2",
            InstrumentRange::Low1 => "_low1",
            InstrumentRange::Mid => "",
            InstrumentRange::High1 => "_high1",
            InstrumentRange::High2 => "_high2",
        }
    }
}

impl fmt::Display for InstrumentRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InstrumentRange::Low2 => "low2",
            InstrumentRange::Low1 => "low1",
            InstrumentRange::Mid => "mid",
            InstrumentRange::High1 => "high1",
            InstrumentRange::High2 => "high2",
        };
        write!(f, "{}", name)
    }
}

/// Sound event names bound to the five instrument ranges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingRule {
    pub low2: String,
    pub low1: String,
    pub mid: String,
    pub high1: String,
    pub high2: String,
}

impl NamingRule {
    /// Derive the five names from a base instrument name
    /// (e.g. `block.note_block.harp` -> `block.note_block.harp_low2`, ...).
    pub fn from_base(base: &str) -> Self {
        let name = |range: InstrumentRange| format!("{}{}", base, range.suffix());
        NamingRule {
            low2: name(InstrumentRange::Low2),
            low1: name(InstrumentRange::Low1),
            mid: name(InstrumentRange::Mid),
            high1: name(InstrumentRange::High1),
            high2: name(InstrumentRange::High2),
        }
    }

    pub fn name(&self, range: InstrumentRange) -> &str {
        match range {
            InstrumentRange::Low2 => &self.low2,
            InstrumentRange::Low1 => &self.low1,
            InstrumentRange::Mid => &self.mid,
            InstrumentRange::High1 => &self.high1,
            InstrumentRange::High2 => &self.high2,
        }
    }
}

/// Result of mapping a note onto an instrument range
#[derive(Debug, Clone, PartialEq)]
pub struct MappedSound {
    pub range: InstrumentRange,
    pub name: String,
    /// Playback pitch ratio, rounded to 7 decimal places
    pub pitch: f64,
}

/// Semitone offset produced by a raw 14-bit pitch-bend value.
pub fn bend_semitones(bend_value: u16, bend_range: u8) -> f64 {
    (bend_value as f64 - BEND_CENTER as f64) * (bend_range as f64 / BEND_CENTER as f64)
}

/// Pick the sample variant for an (already bend-adjusted) note number.
///
/// A range is a candidate when its pitch ratio lies in `[0.5, 2.0]`.
/// Among candidates the smallest `|log2(ratio)|` wins; equal distances
/// prefer the slot named like the mid variant, then the range whose center
/// is closest to the mid center. Returns `None` when no range can play the
/// note.
pub fn map_note(effective_note: f64, rule: &NamingRule) -> Option<MappedSound> {
    let mid_center = InstrumentRange::Mid.center() as f64;

    let mut best: Option<MappedSound> = None;
    let mut min_diff = f64::MAX;
    let mut best_priority = u8::MAX;
    let mut min_center_dist = f64::MAX;

    for range in InstrumentRange::ALL {
        let ratio = 2f64.powf((effective_note - range.center() as f64) / 12.0);
        if !(0.5..=2.0).contains(&ratio) {
            continue;
        }

        let name = rule.name(range);
        let diff = ratio.log2().abs();
        let priority = if name == rule.mid { 0 } else { 1 };
        let center_dist = (range.center() as f64 - mid_center).abs();
        let tied = (diff - min_diff).abs() < PITCH_TIE_EPSILON;

        if diff < min_diff
            || (tied && priority < best_priority)
            || (tied && priority == best_priority && center_dist < min_center_dist)
        {
            min_diff = diff;
            best_priority = priority;
            min_center_dist = center_dist;
            best = Some(MappedSound {
                range,
                name: name.to_string(),
                pitch: round_to(ratio, 7),
            });
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn harp() -> NamingRule {
        NamingRule::from_base("harp")
    }

    #[test]
    fn test_default_naming_rule() {
        let rule = harp();
        assert_eq!(rule.low2, "harp_low2");
        assert_eq!(rule.low1, "harp_low1");
        assert_eq!(rule.mid, "harp");
        assert_eq!(rule.high1, "harp_high1");
        assert_eq!(rule.high2, "harp_high2");
    }

    #[test]
    fn test_exact_centers() {
        for range in InstrumentRange::ALL {
            let mapped = map_note(range.center() as f64, &harp()).unwrap();
            assert_eq!(mapped.range, range);
            assert_eq!(mapped.pitch, 1.0);
        }
    }

    #[test]
    fn test_halfway_prefers_mid() {
        // 78 is one octave above mid and one octave below high1
        let mapped = map_note(78.0, &harp()).unwrap();
        assert_eq!(mapped.range, InstrumentRange::Mid);
        assert_eq!(mapped.pitch, 2.0);

        let mapped = map_note(54.0, &harp()).unwrap();
        assert_eq!(mapped.range, InstrumentRange::Mid);
        assert_eq!(mapped.pitch, 0.5);
    }

    #[test]
    fn test_halfway_away_from_mid_prefers_inner_range() {
        // 102 sits between high1 and high2; high1 is closer to mid
        let mapped = map_note(102.0, &harp()).unwrap();
        assert_eq!(mapped.range, InstrumentRange::High1);

        let mapped = map_note(30.0, &harp()).unwrap();
        assert_eq!(mapped.range, InstrumentRange::Low1);
    }

    #[test]
    fn test_nearest_range_wins() {
        let mapped = map_note(79.0, &harp()).unwrap();
        assert_eq!(mapped.range, InstrumentRange::High1);
        assert_eq!(mapped.name, "harp_high1");
        assert_eq!(mapped.pitch, round_to(2f64.powf(-11.0 / 12.0), 7));
    }

    #[test]
    fn test_out_of_range_dropped() {
        assert!(map_note(5.0, &harp()).is_none());
        assert!(map_note(127.0, &harp()).is_none());
        assert!(map_note(6.0, &harp()).is_some());
        assert!(map_note(126.0, &harp()).is_some());
    }

    #[test]
    fn test_custom_rule_sharing_mid_name() {
        // A slot reusing the mid name gets mid priority on ties
        let mut rule = harp();
        rule.high1 = rule.mid.clone();
        let mapped = map_note(78.0, &rule).unwrap();
        assert_eq!(mapped.range, InstrumentRange::Mid);
    }

    #[test]
    fn test_bend_semitones() {
        assert_eq!(bend_semitones(8192, 2), 0.0);
        assert_eq!(bend_semitones(12288, 2), 1.0);
        assert_eq!(bend_semitones(0, 2), -2.0);
        assert_eq!(bend_semitones(4096, 12), -6.0);
    }

    proptest! {
        #[test]
        fn pitch_stays_within_one_octave(note in 6.0f64..126.0) {
            let mapped = map_note(note, &harp()).unwrap();
            prop_assert!(mapped.pitch >= 0.5 && mapped.pitch <= 2.0);
        }
    }
}
