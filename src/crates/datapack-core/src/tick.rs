use serde::{Deserialize, Serialize};

/// Conversion between MIDI ticks and output (game) ticks.
///
/// Both sides are expressed as ticks per quarter note; there is no tempo
/// map involved, a quarter note in the MIDI file is always exactly
/// `output_per_quarter` game ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TickScale {
    /// Ticks per quarter note of the MIDI file (T)
    pub source_per_quarter: u32,
    /// Game ticks per quarter note (G)
    pub output_per_quarter: u32,
}

impl TickScale {
    /// Create a new scale. Both rates must be positive.
    pub fn new(source_per_quarter: u32, output_per_quarter: u32) -> Self {
        if source_per_quarter == 0 || output_per_quarter == 0 {
            panic!("Tick rates must be positive");
        }
        TickScale {
            source_per_quarter,
            output_per_quarter,
        }
    }

    /// `round(source_tick * G / T)`, ties to even.
    ///
    /// Computed in integer arithmetic so the result is exact for any
    /// tick a MIDI file can express.
    pub fn to_output(&self, source_tick: u64) -> u32 {
        let num = source_tick as u128 * self.output_per_quarter as u128;
        let den = self.source_per_quarter as u128;
        let quotient = num / den;
        let twice_rem = (num % den) * 2;

        let rounded = if twice_rem > den || (twice_rem == den && quotient % 2 == 1) {
            quotient + 1
        } else {
            quotient
        };
        u32::try_from(rounded).unwrap_or(u32::MAX)
    }

    /// Map an output tick back onto the (fractional) MIDI timeline.
    pub fn to_source(&self, output_tick: u32) -> f64 {
        output_tick as f64 * self.source_per_quarter as f64 / self.output_per_quarter as f64
    }
}

/// Round to `digits` decimal places, ties to even.
pub fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round_ties_even() / factor
}
