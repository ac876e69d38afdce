use datapack_core::sound::BEND_CENTER;

pub const CHANNEL_COUNT: usize = 16;

const CC_DATA_ENTRY_MSB: u8 = 6;
const CC_MAIN_VOLUME: u8 = 7;
const CC_PAN: u8 = 10;
const CC_RPN_LSB: u8 = 100;
const CC_RPN_MSB: u8 = 101;

const DEFAULT_PAN: u16 = 64;
const DEFAULT_VOLUME: u16 = 127;
const DEFAULT_BEND_RANGE: u8 = 2;

/// A single control value taking effect at a MIDI tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlSample {
    pub tick: u64,
    pub value: u16,
}

/// Control values over time for one parameter on one channel.
///
/// Always starts with a seed sample at tick 0; samples are kept in tick
/// order, with samples at the same tick in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlTimeline {
    samples: Vec<ControlSample>,
}

impl ControlTimeline {
    pub fn seeded(value: u16) -> Self {
        ControlTimeline {
            samples: vec![ControlSample { tick: 0, value }],
        }
    }

    pub fn push(&mut self, tick: u64, value: u16) {
        let sample = ControlSample { tick, value };
        match self.samples.last() {
            Some(last) if last.tick > tick => {
                // Events from a later track can land before existing samples
                let pos = self.samples.partition_point(|s| s.tick <= tick);
                self.samples.insert(pos, sample);
            }
            _ => self.samples.push(sample),
        }
    }

    pub fn samples(&self) -> &[ControlSample] {
        &self.samples
    }

    /// Value of the last sample at or before `tick`
    pub fn value_at(&self, tick: f64) -> u16 {
        let pos = self.samples.partition_point(|s| s.tick as f64 <= tick);
        self.samples[pos.saturating_sub(1)].value
    }

    /// Whether any sample, the tick-0 seed included, lies in `start..end`
    pub fn changes_within(&self, start: u64, end: u64) -> bool {
        self.samples.iter().any(|s| s.tick >= start && s.tick < end)
    }

    /// Whether a sample after tick 0 has taken effect by `tick`
    pub fn set_after_start(&self, tick: f64) -> bool {
        self.samples.iter().any(|s| s.tick > 0 && s.tick as f64 <= tick)
    }
}

/// Registered Parameter Number currently selected on a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct RpnSelector {
    msb: Option<u8>,
    lsb: Option<u8>,
}

impl RpnSelector {
    fn is_pitch_bend_range(&self) -> bool {
        self.msb == Some(0) && self.lsb == Some(0)
    }
}

/// Control state of one MIDI channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelControls {
    pub pitch_bend: ControlTimeline,
    pub pan: ControlTimeline,
    pub volume: ControlTimeline,
    /// Pitch-bend range in semitones
    pub bend_range: u8,
    rpn: RpnSelector,
}

impl Default for ChannelControls {
    fn default() -> Self {
        ChannelControls {
            pitch_bend: ControlTimeline::seeded(BEND_CENTER),
            pan: ControlTimeline::seeded(DEFAULT_PAN),
            volume: ControlTimeline::seeded(DEFAULT_VOLUME),
            bend_range: DEFAULT_BEND_RANGE,
            rpn: RpnSelector::default(),
        }
    }
}

impl ChannelControls {
    /// Record a control change
    pub fn control_change(&mut self, tick: u64, controller: u8, value: u8) {
        match controller {
            CC_RPN_MSB => self.rpn.msb = Some(value),
            CC_RPN_LSB => self.rpn.lsb = Some(value),
            CC_DATA_ENTRY_MSB if self.rpn.is_pitch_bend_range() => self.bend_range = value,
            CC_PAN => self.pan.push(tick, value as u16),
            CC_MAIN_VOLUME => self.volume.push(tick, value as u16),
            _ => {}
        }
    }

    /// Record a raw 14-bit pitch-bend value (8192 = no bend)
    pub fn pitch_bend(&mut self, tick: u64, value: u16) {
        self.pitch_bend.push(tick, value);
    }

    /// Pan (0..=127) in effect at `tick`
    pub fn pan_at(&self, tick: f64) -> u8 {
        self.pan.value_at(tick) as u8
    }

    /// Raw pitch-bend value in effect at `tick`
    pub fn bend_at(&self, tick: f64) -> u16 {
        self.pitch_bend.value_at(tick)
    }

    /// Channel volume (0..=127) at `tick`, if a volume change has happened by then
    pub fn volume_at(&self, tick: f64) -> Option<u8> {
        self.volume
            .set_after_start(tick)
            .then(|| self.volume.value_at(tick) as u8)
    }

    /// Whether a pitch-bend sample falls inside the held span of a note.
    ///
    /// The seed counts, so a note starting at tick 0 is always sampled.
    pub fn bend_active(&self, start: u64, end: u64) -> bool {
        self.pitch_bend.changes_within(start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_defaults() {
        let controls = ChannelControls::default();
        assert_eq!(controls.bend_at(0.0), 8192);
        assert_eq!(controls.pan_at(1000.0), 64);
        assert_eq!(controls.volume_at(1000.0), None);
        assert_eq!(controls.bend_range, 2);
    }

    #[test]
    fn test_last_sample_at_or_before() {
        let mut timeline = ControlTimeline::seeded(64);
        timeline.push(10, 0);
        timeline.push(20, 127);
        assert_eq!(timeline.value_at(9.99), 64);
        assert_eq!(timeline.value_at(10.0), 0);
        assert_eq!(timeline.value_at(19.0), 0);
        assert_eq!(timeline.value_at(25.0), 127);
    }

    #[test]
    fn test_same_tick_keeps_arrival_order() {
        let mut timeline = ControlTimeline::seeded(64);
        timeline.push(0, 10);
        timeline.push(5, 20);
        timeline.push(5, 30);
        assert_eq!(timeline.value_at(0.0), 10);
        assert_eq!(timeline.value_at(5.0), 30);
    }

    #[test]
    fn test_out_of_order_push_is_sorted() {
        let mut timeline = ControlTimeline::seeded(8192);
        timeline.push(30, 1);
        timeline.push(10, 2);
        let ticks: Vec<u64> = timeline.samples().iter().map(|s| s.tick).collect();
        assert_eq!(ticks, vec![0, 10, 30]);
        assert_eq!(timeline.value_at(20.0), 2);
    }

    #[test]
    fn test_rpn_sets_bend_range() {
        let mut controls = ChannelControls::default();
        controls.control_change(0, 6, 12); // no RPN selected yet
        assert_eq!(controls.bend_range, 2);

        controls.control_change(0, 101, 0);
        controls.control_change(0, 100, 0);
        controls.control_change(0, 6, 12);
        assert_eq!(controls.bend_range, 12);

        // fine tuning RPN does not touch the bend range
        controls.control_change(0, 100, 1);
        controls.control_change(0, 6, 3);
        assert_eq!(controls.bend_range, 12);
    }

    #[test]
    fn test_pan_and_volume_changes() {
        let mut controls = ChannelControls::default();
        controls.control_change(4, 10, 0);
        controls.control_change(8, 7, 100);
        assert_eq!(controls.pan_at(4.0), 0);
        assert_eq!(controls.volume_at(7.0), None);
        assert_eq!(controls.volume_at(8.0), Some(100));
    }

    #[test]
    fn test_bend_activity_includes_seed() {
        let mut controls = ChannelControls::default();
        assert!(controls.bend_active(0, 10));
        assert!(!controls.bend_active(1, 10));
        controls.pitch_bend(10, 9000);
        assert!(!controls.bend_active(1, 10));
        assert!(controls.bend_active(10, 11));
        assert!(controls.bend_active(5, 20));
    }
}
