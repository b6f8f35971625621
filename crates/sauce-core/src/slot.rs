//! Per-slot state (spec §3.3): the sticky settings that survive a
//! descriptor swap, plus the channel-strip sub-state. Owned exclusively by
//! the audio thread (spec §5); the control thread only ever reaches it
//! through a `ControlMessage`.

use crate::dsp::envelope::EnvSource;
use crate::dsp::eq::Eq3Gains;
use crate::dsp::filters::FilterType;
use crate::strip::StripParams;

/// Settings preserved across a descriptor swap (spec §3.3, §8 property 4).
#[derive(Debug, Clone, Copy)]
pub struct StickySettings {
    pub env_source: EnvSource,
    pub clock_rate_index: u8,
    pub midi_channel: u8,
    pub filter_type: FilterType,
}

impl Default for StickySettings {
    fn default() -> Self {
        Self {
            env_source: EnvSource::Off,
            clock_rate_index: 6, // unity ratio, see clock::DIVISION_RATIOS
            midi_channel: 0,     // 0 = off
            filter_type: FilterType::Lp,
        }
    }
}

/// Channel-strip sub-state (spec §3.3): persists across voice swaps,
/// independent of the currently assigned descriptor.
#[derive(Debug, Clone, Copy)]
pub struct ChannelStripState {
    pub volume: f32,
    pub pan: f32,
    pub mute: bool,
    pub solo: bool,
    pub gain_trim_db: f32,
    pub eq: Eq3Gains,
    pub send_levels: [f32; crate::strip::NUM_SENDS],
}

impl Default for ChannelStripState {
    fn default() -> Self {
        Self {
            volume: 1.0,
            pan: 0.0,
            mute: false,
            solo: false,
            gain_trim_db: 0.0,
            eq: Eq3Gains { lo: 1.0, mid: 1.0, hi: 1.0, ..Default::default() },
            send_levels: [0.0; crate::strip::NUM_SENDS],
        }
    }
}

impl ChannelStripState {
    pub fn to_strip_params(&self) -> StripParams {
        StripParams {
            eq: self.eq,
            amp_trim_db: self.gain_trim_db,
            pan: self.pan,
            volume: self.volume,
            muted: self.mute,
            solo: self.solo,
            send_levels: self.send_levels,
        }
    }
}

/// Full per-slot state: descriptor assignment, sticky settings (persist
/// across swap), and the channel strip (persists independently of both).
#[derive(Debug, Clone, Default)]
pub struct SlotState {
    pub descriptor_id: Option<String>,
    pub is_running: bool,
    pub sticky: StickySettings,
    pub channel: ChannelStripState,
}

impl SlotState {
    /// Descriptor swap preserves sticky settings and channel state; only
    /// `descriptor_id`/`is_running` change (spec §3.7, §8 property 4).
    pub fn assign_descriptor(&mut self, descriptor_id: String) {
        self.descriptor_id = Some(descriptor_id);
        self.is_running = true;
    }

    pub fn clear(&mut self) {
        self.descriptor_id = None;
        self.is_running = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_swap_preserves_sticky_settings() {
        let mut slot = SlotState::default();
        slot.sticky.env_source = EnvSource::Midi;
        slot.sticky.clock_rate_index = 3;
        slot.sticky.midi_channel = 5;
        slot.sticky.filter_type = FilterType::Hp;
        slot.channel.volume = 0.42;

        slot.assign_descriptor("saw_basic".into());
        slot.assign_descriptor("karplus".into());

        assert_eq!(slot.sticky.env_source, EnvSource::Midi);
        assert_eq!(slot.sticky.clock_rate_index, 3);
        assert_eq!(slot.sticky.midi_channel, 5);
        assert_eq!(slot.sticky.filter_type, FilterType::Hp);
        assert_eq!(slot.channel.volume, 0.42);
        assert_eq!(slot.descriptor_id.as_deref(), Some("karplus"));
    }

    #[test]
    fn test_clear_empties_slot() {
        let mut slot = SlotState::default();
        slot.assign_descriptor("sine".into());
        slot.clear();
        assert!(slot.descriptor_id.is_none());
        assert!(!slot.is_running);
    }
}
