//! Control messages (spec §4.6, §6.1): the three categories — Set,
//! Structural, Trigger — the control/event router dispatches to the grid,
//! voice manager, and modulation engine. Grounded on the teacher's (now
//! legacy) `modular_core::message` taxonomy, generalized from the
//! patch-graph's free-form addressing to this engine's fixed OSC-style
//! address set.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardParam {
    Freq,
    Cutoff,
    Resonance,
    Attack,
    Decay,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ControlMessage {
    // --- Set: write base[index] via §4.1 ---
    EngineBpm(f32),
    SlotParam { slot: u8, param: u8, value_normalised: f32 },
    SlotCustom { slot: u8, custom: u8, value_normalised: f32 },
    ChannelVolume { slot: u8, value: f32 },
    ChannelPan { slot: u8, value: f32 },
    ChannelMute { slot: u8, muted: bool },
    ChannelSolo { slot: u8, solo: bool },
    ChannelGainTrim { slot: u8, value_db: f32 },
    ChannelEq { slot: u8, band: EqBand, value: f32 },
    ChannelSend { slot: u8, send: u8, value: f32 },
    FxParam { fx_slot: u8, param: u8, value: f32 },
    FxBypass { fx_slot: u8, bypassed: bool },
    MasterVolume(f32),
    MasterParam { section: MasterSection, param: u8, value: f32 },
    ModParam { mod_slot: u8, param: u8, value: f32 },
    /// Bulk target→offset upload from an external modulation source (spec
    /// §6.1 `/mod/boid/offsets`). Replaces the previous upload wholesale;
    /// held by the engine and re-applied every block until replaced.
    ExternalOffsets(Vec<(u16, f32)>),

    // --- Structural: lifecycle transitions ---
    SlotDescriptor { slot: u8, descriptor_id: String },
    SlotEnvSource { slot: u8, source: u8 },
    SlotClockRate { slot: u8, rate_index: u8 },
    SlotFilterType { slot: u8, filter_type: u8 },
    SlotMidiChannel { slot: u8, channel: u8 },
    ModSlotKind { mod_slot: u8, kind: String },
    ModSlotReset { mod_slot: u8 },
    FxKind { fx_slot: u8, kind: String },
    RouteAdd { source_slot: u8, source_channel: u8, target_index: u16, depth: f32 },
    RouteRemove { source_slot: u8, source_channel: u8, target_index: u16 },
    TransportStart,
    TransportStop,
    Reset,

    // --- Trigger: never dropped under backlog ---
    MidiNoteOn { slot: u8, note: u8, velocity: u8 },
    MidiNoteOff { slot: u8, note: u8 },
    MidiAllNotesOff { slot: u8 },
    Panic,

    // --- Heartbeat ---
    Ping,
    Pong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EqBand {
    Lo,
    Mid,
    Hi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MasterSection {
    Heat,
    Filter,
    Eq,
    Comp,
    Limiter,
}

impl ControlMessage {
    /// Trigger messages are never dropped under backlog pressure (spec
    /// §7's `MessageBacklog` rule).
    pub fn is_trigger(&self) -> bool {
        matches!(
            self,
            ControlMessage::MidiNoteOn { .. }
                | ControlMessage::MidiNoteOff { .. }
                | ControlMessage::MidiAllNotesOff { .. }
                | ControlMessage::Panic
        )
    }
}

/// Outbound telemetry (spec §6.1): level meters and the decimated grid.
#[derive(Debug, Clone, PartialEq)]
pub enum TelemetryMessage {
    SlotLevel { slot: u8, peak: f32, rms: f32 },
    MasterLevel { peak: f32, rms: f32 },
    ModBuses([f32; crate::grid::GRID_SIZE]),
    Pong,
    Disconnected,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_midi_messages_are_triggers() {
        assert!(ControlMessage::MidiNoteOn { slot: 0, note: 60, velocity: 100 }.is_trigger());
        assert!(ControlMessage::Panic.is_trigger());
    }

    #[test]
    fn test_set_messages_are_not_triggers() {
        assert!(!ControlMessage::EngineBpm(120.0).is_trigger());
        assert!(!ControlMessage::ChannelVolume { slot: 0, value: 0.8 }.is_trigger());
    }
}
