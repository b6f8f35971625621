//! OSC address parsing/encoding (spec §6.1): translates the wire address
//! scheme to and from `sauce_core::message::{ControlMessage, TelemetryMessage}`.
//! Grounded on the teacher's (now-legacy) `modular_server::osc` module: same
//! split-on-`/` address matching and `rosc::OscType` destructuring, adapted
//! from the teacher's free-form patch addressing to this engine's fixed set.

use rosc::{OscBundle, OscMessage, OscPacket, OscTime, OscType};
use sauce_core::grid::GRID_SIZE;
use sauce_core::message::{ControlMessage, EqBand, MasterSection, TelemetryMessage};

/// Result of parsing one inbound OSC packet. `PeerAck` is not a
/// `ControlMessage` — it never reaches the audio thread, only the
/// heartbeat tracker (spec §4.6).
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Control(ControlMessage),
    PeerAck,
}

/// Parses a decoded OSC packet into zero or more inbound events. Bundles
/// are flattened recursively; a malformed individual message is dropped
/// (never fatal — spec §7 treats bad packets as silently ignored, not as
/// a `ValidationError` worth propagating to the control plane).
pub fn parse_packet(packet: &OscPacket) -> Vec<Inbound> {
    match packet {
        OscPacket::Message(message) => parse_message(message).into_iter().collect(),
        OscPacket::Bundle(bundle) => bundle.content.iter().flat_map(parse_packet).collect(),
    }
}

fn f(args: &[OscType], i: usize) -> Option<f32> {
    match args.get(i)? {
        OscType::Float(v) => Some(*v),
        OscType::Double(v) => Some(*v as f32),
        OscType::Int(v) => Some(*v as f32),
        _ => None,
    }
}

fn int(args: &[OscType], i: usize) -> Option<i32> {
    match args.get(i)? {
        OscType::Int(v) => Some(*v),
        OscType::Float(v) => Some(*v as i32),
        _ => None,
    }
}

fn s(args: &[OscType], i: usize) -> Option<&str> {
    match args.get(i)? {
        OscType::String(v) => Some(v.as_str()),
        _ => None,
    }
}

fn standard_param_index(name: &str) -> Option<u8> {
    Some(match name {
        "freq" => 0,
        "cutoff" => 1,
        "res" | "resonance" => 2,
        "attack" => 3,
        "decay" => 4,
        _ => return None,
    })
}

fn master_section_and_param(section: &str, leaf: &str) -> Option<(MasterSection, u8)> {
    Some(match (section, leaf) {
        ("heat", "drive") => (MasterSection::Heat, 0),
        ("heat", "makeup") => (MasterSection::Heat, 1),
        ("heat", "circuit") => (MasterSection::Heat, 2),
        ("filter", "a-cutoff") => (MasterSection::Filter, 0),
        ("filter", "a-resonance") => (MasterSection::Filter, 1),
        ("filter", "b-cutoff") => (MasterSection::Filter, 2),
        ("filter", "b-resonance") => (MasterSection::Filter, 3),
        ("filter", "sync-ratio") => (MasterSection::Filter, 4),
        ("eq", "lo") => (MasterSection::Eq, 0),
        ("eq", "mid") => (MasterSection::Eq, 1),
        ("eq", "hi") => (MasterSection::Eq, 2),
        ("comp", "threshold") => (MasterSection::Comp, 0),
        ("comp", "ratio") => (MasterSection::Comp, 1),
        ("comp", "makeup") => (MasterSection::Comp, 2),
        ("limiter", "ceiling") => (MasterSection::Limiter, 0),
        _ => return None,
    })
}

/// Parses one OSC message against the address set in spec §6.1.
fn parse_message(message: &OscMessage) -> Option<Inbound> {
    let segments: Vec<&str> = message.addr.split('/').filter(|s| !s.is_empty()).collect();
    let args = &message.args;

    let control = match segments.as_slice() {
        ["engine", "ping"] => ControlMessage::Ping,
        ["engine", "pong"] => return Some(Inbound::PeerAck),
        ["engine", "bpm"] => ControlMessage::EngineBpm(f(args, 0)?),
        ["engine", "start"] => ControlMessage::TransportStart,
        ["engine", "stop"] => ControlMessage::TransportStop,
        ["engine", "reset"] => ControlMessage::Reset,
        ["engine", "panic"] => ControlMessage::Panic,

        ["slot", n, "descriptor"] => {
            ControlMessage::SlotDescriptor { slot: parse_slot(n)?, descriptor_id: s(args, 0)?.to_owned() }
        }
        ["slot", n, "param", k] => ControlMessage::SlotParam {
            slot: parse_slot(n)?,
            param: standard_param_index(k)?,
            value_normalised: f(args, 0)?,
        },
        ["slot", n, "custom", j] => {
            ControlMessage::SlotCustom { slot: parse_slot(n)?, custom: j.parse().ok()?, value_normalised: f(args, 0)? }
        }
        ["slot", n, "env-source"] => ControlMessage::SlotEnvSource { slot: parse_slot(n)?, source: int(args, 0)? as u8 },
        ["slot", n, "clock-rate"] => {
            ControlMessage::SlotClockRate { slot: parse_slot(n)?, rate_index: int(args, 0)? as u8 }
        }
        ["slot", n, "filter-type"] => {
            ControlMessage::SlotFilterType { slot: parse_slot(n)?, filter_type: int(args, 0)? as u8 }
        }
        ["slot", n, "midi", "channel"] => {
            ControlMessage::SlotMidiChannel { slot: parse_slot(n)?, channel: int(args, 0)? as u8 }
        }
        ["slot", n, "midi", "note-on"] => ControlMessage::MidiNoteOn {
            slot: parse_slot(n)?,
            note: int(args, 0)? as u8,
            velocity: int(args, 1)? as u8,
        },
        ["slot", n, "midi", "note-off"] => ControlMessage::MidiNoteOff { slot: parse_slot(n)?, note: int(args, 0)? as u8 },
        ["slot", n, "midi", "all-notes-off"] => ControlMessage::MidiAllNotesOff { slot: parse_slot(n)? },

        ["channel", n, "volume"] => ControlMessage::ChannelVolume { slot: parse_slot(n)?, value: f(args, 0)? },
        ["channel", n, "pan"] => ControlMessage::ChannelPan { slot: parse_slot(n)?, value: f(args, 0)? },
        ["channel", n, "mute"] => ControlMessage::ChannelMute { slot: parse_slot(n)?, muted: int(args, 0)? != 0 },
        ["channel", n, "solo"] => ControlMessage::ChannelSolo { slot: parse_slot(n)?, solo: int(args, 0)? != 0 },
        ["channel", n, "gain"] => ControlMessage::ChannelGainTrim { slot: parse_slot(n)?, value_db: f(args, 0)? },
        ["channel", n, "eq", "lo"] => {
            ControlMessage::ChannelEq { slot: parse_slot(n)?, band: EqBand::Lo, value: f(args, 0)? }
        }
        ["channel", n, "eq", "mid"] => {
            ControlMessage::ChannelEq { slot: parse_slot(n)?, band: EqBand::Mid, value: f(args, 0)? }
        }
        ["channel", n, "eq", "hi"] => {
            ControlMessage::ChannelEq { slot: parse_slot(n)?, band: EqBand::Hi, value: f(args, 0)? }
        }
        ["channel", n, "send", j] => {
            ControlMessage::ChannelSend { slot: parse_slot(n)?, send: j.parse().ok()?, value: f(args, 0)? }
        }

        ["fx", j, "kind"] => ControlMessage::FxKind { fx_slot: parse_slot(j)?, kind: s(args, 0)?.to_owned() },
        ["fx", j, "param", k] => {
            ControlMessage::FxParam { fx_slot: parse_slot(j)?, param: k.parse().ok()?, value: f(args, 0)? }
        }
        ["fx", j, "bypass"] => ControlMessage::FxBypass { fx_slot: parse_slot(j)?, bypassed: int(args, 0)? != 0 },

        ["master", "volume"] => ControlMessage::MasterVolume(f(args, 0)?),
        ["master", section, leaf] => {
            let (section, param) = master_section_and_param(section, leaf)?;
            ControlMessage::MasterParam { section, param, value: f(args, 0)? }
        }

        ["mod", "slot", n, "kind"] => ControlMessage::ModSlotKind { mod_slot: parse_slot(n)?, kind: s(args, 0)?.to_owned() },
        ["mod", "slot", n, "param", k] => {
            ControlMessage::ModParam { mod_slot: parse_slot(n)?, param: k.parse().ok()?, value: f(args, 0)? }
        }
        ["mod", "slot", n, "reset"] => ControlMessage::ModSlotReset { mod_slot: parse_slot(n)? },
        ["mod", "route", "add"] => ControlMessage::RouteAdd {
            source_slot: int(args, 0)? as u8,
            source_channel: int(args, 1)? as u8,
            target_index: int(args, 2)? as u16,
            depth: f(args, 3)?,
        },
        ["mod", "route", "remove"] => ControlMessage::RouteRemove {
            source_slot: int(args, 0)? as u8,
            source_channel: int(args, 1)? as u8,
            target_index: int(args, 2)? as u16,
        },
        ["mod", "boid", "offsets"] => {
            let mut offsets = Vec::with_capacity(args.len() / 2);
            let mut i = 0;
            while i + 1 < args.len() {
                let target = int(args, i)? as u16;
                let value = f(args, i + 1)?;
                offsets.push((target, value));
                i += 2;
            }
            ControlMessage::ExternalOffsets(offsets)
        }

        _ => {
            tracing::debug!(addr = %message.addr, "unrecognised control address, ignored");
            return None;
        }
    };

    Some(Inbound::Control(control))
}

fn parse_slot(segment: &str) -> Option<u8> {
    let n: u8 = segment.parse().ok()?;
    Some(n.saturating_sub(1))
}

fn msg(addr: &str, args: Vec<OscType>) -> OscPacket {
    OscPacket::Message(OscMessage { addr: addr.to_owned(), args })
}

fn bundle(content: Vec<OscPacket>) -> OscPacket {
    OscPacket::Bundle(OscBundle { content, timetag: OscTime { seconds: 0, fractional: 1 } })
}

/// Encodes one outbound telemetry event into its OSC wire form (spec
/// §6.1). `ModBuses` is sent as a single 149-float message.
pub fn telemetry_to_osc(message: &TelemetryMessage) -> OscPacket {
    match message {
        TelemetryMessage::SlotLevel { slot, peak, rms } => {
            msg(&format!("/level/slot/{}", slot + 1), vec![OscType::Float(*peak), OscType::Float(*rms)])
        }
        TelemetryMessage::MasterLevel { peak, rms } => {
            msg("/level/master", vec![OscType::Float(*peak), OscType::Float(*rms)])
        }
        TelemetryMessage::ModBuses(values) => {
            debug_assert_eq!(values.len(), GRID_SIZE);
            msg("/mod/buses", values.iter().map(|v| OscType::Float(*v)).collect())
        }
        TelemetryMessage::Pong => msg("/engine/pong", vec![]),
        TelemetryMessage::Disconnected => msg("/engine/status", vec![OscType::String("disconnected".into())]),
    }
}

/// The outbound heartbeat ping (spec §4.6): sent by the control thread on
/// its own 2s cadence, independent of any `ControlMessage`.
pub fn ping_packet() -> OscPacket {
    msg("/engine/ping", vec![])
}

/// Bundles several telemetry events (e.g. a batch of per-slot level
/// readings plus the master reading) into a single OSC packet, mirroring
/// the teacher's `message_to_osc` bundling for `PatchState`.
pub fn bundle_telemetry(messages: &[TelemetryMessage]) -> OscPacket {
    bundle(messages.iter().map(telemetry_to_osc).collect())
}
