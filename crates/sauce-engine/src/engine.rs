//! The per-block graph walk (spec §4, §5): drain messages, assemble
//! modulation offsets, snapshot the grid, then run generators -> strips ->
//! send FX -> pre-master mixer -> master inserts -> output, exactly once
//! per audio block. Pure computation — no threads, no device I/O, no
//! allocation inside `process_block` itself.

use sauce_core::bus::BusSet;
use sauce_core::clock::Clock;
use sauce_core::descriptor::PitchTarget;
use sauce_core::dsp::envelope::EnvSource;
use sauce_core::dsp::filters::FilterType;
use sauce_core::dsp::fx::slot::SendFxSlot;
use sauce_core::dsp::fx::SendFxKind;
use sauce_core::dsp::meter::{hard_clip_safety, PeakRmsMeter};
use sauce_core::grid::{self, channel, gen_standard, ParamGrid, TargetKind};
use sauce_core::master_chain::{MasterChain, MASTER_FX_WINDOW_SIZE};
use sauce_core::message::{ControlMessage, MasterSection, TelemetryMessage};
use sauce_core::midi::GateStream;
use sauce_core::mixer;
use sauce_core::modulator::{ModulatorKind, ModulatorSlot};
use sauce_core::routing::{Route, RoutingTable};
use sauce_core::slot::SlotState;
use sauce_core::strip::ChannelStrip;
use sauce_core::voice::{GeneratorVoice, VoiceParams};
use sauce_core::NUM_SLOTS;

use crate::worker::{DescriptorMeta, PendingSwap, SwapRequest};

/// Fixed headroom applied at device output regardless of the limiter
/// insert's own ceiling (spec §4.7): a last-resort guard against a runaway
/// feedback path, not a mix decision.
const MASTER_HARD_CEILING_DB: f32 = -0.1;

const TELEMETRY_INTERVAL_SECONDS: f32 = 1.0 / 30.0;

fn midi_note_to_hz(note: u8) -> f32 {
    440.0 * 2f32.powf((note as f32 - 69.0) / 12.0)
}

impl Default for DescriptorMeta {
    fn default() -> Self {
        Self { pitch_target: PitchTarget::Freq, midi_retrig: false, output_trim_db: 0.0, custom_params: Vec::new() }
    }
}

/// The fixed synthesis graph (spec §3, §4): everything the audio callback
/// touches every block, minus device I/O and threading, which live in
/// `audio::AudioHandle`.
pub struct Engine {
    sample_rate: f32,
    block_size: usize,

    grid: ParamGrid,
    buses: BusSet,
    clock: Clock,

    gates: [GateStream; NUM_SLOTS],
    held_notes: [Option<u8>; NUM_SLOTS],
    voices: [GeneratorVoice; NUM_SLOTS],
    voice_meta: [DescriptorMeta; NUM_SLOTS],
    slots: [SlotState; NUM_SLOTS],
    strips: [ChannelStrip; NUM_SLOTS],
    gen_meters: [PeakRmsMeter; NUM_SLOTS],

    modulators: [ModulatorSlot; 4],
    routing: RoutingTable,

    fx_slots: [SendFxSlot; 4],
    fx_params: [[f32; 6]; 4],
    return_levels: [f32; 4],

    master_chain: MasterChain,
    master_meter: PeakRmsMeter,

    external_offsets: Vec<(u16, f32)>,

    telemetry_accum_seconds: f32,
    dropped_message_count: u32,
}

impl Engine {
    pub fn new(sample_rate: f32, block_size: usize) -> Self {
        Self {
            sample_rate,
            block_size,
            grid: ParamGrid::default(),
            buses: BusSet::new(block_size),
            clock: Clock::default(),
            gates: std::array::from_fn(|_| GateStream::default()),
            held_notes: [None; NUM_SLOTS],
            voices: std::array::from_fn(|_| GeneratorVoice::new(sauce_core::dsp::oscillators::DspKindInstance::Sine(Default::default()))),
            voice_meta: std::array::from_fn(|_| DescriptorMeta::default()),
            slots: std::array::from_fn(|_| SlotState::default()),
            strips: std::array::from_fn(|_| ChannelStrip::default()),
            gen_meters: std::array::from_fn(|_| PeakRmsMeter::default()),
            modulators: std::array::from_fn(|_| ModulatorSlot::default()),
            routing: RoutingTable::default(),
            fx_slots: std::array::from_fn(|_| SendFxSlot::default()),
            fx_params: [[0.0; 6]; 4],
            return_levels: [1.0; 4],
            master_chain: MasterChain::default(),
            master_meter: PeakRmsMeter::default(),
            external_offsets: Vec::new(),
            telemetry_accum_seconds: 0.0,
            dropped_message_count: 0,
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Applies one already-dequeued control message (spec §4.6). `swap_requests`
    /// is the channel to the descriptor-swap worker (spec §4.6, §5): a
    /// `SlotDescriptor` message never instantiates DSP state inline, since
    /// that can allocate.
    pub fn apply_message(
        &mut self,
        message: ControlMessage,
        swap_requests: &crossbeam_channel::Sender<SwapRequest>,
    ) -> Option<TelemetryMessage> {
        match message {
            ControlMessage::EngineBpm(bpm) => self.clock.set_bpm(bpm),

            ControlMessage::SlotParam { slot, param, value_normalised } => {
                let index = gen_standard_index(slot, param);
                self.set_normalised(index, value_normalised);
            }
            ControlMessage::SlotCustom { slot, custom, value_normalised } => {
                let index = grid::GEN_CUSTOM_PARAMS_START
                    + slot as usize * grid::GEN_CUSTOM_PARAMS_PER_SLOT
                    + custom as usize;
                self.set_normalised(index, value_normalised);
            }

            ControlMessage::ChannelVolume { slot, value } => {
                self.slot_mut(slot).channel.volume = value;
            }
            ControlMessage::ChannelPan { slot, value } => {
                let index = channel_index(slot, channel::PAN);
                self.grid.set_base(index, value);
                self.slot_mut(slot).channel.pan = value;
            }
            ControlMessage::ChannelMute { slot, muted } => {
                self.slot_mut(slot).channel.mute = muted;
            }
            ControlMessage::ChannelSolo { slot, solo } => {
                self.slot_mut(slot).channel.solo = solo;
            }
            ControlMessage::ChannelGainTrim { slot, value_db } => {
                self.slot_mut(slot).channel.gain_trim_db = value_db;
            }
            ControlMessage::ChannelEq { slot, band, value } => {
                let eq = &mut self.slot_mut(slot).channel.eq;
                match band {
                    sauce_core::message::EqBand::Lo => eq.lo = value,
                    sauce_core::message::EqBand::Mid => eq.mid = value,
                    sauce_core::message::EqBand::Hi => eq.hi = value,
                }
            }
            ControlMessage::ChannelSend { slot, send, value } => match send {
                0 => self.grid.set_base(channel_index(slot, channel::ECHO_SEND), value),
                1 => self.grid.set_base(channel_index(slot, channel::REVERB_SEND), value),
                other => {
                    if let Some(level) = self.slot_mut(slot).channel.send_levels.get_mut(other as usize) {
                        *level = value;
                    }
                }
            },

            ControlMessage::FxParam { fx_slot, param, value } => {
                let fx_slot = fx_slot as usize;
                if fx_slot < 4 {
                    if param == 6 {
                        self.return_levels[fx_slot] = value;
                    } else if (param as usize) < 6 {
                        self.fx_params[fx_slot][param as usize] = value;
                    }
                }
            }
            ControlMessage::FxBypass { fx_slot, bypassed } => {
                if let Some(slot) = self.fx_slots.get_mut(fx_slot as usize) {
                    slot.bypassed = bypassed;
                }
            }

            ControlMessage::MasterVolume(value) => {
                self.grid.set_base(master_index(sauce_core::master_chain::offset::MASTER_GAIN_DB), value);
            }
            ControlMessage::MasterParam { section, param, value } => {
                if let Some(offset) = master_section_offset(section, param) {
                    self.grid.set_base(master_index(offset), value);
                }
            }
            ControlMessage::ModParam { mod_slot, param, value } => {
                let index = grid::MOD_SLOT_PARAMS_START
                    + mod_slot as usize * grid::MOD_PARAMS_PER_SLOT
                    + param as usize;
                self.grid.set_base(index, value);
            }
            ControlMessage::ExternalOffsets(offsets) => {
                self.external_offsets = offsets;
            }

            ControlMessage::SlotDescriptor { slot, descriptor_id } => {
                let _ = swap_requests.send(SwapRequest { slot: slot as usize, descriptor_id });
            }
            ControlMessage::SlotEnvSource { slot, source } => {
                self.slot_mut(slot).sticky.env_source = EnvSource::from_index(source);
            }
            ControlMessage::SlotClockRate { slot, rate_index } => {
                self.slot_mut(slot).sticky.clock_rate_index = rate_index.min(12);
            }
            ControlMessage::SlotFilterType { slot, filter_type } => {
                self.slot_mut(slot).sticky.filter_type = FilterType::from_index(filter_type);
            }
            ControlMessage::SlotMidiChannel { slot, channel } => {
                self.slot_mut(slot).sticky.midi_channel = channel;
            }

            ControlMessage::ModSlotKind { mod_slot, kind } => {
                if let (Some(slot), Some(kind)) =
                    (self.modulators.get_mut(mod_slot as usize), ModulatorKind::from_name(&kind))
                {
                    slot.set_kind(kind);
                }
            }
            ControlMessage::ModSlotReset { mod_slot } => {
                if let Some(slot) = self.modulators.get_mut(mod_slot as usize) {
                    slot.reset_hub();
                }
            }
            ControlMessage::FxKind { fx_slot, kind } => {
                if let (Some(slot), Some(kind)) =
                    (self.fx_slots.get_mut(fx_slot as usize), SendFxKind::from_name(&kind))
                {
                    slot.set_kind(kind, self.sample_rate);
                }
            }
            ControlMessage::RouteAdd { source_slot, source_channel, target_index, depth } => {
                self.routing.add(Route::new(
                    source_slot as usize,
                    source_channel as usize,
                    target_index as usize,
                    depth,
                ));
            }
            ControlMessage::RouteRemove { source_slot, source_channel, target_index } => {
                self.routing.remove(source_slot as usize, source_channel as usize, target_index as usize);
            }
            ControlMessage::TransportStart => self.clock.start(),
            ControlMessage::TransportStop => self.clock.stop(),
            ControlMessage::Reset => self.reset(),

            ControlMessage::MidiNoteOn { slot, note, velocity } => {
                let _ = velocity;
                self.gates[slot as usize].retrig_enabled = self.voice_meta[slot as usize].midi_retrig;
                self.gates[slot as usize].note_on(note);
                self.held_notes[slot as usize] = Some(note);
            }
            ControlMessage::MidiNoteOff { slot, note } => {
                self.gates[slot as usize].note_off(note);
                if self.held_notes[slot as usize] == Some(note) {
                    self.held_notes[slot as usize] = None;
                }
            }
            ControlMessage::MidiAllNotesOff { slot } => {
                self.gates[slot as usize].all_notes_off();
                self.held_notes[slot as usize] = None;
            }
            ControlMessage::Panic => {
                for slot in 0..NUM_SLOTS {
                    self.gates[slot].all_notes_off();
                    self.held_notes[slot] = None;
                    self.voices[slot].reset();
                }
            }

            ControlMessage::Ping => return Some(TelemetryMessage::Pong),
            ControlMessage::Pong => {}
        }
        None
    }

    /// Adopts a descriptor swap completed by the background worker (spec
    /// §4.6): the new voice replaces the old one atomically from the audio
    /// thread's point of view, and the grid's custom-param bounds are
    /// refreshed to the new descriptor's ranges/curves.
    pub fn complete_swap(&mut self, swap: PendingSwap) {
        let PendingSwap { slot, descriptor_id, voice, meta } = swap;
        if slot >= NUM_SLOTS {
            return;
        }
        let custom_base = grid::GEN_CUSTOM_PARAMS_START + slot * grid::GEN_CUSTOM_PARAMS_PER_SLOT;
        for (i, param) in meta.custom_params.iter().enumerate().take(grid::GEN_CUSTOM_PARAMS_PER_SLOT) {
            self.grid.set_bounds(custom_base + i, param.min, param.max, param.default, param.curve.into());
        }
        self.voices[slot] = voice;
        self.voice_meta[slot] = meta;
        self.slots[slot].assign_descriptor(descriptor_id);
    }

    fn reset(&mut self) {
        self.grid.reset();
        self.clock.reset();
        self.routing = RoutingTable::default();
        self.external_offsets.clear();
        for slot in 0..NUM_SLOTS {
            self.gates[slot].all_notes_off();
            self.held_notes[slot] = None;
            self.voices[slot].reset();
        }
    }

    fn slot_mut(&mut self, slot: u8) -> &mut SlotState {
        &mut self.slots[(slot as usize).min(NUM_SLOTS - 1)]
    }

    fn set_normalised(&mut self, index: usize, value_normalised: f32) {
        let Some(target) = self.grid.target(index) else { return };
        let mapped = sauce_core::dsp::utils::map_normalised(
            value_normalised,
            target.min,
            target.max,
            target.kind == TargetKind::Exponential,
        );
        self.grid.set_base(index, mapped);
    }

    /// Runs exactly one audio block: assembles modulation, snapshots the
    /// grid, walks the fixed graph sample-by-sample, and writes `out` (spec
    /// §5). `emit_telemetry` is called at most ~30 times per second with
    /// decimated level readings (spec §4.7, §6.1); it must not allocate.
    pub fn process_block(&mut self, out: &mut [(f32, f32)], mut emit_telemetry: impl FnMut(TelemetryMessage)) {
        debug_assert_eq!(out.len(), self.block_size);
        let block_seconds = self.block_size as f32 / self.sample_rate;

        self.grid.zero_offsets();
        let control_snapshot = self.grid.snapshot_block();

        let mut mod_outputs = [[0.0f32; 4]; 4];
        for (m, slot) in self.modulators.iter_mut().enumerate() {
            let base = grid::MOD_SLOT_PARAMS_START + m * grid::MOD_PARAMS_PER_SLOT;
            let mut window = [0.0f32; 7];
            window.copy_from_slice(&control_snapshot[base..base + grid::MOD_PARAMS_PER_SLOT]);
            mod_outputs[m] = slot.process_block(&window, block_seconds);
        }

        for route in self.routing.enabled_routes() {
            let value = mod_outputs
                .get(route.source_slot)
                .and_then(|channels| channels.get(route.source_channel))
                .copied()
                .unwrap_or(0.0);
            let contribution = self.grid.route_contribution(route.target_index, value, route.effective_depth());
            self.grid.add_offset(route.target_index, contribution);
        }

        for &(target_index, offset) in &self.external_offsets {
            self.grid.add_offset(target_index as usize, offset);
        }

        let eff = self.grid.snapshot_block();
        let solo_active = self.slots.iter().any(|s| s.channel.solo);

        self.buses.clear_all();

        let mut master_window = [0.0f32; MASTER_FX_WINDOW_SIZE];
        master_window.copy_from_slice(&eff[grid::MASTER_FX_PARAMS_START..grid::MASTER_FX_PARAMS_START + grid::MASTER_FX_PARAMS_COUNT]);

        for i in 0..self.block_size {
            let clock_triggers = self.clock.tick(self.sample_rate);

            for slot in 0..NUM_SLOTS {
                let gate_trigger = self.gates[slot].tick(self.sample_rate);
                let sticky = self.slots[slot].sticky;
                let trigger_for_voice = match sticky.env_source {
                    EnvSource::Off => 0.0,
                    EnvSource::Clock => clock_triggers[sticky.clock_rate_index as usize],
                    EnvSource::Midi => gate_trigger,
                };

                let std_base = grid::GEN_STANDARD_PARAMS_START + slot * grid::GEN_STANDARD_PARAMS_PER_SLOT;
                let custom_base = grid::GEN_CUSTOM_PARAMS_START + slot * grid::GEN_CUSTOM_PARAMS_PER_SLOT;

                let mut pitch_hz = eff[std_base + gen_standard::FREQ];
                let mut custom = [0.0f32; 5];
                custom.copy_from_slice(&eff[custom_base..custom_base + 5]);

                if let Some(note) = self.held_notes[slot] {
                    let midi_hz = midi_note_to_hz(note);
                    match self.voice_meta[slot].pitch_target {
                        PitchTarget::Freq => pitch_hz = midi_hz,
                        PitchTarget::Custom0 => custom[0] = midi_hz,
                        PitchTarget::Custom1 => custom[1] = midi_hz,
                        PitchTarget::Custom2 => custom[2] = midi_hz,
                        PitchTarget::Custom3 => custom[3] = midi_hz,
                        PitchTarget::Custom4 => custom[4] = midi_hz,
                    }
                }

                let params = VoiceParams {
                    pitch_hz,
                    cutoff_hz: eff[std_base + gen_standard::CUTOFF],
                    resonance: eff[std_base + gen_standard::RESONANCE],
                    attack_s: eff[std_base + gen_standard::ATTACK],
                    decay_s: eff[std_base + gen_standard::DECAY],
                    filter_type: sticky.filter_type,
                    env_source: sticky.env_source,
                    output_trim_db: self.voice_meta[slot].output_trim_db,
                    custom,
                };

                let (l, r) = self.voices[slot].render(&params, trigger_for_voice, self.sample_rate);
                self.gen_meters[slot].accumulate(0.5 * (l + r));

                let chan_base = grid::CHANNEL_PARAMS_START + slot * grid::CHANNEL_PARAMS_PER_SLOT;
                let mut strip_params = self.slots[slot].channel.to_strip_params();
                strip_params.send_levels[0] = eff[chan_base + channel::ECHO_SEND];
                strip_params.send_levels[1] = eff[chan_base + channel::REVERB_SEND];
                strip_params.pan = eff[chan_base + channel::PAN];

                let strip_out = self.strips[slot].process((l, r), &strip_params, solo_active, self.sample_rate);
                self.buses.dry_sum_bus.add(i, strip_out.dry);
                for (j, send) in strip_out.sends.iter().enumerate() {
                    self.buses.send_bus[j].add(i, *send);
                }
            }

            for j in 0..4 {
                let (sl, sr) = self.buses.send_bus[j].get(i);
                let (rl, rr) = self.fx_slots[j].process(sl, sr, &self.fx_params[j], self.sample_rate);
                self.buses.return_bus[j].set(i, (rl, rr));
            }

            let dry = self.buses.dry_sum_bus.get(i);
            let returns: [(f32, f32); 4] = std::array::from_fn(|j| self.buses.return_bus[j].get(i));
            let pre_master = mixer::sum_pre_master(dry, &returns, &self.return_levels);
            self.buses.pre_master_bus.set(i, pre_master);

            let (ml, mr) = self.master_chain.process(pre_master, &master_window, self.sample_rate);
            let (ml, mr) = (
                hard_clip_safety(ml, MASTER_HARD_CEILING_DB),
                hard_clip_safety(mr, MASTER_HARD_CEILING_DB),
            );

            self.master_meter.accumulate(0.5 * (ml + mr));
            self.buses.master_out.set(i, (ml, mr));
            out[i] = (ml, mr);
        }

        self.telemetry_accum_seconds += block_seconds;
        if self.telemetry_accum_seconds >= TELEMETRY_INTERVAL_SECONDS {
            self.telemetry_accum_seconds -= TELEMETRY_INTERVAL_SECONDS;
            for slot in 0..NUM_SLOTS {
                let reading = self.gen_meters[slot].take_block();
                emit_telemetry(TelemetryMessage::SlotLevel { slot: slot as u8, peak: reading.peak, rms: reading.rms });
            }
            let master_reading = self.master_meter.take_block();
            emit_telemetry(TelemetryMessage::MasterLevel { peak: master_reading.peak, rms: master_reading.rms });
            emit_telemetry(TelemetryMessage::ModBuses(self.grid.snapshot_block()));
        }
    }

    /// Records non-trigger messages dropped under backlog pressure (spec
    /// §7 `MessageBacklog`), returning a telemetry-worthy count and
    /// resetting the counter.
    pub fn record_dropped(&mut self, dropped: u32) -> Option<TelemetryMessage> {
        self.dropped_message_count += dropped;
        if self.dropped_message_count > 0 {
            let count = self.dropped_message_count;
            self.dropped_message_count = 0;
            tracing::warn!(dropped = count, "control message backlog dropped non-trigger messages");
        }
        None
    }
}

fn gen_standard_index(slot: u8, param: u8) -> usize {
    grid::GEN_STANDARD_PARAMS_START + slot as usize * grid::GEN_STANDARD_PARAMS_PER_SLOT + param as usize
}

fn channel_index(slot: u8, offset: usize) -> usize {
    grid::CHANNEL_PARAMS_START + slot as usize * grid::CHANNEL_PARAMS_PER_SLOT + offset
}

fn master_index(offset: usize) -> usize {
    grid::MASTER_FX_PARAMS_START + offset
}

fn master_section_offset(section: MasterSection, param: u8) -> Option<usize> {
    use sauce_core::master_chain::offset as mfx;
    let param = param as usize;
    Some(match section {
        MasterSection::Heat => match param {
            0 => mfx::HEAT_DRIVE_DB,
            1 => mfx::HEAT_MAKEUP_DB,
            2 => mfx::HEAT_CIRCUIT,
            _ => return None,
        },
        MasterSection::Filter => match param {
            0 => mfx::FILTER_A_CUTOFF,
            1 => mfx::FILTER_A_RESONANCE,
            2 => mfx::FILTER_B_CUTOFF,
            3 => mfx::FILTER_B_RESONANCE,
            4 => mfx::FILTER_SYNC_RATIO,
            _ => return None,
        },
        MasterSection::Eq => match param {
            0 => mfx::EQ_LO,
            1 => mfx::EQ_MID,
            2 => mfx::EQ_HI,
            _ => return None,
        },
        MasterSection::Comp => match param {
            0 => mfx::COMP_THRESHOLD_DB,
            1 => mfx::COMP_RATIO,
            2 => mfx::COMP_MAKEUP_DB,
            _ => return None,
        },
        MasterSection::Limiter => match param {
            0 => mfx::LIMITER_CEILING_DB,
            _ => return None,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn silent_block(engine: &mut Engine) -> Vec<(f32, f32)> {
        let mut out = vec![(0.0, 0.0); engine.block_size()];
        engine.process_block(&mut out, |_| {});
        out
    }

    #[test]
    fn test_empty_engine_produces_silence() {
        let mut engine = Engine::new(48000.0, 128);
        let out = silent_block(&mut engine);
        assert!(out.iter().all(|&(l, r)| l == 0.0 && r == 0.0));
    }

    #[test]
    fn test_sine_voice_with_midi_trigger_produces_output() {
        let mut engine = Engine::new(48000.0, 256);
        let (tx, _rx) = crossbeam_channel::unbounded();
        engine.complete_swap(PendingSwap {
            slot: 0,
            descriptor_id: "sine_test".into(),
            voice: GeneratorVoice::new(sauce_core::dsp::oscillators::DspKindInstance::Sine(Default::default())),
            meta: DescriptorMeta::default(),
        });
        engine.apply_message(ControlMessage::SlotEnvSource { slot: 0, source: 2 }, &tx);
        engine.apply_message(ControlMessage::MidiNoteOn { slot: 0, note: 69, velocity: 100 }, &tx);

        let mut peak = 0.0f32;
        for _ in 0..40 {
            let out = silent_block(&mut engine);
            for (l, r) in out {
                peak = peak.max(l.abs()).max(r.abs());
            }
        }
        assert!(peak > 0.01, "expected audible output once midi-gated, got peak {peak}");
    }

    #[test]
    fn test_panic_silences_all_held_notes() {
        let mut engine = Engine::new(48000.0, 128);
        let (tx, _rx) = crossbeam_channel::unbounded();
        engine.apply_message(ControlMessage::MidiNoteOn { slot: 0, note: 60, velocity: 100 }, &tx);
        assert_eq!(engine.held_notes[0], Some(60));
        engine.apply_message(ControlMessage::Panic, &tx);
        assert_eq!(engine.held_notes[0], None);
    }

    #[test]
    fn test_descriptor_swap_request_is_sent_not_instantiated_inline() {
        let mut engine = Engine::new(48000.0, 128);
        let (tx, rx) = crossbeam_channel::unbounded();
        engine.apply_message(ControlMessage::SlotDescriptor { slot: 2, descriptor_id: "saw_basic".into() }, &tx);
        let request = rx.try_recv().expect("expected a swap request");
        assert_eq!(request.slot, 2);
        assert_eq!(request.descriptor_id, "saw_basic");
    }

    #[test]
    fn test_ping_replies_with_pong() {
        let mut engine = Engine::new(48000.0, 128);
        let (tx, _rx) = crossbeam_channel::unbounded();
        assert_eq!(engine.apply_message(ControlMessage::Ping, &tx), Some(TelemetryMessage::Pong));
    }

    #[test]
    fn test_external_offsets_apply_every_block_until_replaced() {
        let mut engine = Engine::new(48000.0, 128);
        let (tx, _rx) = crossbeam_channel::unbounded();
        let index = gen_standard_index(0, grid::gen_standard::RESONANCE as u8);
        engine.apply_message(ControlMessage::ExternalOffsets(vec![(index as u16, 0.3)]), &tx);
        silent_block(&mut engine);
        assert!((engine.grid.target(index).unwrap().offset_sum - 0.3).abs() < 1e-6);
        silent_block(&mut engine);
        assert!((engine.grid.target(index).unwrap().offset_sum - 0.3).abs() < 1e-6, "offset must survive past the next block's zero_offsets()");
    }

    #[test]
    fn test_master_param_routes_into_grid() {
        let mut engine = Engine::new(48000.0, 128);
        let (tx, _rx) = crossbeam_channel::unbounded();
        engine.apply_message(ControlMessage::MasterVolume(-6.0), &tx);
        let index = master_index(sauce_core::master_chain::offset::MASTER_GAIN_DB);
        assert!((engine.grid.target(index).unwrap().base - (-6.0)).abs() < 1e-6);
    }
}
