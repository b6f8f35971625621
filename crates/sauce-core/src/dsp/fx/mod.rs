pub mod chorus_flanger;
pub mod echo;
pub mod grain;
pub mod lofi;
pub mod phaser;
pub mod reverb;
pub mod ringmod;
pub mod slot;
pub mod tremolo;

use self::chorus_flanger::{chorus_params, flanger_params, ModulatedDelay};
use self::echo::{TapeEcho, TapeEchoParams};
use self::grain::{GrainFx, GrainParams};
use self::lofi::{LoFi, LoFiParams};
use self::phaser::{Phaser, PhaserParams, PhaserState};
use self::reverb::{Reverb, ReverbParams};
use self::ringmod::{CarrierShape, RingMod, RingModParams};
use self::tremolo::{Tremolo, TremoloParams};

/// Send FX slot kinds (spec §4.5): each reads its send bus 100% wet and
/// writes its return bus. `Empty` passes silence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendFxKind {
    Empty,
    Echo,
    Reverb,
    Chorus,
    Phaser,
    Flanger,
    Tremolo,
    LoFi,
    RingMod,
    Grain,
}

impl SendFxKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "empty" | "" => Some(SendFxKind::Empty),
            "echo" => Some(SendFxKind::Echo),
            "reverb" => Some(SendFxKind::Reverb),
            "chorus" => Some(SendFxKind::Chorus),
            "phaser" => Some(SendFxKind::Phaser),
            "flanger" => Some(SendFxKind::Flanger),
            "tremolo" => Some(SendFxKind::Tremolo),
            "lofi" => Some(SendFxKind::LoFi),
            "ring_mod" => Some(SendFxKind::RingMod),
            "grain" => Some(SendFxKind::Grain),
            _ => None,
        }
    }
}

/// One channel (mono) of an effect instance; the slot holds a pair for
/// true stereo processing. Per-effect params are read out of a flat f32
/// slice populated from the grid's per-FX-slot param block.
#[derive(Debug, Clone)]
pub(crate) enum FxInstance {
    Empty,
    Echo(Box<TapeEcho>),
    Reverb(Box<Reverb>),
    Chorus(Box<ModulatedDelay>),
    Phaser(Box<Phaser>, PhaserState),
    Flanger(Box<ModulatedDelay>),
    Tremolo(Box<Tremolo>),
    LoFi(Box<LoFi>),
    RingMod(Box<RingMod>),
    Grain(Box<GrainFx>),
}

impl FxInstance {
    pub(crate) fn new(kind: SendFxKind) -> Self {
        match kind {
            SendFxKind::Empty => FxInstance::Empty,
            SendFxKind::Echo => FxInstance::Echo(Box::default()),
            SendFxKind::Reverb => FxInstance::Reverb(Box::default()),
            SendFxKind::Chorus => FxInstance::Chorus(Box::default()),
            SendFxKind::Phaser => FxInstance::Phaser(Box::default(), PhaserState::default()),
            SendFxKind::Flanger => FxInstance::Flanger(Box::default()),
            SendFxKind::Tremolo => FxInstance::Tremolo(Box::default()),
            SendFxKind::LoFi => FxInstance::LoFi(Box::default()),
            SendFxKind::RingMod => FxInstance::RingMod(Box::default()),
            SendFxKind::Grain => FxInstance::Grain(Box::default()),
        }
    }

    /// `params` is a fixed 6-slot window out of the grid's master-FX
    /// region, reinterpreted per kind.
    pub(crate) fn process(&mut self, input: f32, params: &[f32; 6], sample_rate: f32) -> f32 {
        match self {
            FxInstance::Empty => 0.0,
            FxInstance::Echo(echo) => echo.process(
                input,
                &TapeEchoParams {
                    delay_s: params[0].max(0.001),
                    feedback: params[1].clamp(0.0, 0.97),
                    tone_hz: params[2].clamp(200.0, 18000.0),
                    wow_rate_hz: params[3].clamp(0.0, 8.0),
                    wow_depth_s: params[4].clamp(0.0, 0.01),
                    crossfeed_gain: params[5].clamp(0.0, 1.0),
                },
                sample_rate,
            ),
            FxInstance::Reverb(reverb) => reverb.process(
                input,
                &ReverbParams {
                    feedback: params[0].clamp(0.0, 0.98),
                    damping: params[1].clamp(0.0, 1.0),
                },
            ),
            FxInstance::Chorus(delay) => {
                delay.process(input, &chorus_params(params[0], params[1], params[2]), sample_rate)
            }
            FxInstance::Phaser(phaser, state) => phaser.process(
                input,
                &PhaserParams {
                    rate_hz: params[0],
                    depth: params[1].clamp(0.0, 1.0),
                    feedback: params[2].clamp(-0.95, 0.95),
                    mix: params[3].clamp(0.0, 1.0),
                },
                state,
                sample_rate,
            ),
            FxInstance::Flanger(delay) => delay.process(
                input,
                &flanger_params(params[0], params[1], params[2], params[3]),
                sample_rate,
            ),
            FxInstance::Tremolo(tremolo) => tremolo.process(
                input,
                &TremoloParams { rate_hz: params[0], depth: params[1].clamp(0.0, 1.0) },
                sample_rate,
            ),
            FxInstance::LoFi(lofi) => lofi.process(
                input,
                &LoFiParams { sample_rate_divisor: params[0].max(1.0), bit_depth: params[1] },
            ),
            FxInstance::RingMod(ring_mod) => ring_mod.process(
                input,
                &RingModParams {
                    carrier_hz: params[0],
                    shape: if params[1] > 0.5 { CarrierShape::Triangle } else { CarrierShape::Sine },
                    mix: params[2].clamp(0.0, 1.0),
                },
                sample_rate,
            ),
            FxInstance::Grain(grain_fx) => grain_fx.process(
                input,
                &GrainParams {
                    grain_rate_hz: params[0].max(0.0),
                    grain_size_s: params[1].max(0.005),
                    scatter: params[2].clamp(0.0, 1.0),
                    mix: params[3].clamp(0.0, 1.0),
                },
                sample_rate,
            ),
        }
    }

    /// Whether this kind is self-oscillating/feedback-capable and must be
    /// DC-blocked + limited at the slot boundary (spec §4.5). Echo and
    /// Reverb already self-limit internally; Phaser/Flanger feed back
    /// through an allpass/delay loop and need the slot-level safety net.
    pub(crate) fn needs_slot_safety(kind: SendFxKind) -> bool {
        matches!(kind, SendFxKind::Phaser | SendFxKind::Flanger)
    }
}
