//! Generator voice (spec §4.3, component C): the fixed per-slot chain
//! `dsp_kind.render -> ensure_stereo -> multi_filter -> env_vca -> gain`.
//! One instance lives per generator slot; `reset()` is called on a
//! descriptor swap.

use crate::dsp::envelope::{EnvSource, EnvVca};
use crate::dsp::filters::{FilterType, MultiFilter};
use crate::dsp::oscillators::DspKindInstance;
use crate::dsp::utils::db_to_linear;

/// Per-block-resolved inputs a voice needs; assembled by the slot/engine
/// layer from the grid snapshot and the slot's sticky settings.
#[derive(Debug, Clone, Copy)]
pub struct VoiceParams {
    pub pitch_hz: f32,
    pub cutoff_hz: f32,
    pub resonance: f32,
    pub attack_s: f32,
    pub decay_s: f32,
    pub filter_type: FilterType,
    pub env_source: EnvSource,
    pub output_trim_db: f32,
    pub custom: [f32; 5],
}

/// Sub-millisecond one-pole allpass used to decorrelate the right channel
/// from the left so a single mono `dsp_kind` still fills a stereo image
/// (spec §4.3 "ensure_stereo"); the teacher has no equivalent, since its
/// oscillators feed a dynamic patch graph that handles panning elsewhere.
#[derive(Debug, Clone, Copy, Default)]
struct StereoSpread {
    z1: f32,
}

const SPREAD_COEFF: f32 = 0.35;

impl StereoSpread {
    fn widen(&mut self, mono: f32) -> (f32, f32) {
        let allpassed = -SPREAD_COEFF * mono + self.z1;
        self.z1 = mono + SPREAD_COEFF * allpassed;
        (mono, allpassed)
    }

    fn reset(&mut self) {
        self.z1 = 0.0;
    }
}

#[derive(Debug, Clone)]
pub struct GeneratorVoice {
    dsp: DspKindInstance,
    spread: StereoSpread,
    filter: MultiFilter,
    env: EnvVca,
}

impl GeneratorVoice {
    pub fn new(dsp: DspKindInstance) -> Self {
        Self { dsp, spread: StereoSpread::default(), filter: MultiFilter::default(), env: EnvVca::default() }
    }

    pub fn trigger(&mut self) {
        self.dsp.trigger();
    }

    /// Renders one stereo sample through the fixed voice chain.
    pub fn render(&mut self, params: &VoiceParams, trigger_stream: f32, sample_rate: f32) -> (f32, f32) {
        self.dsp.set_pitch(params.pitch_hz);
        for (i, &value) in params.custom.iter().enumerate() {
            self.dsp.set_custom(i, value);
        }

        let mono = self.dsp.render(sample_rate);
        let (left, right) = self.spread.widen(mono);

        let left = self.filter.process(left, params.filter_type, params.cutoff_hz, params.resonance, sample_rate);
        let right = self.filter.process(right, params.filter_type, params.cutoff_hz, params.resonance, sample_rate);

        let left = self.env.process(left, params.env_source, trigger_stream, params.attack_s, params.decay_s, sample_rate);
        let right = self.env.process(right, params.env_source, trigger_stream, params.attack_s, params.decay_s, sample_rate);

        let trim = db_to_linear(params.output_trim_db);
        (left * trim, right * trim)
    }

    /// Swaps in a freshly constructed `dsp_kind`, silencing the chain
    /// (spec §3.7 descriptor swap).
    pub fn swap_dsp_kind(&mut self, dsp: DspKindInstance) {
        self.dsp = dsp;
        self.reset();
    }

    pub fn reset(&mut self) {
        self.dsp.reset();
        self.spread.reset();
        self.filter.reset();
        self.env.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_params() -> VoiceParams {
        VoiceParams {
            pitch_hz: 220.0,
            cutoff_hz: 4000.0,
            resonance: 0.2,
            attack_s: 0.001,
            decay_s: 0.2,
            filter_type: FilterType::Lp,
            env_source: EnvSource::Clock,
            output_trim_db: 0.0,
            custom: [0.0; 5],
        }
    }

    #[test]
    fn test_voice_produces_stereo_output_after_trigger() {
        let mut voice = GeneratorVoice::new(DspKindInstance::Sine(Default::default()));
        let params = default_params();
        let sample_rate = 48000.0;
        let mut peak_l = 0.0f32;
        let mut peak_r = 0.0f32;
        for i in 0..4000 {
            let trig = if i == 0 { 1.0 } else { 0.0 };
            let (l, r) = voice.render(&params, trig, sample_rate);
            peak_l = peak_l.max(l.abs());
            peak_r = peak_r.max(r.abs());
        }
        assert!(peak_l > 0.01);
        assert!(peak_r > 0.01);
    }

    #[test]
    fn test_output_trim_attenuates() {
        let mut loud = GeneratorVoice::new(DspKindInstance::Sine(Default::default()));
        let mut quiet = GeneratorVoice::new(DspKindInstance::Sine(Default::default()));
        let mut loud_params = default_params();
        loud_params.env_source = EnvSource::Off;
        let mut quiet_params = loud_params;
        quiet_params.output_trim_db = -20.0;

        let mut loud_energy = 0.0;
        let mut quiet_energy = 0.0;
        for _ in 0..2000 {
            let (l, _) = loud.render(&loud_params, 0.0, 48000.0);
            loud_energy += l.abs();
            let (l, _) = quiet.render(&quiet_params, 0.0, 48000.0);
            quiet_energy += l.abs();
        }
        assert!(quiet_energy < loud_energy * 0.5);
    }

    #[test]
    fn test_swap_dsp_kind_silences_chain() {
        let mut voice = GeneratorVoice::new(DspKindInstance::Sine(Default::default()));
        let mut params = default_params();
        params.env_source = EnvSource::Off;
        for _ in 0..100 {
            voice.render(&params, 0.0, 48000.0);
        }
        voice.swap_dsp_kind(DspKindInstance::Saw(Default::default()));
        let (l, r) = voice.render(&params, 0.0, 48000.0);
        assert!(l.abs() < 0.2 && r.abs() < 0.2);
    }
}
