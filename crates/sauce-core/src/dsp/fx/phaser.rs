//! Phaser: a cascade of first-order allpass stages with an LFO-swept
//! coefficient (spec §4.5).

use crate::dsp::utils::sine_lut;

const NUM_STAGES: usize = 6;

#[derive(Debug, Clone, Copy, Default)]
struct AllpassStage {
    z1: f32,
}

impl AllpassStage {
    fn process(&mut self, input: f32, coeff: f32) -> f32 {
        let out = -coeff * input + self.z1;
        self.z1 = input + coeff * out;
        out
    }
}

#[derive(Debug, Clone)]
pub struct Phaser {
    stages: [AllpassStage; NUM_STAGES],
    lfo_phase: f32,
}

impl Default for Phaser {
    fn default() -> Self {
        Self { stages: [AllpassStage::default(); NUM_STAGES], lfo_phase: 0.0 }
    }
}

pub struct PhaserParams {
    pub rate_hz: f32,
    pub depth: f32,
    pub feedback: f32,
    pub mix: f32,
}

#[derive(Default)]
pub struct PhaserState {
    feedback_sample: f32,
}

impl Phaser {
    pub fn process(&mut self, input: f32, params: &PhaserParams, state: &mut PhaserState, sample_rate: f32) -> f32 {
        self.lfo_phase = (self.lfo_phase + params.rate_hz / sample_rate).rem_euclid(1.0);
        let coeff = (sine_lut(self.lfo_phase) * params.depth).clamp(-0.95, 0.95);

        let mut sig = input + state.feedback_sample * params.feedback;
        for stage in self.stages.iter_mut() {
            sig = stage.process(sig, coeff);
        }
        state.feedback_sample = sig;

        input * (1.0 - params.mix) + sig * params.mix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phaser_bounded_output() {
        let mut phaser = Phaser::default();
        let mut state = PhaserState::default();
        let params = PhaserParams { rate_hz: 0.3, depth: 0.8, feedback: 0.4, mix: 0.6 };
        let mut max = 0.0f32;
        for i in 0..20000 {
            let t = i as f32 / 48000.0;
            let input = (t * std::f32::consts::TAU * 300.0).sin();
            max = max.max(phaser.process(input, &params, &mut state, 48000.0).abs());
        }
        assert!(max < 3.0);
    }
}
