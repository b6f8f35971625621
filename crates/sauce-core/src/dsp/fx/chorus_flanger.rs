//! Chorus and Flanger share one modulated-short-delay-line topology,
//! differing only in delay range and feedback sign/amount (spec §4.5).

use crate::dsp::utils::sine_lut;

const MAX_DELAY_SAMPLES: usize = 4800;

#[derive(Debug, Clone)]
pub struct ModulatedDelay {
    buffer: [f32; MAX_DELAY_SAMPLES],
    write_pos: usize,
    lfo_phase: f32,
}

impl Default for ModulatedDelay {
    fn default() -> Self {
        Self { buffer: [0.0; MAX_DELAY_SAMPLES], write_pos: 0, lfo_phase: 0.0 }
    }
}

pub struct ModulatedDelayParams {
    pub center_delay_s: f32,
    pub depth_s: f32,
    pub rate_hz: f32,
    pub feedback: f32,
    pub mix: f32,
}

impl ModulatedDelay {
    pub fn process(&mut self, input: f32, params: &ModulatedDelayParams, sample_rate: f32) -> f32 {
        self.lfo_phase = (self.lfo_phase + params.rate_hz / sample_rate).rem_euclid(1.0);
        let mod_delay_s =
            (params.center_delay_s + sine_lut(self.lfo_phase) * params.depth_s).max(0.0001);
        let delay_samples =
            (mod_delay_s * sample_rate).clamp(1.0, (MAX_DELAY_SAMPLES - 1) as f32);

        let read_pos_f = self.write_pos as f32 - delay_samples;
        let read_pos_f = if read_pos_f < 0.0 {
            read_pos_f + MAX_DELAY_SAMPLES as f32
        } else {
            read_pos_f
        };
        let i0 = read_pos_f as usize % MAX_DELAY_SAMPLES;
        let i1 = (i0 + 1) % MAX_DELAY_SAMPLES;
        let frac = read_pos_f.fract();
        let delayed = self.buffer[i0] * (1.0 - frac) + self.buffer[i1] * frac;

        self.buffer[self.write_pos] = input + delayed * params.feedback;
        self.write_pos = (self.write_pos + 1) % MAX_DELAY_SAMPLES;

        input * (1.0 - params.mix) + delayed * params.mix
    }
}

/// Chorus: longer center delay (10-30ms), no negative feedback.
pub fn chorus_params(rate_hz: f32, depth_s: f32, mix: f32) -> ModulatedDelayParams {
    ModulatedDelayParams {
        center_delay_s: 0.02,
        depth_s: depth_s.min(0.008),
        rate_hz,
        feedback: 0.0,
        mix,
    }
}

/// Flanger: short center delay (<10ms) with feedback for the metallic comb.
pub fn flanger_params(rate_hz: f32, depth_s: f32, feedback: f32, mix: f32) -> ModulatedDelayParams {
    ModulatedDelayParams {
        center_delay_s: 0.003,
        depth_s: depth_s.min(0.0025),
        rate_hz,
        feedback: feedback.clamp(-0.95, 0.95),
        mix,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chorus_is_bounded() {
        let mut delay = ModulatedDelay::default();
        let params = chorus_params(0.5, 0.004, 0.5);
        let mut max = 0.0f32;
        for i in 0..20000 {
            let t = i as f32 / 48000.0;
            let input = (t * std::f32::consts::TAU * 220.0).sin();
            max = max.max(delay.process(input, &params, 48000.0).abs());
        }
        assert!(max < 1.5);
    }

    #[test]
    fn test_flanger_feedback_bounded() {
        let mut delay = ModulatedDelay::default();
        let params = flanger_params(0.2, 0.002, 0.9, 0.7);
        let mut max = 0.0f32;
        for i in 0..20000 {
            let input = if i == 0 { 1.0 } else { 0.0 };
            max = max.max(delay.process(input, &params, 48000.0).abs());
        }
        assert!(max < 3.0);
    }
}
