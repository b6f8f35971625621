//! Tremolo: amplitude modulation by an internal LFO (spec §4.5).

use crate::dsp::utils::sine_lut;

#[derive(Debug, Clone, Default)]
pub struct Tremolo {
    phase: f32,
}

pub struct TremoloParams {
    pub rate_hz: f32,
    pub depth: f32,
}

impl Tremolo {
    pub fn process(&mut self, input: f32, params: &TremoloParams, sample_rate: f32) -> f32 {
        self.phase = (self.phase + params.rate_hz / sample_rate).rem_euclid(1.0);
        let modulation = 1.0 - params.depth.clamp(0.0, 1.0) * (0.5 - 0.5 * sine_lut(self.phase));
        input * modulation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_depth_reaches_near_silence_at_trough() {
        let mut tremolo = Tremolo::default();
        let params = TremoloParams { rate_hz: 1.0, depth: 1.0 };
        let mut min_out = f32::MAX;
        for _ in 0..48000 {
            let out = tremolo.process(1.0, &params, 48000.0).abs();
            min_out = min_out.min(out);
        }
        assert!(min_out < 0.05, "expected near-silence at trough, got {min_out}");
    }

    #[test]
    fn test_zero_depth_is_transparent() {
        let mut tremolo = Tremolo::default();
        let params = TremoloParams { rate_hz: 2.0, depth: 0.0 };
        for _ in 0..1000 {
            assert!((tremolo.process(0.7, &params, 48000.0) - 0.7).abs() < 1e-6);
        }
    }
}
