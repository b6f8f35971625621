//! SSL-style bus compressor and a look-ahead brick-wall limiter (spec §4.5
//! items 4–5). Neither has a direct teacher analogue (the teacher is an
//! oscillator/filter library with no dynamics processors), so these follow
//! standard feed-forward envelope-follower topology, keeping the same
//! one-pole-smoothing idiom the teacher uses everywhere else.

use super::utils::db_to_linear;

#[derive(Debug, Clone, Copy)]
pub struct CompressorParams {
    pub threshold_db: f32,
    pub ratio: f32,
    pub attack_s: f32,
    pub release_s: f32,
    pub makeup_db: f32,
}

impl Default for CompressorParams {
    fn default() -> Self {
        Self {
            threshold_db: -12.0,
            ratio: 4.0,
            attack_s: 0.005,
            release_s: 0.25,
            makeup_db: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Compressor {
    envelope_db: f32,
}

impl Compressor {
    /// Processes one sample, optionally keyed from an external sidechain
    /// signal instead of `input` itself (spec §4.5 item 4 "optional external
    /// sidechain").
    pub fn process(
        &mut self,
        input: f32,
        sidechain: Option<f32>,
        params: CompressorParams,
        sample_rate: f32,
    ) -> f32 {
        let key = sidechain.unwrap_or(input);
        let key_db = super::utils::linear_to_db(key);

        let attack_coeff = (-1.0 / (params.attack_s.max(1e-4) * sample_rate)).exp();
        let release_coeff = (-1.0 / (params.release_s.max(1e-4) * sample_rate)).exp();
        let coeff = if key_db > self.envelope_db { attack_coeff } else { release_coeff };
        self.envelope_db = key_db + (self.envelope_db - key_db) * coeff;

        let over = self.envelope_db - params.threshold_db;
        let gain_reduction_db = if over > 0.0 {
            over * (1.0 - 1.0 / params.ratio)
        } else {
            0.0
        };

        input * db_to_linear(params.makeup_db - gain_reduction_db)
    }
}

const LOOKAHEAD_SAMPLES: usize = 64;

/// Look-ahead brick-wall limiter: a delay line lets the gain-reduction
/// envelope anticipate the peak before it reaches the output tap.
#[derive(Debug, Clone)]
pub struct Limiter {
    buffer: [f32; LOOKAHEAD_SAMPLES],
    write_pos: usize,
    gain: f32,
    pub ceiling_db: f32,
}

impl Default for Limiter {
    fn default() -> Self {
        Self {
            buffer: [0.0; LOOKAHEAD_SAMPLES],
            write_pos: 0,
            gain: 1.0,
            ceiling_db: super::consts::LIMITER_CEILING_DB,
        }
    }
}

impl Limiter {
    pub fn process(&mut self, input: f32) -> f32 {
        let ceiling = db_to_linear(self.ceiling_db);

        let mut peak_ahead = input.abs();
        for s in self.buffer.iter() {
            peak_ahead = peak_ahead.max(s.abs());
        }
        let target_gain = if peak_ahead > ceiling { ceiling / peak_ahead } else { 1.0 };
        self.gain = self.gain.min(target_gain * 1.0).max(target_gain);
        // fast-attack / slower-release smoothing on the gain envelope
        self.gain = if target_gain < self.gain {
            target_gain
        } else {
            self.gain * 0.999 + target_gain * 0.001
        };

        let delayed = self.buffer[self.write_pos];
        self.buffer[self.write_pos] = input;
        self.write_pos = (self.write_pos + 1) % LOOKAHEAD_SAMPLES;

        (delayed * self.gain).clamp(-ceiling, ceiling)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compressor_reduces_gain_above_threshold() {
        let mut comp = Compressor::default();
        let params = CompressorParams { threshold_db: -12.0, ratio: 4.0, ..Default::default() };
        let mut last = 0.0;
        for _ in 0..10000 {
            last = comp.process(1.0, None, params, 48000.0);
        }
        assert!(last < 1.0, "compressor should attenuate a loud sustained signal");
    }

    #[test]
    fn test_limiter_never_exceeds_ceiling() {
        let mut limiter = Limiter::default();
        let ceiling = db_to_linear(limiter.ceiling_db);
        for i in 0..10000 {
            let input = if i % 500 == 0 { 3.0 } else { 0.1 };
            let out = limiter.process(input);
            assert!(out.abs() <= ceiling + 1e-4);
        }
    }
}
