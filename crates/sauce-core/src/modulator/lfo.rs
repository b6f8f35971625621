//! LFO modulator core (spec §4.4.1): quadrature phase patterns, 6 base
//! shapes... 5 base shapes + rotation (0..23 steps of 15 degrees), and a
//! per-output polarity toggle. Rotation and pattern interact additively
//! per spec §9's resolved open question.

use crate::dsp::utils::sine_lut;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LfoShape {
    Sine,
    Triangle,
    Saw,
    Square,
    Noise,
}

impl LfoShape {
    pub fn from_index(i: u32) -> Self {
        match i % 5 {
            0 => LfoShape::Sine,
            1 => LfoShape::Triangle,
            2 => LfoShape::Saw,
            3 => LfoShape::Square,
            _ => LfoShape::Noise,
        }
    }
}

/// Six patterns, each four base phase offsets (in cycles, i.e. degrees/360)
/// for outputs A/B/C/D.
pub const PATTERNS: [[f32; 4]; 6] = [
    [0.0, 0.25, 0.5, 0.75],   // Quad
    [0.0, 0.0, 0.5, 0.5],     // Pair
    [0.0, 1.0 / 3.0, 2.0 / 3.0, 0.0], // Tri
    [0.0, 0.125, 0.25, 0.375], // Cascade
    [0.0, 0.5, 0.0, 0.5],     // Mirror
    [0.0, 0.0, 0.0, 0.0],     // Unison
];

fn wave(shape: LfoShape, phase: f32, noise_state: &mut u32) -> f32 {
    let phase = phase.rem_euclid(1.0);
    match shape {
        LfoShape::Sine => sine_lut(phase),
        LfoShape::Triangle => 4.0 * (phase - (phase + 0.5).floor()).abs() - 1.0,
        LfoShape::Saw => phase * 2.0 - 1.0,
        LfoShape::Square => {
            if phase < 0.5 {
                1.0
            } else {
                -1.0
            }
        }
        LfoShape::Noise => {
            let mut x = *noise_state;
            x ^= x << 13;
            x ^= x >> 17;
            x ^= x << 5;
            *noise_state = x;
            (x as f32 / u32::MAX as f32) * 2.0 - 1.0
        }
    }
}

/// Grid params (7-entry window, spec §3.1): rate_hz, shape_index,
/// pattern_index, rotation_steps, polarity_a..d packed as a bitmask in the
/// 7th slot (one bit per output).
#[derive(Debug, Clone)]
pub struct Lfo {
    phase: f32,
    noise_state: u32,
}

impl Default for Lfo {
    fn default() -> Self {
        Self { phase: 0.0, noise_state: 0xACE1_1234 }
    }
}

const ROTATION_STEP_CYCLES: f32 = 15.0 / 360.0;

impl Lfo {
    pub fn process_block(&mut self, params: &[f32; 7], block_seconds: f32) -> [f32; 4] {
        let rate_hz = params[0] * 10.0; // grid stores 0..1, scaled to 0..10 Hz
        let shape = LfoShape::from_index(params[1] as u32);
        let pattern_index = (params[2] as usize) % PATTERNS.len();
        let rotation_steps = (params[3] * 23.0) as u32 % 24;
        let polarity_mask = params[4] as u32;

        self.phase = (self.phase + rate_hz * block_seconds).rem_euclid(1.0);

        let rotation_cycles = rotation_steps as f32 * ROTATION_STEP_CYCLES;
        let base_offsets = PATTERNS[pattern_index];

        let mut outputs = [0.0; 4];
        for (i, offset) in base_offsets.iter().enumerate() {
            let sample = wave(shape, self.phase + offset + rotation_cycles, &mut self.noise_state);
            let inverted = (polarity_mask >> i) & 1 == 1;
            outputs[i] = if inverted { -sample } else { sample };
        }
        outputs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quad_pattern_produces_90_degree_spacing() {
        let mut lfo = Lfo::default();
        // rate 0 so phase stays at 0, isolate pattern offsets only
        let params = [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let outputs = lfo.process_block(&params, 0.0);
        // at phase 0: sine(0)=0, sine(0.25)=1, sine(0.5)=0, sine(0.75)=-1
        assert!(outputs[0].abs() < 0.05);
        assert!((outputs[1] - 1.0).abs() < 0.05);
        assert!(outputs[2].abs() < 0.05);
        assert!((outputs[3] + 1.0).abs() < 0.05);
    }

    #[test]
    fn test_polarity_toggle_negates_single_output() {
        let mut lfo = Lfo::default();
        let params_normal = [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let params_inverted = [0.0, 0.0, 0.0, 0.0, 0b0010 as f32, 0.0, 0.0];
        let mut lfo2 = Lfo::default();
        let normal = lfo.process_block(&params_normal, 0.0);
        let inverted = lfo2.process_block(&params_inverted, 0.0);
        assert!((normal[1] + inverted[1]).abs() < 1e-5);
        assert!((normal[0] - inverted[0]).abs() < 1e-5);
    }

    #[test]
    fn test_rotation_shifts_all_outputs_in_lockstep() {
        let mut lfo_a = Lfo::default();
        let mut lfo_b = Lfo::default();
        let params_no_rotation = [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let params_rotated = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0]; // full rotation range maps ~23 steps
        let a = lfo_a.process_block(&params_no_rotation, 0.0);
        let b = lfo_b.process_block(&params_rotated, 0.0);
        // rotation applies identically to all four outputs, so their
        // pairwise phase relationship (pattern shape) is preserved
        assert!(a != b);
    }
}
