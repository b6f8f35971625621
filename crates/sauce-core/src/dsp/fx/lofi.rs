//! LoFi: sample-rate decimation (zero-order hold) + bit-depth quantisation
//! (spec §4.5).

#[derive(Debug, Clone, Default)]
pub struct LoFi {
    held_sample: f32,
    hold_counter: f32,
}

pub struct LoFiParams {
    pub sample_rate_divisor: f32,
    pub bit_depth: f32,
}

impl LoFi {
    pub fn process(&mut self, input: f32, params: &LoFiParams) -> f32 {
        let divisor = params.sample_rate_divisor.max(1.0);
        self.hold_counter += 1.0;
        if self.hold_counter >= divisor {
            self.hold_counter -= divisor;
            self.held_sample = input;
        }

        let levels = 2f32.powf(params.bit_depth.clamp(1.0, 16.0));
        (self.held_sample * levels).round() / levels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_depth_quantises() {
        let mut lofi = LoFi::default();
        let params = LoFiParams { sample_rate_divisor: 1.0, bit_depth: 2.0 };
        let mut distinct = std::collections::HashSet::new();
        for i in 0..1000 {
            let input = (i as f32 / 1000.0) * 2.0 - 1.0;
            let out = lofi.process(input, &params);
            distinct.insert(out.to_bits());
        }
        assert!(distinct.len() <= 8, "2-bit quantisation should produce few distinct levels, got {}", distinct.len());
    }

    #[test]
    fn test_sample_rate_divisor_holds_value() {
        let mut lofi = LoFi::default();
        let params = LoFiParams { sample_rate_divisor: 4.0, bit_depth: 16.0 };
        let a = lofi.process(1.0, &params);
        let b = lofi.process(-1.0, &params);
        assert!((a - b).abs() < 1e-3, "held sample should not change within the hold window");
    }
}
