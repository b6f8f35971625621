//! Heat: `HPF(dc_cut) -> gain(drive) -> waveshape(curve, asymmetry) ->
//! LPF(hf_loss) -> gain(makeup)` (spec §4.5 item 1). Circuit presets select
//! waveshaper curve/asymmetry; switching presets lags the coefficient
//! change over a short crossfade window to avoid clicks, matching the
//! teacher's smoothing idiom.

use super::consts::SMOOTHING_COEFF;
use super::dc_blocker::DcBlocker;
use super::filters::{FilterType, MultiFilter};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatCircuit {
    pub asymmetry: f32,
    pub hf_loss_hz: f32,
}

pub const HEAT_CIRCUITS: [HeatCircuit; 3] = [
    HeatCircuit { asymmetry: 0.0, hf_loss_hz: 18000.0 },
    HeatCircuit { asymmetry: 0.3, hf_loss_hz: 9000.0 },
    HeatCircuit { asymmetry: 0.6, hf_loss_hz: 5000.0 },
];

#[derive(Debug, Clone)]
pub struct Heat {
    dc_cut: DcBlocker,
    lpf: MultiFilter,
    smoothed_asymmetry: f32,
    smoothed_hf_loss: f32,
    pub circuit_index: usize,
}

impl Default for Heat {
    fn default() -> Self {
        Self {
            dc_cut: DcBlocker::default(),
            lpf: MultiFilter::default(),
            smoothed_asymmetry: 0.0,
            smoothed_hf_loss: HEAT_CIRCUITS[0].hf_loss_hz,
            circuit_index: 0,
        }
    }
}

fn waveshape(x: f32, asymmetry: f32) -> f32 {
    let biased = x + asymmetry * 0.3;
    biased.tanh()
}

impl Heat {
    pub fn process(&mut self, input: f32, drive_db: f32, makeup_db: f32, sample_rate: f32) -> f32 {
        let target = HEAT_CIRCUITS[self.circuit_index.min(HEAT_CIRCUITS.len() - 1)];
        self.smoothed_asymmetry =
            self.smoothed_asymmetry * SMOOTHING_COEFF + target.asymmetry * (1.0 - SMOOTHING_COEFF);
        self.smoothed_hf_loss =
            self.smoothed_hf_loss * SMOOTHING_COEFF + target.hf_loss_hz * (1.0 - SMOOTHING_COEFF);

        let hp = self.dc_cut.process(input);
        let driven = hp * super::utils::db_to_linear(drive_db);
        let shaped = waveshape(driven, self.smoothed_asymmetry);
        let filtered = self
            .lpf
            .process(shaped, FilterType::Lp, self.smoothed_hf_loss, 0.1, sample_rate);
        filtered * super::utils::db_to_linear(makeup_db)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heat_bounded_output_on_loud_input() {
        let mut heat = Heat::default();
        let mut max = 0.0f32;
        for i in 0..2000 {
            let t = i as f32 / 48000.0;
            let input = (t * std::f32::consts::TAU * 200.0).sin() * 4.0;
            let out = heat.process(input, 12.0, 0.0, 48000.0);
            max = max.max(out.abs());
        }
        assert!(max < 2.0, "heat saturation should bound output, got {max}");
    }
}
