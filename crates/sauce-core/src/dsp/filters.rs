//! State-variable filter, grounded on the teacher's `dsp/filters/state_variable.rs`
//! Chamberlin topology, generalized from v/oct cutoff to direct Hz and from
//! a fixed LP output to a selectable LP/HP/BP output (spec §4.3
//! `multi_filter`).

use super::consts::{MIN_FILTER_HZ, SMOOTHING_COEFF};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    Lp,
    Hp,
    Bp,
}

impl FilterType {
    pub fn from_index(i: u8) -> Self {
        match i {
            1 => FilterType::Hp,
            2 => FilterType::Bp,
            _ => FilterType::Lp,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct SvfCore {
    z1_low: f32,
    z1_band: f32,
    smoothed_cutoff: f32,
    smoothed_resonance: f32,
}

impl SvfCore {
    /// Returns `(low, band, high)` for this step.
    fn step(&mut self, input: f32, cutoff_hz: f32, resonance: f32, sample_rate: f32) -> (f32, f32, f32) {
        self.smoothed_cutoff =
            self.smoothed_cutoff * SMOOTHING_COEFF + cutoff_hz * (1.0 - SMOOTHING_COEFF);
        self.smoothed_resonance =
            self.smoothed_resonance * SMOOTHING_COEFF + resonance * (1.0 - SMOOTHING_COEFF);

        let freq = self.smoothed_cutoff.clamp(MIN_FILTER_HZ, sample_rate * 0.45);
        let f = 2.0 * (std::f32::consts::PI * freq / sample_rate).sin();
        let q = (1.0 - self.smoothed_resonance.clamp(0.0, 1.0) * 0.95).max(0.05);

        let high = input - self.z1_low - q * self.z1_band;
        let band = f * high + self.z1_band;
        let low = f * band + self.z1_low;

        self.z1_band = band.clamp(-5.0, 5.0);
        self.z1_low = low.clamp(-5.0, 5.0);

        (self.z1_low, self.z1_band, high.clamp(-5.0, 5.0))
    }
}

/// Selectable LP/HP/BP filter driven from the grid's `cutoff`/`resonance`
/// targets; output clamped per the teacher's SVF clamp convention.
#[derive(Debug, Clone, Default)]
pub struct MultiFilter {
    core: SvfCore,
}

impl MultiFilter {
    pub fn process(
        &mut self,
        input: f32,
        filter_type: FilterType,
        cutoff_hz: f32,
        resonance: f32,
        sample_rate: f32,
    ) -> f32 {
        let (low, band, high) = self.core.step(input, cutoff_hz, resonance, sample_rate);
        match filter_type {
            FilterType::Lp => low,
            FilterType::Hp => high,
            FilterType::Bp => band,
        }
    }

    pub fn reset(&mut self) {
        self.core = SvfCore::default();
    }
}

/// Two SVFs, optionally frequency-synced (`f2 = f1 / ratio`), combinable in
/// series or parallel for the master insert chain's dual-filter stage
/// (spec §4.5 item 2).
#[derive(Debug, Clone, Default)]
pub struct DualFilter {
    filter_a: MultiFilter,
    filter_b: MultiFilter,
    pub serial: bool,
    pub sync_ratio: Option<f32>,
}

impl DualFilter {
    pub fn process(
        &mut self,
        input: f32,
        type_a: FilterType,
        cutoff_a_hz: f32,
        resonance_a: f32,
        type_b: FilterType,
        cutoff_b_hz: f32,
        resonance_b: f32,
        sample_rate: f32,
    ) -> f32 {
        let cutoff_b_hz = match self.sync_ratio {
            Some(ratio) if ratio > 0.0 => cutoff_a_hz / ratio,
            _ => cutoff_b_hz,
        };

        if self.serial {
            let mid = self
                .filter_a
                .process(input, type_a, cutoff_a_hz, resonance_a, sample_rate);
            let out = self
                .filter_b
                .process(mid, type_b, cutoff_b_hz, resonance_b, sample_rate);
            out.clamp(-1.2, 1.2)
        } else {
            let a = self
                .filter_a
                .process(input, type_a, cutoff_a_hz, resonance_a, sample_rate);
            let b = self
                .filter_b
                .process(input, type_b, cutoff_b_hz, resonance_b, sample_rate);
            ((a + b) * 0.5).clamp(-1.2, 1.2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_lp_attenuates_above_cutoff() {
        let mut filter = MultiFilter::default();
        let sample_rate = 48000.0;
        // warm up the smoother
        for _ in 0..2000 {
            filter.process(0.0, FilterType::Lp, 500.0, 0.2, sample_rate);
        }
        let mut peak = 0.0f32;
        for i in 0..2000 {
            let t = i as f32 / sample_rate;
            let input = (t * std::f32::consts::TAU * 8000.0).sin();
            let out = filter.process(input, FilterType::Lp, 500.0, 0.2, sample_rate);
            peak = peak.max(out.abs());
        }
        assert!(peak < 0.5, "expected low-pass attenuation, got peak {peak}");
    }

    #[test]
    fn test_output_never_exceeds_clamp() {
        let mut filter = MultiFilter::default();
        for _ in 0..5000 {
            let out = filter.process(10.0, FilterType::Bp, 1000.0, 0.99, 48000.0);
            assert!(out <= 5.0 && out >= -5.0);
        }
    }

    #[test]
    fn test_filter_type_from_index() {
        assert_eq!(FilterType::from_index(0), FilterType::Lp);
        assert_eq!(FilterType::from_index(1), FilterType::Hp);
        assert_eq!(FilterType::from_index(2), FilterType::Bp);
        assert_relative_eq!(1.0, 1.0);
    }
}
