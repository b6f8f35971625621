//! Master insert chain (spec §4.5, component G): `Heat -> DualFilter ->
//! Eq3 -> Compressor -> Limiter -> master gain`, each insert individually
//! bypassable via an equal-power crossfade rather than a hard switch, so
//! toggling bypass mid-block never clicks.

use crate::dsp::dynamics::{Compressor, CompressorParams, Limiter};
use crate::dsp::eq::{Eq3, Eq3Gains};
use crate::dsp::filters::{DualFilter, FilterType};
use crate::dsp::heat::Heat;
use crate::dsp::utils::db_to_linear;

/// Offsets within the 17-entry master-FX grid window (spec §3.1).
pub mod offset {
    pub const HEAT_DRIVE_DB: usize = 0;
    pub const HEAT_MAKEUP_DB: usize = 1;
    pub const HEAT_CIRCUIT: usize = 2;
    pub const FILTER_A_CUTOFF: usize = 3;
    pub const FILTER_A_RESONANCE: usize = 4;
    pub const FILTER_B_CUTOFF: usize = 5;
    pub const FILTER_B_RESONANCE: usize = 6;
    pub const FILTER_SYNC_RATIO: usize = 7;
    pub const EQ_LO: usize = 8;
    pub const EQ_MID: usize = 9;
    pub const EQ_HI: usize = 10;
    pub const COMP_THRESHOLD_DB: usize = 11;
    pub const COMP_RATIO: usize = 12;
    pub const COMP_MAKEUP_DB: usize = 13;
    pub const LIMITER_CEILING_DB: usize = 14;
    pub const MASTER_GAIN_DB: usize = 15;
    pub const BYPASS_MASK: usize = 16;
}

pub const MASTER_FX_WINDOW_SIZE: usize = 17;

const FADE_SECONDS: f32 = 0.02;

/// Smoothed dry/wet mix driven toward 0 (bypassed) or 1 (active) and
/// applied through an equal-power (sin/cos) law.
#[derive(Debug, Clone, Copy)]
struct InsertBypass {
    mix: f32,
}

impl Default for InsertBypass {
    fn default() -> Self {
        Self { mix: 1.0 }
    }
}

impl InsertBypass {
    fn apply(&mut self, bypassed: bool, dry: f32, wet: f32, sample_rate: f32) -> f32 {
        let target = if bypassed { 0.0 } else { 1.0 };
        let coeff = (-1.0 / (FADE_SECONDS * sample_rate)).exp();
        self.mix = target + (self.mix - target) * coeff;
        let angle = self.mix.clamp(0.0, 1.0) * std::f32::consts::FRAC_PI_2;
        dry * angle.cos() + wet * angle.sin()
    }
}

#[derive(Debug, Clone, Default)]
struct ChannelInserts {
    heat: Heat,
    dual_filter: DualFilter,
    eq: Eq3,
    compressor: Compressor,
    limiter: Limiter,
}

#[derive(Debug, Clone, Default)]
pub struct MasterChain {
    left: ChannelInserts,
    right: ChannelInserts,
    bypass_heat: InsertBypass,
    bypass_filter: InsertBypass,
    bypass_eq: InsertBypass,
    bypass_comp: InsertBypass,
    bypass_limiter: InsertBypass,
}

fn process_channel(
    channel: &mut ChannelInserts,
    bypass_heat: &mut InsertBypass,
    bypass_filter: &mut InsertBypass,
    bypass_eq: &mut InsertBypass,
    bypass_comp: &mut InsertBypass,
    bypass_limiter: &mut InsertBypass,
    input: f32,
    params: &[f32; MASTER_FX_WINDOW_SIZE],
    sample_rate: f32,
) -> f32 {
    let mask = params[offset::BYPASS_MASK] as u32;
    let heat_bypassed = mask & 0b00001 != 0;
    let filter_bypassed = mask & 0b00010 != 0;
    let eq_bypassed = mask & 0b00100 != 0;
    let comp_bypassed = mask & 0b01000 != 0;
    let limiter_bypassed = mask & 0b10000 != 0;

    channel.heat.circuit_index = params[offset::HEAT_CIRCUIT].round() as usize;
    let heated = channel.heat.process(
        input,
        params[offset::HEAT_DRIVE_DB],
        params[offset::HEAT_MAKEUP_DB],
        sample_rate,
    );
    let stage1 = bypass_heat.apply(heat_bypassed, input, heated, sample_rate);

    let filtered = channel.dual_filter.process(
        stage1,
        FilterType::Lp,
        params[offset::FILTER_A_CUTOFF],
        params[offset::FILTER_A_RESONANCE],
        FilterType::Lp,
        params[offset::FILTER_B_CUTOFF],
        params[offset::FILTER_B_RESONANCE],
        sample_rate,
    );
    let stage2 = bypass_filter.apply(filter_bypassed, stage1, filtered, sample_rate);

    let eq_gains = Eq3Gains {
        lo: params[offset::EQ_LO],
        mid: params[offset::EQ_MID],
        hi: params[offset::EQ_HI],
        ..Default::default()
    };
    let eqd = channel.eq.process(stage2, eq_gains, sample_rate);
    let stage3 = bypass_eq.apply(eq_bypassed, stage2, eqd, sample_rate);

    let comp_params = CompressorParams {
        threshold_db: params[offset::COMP_THRESHOLD_DB],
        ratio: params[offset::COMP_RATIO].max(1.0),
        makeup_db: params[offset::COMP_MAKEUP_DB],
        ..Default::default()
    };
    let compressed = channel.compressor.process(stage3, None, comp_params, sample_rate);
    let stage4 = bypass_comp.apply(comp_bypassed, stage3, compressed, sample_rate);

    channel.limiter.ceiling_db = params[offset::LIMITER_CEILING_DB];
    let limited = channel.limiter.process(stage4);
    let stage5 = bypass_limiter.apply(limiter_bypassed, stage4, limited, sample_rate);

    stage5 * db_to_linear(params[offset::MASTER_GAIN_DB])
}

impl MasterChain {
    pub fn process(&mut self, input: (f32, f32), params: &[f32; MASTER_FX_WINDOW_SIZE], sample_rate: f32) -> (f32, f32) {
        let left = process_channel(
            &mut self.left,
            &mut self.bypass_heat,
            &mut self.bypass_filter,
            &mut self.bypass_eq,
            &mut self.bypass_comp,
            &mut self.bypass_limiter,
            input.0,
            params,
            sample_rate,
        );
        // both channels share one bypass-mix state per insert so L/R never
        // drift out of phase when toggling bypass mid-block; the mix value
        // was already advanced by the left-channel call above.
        let right = {
            let mut dummy_heat = self.bypass_heat;
            let mut dummy_filter = self.bypass_filter;
            let mut dummy_eq = self.bypass_eq;
            let mut dummy_comp = self.bypass_comp;
            let mut dummy_limiter = self.bypass_limiter;
            process_channel(
                &mut self.right,
                &mut dummy_heat,
                &mut dummy_filter,
                &mut dummy_eq,
                &mut dummy_comp,
                &mut dummy_limiter,
                input.1,
                params,
                sample_rate,
            )
        };
        (left, right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passthrough_params() -> [f32; MASTER_FX_WINDOW_SIZE] {
        let mut params = [0.0; MASTER_FX_WINDOW_SIZE];
        params[offset::HEAT_DRIVE_DB] = 0.0;
        params[offset::FILTER_A_CUTOFF] = 18000.0;
        params[offset::FILTER_B_CUTOFF] = 18000.0;
        params[offset::EQ_LO] = 1.0;
        params[offset::EQ_MID] = 1.0;
        params[offset::EQ_HI] = 1.0;
        params[offset::COMP_THRESHOLD_DB] = 0.0;
        params[offset::COMP_RATIO] = 1.0;
        params[offset::LIMITER_CEILING_DB] = 0.0;
        params[offset::MASTER_GAIN_DB] = 0.0;
        params[offset::BYPASS_MASK] = 0.0;
        params
    }

    #[test]
    fn test_bypassing_everything_settles_to_near_unity_gain() {
        let mut chain = MasterChain::default();
        let mut params = passthrough_params();
        params[offset::BYPASS_MASK] = 0b11111 as f32;
        let sample_rate = 48000.0;
        let mut last = (0.0, 0.0);
        for _ in 0..8000 {
            last = chain.process((0.3, -0.3), &params, sample_rate);
        }
        assert!((last.0 - 0.3).abs() < 0.05);
        assert!((last.1 + 0.3).abs() < 0.05);
    }

    #[test]
    fn test_master_gain_applies_in_db() {
        let mut chain = MasterChain::default();
        let mut params = passthrough_params();
        params[offset::BYPASS_MASK] = 0b11111 as f32;
        params[offset::MASTER_GAIN_DB] = -6.0;
        let sample_rate = 48000.0;
        let mut last = (0.0, 0.0);
        for _ in 0..8000 {
            last = chain.process((1.0, 1.0), &params, sample_rate);
        }
        assert!((last.0 - db_to_linear(-6.0)).abs() < 0.05);
    }

    #[test]
    fn test_output_always_finite() {
        let mut chain = MasterChain::default();
        let params = passthrough_params();
        for i in 0..4000 {
            let input = if i % 100 == 0 { (5.0, -5.0) } else { (0.2, -0.2) };
            let (l, r) = chain.process(input, &params, 48000.0);
            assert!(l.is_finite() && r.is_finite());
        }
    }
}
