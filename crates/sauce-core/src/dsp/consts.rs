//! Shared DSP constants: sine lookup table and the one-pole smoothing
//! coefficient used throughout the control-rate parameter smoothers.
//! Mirrors the teacher's `dsp/consts.rs` (`LUT_SINE`, `LUT_SINE_SIZE`).

pub const LUT_SINE_SIZE: usize = 2048;

lazy_static::lazy_static! {
    pub static ref LUT_SINE: Vec<f32> = {
        (0..LUT_SINE_SIZE)
            .map(|i| {
                let phase = i as f32 / LUT_SINE_SIZE as f32;
                (phase * std::f32::consts::TAU).sin()
            })
            .collect()
    };
}

/// One-pole smoothing coefficient for click-free parameter changes; at a
/// typical control-rate update cadence this settles within a few ms.
pub const SMOOTHING_COEFF: f32 = 0.99;

pub const MIN_FILTER_HZ: f32 = 20.0;
pub const LIMITER_CEILING_DB: f32 = -0.2;
