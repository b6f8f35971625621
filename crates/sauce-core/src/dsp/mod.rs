pub mod consts;
pub mod dc_blocker;
pub mod dynamics;
pub mod envelope;
pub mod eq;
pub mod filters;
pub mod fx;
pub mod heat;
pub mod meter;
pub mod oscillators;
pub mod utils;

/// The shared per-block step contract every `dsp_kind` synthesis template
/// implements (spec §3.6, §4.3). Closed sum-type dispatch, no dynamic
/// reflection: see `oscillators::DspKindInstance`, expanded by
/// `sauce_derive::dsp_kind_table!`.
pub trait DspKind {
    /// Render one sample at the given sample rate.
    fn render(&mut self, sample_rate: f32) -> f32;
    /// Set the pitch target in Hz (descriptor's `pitch_target` routes MIDI
    /// pitch here; see spec §3.6).
    fn set_pitch(&mut self, hz: f32);
    /// Re-trigger excitation (struck/plucked models; no-op for continuous
    /// oscillators).
    fn trigger(&mut self);
    /// Reset internal state to silence, e.g. on voice swap.
    fn reset(&mut self);
}
