//! The `dsp_kind` catalog (spec §3.6, §3.9 of SPEC_FULL.md). Each kind
//! mirrors the teacher's single-oscillator module shape (phase accumulator,
//! one-pole-smoothed pitch, LUT interpolation where applicable) generalized
//! from v/oct to direct Hz, since this engine's grid stores real-world
//! units rather than volts.

use super::utils::sine_lut;
use super::DspKind;
use sauce_derive::dsp_kind_table;

fn xorshift32(state: &mut u32) -> f32 {
    let mut x = *state;
    x ^= x << 13;
    x ^= x >> 17;
    x ^= x << 5;
    *state = x;
    (x as f32 / u32::MAX as f32) * 2.0 - 1.0
}

#[derive(Default, Clone)]
pub struct SineOsc {
    phase: f32,
    freq_hz: f32,
}

impl DspKind for SineOsc {
    fn render(&mut self, sample_rate: f32) -> f32 {
        let out = sine_lut(self.phase);
        self.phase = (self.phase + self.freq_hz / sample_rate).rem_euclid(1.0);
        out
    }
    fn set_pitch(&mut self, hz: f32) {
        self.freq_hz = hz.max(0.0);
    }
    fn trigger(&mut self) {}
    fn reset(&mut self) {
        self.phase = 0.0;
    }
}

#[derive(Default, Clone)]
pub struct SawOsc {
    phase: f32,
    freq_hz: f32,
}

impl DspKind for SawOsc {
    fn render(&mut self, sample_rate: f32) -> f32 {
        let out = self.phase * 2.0 - 1.0;
        self.phase = (self.phase + self.freq_hz / sample_rate).rem_euclid(1.0);
        out
    }
    fn set_pitch(&mut self, hz: f32) {
        self.freq_hz = hz.max(0.0);
    }
    fn trigger(&mut self) {}
    fn reset(&mut self) {
        self.phase = 0.0;
    }
}

#[derive(Clone)]
pub struct PulseOsc {
    phase: f32,
    freq_hz: f32,
    pub width: f32,
}

impl Default for PulseOsc {
    fn default() -> Self {
        Self { phase: 0.0, freq_hz: 0.0, width: 0.5 }
    }
}

impl DspKind for PulseOsc {
    fn render(&mut self, sample_rate: f32) -> f32 {
        let out = if self.phase < self.width { 1.0 } else { -1.0 };
        self.phase = (self.phase + self.freq_hz / sample_rate).rem_euclid(1.0);
        out
    }
    fn set_pitch(&mut self, hz: f32) {
        self.freq_hz = hz.max(0.0);
    }
    fn trigger(&mut self) {}
    fn reset(&mut self) {
        self.phase = 0.0;
    }
}

#[derive(Clone)]
pub struct NoiseOsc {
    state: u32,
}

impl Default for NoiseOsc {
    fn default() -> Self {
        Self { state: 0x1234_5678 }
    }
}

impl DspKind for NoiseOsc {
    fn render(&mut self, _sample_rate: f32) -> f32 {
        xorshift32(&mut self.state)
    }
    fn set_pitch(&mut self, _hz: f32) {}
    fn trigger(&mut self) {}
    fn reset(&mut self) {
        self.state = 0x1234_5678;
    }
}

/// Two-operator FM: carrier phase-modulated by a modulator running at
/// `ratio * carrier_freq`, `index` scales modulator depth in radians.
#[derive(Clone)]
pub struct FmPairOsc {
    carrier_phase: f32,
    mod_phase: f32,
    freq_hz: f32,
    pub ratio: f32,
    pub index: f32,
}

impl Default for FmPairOsc {
    fn default() -> Self {
        Self { carrier_phase: 0.0, mod_phase: 0.0, freq_hz: 0.0, ratio: 2.0, index: 1.0 }
    }
}

impl DspKind for FmPairOsc {
    fn render(&mut self, sample_rate: f32) -> f32 {
        let modulator = sine_lut(self.mod_phase) * self.index;
        let out = sine_lut(self.carrier_phase + modulator / std::f32::consts::TAU);
        self.carrier_phase = (self.carrier_phase + self.freq_hz / sample_rate).rem_euclid(1.0);
        self.mod_phase =
            (self.mod_phase + (self.freq_hz * self.ratio) / sample_rate).rem_euclid(1.0);
        out
    }
    fn set_pitch(&mut self, hz: f32) {
        self.freq_hz = hz.max(0.0);
    }
    fn trigger(&mut self) {
        self.mod_phase = 0.0;
    }
    fn reset(&mut self) {
        self.carrier_phase = 0.0;
        self.mod_phase = 0.0;
    }
}

const KARPLUS_MAX_SAMPLES: usize = 4096;

/// Karplus-Strong plucked string: a noise burst excites a feedback delay
/// line whose length sets pitch; a one-pole average damps high frequencies
/// each pass, matching the teacher's string-oscillator contract (freq,
/// damping) without pulling in the Plaits engine it normally wraps.
#[derive(Clone)]
pub struct KarplusOsc {
    buffer: Vec<f32>,
    write_pos: usize,
    freq_hz: f32,
    pub damping: f32,
    noise_state: u32,
    excite_remaining: usize,
}

impl Default for KarplusOsc {
    fn default() -> Self {
        Self {
            buffer: vec![0.0; KARPLUS_MAX_SAMPLES],
            write_pos: 0,
            freq_hz: 110.0,
            damping: 0.5,
            noise_state: 0xC0FF_EE11,
            excite_remaining: 0,
        }
    }
}

impl DspKind for KarplusOsc {
    fn render(&mut self, sample_rate: f32) -> f32 {
        let delay_len = ((sample_rate / self.freq_hz.max(20.0)) as usize)
            .clamp(2, KARPLUS_MAX_SAMPLES - 1);
        let read_pos = (self.write_pos + KARPLUS_MAX_SAMPLES - delay_len) % KARPLUS_MAX_SAMPLES;
        let next_read = (read_pos + 1) % KARPLUS_MAX_SAMPLES;
        let mut sample = (self.buffer[read_pos] + self.buffer[next_read]) * 0.5;
        sample *= 1.0 - self.damping * 0.02;

        if self.excite_remaining > 0 {
            sample += xorshift32(&mut self.noise_state) * 0.9;
            self.excite_remaining -= 1;
        }

        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % KARPLUS_MAX_SAMPLES;
        sample
    }
    fn set_pitch(&mut self, hz: f32) {
        self.freq_hz = hz.max(20.0);
    }
    fn trigger(&mut self) {
        self.excite_remaining = (self.buffer.len() / 4).max(8);
    }
    fn reset(&mut self) {
        self.buffer.iter_mut().for_each(|s| *s = 0.0);
        self.write_pos = 0;
        self.excite_remaining = 0;
    }
}

const WAVETABLE_SIZE: usize = 256;

/// Single-cycle wavetable oscillator; the table defaults to a band-limited
/// approximation of a saw built from additive partials, matching the
/// teacher's wavetable-oscillator contract (freq, table index).
#[derive(Clone)]
pub struct WavetableOsc {
    table: Vec<f32>,
    phase: f32,
    freq_hz: f32,
}

impl Default for WavetableOsc {
    fn default() -> Self {
        let table = (0..WAVETABLE_SIZE)
            .map(|i| {
                let phase = i as f32 / WAVETABLE_SIZE as f32;
                let mut acc = 0.0;
                for harmonic in 1..=8 {
                    acc += (phase * std::f32::consts::TAU * harmonic as f32).sin() / harmonic as f32;
                }
                acc * (2.0 / std::f32::consts::PI)
            })
            .collect();
        Self { table, phase: 0.0, freq_hz: 0.0 }
    }
}

impl DspKind for WavetableOsc {
    fn render(&mut self, sample_rate: f32) -> f32 {
        let out = super::utils::interpolate(&self.table, self.phase, WAVETABLE_SIZE);
        self.phase = (self.phase + self.freq_hz / sample_rate).rem_euclid(1.0);
        out
    }
    fn set_pitch(&mut self, hz: f32) {
        self.freq_hz = hz.max(0.0);
    }
    fn trigger(&mut self) {
        self.phase = 0.0;
    }
    fn reset(&mut self) {
        self.phase = 0.0;
    }
}

dsp_kind_table! {
    enum DspKindInstance {
        Sine(SineOsc),
        Saw(SawOsc),
        Pulse(PulseOsc),
        Noise(NoiseOsc),
        FmPair(FmPairOsc),
        Karplus(KarplusOsc),
        Wavetable(WavetableOsc),
    }
}

impl DspKindInstance {
    /// Resolve a descriptor's `dsp_kind` string (spec §3.6) to a freshly
    /// constructed instance.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sine" => Some(DspKindInstance::Sine(SineOsc::default())),
            "saw" => Some(DspKindInstance::Saw(SawOsc::default())),
            "pulse" => Some(DspKindInstance::Pulse(PulseOsc::default())),
            "noise" => Some(DspKindInstance::Noise(NoiseOsc::default())),
            "fm_pair" => Some(DspKindInstance::FmPair(FmPairOsc::default())),
            "karplus" => Some(DspKindInstance::Karplus(KarplusOsc::default())),
            "wavetable" => Some(DspKindInstance::Wavetable(WavetableOsc::default())),
            _ => None,
        }
    }

    /// Writes a descriptor's custom param onto the kind-specific field it
    /// maps to (spec §3.6); kinds with no custom knobs ignore the write.
    /// `index` is the custom-param slot (0..5) within the generator.
    pub fn set_custom(&mut self, index: usize, value: f32) {
        match (self, index) {
            (DspKindInstance::Pulse(osc), 0) => osc.width = value.clamp(0.01, 0.99),
            (DspKindInstance::FmPair(osc), 0) => osc.ratio = value.max(0.01),
            (DspKindInstance::FmPair(osc), 1) => osc.index = value.max(0.0),
            (DspKindInstance::Karplus(osc), 0) => osc.damping = value.clamp(0.0, 1.0),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sine_osc_period() {
        let mut osc = SineOsc::default();
        osc.set_pitch(100.0);
        let sample_rate = 1000.0;
        let mut samples = Vec::new();
        for _ in 0..10 {
            samples.push(osc.render(sample_rate));
        }
        assert!((samples[0] - 0.0).abs() < 1e-3);
    }

    #[test]
    fn test_karplus_trigger_produces_energy() {
        let mut osc = KarplusOsc::default();
        osc.set_pitch(220.0);
        osc.trigger();
        let energy: f32 = (0..200).map(|_| osc.render(48000.0).abs()).sum();
        assert!(energy > 0.0);
    }

    #[test]
    fn test_from_name_unknown_returns_none() {
        assert!(DspKindInstance::from_name("not_a_kind").is_none());
    }

    #[test]
    fn test_from_name_all_catalog_entries_resolve() {
        for name in ["sine", "saw", "pulse", "noise", "fm_pair", "karplus", "wavetable"] {
            assert!(DspKindInstance::from_name(name).is_some());
        }
    }
}
