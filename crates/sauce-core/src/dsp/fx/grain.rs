//! Grain: a small circular capture buffer sampled by overlapping
//! Hann-windowed grains at a controllable rate/size — a simplified
//! granular texturizer, not a full scrub-granular engine (SPEC_FULL.md §4.5
//! explicitly scopes this down from a full granular synthesis engine).

const CAPTURE_SAMPLES: usize = 48_000;
const MAX_GRAINS: usize = 8;

#[derive(Debug, Clone, Copy)]
struct Grain {
    start_in_buffer: usize,
    length: usize,
    position: usize,
    active: bool,
}

impl Default for Grain {
    fn default() -> Self {
        Self { start_in_buffer: 0, length: 0, position: 0, active: false }
    }
}

#[derive(Debug, Clone)]
pub struct GrainFx {
    capture: [f32; CAPTURE_SAMPLES],
    write_pos: usize,
    grains: [Grain; MAX_GRAINS],
    samples_until_next_grain: f32,
}

impl Default for GrainFx {
    fn default() -> Self {
        Self {
            capture: [0.0; CAPTURE_SAMPLES],
            write_pos: 0,
            grains: [Grain::default(); MAX_GRAINS],
            samples_until_next_grain: 0.0,
        }
    }
}

pub struct GrainParams {
    pub grain_rate_hz: f32,
    pub grain_size_s: f32,
    pub scatter: f32,
    pub mix: f32,
}

fn hann(t: f32) -> f32 {
    0.5 - 0.5 * (t * std::f32::consts::TAU).cos()
}

impl GrainFx {
    pub fn process(&mut self, input: f32, params: &GrainParams, sample_rate: f32) -> f32 {
        self.capture[self.write_pos] = input;
        let captured_pos = self.write_pos;
        self.write_pos = (self.write_pos + 1) % CAPTURE_SAMPLES;

        self.samples_until_next_grain -= 1.0;
        if self.samples_until_next_grain <= 0.0 && params.grain_rate_hz > 0.0 {
            self.samples_until_next_grain += sample_rate / params.grain_rate_hz;
            let length = ((params.grain_size_s * sample_rate) as usize).clamp(16, CAPTURE_SAMPLES - 1);
            let scatter_offset =
                ((params.scatter * length as f32) as usize).min(CAPTURE_SAMPLES - 1);
            let start = (captured_pos + CAPTURE_SAMPLES - scatter_offset) % CAPTURE_SAMPLES;
            if let Some(slot) = self.grains.iter_mut().find(|g| !g.active) {
                *slot = Grain { start_in_buffer: start, length, position: 0, active: true };
            }
        }

        let mut wet = 0.0;
        for grain in self.grains.iter_mut() {
            if !grain.active {
                continue;
            }
            let t = grain.position as f32 / grain.length as f32;
            let sample_index = (grain.start_in_buffer + grain.position) % CAPTURE_SAMPLES;
            wet += self.capture[sample_index] * hann(t);
            grain.position += 1;
            if grain.position >= grain.length {
                grain.active = false;
            }
        }

        input * (1.0 - params.mix) + wet * params.mix
    }
}
