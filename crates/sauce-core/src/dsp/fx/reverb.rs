//! Schroeder/Freeverb-style reverb: four parallel damped comb filters
//! summed into two series allpass filters.

use crate::dsp::dc_blocker::DcBlocker;
use crate::dsp::dynamics::Limiter;

const COMB_LENGTHS: [usize; 4] = [1557, 1617, 1491, 1422];
const ALLPASS_LENGTHS: [usize; 2] = [225, 556];

#[derive(Debug, Clone)]
struct Comb {
    buffer: Vec<f32>,
    pos: usize,
    damp_state: f32,
}

impl Comb {
    fn new(length: usize) -> Self {
        Self { buffer: vec![0.0; length], pos: 0, damp_state: 0.0 }
    }

    fn process(&mut self, input: f32, feedback: f32, damping: f32) -> f32 {
        let out = self.buffer[self.pos];
        self.damp_state = out * (1.0 - damping) + self.damp_state * damping;
        self.buffer[self.pos] = input + self.damp_state * feedback;
        self.pos = (self.pos + 1) % self.buffer.len();
        out
    }
}

#[derive(Debug, Clone)]
struct Allpass {
    buffer: Vec<f32>,
    pos: usize,
}

impl Allpass {
    fn new(length: usize) -> Self {
        Self { buffer: vec![0.0; length], pos: 0 }
    }

    fn process(&mut self, input: f32) -> f32 {
        const FEEDBACK: f32 = 0.5;
        let buffered = self.buffer[self.pos];
        let out = -input + buffered;
        self.buffer[self.pos] = input + buffered * FEEDBACK;
        self.pos = (self.pos + 1) % self.buffer.len();
        out
    }
}

#[derive(Debug, Clone)]
pub struct Reverb {
    combs: [Comb; 4],
    allpasses: [Allpass; 2],
    dc_blocker: DcBlocker,
    limiter: Limiter,
}

impl Default for Reverb {
    fn default() -> Self {
        Self {
            combs: COMB_LENGTHS.map(Comb::new),
            allpasses: ALLPASS_LENGTHS.map(Allpass::new),
            dc_blocker: DcBlocker::default(),
            limiter: Limiter::default(),
        }
    }
}

pub struct ReverbParams {
    pub feedback: f32,
    pub damping: f32,
}

impl Reverb {
    pub fn process(&mut self, input: f32, params: &ReverbParams) -> f32 {
        let mut sum = 0.0;
        for comb in self.combs.iter_mut() {
            sum += comb.process(input, params.feedback, params.damping);
        }
        sum *= 0.25;
        for allpass in self.allpasses.iter_mut() {
            sum = allpass.process(sum);
        }
        let clean = self.dc_blocker.process(sum);
        self.limiter.process(clean)
    }
}
