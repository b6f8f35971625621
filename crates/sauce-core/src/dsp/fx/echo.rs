//! Tape Echo (spec §4.5 "representative" effect): delay line with internal
//! `tanh`-saturated feedback, a tone LPF, slow "wow" delay-time modulation,
//! and a cross-feed tap into the reverb send bus.

use crate::dsp::dc_blocker::DcBlocker;
use crate::dsp::dynamics::Limiter;
use crate::dsp::filters::{FilterType, MultiFilter};
use crate::dsp::utils::sine_lut;

const MAX_DELAY_SAMPLES: usize = 96_000;

#[derive(Debug, Clone)]
pub struct TapeEcho {
    buffer: Vec<f32>,
    write_pos: usize,
    wow_phase: f32,
    tone_filter: MultiFilter,
    dc_blocker: DcBlocker,
    limiter: Limiter,
    /// Most recent cross-feed sample destined for the reverb send bus.
    pub reverb_crossfeed: f32,
}

impl Default for TapeEcho {
    fn default() -> Self {
        Self {
            buffer: vec![0.0; MAX_DELAY_SAMPLES],
            write_pos: 0,
            wow_phase: 0.0,
            tone_filter: MultiFilter::default(),
            dc_blocker: DcBlocker::default(),
            limiter: Limiter::default(),
            reverb_crossfeed: 0.0,
        }
    }
}

pub struct TapeEchoParams {
    pub delay_s: f32,
    pub feedback: f32,
    pub tone_hz: f32,
    pub wow_rate_hz: f32,
    pub wow_depth_s: f32,
    pub crossfeed_gain: f32,
}

impl TapeEcho {
    pub fn process(&mut self, input: f32, params: &TapeEchoParams, sample_rate: f32) -> f32 {
        self.wow_phase = (self.wow_phase + params.wow_rate_hz / sample_rate).rem_euclid(1.0);
        let wow = sine_lut(self.wow_phase) * params.wow_depth_s;

        let delay_samples =
            ((params.delay_s + wow) * sample_rate).clamp(1.0, (MAX_DELAY_SAMPLES - 1) as f32);
        let read_pos_f = self.write_pos as f32 - delay_samples;
        let read_pos_f = if read_pos_f < 0.0 {
            read_pos_f + MAX_DELAY_SAMPLES as f32
        } else {
            read_pos_f
        };
        let i0 = read_pos_f as usize % MAX_DELAY_SAMPLES;
        let i1 = (i0 + 1) % MAX_DELAY_SAMPLES;
        let frac = read_pos_f.fract();
        let delayed = self.buffer[i0] * (1.0 - frac) + self.buffer[i1] * frac;

        let saturated = (delayed * params.feedback).tanh();
        let toned = self.tone_filter.process(
            saturated,
            FilterType::Lp,
            params.tone_hz,
            0.1,
            sample_rate,
        );

        self.buffer[self.write_pos] = input + toned;
        self.write_pos = (self.write_pos + 1) % MAX_DELAY_SAMPLES;

        self.reverb_crossfeed = delayed * params.crossfeed_gain;

        let clean = self.dc_blocker.process(delayed);
        self.limiter.process(clean)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_echo_produces_delayed_repeat() {
        let mut echo = TapeEcho::default();
        let sample_rate = 48000.0;
        let params = TapeEchoParams {
            delay_s: 0.01,
            feedback: 0.3,
            tone_hz: 8000.0,
            wow_rate_hz: 0.0,
            wow_depth_s: 0.0,
            crossfeed_gain: 0.2,
        };
        echo.process(1.0, &params, sample_rate);
        for _ in 0..1000 {
            echo.process(0.0, &params, sample_rate);
        }
        let mut saw_signal = false;
        for _ in 0..2000 {
            let out = echo.process(0.0, &params, sample_rate);
            if out.abs() > 1e-5 {
                saw_signal = true;
            }
        }
        assert!(saw_signal, "expected a delayed repeat to appear");
    }

    #[test]
    fn test_high_feedback_stays_bounded() {
        let mut echo = TapeEcho::default();
        let params = TapeEchoParams {
            delay_s: 0.005,
            feedback: 0.98,
            tone_hz: 12000.0,
            wow_rate_hz: 0.3,
            wow_depth_s: 0.001,
            crossfeed_gain: 0.0,
        };
        let mut max = 0.0f32;
        for i in 0..20000 {
            let input = if i == 0 { 1.0 } else { 0.0 };
            max = max.max(echo.process(input, &params, 48000.0).abs());
        }
        assert!(max < 1.2, "feedback loop should stay bounded, got {max}");
    }
}
