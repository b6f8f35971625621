//! `SendFxSlot`: owns one FX kind per slot, click-free on kind swap via a
//! ≥20ms crossfade between the outgoing and incoming instance (spec §4.5).

use super::{FxInstance, SendFxKind};
use crate::dsp::dc_blocker::DcBlocker;
use crate::dsp::dynamics::Limiter;

const FADE_SECONDS: f32 = 0.025;

struct StereoInstance {
    left: FxInstance,
    right: FxInstance,
}

impl StereoInstance {
    fn new(kind: SendFxKind) -> Self {
        Self { left: FxInstance::new(kind), right: FxInstance::new(kind) }
    }

    fn process(&mut self, left: f32, right: f32, params: &[f32; 6], sample_rate: f32) -> (f32, f32) {
        (
            self.left.process(left, params, sample_rate),
            self.right.process(right, params, sample_rate),
        )
    }
}

pub struct SendFxSlot {
    kind: SendFxKind,
    current: StereoInstance,
    outgoing: Option<StereoInstance>,
    fade_elapsed_samples: f32,
    fade_total_samples: f32,
    dc_l: DcBlocker,
    dc_r: DcBlocker,
    limiter_l: Limiter,
    limiter_r: Limiter,
    pub bypassed: bool,
}

impl Default for SendFxSlot {
    fn default() -> Self {
        Self {
            kind: SendFxKind::Empty,
            current: StereoInstance::new(SendFxKind::Empty),
            outgoing: None,
            fade_elapsed_samples: 0.0,
            fade_total_samples: 1.0,
            dc_l: DcBlocker::default(),
            dc_r: DcBlocker::default(),
            limiter_l: Limiter::default(),
            limiter_r: Limiter::default(),
            bypassed: false,
        }
    }
}

impl SendFxSlot {
    pub fn set_kind(&mut self, kind: SendFxKind, sample_rate: f32) {
        if kind == self.kind {
            return;
        }
        let previous = std::mem::replace(&mut self.current, StereoInstance::new(kind));
        self.outgoing = Some(previous);
        self.fade_elapsed_samples = 0.0;
        self.fade_total_samples = (FADE_SECONDS * sample_rate).max(1.0);
        self.kind = kind;
    }

    pub fn kind(&self) -> SendFxKind {
        self.kind
    }

    pub fn process(
        &mut self,
        left: f32,
        right: f32,
        params: &[f32; 6],
        sample_rate: f32,
    ) -> (f32, f32) {
        let (mut out_l, mut out_r) = self.current.process(left, right, params, sample_rate);

        if let Some(outgoing) = self.outgoing.as_mut() {
            let (prev_l, prev_r) = outgoing.process(left, right, params, sample_rate);
            let t = (self.fade_elapsed_samples / self.fade_total_samples).clamp(0.0, 1.0);
            out_l = prev_l * (1.0 - t) + out_l * t;
            out_r = prev_r * (1.0 - t) + out_r * t;
            self.fade_elapsed_samples += 1.0;
            if t >= 1.0 {
                self.outgoing = None;
            }
        }

        if FxInstance::needs_slot_safety(self.kind) {
            out_l = self.limiter_l.process(self.dc_l.process(out_l));
            out_r = self.limiter_r.process(self.dc_r.process(out_r));
        }

        if self.bypassed {
            (left, right)
        } else {
            (out_l, out_r)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_kind_is_silent() {
        let mut slot = SendFxSlot::default();
        let params = [0.0; 6];
        let (l, r) = slot.process(1.0, 1.0, &params, 48000.0);
        assert_eq!((l, r), (0.0, 0.0));
    }

    #[test]
    fn test_kind_swap_has_no_output_discontinuity() {
        let mut slot = SendFxSlot::default();
        let params = [0.2, 0.4, 2000.0, 1.0, 0.003, 0.1];
        let sample_rate = 48000.0;

        slot.set_kind(SendFxKind::Tremolo, sample_rate);
        let mut prev = 0.0;
        let mut max_jump = 0.0f32;
        for i in 0..4000 {
            if i == 1000 {
                slot.set_kind(SendFxKind::RingMod, sample_rate);
            }
            let t = i as f32 / sample_rate;
            let input = (t * std::f32::consts::TAU * 220.0).sin();
            let (l, _r) = slot.process(input, input, &params, sample_rate);
            max_jump = max_jump.max((l - prev).abs());
            prev = l;
        }
        assert!(max_jump < 1.0, "expected crossfade to bound sample-to-sample jump, got {max_jump}");
    }

    #[test]
    fn test_phaser_gets_dc_blocked_and_limited() {
        let mut slot = SendFxSlot::default();
        slot.set_kind(SendFxKind::Phaser, 48000.0);
        let params = [0.3, 0.8, 0.9, 1.0, 0.0, 0.0];
        for _ in 0..2000 {
            let (l, r) = slot.process(1.0, 1.0, &params, 48000.0);
            assert!(l.is_finite() && r.is_finite());
        }
    }
}
