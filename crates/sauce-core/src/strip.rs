//! Channel strip (spec §4.3, component D): `eq3_iso -> amp -> pan2 -> fader
//! -> mute/solo gating -> dry_sum_bus + 4 post-fader send writes`. Sends are
//! tapped post-fader/post-pan (spec §9 resolved open question), so a
//! channel's send contribution is identical in balance to what reaches the
//! dry bus, just scaled by each send's level.

use crate::dsp::eq::{Eq3, Eq3Gains};
use crate::dsp::utils::db_to_linear;

pub const NUM_SENDS: usize = 4;

#[derive(Debug, Clone, Copy)]
pub struct StripParams {
    pub eq: Eq3Gains,
    pub amp_trim_db: f32,
    pub pan: f32,
    pub volume: f32,
    pub muted: bool,
    pub solo: bool,
    pub send_levels: [f32; NUM_SENDS],
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StripOutput {
    pub dry: (f32, f32),
    pub sends: [(f32, f32); NUM_SENDS],
}

/// Equal-power pan law, `pan` in `[-1, 1]`.
fn pan2(input: (f32, f32), pan: f32) -> (f32, f32) {
    let angle = (pan.clamp(-1.0, 1.0) + 1.0) * 0.25 * std::f32::consts::PI;
    let (left_gain, right_gain) = (angle.cos(), angle.sin());
    (input.0 * left_gain, input.1 * right_gain)
}

#[derive(Debug, Clone, Default)]
pub struct ChannelStrip {
    eq_l: Eq3,
    eq_r: Eq3,
}

impl ChannelStrip {
    /// `solo_active` is the process-wide flag: true if any strip in the
    /// mixer currently has `solo` set (spec §8 property 3).
    pub fn process(
        &mut self,
        input: (f32, f32),
        params: &StripParams,
        solo_active: bool,
        sample_rate: f32,
    ) -> StripOutput {
        let eq_l = self.eq_l.process(input.0, params.eq, sample_rate);
        let eq_r = self.eq_r.process(input.1, params.eq, sample_rate);

        let trim = db_to_linear(params.amp_trim_db);
        let amped = (eq_l * trim, eq_r * trim);

        let panned = pan2(amped, params.pan);
        let faded = (panned.0 * params.volume, panned.1 * params.volume);

        let silenced = params.muted || (solo_active && !params.solo);
        if silenced {
            return StripOutput::default();
        }

        let mut sends = [(0.0, 0.0); NUM_SENDS];
        for (i, send) in sends.iter_mut().enumerate() {
            let level = params.send_levels[i];
            *send = (faded.0 * level, faded.1 * level);
        }

        StripOutput { dry: faded, sends }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> StripParams {
        StripParams {
            eq: Eq3Gains { lo: 1.0, mid: 1.0, hi: 1.0, ..Default::default() },
            amp_trim_db: 0.0,
            pan: 0.0,
            volume: 1.0,
            muted: false,
            solo: false,
            send_levels: [0.0; NUM_SENDS],
        }
    }

    #[test]
    fn test_center_pan_balances_channels() {
        let out = pan2((1.0, 1.0), 0.0);
        assert!((out.0 - out.1).abs() < 1e-5);
    }

    #[test]
    fn test_hard_left_silences_right() {
        let out = pan2((1.0, 1.0), -1.0);
        assert!(out.1.abs() < 1e-5);
        assert!(out.0.abs() > 0.9);
    }

    #[test]
    fn test_muted_strip_produces_silence_including_sends() {
        let mut strip = ChannelStrip::default();
        let mut p = params();
        p.muted = true;
        p.send_levels = [0.5; NUM_SENDS];
        let out = strip.process((1.0, 1.0), &p, false, 48000.0);
        assert_eq!(out.dry, (0.0, 0.0));
        assert!(out.sends.iter().all(|&s| s == (0.0, 0.0)));
    }

    #[test]
    fn test_solo_active_mutes_non_soloed_strips() {
        let mut strip = ChannelStrip::default();
        let p = params();
        let out = strip.process((1.0, 1.0), &p, true, 48000.0);
        assert_eq!(out.dry, (0.0, 0.0));
    }

    #[test]
    fn test_mute_takes_precedence_over_solo() {
        let mut strip = ChannelStrip::default();
        let mut p = params();
        p.solo = true;
        p.muted = true;
        let out = strip.process((1.0, 1.0), &p, true, 48000.0);
        assert_eq!(out.dry, (0.0, 0.0));
    }

    #[test]
    fn test_sends_scale_by_send_level_post_fader() {
        let mut strip = ChannelStrip::default();
        let mut p = params();
        p.volume = 0.5;
        p.send_levels = [1.0, 0.0, 0.0, 0.0];
        let out = strip.process((1.0, 1.0), &p, false, 48000.0);
        assert!((out.sends[0].0 - out.dry.0).abs() < 1e-5);
        assert_eq!(out.sends[1], (0.0, 0.0));
    }
}
