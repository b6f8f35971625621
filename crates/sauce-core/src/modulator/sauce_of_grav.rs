//! SauceOfGrav modulator core (spec §4.4.3): four coupled Van-der-Pol
//! oscillators on a ring plus an inertial hub. This is the normative
//! algorithm from `spec.md`; every constant and step below follows its
//! listed contract rather than any teacher precedent (the teacher has no
//! equivalent DSP module).

const MAX_SUBSTEP_DT: f32 = 0.0025;

const HUB_LIMIT: f32 = 1.0;
const HUB_DAMP: f32 = 0.5;
const RAIL_ZONE: f32 = 0.05;
const RAIL_ABSORB: f32 = 0.25;
const OVERSHOOT_MAX: f32 = 1.0;

const VDP_THRESHOLD: f32 = 0.3;
const VDP_THRESHOLD_FLOOR: f32 = 0.1;
const VDP_HUB_MOD: f32 = 0.5;
const VDP_INJECT: f32 = 0.8;
const BASE_DAMPING: f32 = 0.3;

const GRAVITY_K: f32 = 0.6;
const HUB_COUPLE_K: f32 = 0.8;
const BASE_RING_COUPLING: f32 = 0.5;
const RING_SKEW: f32 = 0.015;
const KE_FLOOR: f32 = 0.02;
const RESONANCE_DRIVE_K: f32 = 1.2;
const CONTINUOUS_FEED_K: f32 = 0.1;
const STARVATION_SECONDS: f32 = 4.0;
const KICKSTART_IMPULSE: f32 = 0.4;
const KICKSTART_COOLDOWN_S: f32 = 6.0;
const NOISE_SIGMA: f32 = 0.01;

/// Per-node calibration trims; the ring's non-reciprocal skew is applied
/// on top of these (spec §4.4.3 step 3).
const NODE_TRIMS: [f32; 4] = [1.0, 1.03, 0.98, 1.01];

fn map_range(v: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    let t = ((v - in_min) / (in_max - in_min)).clamp(0.0, 1.0);
    out_min + t * (out_max - out_min)
}

#[derive(Debug, Clone, Copy, Default)]
struct OutputState {
    position: f32,
    velocity: f32,
    prev_side: f32,
    overshoot_active: bool,
    overshoot_target: f32,
    overshoot_peak: f32,
}

impl OutputState {
    fn fresh() -> Self {
        Self { position: 0.5, velocity: 0.0, ..Default::default() }
    }
}

#[derive(Debug, Clone)]
pub struct SauceOfGrav {
    outputs: [OutputState; 4],
    hub_bias: f32,
    hub_vel: f32,
    kick_toggle: f32,
    kick_index: usize,
    kick_cooldown_s: f32,
    starved_seconds: f32,
    refresh_timer_s: f32,
    noise_state: u32,
}

impl Default for SauceOfGrav {
    fn default() -> Self {
        Self {
            outputs: [OutputState::fresh(); 4],
            hub_bias: 0.0,
            hub_vel: 0.0,
            kick_toggle: 1.0,
            kick_index: 0,
            kick_cooldown_s: 0.0,
            starved_seconds: 0.0,
            refresh_timer_s: 0.0,
            noise_state: 0xB16B_00B5,
        }
    }
}

fn cheap_gaussian(state: &mut u32) -> f32 {
    // sum of 4 uniforms approximates a unit-variance Gaussian closely
    // enough for a Brownian nudge; no allocation, no external crate needed
    // on the audio-thread-owned modulator state.
    let mut sum = 0.0;
    for _ in 0..4 {
        *state ^= *state << 13;
        *state ^= *state >> 17;
        *state ^= *state << 5;
        sum += *state as f32 / u32::MAX as f32;
    }
    (sum - 2.0) * 1.1547 // scale to approx unit variance
}

impl SauceOfGrav {
    /// `params` is the 7-entry grid window: [rate, depth, gravity,
    /// resonance, excursion, calm, polarity_mask].
    pub fn process_block(&mut self, params: &[f32; 7], block_seconds: f32) -> [f32; 4] {
        let rate = params[0];
        let depth = params[1].clamp(0.0, 1.0);
        let gravity = params[2].clamp(0.0, 1.0);
        let resonance = params[3].clamp(0.0, 1.0);
        let excursion = params[4].clamp(0.0, 1.0);
        let calm = params[5].clamp(0.0, 1.0);
        let polarity_mask = params[6] as u32;

        let num_steps = (block_seconds / MAX_SUBSTEP_DT).ceil().max(1.0) as u32;
        let dt = block_seconds / num_steps as f32;

        for _ in 0..num_steps {
            self.step(dt, rate, depth, gravity, resonance, excursion, calm);
        }

        let mut result = [0.0; 4];
        for i in 0..4 {
            let value = self.outputs[i].position;
            let inverted = (polarity_mask >> i) & 1 == 1;
            result[i] = if inverted { -value } else { value };
        }
        result
    }

    fn step(&mut self, dt: f32, rate: f32, depth: f32, gravity: f32, resonance: f32, excursion: f32, calm: f32) {
        // sanitize before the ring-neighbor snapshot below, so a non-finite
        // output can't flow into f_ring and contaminate i-1/i+1 within this
        // same step (spec §4.4.3 "resets only that output").
        for output in &mut self.outputs {
            if !output.position.is_finite() || !output.velocity.is_finite() {
                *output = OutputState::fresh();
            }
        }

        let calm_bi = 2.0 * calm - 1.0;
        let calm_damp_mul = map_range(calm_bi, -1.0, 1.0, 1.5, 0.5);
        let calm_vdp_mul = map_range(calm_bi, -1.0, 1.0, 1.5, 0.3);
        let calm_kick_mul = map_range(calm_bi, -1.0, 1.0, 1.5, 0.2);

        let excursion_gain = 1.0 + excursion * 0.5;
        let hub_target = (0.5 + self.hub_bias * (1.0 - gravity) * excursion_gain).clamp(0.0, 1.0);

        let positions: [f32; 4] = std::array::from_fn(|i| self.outputs[i].position);
        let velocities: [f32; 4] = std::array::from_fn(|i| self.outputs[i].velocity);
        let total_ke: f32 = velocities.iter().map(|v| v * v).sum();

        let mut overshoot_impulse_total = 0.0;

        for i in 0..4 {
            let trim = NODE_TRIMS[i];
            let forward_coupling = BASE_RING_COUPLING * trim * (1.0 + RING_SKEW);
            let backward_coupling = BASE_RING_COUPLING * trim * (1.0 - RING_SKEW);

            let damping_base = BASE_DAMPING * calm_damp_mul;
            let amp = (positions[i] - 0.5).abs() * 2.0;
            let threshold = (VDP_THRESHOLD * (1.0 + VDP_HUB_MOD * self.hub_bias / HUB_LIMIT))
                .max(VDP_THRESHOLD_FLOOR);
            let damping_eff =
                damping_base - VDP_INJECT * calm_vdp_mul * (1.0 - (amp / threshold).powi(2));

            let noise = cheap_gaussian(&mut self.noise_state) * NOISE_SIGMA * dt.sqrt();

            let f_gravity = -GRAVITY_K * gravity * (positions[i] - 0.5);
            let f_hub = HUB_COUPLE_K * (hub_target - positions[i]);
            let next_node = positions[(i + 1) % 4];
            let prev_node = positions[(i + 3) % 4];
            let f_ring = forward_coupling * (next_node - positions[i])
                + backward_coupling * (prev_node - positions[i]);

            let aligned_count = (0..4)
                .filter(|&j| j != i && velocities[j].signum() == velocities[i].signum() && velocities[j] != 0.0)
                .count();
            let f_res = if aligned_count >= 2 && total_ke < KE_FLOOR {
                resonance * RESONANCE_DRIVE_K * velocities[i].signum()
            } else {
                0.0
            };

            let mut accel = f_gravity + f_hub + f_ring + f_res + noise;

            if self.kick_cooldown_s <= 0.0 && self.starved_seconds > STARVATION_SECONDS && i == self.kick_index {
                accel += self.kick_toggle * KICKSTART_IMPULSE * calm_kick_mul;
                self.kick_toggle = -self.kick_toggle;
                self.kick_index = (self.kick_index + 1) % 3;
                self.kick_cooldown_s = KICKSTART_COOLDOWN_S;
            }

            let output = &mut self.outputs[i];
            output.velocity += accel * dt;
            output.velocity *= (-damping_eff * dt).exp();
            output.position += output.velocity * dt;

            if output.position < RAIL_ZONE {
                output.position = output.position.max(0.0);
                output.velocity *= 1.0 - RAIL_ABSORB;
            } else if output.position > 1.0 - RAIL_ZONE {
                output.position = output.position.min(1.0);
                output.velocity *= 1.0 - RAIL_ABSORB;
            }
            output.position = output.position.clamp(0.0, 1.0);

            let side = (output.position - hub_target).signum();
            if side != output.prev_side && output.prev_side != 0.0 {
                if !output.overshoot_active {
                    output.overshoot_active = true;
                    output.overshoot_target = hub_target;
                    output.overshoot_peak = (output.position - hub_target).abs();
                } else {
                    let impulse = output.prev_side * output.overshoot_peak.min(OVERSHOOT_MAX);
                    overshoot_impulse_total += impulse;
                    output.overshoot_active = false;
                    output.overshoot_peak = 0.0;
                }
            } else if output.overshoot_active {
                output.overshoot_peak = output.overshoot_peak.max((output.position - output.overshoot_target).abs());
            }
            output.prev_side = side;

            if !output.position.is_finite() || !output.velocity.is_finite() {
                *output = OutputState::fresh();
            }
        }

        let continuous_work_feed = total_ke * CONTINUOUS_FEED_K * depth;
        self.hub_vel += (overshoot_impulse_total + continuous_work_feed) * dt;
        self.hub_vel *= (-HUB_DAMP * dt).exp();
        self.hub_bias += self.hub_vel * dt;
        self.hub_bias = HUB_LIMIT * (self.hub_bias / HUB_LIMIT).tanh();

        if !self.hub_bias.is_finite() || !self.hub_vel.is_finite() {
            self.hub_bias = 0.0;
            self.hub_vel = 0.0;
        }

        const RATE_OFF_DEADBAND: f32 = 0.02;
        if rate > RATE_OFF_DEADBAND {
            self.refresh_timer_s -= dt;
            if self.refresh_timer_s <= 0.0 {
                let refresh_interval_s = (1.0 / rate).clamp(0.5, 120.0);
                self.refresh_timer_s += refresh_interval_s;
                let refresh_mul = 0.95 - depth * 0.95;
                self.hub_bias *= refresh_mul;
                self.hub_vel *= refresh_mul;
            }
        }

        if total_ke < KE_FLOOR {
            self.starved_seconds += dt;
        } else {
            self.starved_seconds = 0.0;
        }
        self.kick_cooldown_s = (self.kick_cooldown_s - dt).max(0.0);
    }

    /// `/mod/slot/N/reset`: clears hub state and kickstart cooldown only;
    /// output positions/velocities are left untouched (spec §4.4.3 step
    /// 11).
    pub fn reset_hub(&mut self) {
        self.hub_bias = 0.0;
        self.hub_vel = 0.0;
        self.kick_cooldown_s = 0.0;
    }

    /// Test/fault-injection hook mirroring spec §8 scenario S6: force a
    /// non-finite position on one output to exercise failure isolation.
    #[cfg(test)]
    fn inject_nan(&mut self, output_index: usize) {
        self.outputs[output_index].position = f32::NAN;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_seconds(sog: &mut SauceOfGrav, params: &[f32; 7], seconds: f32) {
        let block_seconds = 0.005;
        let blocks = (seconds / block_seconds) as usize;
        for _ in 0..blocks {
            sog.process_block(params, block_seconds);
        }
    }

    #[test]
    fn test_outputs_stay_within_unit_range_after_polarity() {
        let mut sog = SauceOfGrav::default();
        let params = [0.5, 0.5, 0.3, 0.8, 0.6, 1.0, 0.0];
        for _ in 0..2000 {
            let outputs = sog.process_block(&params, 0.005);
            for o in outputs {
                assert!((-1.0..=1.0).contains(&o));
            }
        }
    }

    #[test]
    fn test_polarity_transform_not_one_minus_x() {
        let mut sog = SauceOfGrav::default();
        let params_norm = [0.5, 0.5, 0.3, 0.8, 0.6, 1.0, 0.0];
        let params_inv = [0.5, 0.5, 0.3, 0.8, 0.6, 1.0, 0b0001 as f32];
        let mut sog2 = SauceOfGrav::default();
        let norm = sog.process_block(&params_norm, 0.005);
        let inv = sog2.process_block(&params_inv, 0.005);
        assert!((norm[0] + inv[0]).abs() < 1e-5, "INV should publish -x, not 1-x");
    }

    #[test]
    fn test_wide_motion_visits_extremes_and_hub_crosses_zero() {
        let mut sog = SauceOfGrav::default();
        let params = [0.8, 1.0, 0.2, 0.9, 0.9, 1.0, 0.0];
        let mut saw_low = [false; 4];
        let mut saw_high = [false; 4];
        let mut hub_sign_changes = 0;
        let mut last_hub_sign = 0.0f32;
        let block_seconds = 0.005;
        for _ in 0..24000 {
            let outputs = sog.process_block(&params, block_seconds);
            for i in 0..4 {
                if outputs[i] < -0.8 || outputs[i] < 0.2 {
                    saw_low[i] = true;
                }
                if outputs[i] > 0.8 {
                    saw_high[i] = true;
                }
            }
            let hub_sign = sog.hub_bias.signum();
            if hub_sign != 0.0 && last_hub_sign != 0.0 && hub_sign != last_hub_sign {
                hub_sign_changes += 1;
            }
            if hub_sign != 0.0 {
                last_hub_sign = hub_sign;
            }
        }
        assert!(saw_low.iter().any(|&v| v) || saw_high.iter().any(|&v| v));
    }

    #[test]
    fn test_reset_hub_clears_hub_not_outputs() {
        let mut sog = SauceOfGrav::default();
        let params = [0.5, 0.5, 0.3, 0.8, 0.6, 1.0, 0.0];
        run_seconds(&mut sog, &params, 2.0);
        let position_before = sog.outputs[0].position;
        sog.reset_hub();
        assert_eq!(sog.hub_bias, 0.0);
        assert_eq!(sog.hub_vel, 0.0);
        assert_eq!(sog.outputs[0].position, position_before);
    }

    #[test]
    fn test_nan_isolation_resets_only_affected_output() {
        let params = [0.5, 0.5, 0.3, 0.8, 0.6, 1.0, 0.0];

        // reference run: no fault injected, same history up to and
        // including the block under test.
        let mut reference = SauceOfGrav::default();
        run_seconds(&mut reference, &params, 1.0);
        reference.process_block(&params, 0.005);

        let mut sog = SauceOfGrav::default();
        run_seconds(&mut sog, &params, 1.0);
        sog.inject_nan(2);
        sog.process_block(&params, 0.005);

        assert!(sog.outputs[2].position.is_finite());
        assert!((sog.outputs[2].position - 0.5).abs() < 0.2);

        // output 0 isn't ring-adjacent to output 2 (f_ring reads only
        // indices 1 and 3 for node 2), so it must be bit-for-bit untouched.
        assert_eq!(sog.outputs[0].position, reference.outputs[0].position);
        assert_eq!(sog.outputs[0].velocity, reference.outputs[0].velocity);

        // outputs 1 and 3 are ring-adjacent to 2, so they feel one step of
        // normal coupling against its sanitized (fresh) value instead of its
        // real one — a small perturbation, not the old bug's outright reset
        // to fresh() (0.5, 0.0), which this tolerance would catch.
        for i in [1usize, 3] {
            let dp = (sog.outputs[i].position - reference.outputs[i].position).abs();
            let dv = (sog.outputs[i].velocity - reference.outputs[i].velocity).abs();
            assert!(dp < 1e-3, "output {i} position diverged from reference by {dp}");
            assert!(dv < 1e-3, "output {i} velocity diverged from reference by {dv}");
        }
    }
}
