//! `env_vca`: an attack/release envelope driven by either a clock division
//! trigger or a MIDI gate stream (spec §4.3). Grounded on the teacher's
//! `dsp/utilities/adsr.rs` gate-edge-detection idiom, simplified from
//! ADSR to the spec's AR contract and switched from linear to exponential
//! segments as §4.3 specifies.

#[derive(Debug, Clone, Copy, Default)]
pub struct SchmittTrigger {
    high: bool,
}

impl SchmittTrigger {
    /// Rising-edge detect on a dense-zeros/sparse-impulses trigger stream
    /// (spec §4.2's trigger stream contract): any sample above 0.5 counts
    /// as "on".
    pub fn rising_edge(&mut self, value: f32) -> bool {
        let now_high = value > 0.5;
        let rose = now_high && !self.high;
        self.high = now_high;
        rose
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStage {
    Idle,
    Attack,
    Release,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvSource {
    Off,
    Clock,
    Midi,
}

impl EnvSource {
    pub fn from_index(i: u8) -> Self {
        match i {
            1 => EnvSource::Clock,
            2 => EnvSource::Midi,
            _ => EnvSource::Off,
        }
    }
}

/// Exponential-segment AR envelope. `attack`/`decay` are seconds; a new
/// trigger at any stage restarts from the current level (no hard retrigger
/// click) by re-entering the attack stage.
#[derive(Debug, Clone)]
pub struct EnvVca {
    stage: EnvelopeStage,
    level: f32,
    gate: SchmittTrigger,
}

impl Default for EnvVca {
    fn default() -> Self {
        Self {
            stage: EnvelopeStage::Idle,
            level: 0.0,
            gate: SchmittTrigger::default(),
        }
    }
}

/// Exponential coefficient to travel from `from` to `to` over `seconds`,
/// matching the classic "escape velocity" analog-envelope approximation:
/// a one-pole heading toward a target slightly past the destination so it
/// actually reaches it in finite time.
fn exp_coeff(seconds: f32, sample_rate: f32) -> f32 {
    if seconds <= 0.0 {
        return 0.0;
    }
    (-1.0 / (seconds * sample_rate)).exp()
}

const OVERSHOOT: f32 = 1.0001;

impl EnvVca {
    pub fn process(
        &mut self,
        input: f32,
        source: EnvSource,
        trigger_stream: f32,
        attack_s: f32,
        decay_s: f32,
        sample_rate: f32,
    ) -> f32 {
        if source == EnvSource::Off {
            return input;
        }

        if self.gate.rising_edge(trigger_stream) {
            self.stage = EnvelopeStage::Attack;
        }

        match self.stage {
            EnvelopeStage::Idle => {}
            EnvelopeStage::Attack => {
                let coeff = exp_coeff(attack_s, sample_rate);
                let target = OVERSHOOT;
                self.level = target + (self.level - target) * coeff;
                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.stage = EnvelopeStage::Release;
                }
            }
            EnvelopeStage::Release => {
                let coeff = exp_coeff(decay_s, sample_rate);
                self.level *= coeff;
                if self.level < 1e-4 {
                    self.level = 0.0;
                    self.stage = EnvelopeStage::Idle;
                }
            }
        }

        input * self.level
    }

    pub fn reset(&mut self) {
        self.stage = EnvelopeStage::Idle;
        self.level = 0.0;
        self.gate = SchmittTrigger::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_off_source_is_transparent() {
        let mut env = EnvVca::default();
        assert_eq!(env.process(0.5, EnvSource::Off, 0.0, 0.01, 0.1, 48000.0), 0.5);
    }

    #[test]
    fn test_trigger_rises_then_decays() {
        let mut env = EnvVca::default();
        let sample_rate = 48000.0;
        let mut max_level = 0.0f32;
        for i in 0..4000 {
            let trig = if i == 0 { 1.0 } else { 0.0 };
            let out = env.process(1.0, EnvSource::Clock, trig, 0.001, 0.05, sample_rate);
            max_level = max_level.max(out.abs());
        }
        assert!(max_level > 0.9, "expected envelope to reach near unity, got {max_level}");
        // after enough release time it should have decayed back toward idle
        for _ in 0..48000 {
            env.process(1.0, EnvSource::Clock, 0.0, 0.001, 0.05, sample_rate);
        }
        assert_eq!(env.stage, EnvelopeStage::Idle);
    }

    #[test]
    fn test_env_source_from_index() {
        assert_eq!(EnvSource::from_index(0), EnvSource::Off);
        assert_eq!(EnvSource::from_index(1), EnvSource::Clock);
        assert_eq!(EnvSource::from_index(2), EnvSource::Midi);
    }
}
