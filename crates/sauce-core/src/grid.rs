//! The Unified Parameter Grid (spec §3.1, §4.1, component A): 149 control
//! targets shared between control input, modulation, and audio readers.

pub const GRID_SIZE: usize = 149;

pub const GEN_STANDARD_PARAMS_START: usize = 0;
pub const GEN_STANDARD_PARAMS_COUNT: usize = 40;
pub const GEN_CUSTOM_PARAMS_START: usize = 40;
pub const GEN_CUSTOM_PARAMS_COUNT: usize = 40;
pub const MOD_SLOT_PARAMS_START: usize = 80;
pub const MOD_SLOT_PARAMS_COUNT: usize = 28;
pub const CHANNEL_PARAMS_START: usize = 108;
pub const CHANNEL_PARAMS_COUNT: usize = 24;
pub const MASTER_FX_PARAMS_START: usize = 132;
pub const MASTER_FX_PARAMS_COUNT: usize = 17;

pub const GEN_STANDARD_PARAMS_PER_SLOT: usize = 5;
pub const GEN_CUSTOM_PARAMS_PER_SLOT: usize = 5;
pub const MOD_PARAMS_PER_SLOT: usize = 7;
pub const CHANNEL_PARAMS_PER_SLOT: usize = 3;

/// Standard generator param offsets within a slot's 5-entry block.
pub mod gen_standard {
    pub const FREQ: usize = 0;
    pub const CUTOFF: usize = 1;
    pub const RESONANCE: usize = 2;
    pub const ATTACK: usize = 3;
    pub const DECAY: usize = 4;
}

/// Channel-strip param offsets within a slot's 3-entry block.
pub mod channel {
    pub const ECHO_SEND: usize = 0;
    pub const REVERB_SEND: usize = 1;
    pub const PAN: usize = 2;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Linear,
    Exponential,
}

#[derive(Debug, Clone, Copy)]
pub struct GridTarget {
    pub base: f32,
    pub offset_sum: f32,
    pub min: f32,
    pub max: f32,
    pub default: f32,
    pub kind: TargetKind,
}

impl Default for GridTarget {
    fn default() -> Self {
        Self { base: 0.0, offset_sum: 0.0, min: 0.0, max: 1.0, default: 0.0, kind: TargetKind::Linear }
    }
}

impl GridTarget {
    fn new(min: f32, max: f32, default: f32, kind: TargetKind) -> Self {
        Self { base: default, offset_sum: 0.0, min, max, default, kind }
    }

    /// `eff = clamp(base + offset_sum, min, max)` (spec §3.1 invariant).
    pub fn effective(&self) -> f32 {
        (self.base + self.offset_sum).clamp(self.min, self.max)
    }
}

/// The 149-entry grid (spec §3.1, §4.1). Control-thread writes `base`
/// through `set_base`; the audio thread assembles `offset_sum` once per
/// block (see `sauce_engine`'s routing-application step) then reads
/// `snapshot_block`.
#[derive(Debug, Clone)]
pub struct ParamGrid {
    targets: [GridTarget; GRID_SIZE],
}

impl Default for ParamGrid {
    fn default() -> Self {
        let mut targets = [GridTarget::default(); GRID_SIZE];

        for slot in 0..8 {
            let base = GEN_STANDARD_PARAMS_START + slot * GEN_STANDARD_PARAMS_PER_SLOT;
            targets[base + gen_standard::FREQ] = GridTarget::new(20.0, 8000.0, 220.0, TargetKind::Exponential);
            targets[base + gen_standard::CUTOFF] = GridTarget::new(20.0, 20000.0, 2000.0, TargetKind::Exponential);
            targets[base + gen_standard::RESONANCE] = GridTarget::new(0.0, 1.0, 0.1, TargetKind::Linear);
            targets[base + gen_standard::ATTACK] = GridTarget::new(0.001, 5.0, 0.01, TargetKind::Exponential);
            targets[base + gen_standard::DECAY] = GridTarget::new(0.001, 10.0, 0.2, TargetKind::Exponential);

            let custom_base = GEN_CUSTOM_PARAMS_START + slot * GEN_CUSTOM_PARAMS_PER_SLOT;
            for i in 0..GEN_CUSTOM_PARAMS_PER_SLOT {
                targets[custom_base + i] = GridTarget::new(0.0, 1.0, 0.0, TargetKind::Linear);
            }
        }

        for slot in 0..4 {
            let base = MOD_SLOT_PARAMS_START + slot * MOD_PARAMS_PER_SLOT;
            for i in 0..MOD_PARAMS_PER_SLOT {
                targets[base + i] = GridTarget::new(0.0, 1.0, 0.5, TargetKind::Linear);
            }
        }

        for slot in 0..8 {
            let base = CHANNEL_PARAMS_START + slot * CHANNEL_PARAMS_PER_SLOT;
            targets[base + channel::ECHO_SEND] = GridTarget::new(0.0, 1.0, 0.0, TargetKind::Linear);
            targets[base + channel::REVERB_SEND] = GridTarget::new(0.0, 1.0, 0.0, TargetKind::Linear);
            targets[base + channel::PAN] = GridTarget::new(-1.0, 1.0, 0.0, TargetKind::Linear);
        }

        {
            use crate::master_chain::offset as mfx;
            let base = MASTER_FX_PARAMS_START;
            targets[base + mfx::HEAT_DRIVE_DB] = GridTarget::new(0.0, 24.0, 0.0, TargetKind::Linear);
            targets[base + mfx::HEAT_MAKEUP_DB] = GridTarget::new(-24.0, 24.0, 0.0, TargetKind::Linear);
            targets[base + mfx::HEAT_CIRCUIT] = GridTarget::new(0.0, 2.0, 0.0, TargetKind::Linear);
            targets[base + mfx::FILTER_A_CUTOFF] = GridTarget::new(20.0, 20000.0, 18000.0, TargetKind::Exponential);
            targets[base + mfx::FILTER_A_RESONANCE] = GridTarget::new(0.0, 1.0, 0.1, TargetKind::Linear);
            targets[base + mfx::FILTER_B_CUTOFF] = GridTarget::new(20.0, 20000.0, 18000.0, TargetKind::Exponential);
            targets[base + mfx::FILTER_B_RESONANCE] = GridTarget::new(0.0, 1.0, 0.1, TargetKind::Linear);
            targets[base + mfx::FILTER_SYNC_RATIO] = GridTarget::new(0.0, 4.0, 1.0, TargetKind::Linear);
            targets[base + mfx::EQ_LO] = GridTarget::new(0.0, 4.0, 1.0, TargetKind::Linear);
            targets[base + mfx::EQ_MID] = GridTarget::new(0.0, 4.0, 1.0, TargetKind::Linear);
            targets[base + mfx::EQ_HI] = GridTarget::new(0.0, 4.0, 1.0, TargetKind::Linear);
            targets[base + mfx::COMP_THRESHOLD_DB] = GridTarget::new(-60.0, 0.0, -12.0, TargetKind::Linear);
            targets[base + mfx::COMP_RATIO] = GridTarget::new(1.0, 20.0, 4.0, TargetKind::Linear);
            targets[base + mfx::COMP_MAKEUP_DB] = GridTarget::new(0.0, 24.0, 0.0, TargetKind::Linear);
            targets[base + mfx::LIMITER_CEILING_DB] = GridTarget::new(-12.0, 0.0, -0.2, TargetKind::Linear);
            targets[base + mfx::MASTER_GAIN_DB] = GridTarget::new(-24.0, 24.0, 0.0, TargetKind::Linear);
            targets[base + mfx::BYPASS_MASK] = GridTarget::new(0.0, 31.0, 0.0, TargetKind::Linear);
        }

        Self { targets }
    }
}

impl ParamGrid {
    pub fn set_base(&mut self, index: usize, value: f32) {
        if let Some(target) = self.targets.get_mut(index) {
            target.base = value.clamp(target.min, target.max);
        }
    }

    pub fn set_bounds(&mut self, index: usize, min: f32, max: f32, default: f32, kind: TargetKind) {
        if let Some(target) = self.targets.get_mut(index) {
            target.min = min;
            target.max = max;
            target.default = default;
            target.kind = kind;
        }
    }

    pub fn target(&self, index: usize) -> Option<&GridTarget> {
        self.targets.get(index)
    }

    pub fn zero_offsets(&mut self) {
        for target in self.targets.iter_mut() {
            target.offset_sum = 0.0;
        }
    }

    pub fn add_offset(&mut self, index: usize, contribution: f32) {
        if let Some(target) = self.targets.get_mut(index) {
            target.offset_sum += contribution;
        }
    }

    /// Snapshot of all 149 effective values for the current block (spec
    /// §4.1 step 5, run once per block after offsets are assembled).
    pub fn snapshot_block(&self) -> [f32; GRID_SIZE] {
        let mut out = [0.0; GRID_SIZE];
        for (i, target) in self.targets.iter().enumerate() {
            out[i] = target.effective();
        }
        out
    }

    pub fn reset(&mut self) {
        for target in self.targets.iter_mut() {
            target.base = target.default;
            target.offset_sum = 0.0;
        }
    }

    /// Contribution of one routed source for a given depth, honouring the
    /// linear/exponential (log-domain) scaling rule (spec §4.1 step 3).
    pub fn route_contribution(&self, target_index: usize, source_value: f32, depth: f32) -> f32 {
        let Some(target) = self.targets.get(target_index) else {
            return 0.0;
        };
        match target.kind {
            TargetKind::Linear => source_value * depth * (target.max - target.min),
            TargetKind::Exponential => {
                let ratio = if target.min > 0.0 && target.max > 0.0 {
                    (target.max / target.min).ln()
                } else {
                    0.0
                };
                source_value * depth * ratio
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_index_layout_bit_exact() {
        assert_eq!(GEN_STANDARD_PARAMS_START, 0);
        assert_eq!(GEN_STANDARD_PARAMS_COUNT, 40);
        assert_eq!(GEN_CUSTOM_PARAMS_START, 40);
        assert_eq!(GEN_CUSTOM_PARAMS_COUNT, 40);
        assert_eq!(MOD_SLOT_PARAMS_START, 80);
        assert_eq!(MOD_SLOT_PARAMS_COUNT, 28);
        assert_eq!(CHANNEL_PARAMS_START, 108);
        assert_eq!(CHANNEL_PARAMS_COUNT, 24);
        assert_eq!(MASTER_FX_PARAMS_START, 132);
        assert_eq!(MASTER_FX_PARAMS_COUNT, 17);
        assert_eq!(MASTER_FX_PARAMS_START + MASTER_FX_PARAMS_COUNT, GRID_SIZE);
    }

    #[test]
    fn test_grid_invariant_effective_always_in_bounds() {
        let mut grid = ParamGrid::default();
        for i in 0..GRID_SIZE {
            grid.set_base(i, 1e9);
            grid.add_offset(i, -1e9);
            let eff = grid.target(i).unwrap().effective();
            let target = grid.target(i).unwrap();
            assert!(eff >= target.min && eff <= target.max);
        }
    }

    #[test]
    fn test_routing_linearity_constant_negative_one() {
        let mut grid = ParamGrid::default();
        let index = GEN_STANDARD_PARAMS_START + gen_standard::CUTOFF;
        let target = *grid.target(index).unwrap();
        grid.zero_offsets();
        let contribution = grid.route_contribution(index, -1.0, 1.0);
        grid.add_offset(index, contribution);
        let eff = grid.target(index).unwrap().effective();
        let expected = (target.base - (target.max - target.min)).clamp(target.min, target.max);
        assert!((eff - expected).abs() < 1e-3);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut grid = ParamGrid::default();
        grid.set_base(0, 9999.0);
        grid.reset();
        assert_eq!(grid.target(0).unwrap().base, grid.target(0).unwrap().default);
    }
}
