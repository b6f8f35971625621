pub mod lfo;
pub mod sauce_of_grav;
pub mod sloth;

use lfo::Lfo;
use sauce_of_grav::SauceOfGrav;
use sloth::Sloth;

/// One modulator slot's current kind (spec §3.4). Kind change
/// re-initialises state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModulatorKind {
    Empty,
    Lfo,
    Sloth,
    SauceOfGrav,
}

impl ModulatorKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "empty" | "" => Some(ModulatorKind::Empty),
            "LFO" | "lfo" => Some(ModulatorKind::Lfo),
            "Sloth" | "sloth" => Some(ModulatorKind::Sloth),
            "SauceOfGrav" | "sauce_of_grav" => Some(ModulatorKind::SauceOfGrav),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
enum ModulatorInstance {
    Empty,
    Lfo(Box<Lfo>),
    Sloth(Box<Sloth>),
    SauceOfGrav(Box<SauceOfGrav>),
}

/// A modulator slot (spec §3.4): holds kind-specific state and produces up
/// to four output channels per block, routed to grid targets via
/// `RoutingTable`.
#[derive(Debug, Clone)]
pub struct ModulatorSlot {
    kind: ModulatorKind,
    instance: ModulatorInstance,
}

impl Default for ModulatorSlot {
    fn default() -> Self {
        Self { kind: ModulatorKind::Empty, instance: ModulatorInstance::Empty }
    }
}

impl ModulatorSlot {
    pub fn set_kind(&mut self, kind: ModulatorKind) {
        self.kind = kind;
        self.instance = match kind {
            ModulatorKind::Empty => ModulatorInstance::Empty,
            ModulatorKind::Lfo => ModulatorInstance::Lfo(Box::default()),
            ModulatorKind::Sloth => ModulatorInstance::Sloth(Box::default()),
            ModulatorKind::SauceOfGrav => ModulatorInstance::SauceOfGrav(Box::default()),
        };
    }

    pub fn kind(&self) -> ModulatorKind {
        self.kind
    }

    /// `params` is the 7-entry window from the grid's modulator-slot
    /// region (spec §3.1 layout), meaning differs per kind.
    pub fn process_block(&mut self, params: &[f32; 7], block_seconds: f32) -> [f32; 4] {
        match &mut self.instance {
            ModulatorInstance::Empty => [0.0; 4],
            ModulatorInstance::Lfo(lfo) => lfo.process_block(params, block_seconds),
            ModulatorInstance::Sloth(sloth) => sloth.process_block(block_seconds),
            ModulatorInstance::SauceOfGrav(sog) => sog.process_block(params, block_seconds),
        }
    }

    /// SauceOfGrav-only reset (spec §6.1 `/mod/slot/N/reset`): clears hub
    /// state without touching output positions/velocities.
    pub fn reset_hub(&mut self) {
        if let ModulatorInstance::SauceOfGrav(sog) = &mut self.instance {
            sog.reset_hub();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_slot_produces_zeros() {
        let mut slot = ModulatorSlot::default();
        let out = slot.process_block(&[0.0; 7], 0.01);
        assert_eq!(out, [0.0; 4]);
    }

    #[test]
    fn test_kind_change_reinitialises_state() {
        let mut slot = ModulatorSlot::default();
        slot.set_kind(ModulatorKind::Lfo);
        assert_eq!(slot.kind(), ModulatorKind::Lfo);
        slot.set_kind(ModulatorKind::Sloth);
        assert_eq!(slot.kind(), ModulatorKind::Sloth);
    }

    #[test]
    fn test_from_name_resolves_known_kinds() {
        assert_eq!(ModulatorKind::from_name("LFO"), Some(ModulatorKind::Lfo));
        assert_eq!(ModulatorKind::from_name("SauceOfGrav"), Some(ModulatorKind::SauceOfGrav));
        assert_eq!(ModulatorKind::from_name("bogus"), None);
    }
}
