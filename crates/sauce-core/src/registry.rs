//! Pack/descriptor registry (spec §3.8, component L): validates and holds
//! generator descriptors. Does not own any synthesis DSP state itself.

use std::collections::HashMap;

use crate::descriptor::{validate, GeneratorDescriptor};
use crate::errors::EngineError;

#[derive(Debug, Default)]
pub struct DescriptorRegistry {
    descriptors: HashMap<String, GeneratorDescriptor>,
}

impl DescriptorRegistry {
    pub fn register(&mut self, descriptor: GeneratorDescriptor) -> Result<(), EngineError> {
        validate(&descriptor)?;
        self.descriptors.insert(descriptor.id.clone(), descriptor);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&GeneratorDescriptor> {
        self.descriptors.get(id)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.descriptors.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::PitchTarget;

    fn descriptor(id: &str) -> GeneratorDescriptor {
        GeneratorDescriptor {
            id: id.into(),
            display_name: id.into(),
            dsp_kind: "sine".into(),
            pitch_target: PitchTarget::Freq,
            midi_retrig: false,
            output_trim_db: 0.0,
            custom_params: vec![],
        }
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = DescriptorRegistry::default();
        registry.register(descriptor("sine_basic")).unwrap();
        assert!(registry.get("sine_basic").is_some());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_invalid_descriptor_rejected_and_not_stored() {
        let mut registry = DescriptorRegistry::default();
        let mut bad = descriptor("bad");
        bad.dsp_kind = "unknown".into();
        assert!(registry.register(bad).is_err());
        assert!(registry.is_empty());
    }
}
