//! Generator descriptor format (spec §3.6, §6.2): read-only metadata
//! loaded once at boot, selecting a compiled `dsp_kind` synthesis template.

use serde::{Deserialize, Serialize};

use crate::errors::EngineError;
use crate::grid::TargetKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Curve {
    Lin,
    Exp,
}

impl From<Curve> for TargetKind {
    fn from(curve: Curve) -> Self {
        match curve {
            Curve::Lin => TargetKind::Linear,
            Curve::Exp => TargetKind::Exponential,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomParamDescriptor {
    pub label: String,
    pub min: f32,
    pub max: f32,
    pub default: f32,
    pub curve: Curve,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub steps: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PitchTarget {
    Freq,
    Custom0,
    Custom1,
    Custom2,
    Custom3,
    Custom4,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorDescriptor {
    pub id: String,
    pub display_name: String,
    pub dsp_kind: String,
    pub pitch_target: PitchTarget,
    #[serde(default)]
    pub midi_retrig: bool,
    #[serde(default)]
    pub output_trim_db: f32,
    pub custom_params: Vec<CustomParamDescriptor>,
}

/// Validates a descriptor against spec §3.6/§6.2's constraints:
/// - at most 5 custom params
/// - exponential curves require `min > 0 && max > 0`
/// - labels unique within the descriptor
/// - `dsp_kind` resolves to a known catalog entry
pub fn validate(descriptor: &GeneratorDescriptor) -> Result<(), EngineError> {
    if descriptor.id.trim().is_empty() {
        return Err(EngineError::ValidationError("descriptor id must not be empty".into()));
    }

    if descriptor.custom_params.len() > 5 {
        return Err(EngineError::ValidationError(format!(
            "descriptor '{}' has {} custom params, max is 5",
            descriptor.id,
            descriptor.custom_params.len()
        )));
    }

    let mut seen_labels = std::collections::HashSet::new();
    for param in &descriptor.custom_params {
        if !seen_labels.insert(param.label.clone()) {
            return Err(EngineError::ValidationError(format!(
                "descriptor '{}' has duplicate custom param label '{}'",
                descriptor.id, param.label
            )));
        }
        if param.curve == Curve::Exp && (param.min <= 0.0 || param.max <= 0.0) {
            return Err(EngineError::ValidationError(format!(
                "descriptor '{}' param '{}' is exponential but has non-positive bound",
                descriptor.id, param.label
            )));
        }
    }

    if crate::dsp::oscillators::DspKindInstance::from_name(&descriptor.dsp_kind).is_none() {
        return Err(EngineError::ValidationError(format!(
            "descriptor '{}' references unknown dsp_kind '{}'",
            descriptor.id, descriptor.dsp_kind
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_descriptor() -> GeneratorDescriptor {
        GeneratorDescriptor {
            id: "saw_basic".into(),
            display_name: "Saw Basic".into(),
            dsp_kind: "saw".into(),
            pitch_target: PitchTarget::Freq,
            midi_retrig: false,
            output_trim_db: 0.0,
            custom_params: vec![],
        }
    }

    #[test]
    fn test_valid_descriptor_passes() {
        assert!(validate(&base_descriptor()).is_ok());
    }

    #[test]
    fn test_too_many_custom_params_rejected() {
        let mut descriptor = base_descriptor();
        for i in 0..6 {
            descriptor.custom_params.push(CustomParamDescriptor {
                label: format!("p{i}"),
                min: 0.0,
                max: 1.0,
                default: 0.0,
                curve: Curve::Lin,
                unit: None,
                steps: None,
            });
        }
        assert!(validate(&descriptor).is_err());
    }

    #[test]
    fn test_exponential_curve_with_non_positive_bound_rejected() {
        let mut descriptor = base_descriptor();
        descriptor.custom_params.push(CustomParamDescriptor {
            label: "rate".into(),
            min: -1.0,
            max: 10.0,
            default: 1.0,
            curve: Curve::Exp,
            unit: None,
            steps: None,
        });
        assert!(validate(&descriptor).is_err());
    }

    #[test]
    fn test_duplicate_labels_rejected() {
        let mut descriptor = base_descriptor();
        for _ in 0..2 {
            descriptor.custom_params.push(CustomParamDescriptor {
                label: "rate".into(),
                min: 0.1,
                max: 10.0,
                default: 1.0,
                curve: Curve::Lin,
                unit: None,
                steps: None,
            });
        }
        assert!(validate(&descriptor).is_err());
    }

    #[test]
    fn test_unknown_dsp_kind_rejected() {
        let mut descriptor = base_descriptor();
        descriptor.dsp_kind = "not_a_real_kind".into();
        assert!(validate(&descriptor).is_err());
    }
}
