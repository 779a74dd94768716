//! Effect descriptor builder.
//!
//! An [`EffectForm`] mirrors the effect option groups a user can toggle:
//! each group has an enabling switch and raw text values for its numeric
//! controls. [`EffectForm::build`] turns the enabled groups into typed
//! [`EffectDescriptor`]s in canonical chain order, parsing values at build
//! time so the chain always reflects what is in the form when it is
//! submitted.

use moodshift_common::{EffectDescriptor, EffectKind, ParamKind, ValidationError};
use std::collections::HashMap;

/// Switch and raw control values for one effect kind.
#[derive(Debug, Clone, Default)]
pub struct OptionGroup {
    enabled: bool,
    values: HashMap<String, String>,
}

/// The full set of effect option groups.
#[derive(Debug, Clone, Default)]
pub struct EffectForm {
    groups: HashMap<EffectKind, OptionGroup>,
}

impl EffectForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Turn an option group on.
    pub fn enable(&mut self, kind: EffectKind) -> &mut Self {
        self.groups.entry(kind).or_default().enabled = true;
        self
    }

    /// Turn an option group off. Its values are kept for later re-enabling.
    pub fn disable(&mut self, kind: EffectKind) -> &mut Self {
        self.groups.entry(kind).or_default().enabled = false;
        self
    }

    /// Set the raw text of one control, whether or not its group is enabled.
    pub fn set(&mut self, kind: EffectKind, field: &str, raw: impl Into<String>) -> &mut Self {
        self.groups
            .entry(kind)
            .or_default()
            .values
            .insert(field.to_string(), raw.into());
        self
    }

    pub fn is_enabled(&self, kind: EffectKind) -> bool {
        self.groups.get(&kind).is_some_and(|g| g.enabled)
    }

    /// Build the effects chain from every enabled group.
    ///
    /// Output order is [`EffectKind::ALL`] regardless of the order groups
    /// were toggled. The first unparseable or missing value aborts the build.
    pub fn build(&self) -> Result<Vec<EffectDescriptor>, ValidationError> {
        EffectKind::ALL
            .into_iter()
            .filter_map(|kind| {
                self.groups
                    .get(&kind)
                    .filter(|group| group.enabled)
                    .map(|group| build_descriptor(kind, group))
            })
            .collect()
    }
}

fn build_descriptor(
    kind: EffectKind,
    group: &OptionGroup,
) -> Result<EffectDescriptor, ValidationError> {
    let descriptor = match kind {
        EffectKind::Gain => EffectDescriptor::Gain {
            gain_db: float(kind, group, "gain_db")?,
        },
        EffectKind::HighPassFilter => EffectDescriptor::HighPassFilter {
            cutoff_hz: integer(kind, group, "cutoff_hz")?,
        },
        EffectKind::LowPassFilter => EffectDescriptor::LowPassFilter {
            cutoff_hz: integer(kind, group, "cutoff_hz")?,
        },
        EffectKind::SpeedPitch => EffectDescriptor::SpeedPitch {
            factor: float(kind, group, "factor")?,
        },
        EffectKind::Echo => EffectDescriptor::Echo {
            delay_ms: integer(kind, group, "delay_ms")?,
            decay_factor: float(kind, group, "decay_factor")?,
        },
        EffectKind::Reverb => EffectDescriptor::Reverb {
            wet_level: float(kind, group, "wet_level")?,
            room_size: float(kind, group, "room_size")?,
        },
    };
    tracing::trace!(effect = %kind, ?descriptor, "Built effect descriptor");
    Ok(descriptor)
}

fn raw<'a>(
    kind: EffectKind,
    group: &'a OptionGroup,
    field: &'static str,
) -> Result<&'a str, ValidationError> {
    group
        .values
        .get(field)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .ok_or(ValidationError::MissingParameter {
            effect: kind.name(),
            field,
        })
}

fn invalid(kind: EffectKind, field: &'static str, param: ParamKind, value: &str) -> ValidationError {
    ValidationError::InvalidParameter {
        effect: kind.name(),
        field,
        expected: param.expected(),
        value: value.to_string(),
    }
}

fn integer(kind: EffectKind, group: &OptionGroup, field: &'static str) -> Result<i64, ValidationError> {
    let value = raw(kind, group, field)?;
    value
        .parse::<i64>()
        .map_err(|_| invalid(kind, field, ParamKind::Integer, value))
}

fn float(kind: EffectKind, group: &OptionGroup, field: &'static str) -> Result<f64, ValidationError> {
    let value = raw(kind, group, field)?;
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| invalid(kind, field, ParamKind::Float, value))
}
