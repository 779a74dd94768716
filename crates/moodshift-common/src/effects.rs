//! Effect descriptors and their canonical chain order.
//!
//! An [`EffectDescriptor`] is one typed, parameterized transformation step.
//! On the wire it is a JSON object tagged by `name`, carrying only the
//! numeric fields of its own kind:
//!
//! ```
//! use moodshift_common::EffectDescriptor;
//!
//! let echo = EffectDescriptor::Echo { delay_ms: 250, decay_factor: 0.4 };
//! assert_eq!(
//!     serde_json::to_string(&echo).unwrap(),
//!     r#"{"name":"echo","delay_ms":250,"decay_factor":0.4}"#
//! );
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// The six effect kinds, declared in canonical chain order.
///
/// `Ord` follows declaration order, so sorting by kind yields the order the
/// backend applies effects in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    Gain,
    HighPassFilter,
    LowPassFilter,
    SpeedPitch,
    Echo,
    Reverb,
}

/// Numeric type of one effect parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Integer,
    Float,
}

impl ParamKind {
    /// Human description used in validation messages.
    pub fn expected(self) -> &'static str {
        match self {
            Self::Integer => "an integer",
            Self::Float => "a number",
        }
    }
}

/// One named numeric parameter of an effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    pub field: &'static str,
    pub kind: ParamKind,
    pub unit: &'static str,
}

const fn param(field: &'static str, kind: ParamKind, unit: &'static str) -> ParamSpec {
    ParamSpec { field, kind, unit }
}

const GAIN_PARAMS: &[ParamSpec] = &[param("gain_db", ParamKind::Float, "dB")];
const CUTOFF_PARAMS: &[ParamSpec] = &[param("cutoff_hz", ParamKind::Integer, "Hz")];
const SPEED_PARAMS: &[ParamSpec] = &[param("factor", ParamKind::Float, "x")];
const ECHO_PARAMS: &[ParamSpec] = &[
    param("delay_ms", ParamKind::Integer, "ms"),
    param("decay_factor", ParamKind::Float, ""),
];
const REVERB_PARAMS: &[ParamSpec] = &[
    param("wet_level", ParamKind::Float, ""),
    param("room_size", ParamKind::Float, ""),
];

impl EffectKind {
    /// Every kind in canonical order.
    pub const ALL: [EffectKind; 6] = [
        EffectKind::Gain,
        EffectKind::HighPassFilter,
        EffectKind::LowPassFilter,
        EffectKind::SpeedPitch,
        EffectKind::Echo,
        EffectKind::Reverb,
    ];

    /// The `name` tag used on the wire.
    pub fn name(self) -> &'static str {
        match self {
            Self::Gain => "gain",
            Self::HighPassFilter => "high_pass_filter",
            Self::LowPassFilter => "low_pass_filter",
            Self::SpeedPitch => "speed_pitch",
            Self::Echo => "echo",
            Self::Reverb => "reverb",
        }
    }

    /// Parameters this kind carries, in wire field order.
    pub fn parameters(self) -> &'static [ParamSpec] {
        match self {
            Self::Gain => GAIN_PARAMS,
            Self::HighPassFilter | Self::LowPassFilter => CUTOFF_PARAMS,
            Self::SpeedPitch => SPEED_PARAMS,
            Self::Echo => ECHO_PARAMS,
            Self::Reverb => REVERB_PARAMS,
        }
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One step of an effects chain as sent in `effects_chain`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum EffectDescriptor {
    Gain { gain_db: f64 },
    HighPassFilter { cutoff_hz: i64 },
    LowPassFilter { cutoff_hz: i64 },
    SpeedPitch { factor: f64 },
    Echo { delay_ms: i64, decay_factor: f64 },
    Reverb { wet_level: f64, room_size: f64 },
}

impl EffectDescriptor {
    /// The kind this descriptor belongs to.
    pub fn kind(&self) -> EffectKind {
        match self {
            Self::Gain { .. } => EffectKind::Gain,
            Self::HighPassFilter { .. } => EffectKind::HighPassFilter,
            Self::LowPassFilter { .. } => EffectKind::LowPassFilter,
            Self::SpeedPitch { .. } => EffectKind::SpeedPitch,
            Self::Echo { .. } => EffectKind::Echo,
            Self::Reverb { .. } => EffectKind::Reverb,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_order_matches_declaration() {
        let mut shuffled = vec![
            EffectKind::Reverb,
            EffectKind::Gain,
            EffectKind::Echo,
            EffectKind::LowPassFilter,
            EffectKind::SpeedPitch,
            EffectKind::HighPassFilter,
        ];
        shuffled.sort();
        assert_eq!(shuffled, EffectKind::ALL.to_vec());
    }

    #[test]
    fn test_wire_names() {
        let names: Vec<_> = EffectKind::ALL.iter().map(|k| k.name()).collect();
        assert_eq!(
            names,
            [
                "gain",
                "high_pass_filter",
                "low_pass_filter",
                "speed_pitch",
                "echo",
                "reverb"
            ]
        );
    }

    #[test]
    fn test_descriptor_serialization() {
        let chain = vec![
            EffectDescriptor::HighPassFilter { cutoff_hz: 120 },
            EffectDescriptor::Reverb {
                wet_level: 0.3,
                room_size: 0.75,
            },
        ];
        assert_eq!(
            serde_json::to_string(&chain).unwrap(),
            r#"[{"name":"high_pass_filter","cutoff_hz":120},{"name":"reverb","wet_level":0.3,"room_size":0.75}]"#
        );
    }

    #[test]
    fn test_descriptor_kind_and_params_agree() {
        let gain = EffectDescriptor::Gain { gain_db: -3.0 };
        assert_eq!(gain.kind(), EffectKind::Gain);
        let value = serde_json::to_value(&gain).unwrap();
        for spec in gain.kind().parameters() {
            assert!(value.get(spec.field).is_some(), "{}", spec.field);
        }
    }
}
