//! Moodshift-Common: Shared vocabulary for the moodshift job client.
//!
//! This crate holds the pieces that describe a transformation job without
//! touching the network:
//!
//! - **Effects**: the [`EffectDescriptor`] wire enum and the canonical
//!   [`EffectKind`] order used when assembling an effects chain
//! - **Formats**: the [`OutputFormat`] choices the backend accepts
//! - **Typed IDs**: [`TaskId`] for backend task identifiers
//! - **Path Utilities**: audio extension and MIME helpers
//! - **Validation**: the [`ValidationError`] that blocks a submission locally
//!
//! # Examples
//!
//! ```
//! use moodshift_common::{EffectDescriptor, EffectKind, OutputFormat};
//!
//! let gain = EffectDescriptor::Gain { gain_db: 6.0 };
//! assert_eq!(gain.kind(), EffectKind::Gain);
//! assert_eq!("FLAC".parse::<OutputFormat>().unwrap(), OutputFormat::Flac);
//! ```

pub mod effects;
pub mod error;
pub mod ids;
pub mod paths;
pub mod types;

pub use effects::{EffectDescriptor, EffectKind, ParamKind, ParamSpec};
pub use error::{Result, ValidationError};
pub use ids::TaskId;
pub use types::OutputFormat;
