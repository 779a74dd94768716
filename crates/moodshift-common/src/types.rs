//! Output format choices for a transformation job.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Container/codec of the transformed file.
///
/// Serialized in lowercase, which is also what the backend's
/// `output_format` form field expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Uncompressed PCM WAV.
    #[default]
    Wav,
    /// MPEG layer III.
    Mp3,
    /// AAC in an MP4 container.
    M4a,
    /// Ogg Vorbis.
    Ogg,
    /// Free Lossless Audio Codec.
    Flac,
}

impl OutputFormat {
    /// All formats, in the order they are offered to the user.
    pub const ALL: [OutputFormat; 5] = [
        OutputFormat::Wav,
        OutputFormat::Mp3,
        OutputFormat::M4a,
        OutputFormat::Ogg,
        OutputFormat::Flac,
    ];

    /// The lowercase wire value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Wav => "wav",
            Self::Mp3 => "mp3",
            Self::M4a => "m4a",
            Self::Ogg => "ogg",
            Self::Flac => "flac",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|format| format.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ValidationError::UnknownFormat(s.to_string()))
    }
}
