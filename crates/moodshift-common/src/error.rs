//! Validation errors raised before a job ever reaches the network.
//!
//! Every variant blocks submission locally; the form stays editable and the
//! message is shown as a warning.

/// A problem with the user's inputs that prevents submission.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// No input file was chosen.
    #[error("Please select an audio file to process.")]
    NoFileSelected,

    /// The input file could not be read.
    #[error("Could not read {path}: {reason}")]
    UnreadableFile { path: String, reason: String },

    /// The input file's extension is not one the backend accepts.
    #[error("File extension not allowed: {filename}")]
    ExtensionNotAllowed { filename: String },

    /// The input file exceeds the configured upload limit.
    #[error("{filename} is {size_mb} MB, the upload limit is {limit_mb} MB")]
    FileTooLarge {
        filename: String,
        size_mb: u64,
        limit_mb: u64,
    },

    /// The requested output format is not supported.
    #[error("Unsupported output format: {0}")]
    UnknownFormat(String),

    /// An enabled effect is missing one of its parameters.
    #[error("{effect} is enabled but {field} has no value")]
    MissingParameter {
        effect: &'static str,
        field: &'static str,
    },

    /// An enabled effect has a parameter that is not a valid number.
    #[error("{effect}: {field} must be {expected}, got {value:?}")]
    InvalidParameter {
        effect: &'static str,
        field: &'static str,
        expected: &'static str,
        value: String,
    },
}

impl ValidationError {
    /// Create a new UnreadableFile error.
    pub fn unreadable<P: Into<String>, R: ToString>(path: P, reason: R) -> Self {
        Self::UnreadableFile {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result type alias using [`ValidationError`].
pub type Result<T> = std::result::Result<T, ValidationError>;
