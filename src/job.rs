//! Job request assembly.
//!
//! A [`SubmissionForm`] is the raw user input. Once validated it becomes an
//! immutable [`JobRequest`]: one input artifact, one output format and an
//! ordered effects chain, ready to be encoded as the `/upload` multipart body.

use bytes::Bytes;
use moodshift_common::paths::{audio_mime_type, has_allowed_extension};
use moodshift_common::{EffectDescriptor, OutputFormat, TaskId, ValidationError};
use reqwest::multipart::{Form, Part};
use std::path::{Path, PathBuf};

use crate::client::SubmissionError;
use crate::config::UploadConfig;
use crate::effects::EffectForm;

/// Where the input audio comes from.
#[derive(Debug, Clone)]
pub enum SelectedFile {
    /// A file on disk, read at submission time.
    Path(PathBuf),
    /// Audio already held in memory.
    Memory { filename: String, bytes: Bytes },
}

/// Everything the user filled in for one submission.
#[derive(Debug, Clone, Default)]
pub struct SubmissionForm {
    pub file: Option<SelectedFile>,
    pub output_format: String,
    pub effects: EffectForm,
}

/// The audio payload of a job: raw bytes plus the name the backend sees.
#[derive(Debug, Clone)]
pub struct InputArtifact {
    filename: String,
    bytes: Bytes,
}

impl InputArtifact {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }

    /// Load a selected file, enforcing the upload extension and size limits.
    pub async fn load(selected: &SelectedFile, limits: &UploadConfig) -> Result<Self, ValidationError> {
        let artifact = match selected {
            SelectedFile::Memory { filename, bytes } => {
                check_extension(filename, limits)?;
                Self::new(filename.clone(), bytes.clone())
            }
            SelectedFile::Path(path) => {
                let filename = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .ok_or(ValidationError::NoFileSelected)?;
                check_extension(&filename, limits)?;

                let metadata = tokio::fs::metadata(path)
                    .await
                    .map_err(|e| ValidationError::unreadable(path.display().to_string(), e))?;
                check_size(&filename, metadata.len(), limits)?;

                let bytes = tokio::fs::read(path)
                    .await
                    .map_err(|e| ValidationError::unreadable(path.display().to_string(), e))?;
                Self::new(filename, bytes)
            }
        };

        check_size(&artifact.filename, artifact.bytes.len() as u64, limits)?;
        Ok(artifact)
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

fn check_extension(filename: &str, limits: &UploadConfig) -> Result<(), ValidationError> {
    if has_allowed_extension(Path::new(filename), &limits.allowed_extensions) {
        Ok(())
    } else {
        Err(ValidationError::ExtensionNotAllowed {
            filename: filename.to_string(),
        })
    }
}

fn check_size(filename: &str, size: u64, limits: &UploadConfig) -> Result<(), ValidationError> {
    match limits.max_file_size_bytes() {
        Some(limit) if size > limit => Err(ValidationError::FileTooLarge {
            filename: filename.to_string(),
            size_mb: size.div_ceil(1024 * 1024),
            limit_mb: limits.max_file_size_mb,
        }),
        _ => Ok(()),
    }
}

/// One fully assembled submission. Immutable once built.
#[derive(Debug, Clone)]
pub struct JobRequest {
    input: InputArtifact,
    output_format: OutputFormat,
    effects: Vec<EffectDescriptor>,
}

impl JobRequest {
    /// Package the parts of a submission. `effects` keeps its given order.
    pub fn assemble(
        input: InputArtifact,
        output_format: OutputFormat,
        effects: Vec<EffectDescriptor>,
    ) -> Self {
        Self {
            input,
            output_format,
            effects,
        }
    }

    pub fn input(&self) -> &InputArtifact {
        &self.input
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output_format
    }

    pub fn effects(&self) -> &[EffectDescriptor] {
        &self.effects
    }

    /// The `effects_chain` form field: a JSON array of descriptors.
    pub fn effects_chain_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.effects)
    }

    /// Encode as the `/upload` multipart body.
    pub fn to_multipart(&self) -> Result<Form, SubmissionError> {
        let effects_chain = self.effects_chain_json().map_err(|e| {
            SubmissionError::Transport(format!("could not encode effects chain: {e}"))
        })?;

        let file = Part::stream_with_length(self.input.bytes.clone(), self.input.len() as u64)
            .file_name(self.input.filename.clone())
            .mime_str(audio_mime_type(Path::new(&self.input.filename)))
            .map_err(|e| SubmissionError::Transport(e.to_string()))?;

        Ok(Form::new()
            .part("file", file)
            .text("output_format", self.output_format.to_string())
            .text("effects_chain", effects_chain))
    }
}

/// Reference to a job accepted by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    pub task_id: TaskId,
    pub status_url: String,
}
