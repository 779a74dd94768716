//! Backend contracts: submitting a job and querying its status.
//!
//! [`JobBackend`] is the seam between the orchestration core and the remote
//! processing service. [`HttpBackend`] speaks the real HTTP contracts; tests
//! substitute scripted implementations.

mod http;
#[cfg(test)]
mod scripted;
mod wire;

pub use http::HttpBackend;
#[cfg(test)]
pub(crate) use scripted::ScriptedBackend;
pub use wire::{ErrorBody, StatusResponse, UploadAccepted};

use moodshift_common::TaskId;

use crate::job::{JobHandle, JobRequest};

/// Why a submission did not produce a job handle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    /// The request never got an HTTP response (unreachable, timeout, ...).
    #[error("Upload failed: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("Upload failed: {0}")]
    Rejected(String),

    /// The backend accepted the upload but the body had no job handle.
    #[error("Unexpected response from server after upload.")]
    MalformedResponse,
}

/// A single failed status query. Never terminal for the job.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PollError {
    #[error("status request failed: {0}")]
    Transport(String),

    #[error("status request returned HTTP {0}")]
    Status(u16),

    #[error("status response could not be parsed: {0}")]
    Malformed(String),
}

/// Failure fetching a finished job's result file.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("invalid download URL {0}")]
    Url(String),

    #[error("download failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("download returned HTTP {0}")]
    Status(u16),
}

/// Common trait for job-execution backends
#[async_trait::async_trait]
pub trait JobBackend: Send + Sync {
    /// Submit a job. Exactly one attempt is made; there are no retries.
    async fn submit(&self, request: &JobRequest) -> Result<JobHandle, SubmissionError>;

    /// Fetch the current status record of a job.
    async fn status(&self, task_id: &TaskId) -> Result<StatusResponse, PollError>;
}
