//! Normalization of status responses into strict snapshots.
//!
//! Fallback rules, applied per field:
//!
//! - **state**: `PENDING`, `PROGRESS`, `SUCCESS`, `FAILURE` (any case);
//!   anything else, including a missing state, is [`TaskState::Unknown`].
//! - **message**: `info.status`, then top-level `status`, then
//!   `"Task is {STATE}"`.
//! - **progress**: `info.progress`, then top-level `progress`; numbers are
//!   truncated, numeric strings are read like `parseInt`, the result is
//!   clamped to 0..=100. Missing or non-numeric reads as 100 for `SUCCESS`
//!   and 0 otherwise.
//! - **original filename**: `info.original_filename`, then top-level.
//! - **result** (`SUCCESS` only): requires `download_url`; the filename is
//!   `result_filename` or the last path segment of the URL.
//! - **error detail** (`FAILURE` only): `info.status_message`, then
//!   `info.error_details`, then `status_message`, then `error_details`, then
//!   `"Processing failed."`.
//!
//! Empty strings count as absent throughout.

use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crate::client::StatusResponse;

const DEFAULT_FAILURE_DETAIL: &str = "Processing failed.";

/// Backend task state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskState {
    Pending,
    Progress,
    Success,
    Failure,
    Unknown,
}

impl TaskState {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Self::Pending,
            "PROGRESS" => Self::Progress,
            "SUCCESS" => Self::Success,
            "FAILURE" => Self::Failure,
            _ => Self::Unknown,
        }
    }

    /// No polling happens after a terminal state.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Failure)
    }

    /// Queued or running.
    pub fn is_in_flight(self) -> bool {
        matches!(self, Self::Pending | Self::Progress)
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Progress => "PROGRESS",
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
            Self::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// Downloadable output of a successful job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultArtifact {
    pub filename: String,
    pub download_url: String,
}

/// One fully normalized poll result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusSnapshot {
    pub state: TaskState,
    /// State string as the backend sent it, used in generic messages.
    pub raw_state: String,
    pub progress_percent: u8,
    pub message: String,
    pub original_filename: Option<String>,
    /// Present only when `state` is [`TaskState::Success`].
    pub result: Option<ResultArtifact>,
    /// Present only when `state` is [`TaskState::Failure`].
    pub error_detail: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

impl StatusSnapshot {
    pub fn from_response(resp: &StatusResponse) -> Self {
        let raw_state = non_empty(&resp.state).unwrap_or("UNKNOWN").to_string();
        let state = TaskState::parse(&raw_state);

        let message = resp
            .info_str("status")
            .or_else(|| non_empty(&resp.status))
            .map(str::to_string)
            .unwrap_or_else(|| format!("Task is {raw_state}"));

        let progress_percent = resp
            .info_value("progress")
            .or_else(|| resp.progress.as_ref().filter(|v| !v.is_null()))
            .and_then(parse_percent)
            .unwrap_or(if state == TaskState::Success { 100 } else { 0 });

        let original_filename = resp
            .info_str("original_filename")
            .or_else(|| non_empty(&resp.original_filename))
            .map(str::to_string);

        let result = (state == TaskState::Success)
            .then(|| non_empty(&resp.download_url))
            .flatten()
            .map(|url| ResultArtifact {
                filename: non_empty(&resp.result_filename)
                    .map(str::to_string)
                    .unwrap_or_else(|| filename_from_url(url)),
                download_url: url.to_string(),
            });

        let error_detail = (state == TaskState::Failure).then(|| {
            resp.info_str("status_message")
                .or_else(|| resp.info_str("error_details"))
                .or_else(|| non_empty(&resp.status_message))
                .or_else(|| non_empty(&resp.error_details))
                .unwrap_or(DEFAULT_FAILURE_DETAIL)
                .to_string()
        });

        Self {
            state,
            raw_state,
            progress_percent,
            message,
            original_filename,
            result,
            error_detail,
        }
    }
}

fn filename_from_url(url: &str) -> String {
    url.split(['?', '#'])
        .next()
        .and_then(|path| path.rsplit('/').next())
        .filter(|name| !name.is_empty())
        .unwrap_or("result")
        .to_string()
}

/// Clamp a percentage to 0..=100, truncating any fraction.
pub fn clamp_percent(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.trunc().clamp(0.0, 100.0) as u8
}

/// Read a progress value from JSON. `None` when it is not numeric.
pub fn parse_percent(value: &Value) -> Option<u8> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()).map(clamp_percent),
        Value::String(s) => leading_integer(s).map(|v| clamp_percent(v as f64)),
        _ => None,
    }
}

/// Integer prefix of a string, like JavaScript's `parseInt(s, 10)`.
fn leading_integer(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: i64 = 0;
    let mut seen = false;
    for digit in digits.chars().map_while(|c| c.to_digit(10)) {
        seen = true;
        value = value.saturating_mul(10).saturating_add(i64::from(digit));
    }

    seen.then_some(if negative { -value } else { value })
}
