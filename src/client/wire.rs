//! Wire shapes of the `/upload` and `/status/{task_id}` responses.
//!
//! These records are deliberately loose: every field is optional and
//! string fields tolerate values of the wrong JSON type (they read as
//! absent). Turning them into strict types is the job of
//! [`crate::status::StatusSnapshot`] and [`UploadAccepted::into_handle`].

use moodshift_common::TaskId;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::job::JobHandle;

/// Deserialize a field as a string, treating any other JSON type as absent.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}

/// Success body of `POST /upload`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UploadAccepted {
    #[serde(default, deserialize_with = "lenient_string")]
    pub task_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub message: Option<String>,
}

impl UploadAccepted {
    /// A handle, if both `task_id` and `status_url` are present and non-empty.
    pub fn into_handle(self) -> Option<JobHandle> {
        let task_id = self.task_id.filter(|s| !s.is_empty())?;
        let status_url = self.status_url.filter(|s| !s.is_empty())?;
        Some(JobHandle {
            task_id: TaskId::new(task_id),
            status_url,
        })
    }
}

/// Failure body of either endpoint.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ErrorBody {
    #[serde(default, deserialize_with = "lenient_string")]
    pub error: Option<String>,
}

/// Body of `GET /status/{task_id}`.
///
/// `info` is kept as raw JSON since backends put arbitrary task metadata
/// there. The top-level `status`, `progress`, `original_filename` and
/// `error_details` fields are what the backend actually emits for some
/// states; normalization falls back to them when `info` lacks a field.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StatusResponse {
    #[serde(default, deserialize_with = "lenient_string")]
    pub state: Option<String>,
    #[serde(default)]
    pub info: Option<Value>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub download_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub result_filename: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status_message: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
    #[serde(default)]
    pub progress: Option<Value>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub original_filename: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub error_details: Option<String>,
}

impl StatusResponse {
    /// A string field of `info`, if `info` is an object holding a non-empty string there.
    pub fn info_str(&self, field: &str) -> Option<&str> {
        self.info
            .as_ref()
            .and_then(|info| info.get(field))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Raw `info.<field>` value, if present and not null.
    pub fn info_value(&self, field: &str) -> Option<&Value> {
        self.info
            .as_ref()
            .and_then(|info| info.get(field))
            .filter(|v| !v.is_null())
    }
}
