use moodshift_common::paths::audio_extensions;
use moodshift_common::OutputFormat;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub polling: PollingConfig,

    #[serde(default)]
    pub upload: UploadConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Root URL the `/upload` and `/status/{task_id}` paths are joined onto
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout for submit, poll and download calls
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Override for the User-Agent header
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
            user_agent: None,
        }
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PollingConfig {
    /// Delay between status queries for an active job
    #[serde(default = "default_poll_interval")]
    pub interval_ms: u64,
}

fn default_poll_interval() -> u64 {
    2500
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_poll_interval(),
        }
    }
}

impl PollingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UploadConfig {
    #[serde(default)]
    pub default_format: OutputFormat,

    /// Extensions accepted for upload (empty = no check)
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,

    /// Largest file that will be uploaded, in megabytes (0 = unlimited)
    #[serde(default = "default_max_file_size")]
    pub max_file_size_mb: u64,
}

fn default_allowed_extensions() -> Vec<String> {
    audio_extensions().iter().map(|ext| ext.to_string()).collect()
}

fn default_max_file_size() -> u64 {
    300
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            default_format: OutputFormat::default(),
            allowed_extensions: default_allowed_extensions(),
            max_file_size_mb: default_max_file_size(),
        }
    }
}

impl UploadConfig {
    /// Upload limit in bytes, or `None` when unlimited.
    pub fn max_file_size_bytes(&self) -> Option<u64> {
        (self.max_file_size_mb > 0).then(|| self.max_file_size_mb * 1024 * 1024)
    }
}
