use anyhow::{Context, Result};
use bytes::Bytes;
use moodshift_common::TaskId;
use reqwest::{Client, StatusCode, Url};

use super::wire::{ErrorBody, StatusResponse, UploadAccepted};
use super::{DownloadError, JobBackend, PollError, SubmissionError};
use crate::config::ServerConfig;
use crate::job::{JobHandle, JobRequest};

/// [`JobBackend`] speaking the processing service's HTTP contracts.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(config: &ServerConfig) -> Result<Self> {
        let base_url = Self::normalize_base(&config.base_url)?;
        let user_agent = config
            .user_agent
            .clone()
            .unwrap_or_else(|| concat!("moodshift/", env!("CARGO_PKG_VERSION")).to_string());

        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(user_agent)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client, base_url })
    }

    /// Parse the base URL and make sure relative joins stay beneath it.
    fn normalize_base(base: &str) -> Result<Url> {
        let mut url = Url::parse(base).with_context(|| format!("Invalid base URL: {base}"))?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn upload_url(&self) -> Result<Url, SubmissionError> {
        self.base_url
            .join("upload")
            .map_err(|e| SubmissionError::Transport(e.to_string()))
    }

    fn status_url(&self, task_id: &TaskId) -> Result<Url, PollError> {
        let mut url = self
            .base_url
            .join("status/")
            .map_err(|e| PollError::Transport(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| PollError::Transport("base URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .push(task_id.as_str());
        Ok(url)
    }

    /// Resolve a `download_url` from a status record against the base URL.
    pub fn resolve(&self, url: &str) -> Result<Url, DownloadError> {
        self.base_url
            .join(url)
            .map_err(|e| DownloadError::Url(format!("{url}: {e}")))
    }

    /// Fetch the transformed file of a finished job.
    pub async fn fetch_result(&self, download_url: &str) -> Result<Bytes, DownloadError> {
        let url = self.resolve(download_url)?;
        tracing::debug!("Downloading result from {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Status(status.as_u16()));
        }
        Ok(response.bytes().await?)
    }
}

/// The `error` field of a JSON body, if present and non-empty.
fn error_message(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .filter(|e| !e.is_empty())
}

/// Message for a non-success upload response.
///
/// Uses the body's `error` field when it is JSON carrying one, otherwise the
/// status line.
fn rejection_message(status: StatusCode, body: &[u8]) -> String {
    error_message(body).unwrap_or_else(|| {
        format!(
            "Server error: {} - {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown Status")
        )
    })
}

#[async_trait::async_trait]
impl JobBackend for HttpBackend {
    async fn submit(&self, request: &JobRequest) -> Result<JobHandle, SubmissionError> {
        let url = self.upload_url()?;
        let form = request.to_multipart()?;

        tracing::info!(
            file = request.input().filename(),
            format = %request.output_format(),
            effects = request.effects().len(),
            "Uploading to {}",
            url
        );

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| SubmissionError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| SubmissionError::Transport(e.to_string()))?;
        tracing::debug!("Upload response status: {}", status);

        if !status.is_success() {
            let message = rejection_message(status, &body);
            tracing::warn!("Upload rejected ({}): {}", status, message);
            return Err(SubmissionError::Rejected(message));
        }

        if let Some(handle) = serde_json::from_slice::<UploadAccepted>(&body)
            .ok()
            .and_then(UploadAccepted::into_handle)
        {
            return Ok(handle);
        }

        // A success status can still carry an error body.
        match error_message(&body) {
            Some(message) => {
                tracing::warn!("Upload refused ({}): {}", status, message);
                Err(SubmissionError::Rejected(message))
            }
            None => Err(SubmissionError::MalformedResponse),
        }
    }

    async fn status(&self, task_id: &TaskId) -> Result<StatusResponse, PollError> {
        let url = self.status_url(task_id)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PollError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PollError::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| PollError::Transport(e.to_string()))?;
        serde_json::from_slice(&body).map_err(|e| PollError::Malformed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(base: &str) -> HttpBackend {
        let config = ServerConfig {
            base_url: base.to_string(),
            ..ServerConfig::default()
        };
        HttpBackend::new(&config).unwrap()
    }

    #[test]
    fn test_urls_join_under_base_path() {
        let b = backend("http://example.com/app");
        assert_eq!(b.upload_url().unwrap().as_str(), "http://example.com/app/upload");
        assert_eq!(
            b.status_url(&TaskId::new("abc")).unwrap().as_str(),
            "http://example.com/app/status/abc"
        );
    }

    #[test]
    fn test_status_url_escapes_task_id() {
        let b = backend("http://example.com/");
        assert_eq!(
            b.status_url(&TaskId::new("a/b c")).unwrap().as_str(),
            "http://example.com/status/a%2Fb%20c"
        );
    }

    #[test]
    fn test_resolve_download_url() {
        let b = backend("http://example.com/app/");
        assert_eq!(
            b.resolve("/dl/x.wav").unwrap().as_str(),
            "http://example.com/dl/x.wav"
        );
        assert_eq!(
            b.resolve("https://cdn.example.com/x.wav").unwrap().as_str(),
            "https://cdn.example.com/x.wav"
        );
    }

    #[test]
    fn test_rejection_message() {
        assert_eq!(
            rejection_message(StatusCode::BAD_REQUEST, br#"{"error":"No file part in the request"}"#),
            "No file part in the request"
        );
        assert_eq!(
            rejection_message(StatusCode::BAD_GATEWAY, b"<html>oops</html>"),
            "Server error: 502 - Bad Gateway"
        );
        assert_eq!(
            rejection_message(StatusCode::INTERNAL_SERVER_ERROR, br#"{"detail":"x"}"#),
            "Server error: 500 - Internal Server Error"
        );
        assert_eq!(
            rejection_message(StatusCode::SERVICE_UNAVAILABLE, b""),
            "Server error: 503 - Service Unavailable"
        );
    }
}
