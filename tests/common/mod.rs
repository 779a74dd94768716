//! Shared helpers for integration tests.
//!
//! Provides a [`RecordingView`] that captures everything a session renders
//! and constructors for backends pointed at a wiremock server.

#![allow(dead_code)]

use std::time::Duration;

use moodshift::client::HttpBackend;
use moodshift::config::{ServerConfig, UploadConfig};
use moodshift::render::Presentation;
use moodshift::session::{FormControls, SessionSettings, StatusView};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Poll cadence used against mock servers.
pub const FAST_POLL: Duration = Duration::from_millis(20);

/// Captures every presentation and control change.
#[derive(Default)]
pub struct RecordingView {
    pub shown: Vec<Presentation>,
    pub controls: Vec<FormControls>,
    pub clears: usize,
}

impl RecordingView {
    pub fn last(&self) -> &Presentation {
        self.shown.last().expect("nothing was shown")
    }
}

impl StatusView for RecordingView {
    fn clear(&mut self) {
        self.clears += 1;
    }

    fn show(&mut self, presentation: &Presentation) {
        self.shown.push(presentation.clone());
    }

    fn controls_changed(&mut self, controls: &FormControls) {
        self.controls.push(*controls);
    }
}

pub fn backend_for(server: &MockServer) -> HttpBackend {
    let config = ServerConfig {
        base_url: server.uri(),
        request_timeout_secs: 5,
        ..ServerConfig::default()
    };
    HttpBackend::new(&config).expect("backend")
}

pub fn fast_settings() -> SessionSettings {
    SessionSettings {
        poll_interval: FAST_POLL,
        upload: UploadConfig::default(),
    }
}

/// Accept any upload as task `task_id`.
pub async fn mount_upload(server: &MockServer, task_id: &str) {
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({
            "message": "File uploaded, effects processing started.",
            "task_id": task_id,
            "status_url": format!("/status/{task_id}"),
        })))
        .mount(server)
        .await;
}

/// Answer status queries for `task_id` with `bodies` in order; the last one repeats.
pub async fn mount_status_sequence(server: &MockServer, task_id: &str, bodies: Vec<Value>) {
    let count = bodies.len();
    for (i, body) in bodies.into_iter().enumerate() {
        let mock = Mock::given(method("GET"))
            .and(path(format!("/status/{task_id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(body));
        let mock = if i + 1 < count { mock.up_to_n_times(1) } else { mock };
        mock.mount(server).await;
    }
}
