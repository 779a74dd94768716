//! CLI end-to-end tests
//!
//! Tests for the moodshift command-line interface.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use serde_json::json;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Get a command for the moodshift binary
#[allow(deprecated)]
fn moodshift_cmd() -> Command {
    let mut cmd = Command::cargo_bin("moodshift").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

/// Config with a fast poll interval pointed at `base_url`.
fn write_config(dir: &Path, base_url: &str) -> std::path::PathBuf {
    let config_path = dir.join("moodshift.toml");
    fs::write(
        &config_path,
        format!(
            r#"
[server]
base_url = "{base_url}"
request_timeout_secs = 5

[polling]
interval_ms = 20
"#
        ),
    )
    .unwrap();
    config_path
}

#[test]
fn test_cli_no_args_shows_help() {
    let mut cmd = moodshift_cmd();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_version_command() {
    let mut cmd = moodshift_cmd();
    cmd.arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("moodshift"));
}

#[test]
fn test_cli_effects_in_chain_order() {
    let output = moodshift_cmd().arg("effects").output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let positions: Vec<usize> = [
        "gain",
        "high_pass_filter",
        "low_pass_filter",
        "speed_pitch",
        "echo",
        "reverb",
    ]
    .iter()
    .map(|name| stdout.find(&format!("  {name} ")).unwrap())
    .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
    assert!(stdout.contains("delay_ms"));
}

#[test]
fn test_cli_validate_config() {
    let dir = tempdir().unwrap();
    let config_path = write_config(dir.path(), "http://audio.local:5000");

    let mut cmd = moodshift_cmd();
    cmd.arg("validate")
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains("http://audio.local:5000"))
        .stdout(predicate::str::contains("Poll interval: 20ms"));
}

#[test]
fn test_cli_validate_rejects_bad_url() {
    let dir = tempdir().unwrap();
    let config_path = write_config(dir.path(), "ftp://audio.local");

    let mut cmd = moodshift_cmd();
    cmd.arg("validate").arg(&config_path).assert().failure();
}

#[test]
fn test_cli_process_missing_file_fails_without_network() {
    let dir = tempdir().unwrap();
    // Nothing listens here; a request would fail differently.
    let config_path = write_config(dir.path(), "http://127.0.0.1:9");

    let mut cmd = moodshift_cmd();
    cmd.arg("-c")
        .arg(&config_path)
        .arg("process")
        .arg(dir.path().join("missing.wav"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not read"));
}

#[test]
fn test_cli_process_bad_parameter_fails() {
    let dir = tempdir().unwrap();
    let config_path = write_config(dir.path(), "http://127.0.0.1:9");
    let input = dir.path().join("song.wav");
    fs::write(&input, b"RIFF").unwrap();

    let mut cmd = moodshift_cmd();
    cmd.arg("-c")
        .arg(&config_path)
        .arg("process")
        .arg(&input)
        .args(["--high-pass", "12.5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cutoff_hz"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cli_process_downloads_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({
            "task_id": "cli-1",
            "status_url": "/status/cli-1",
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/status/cli-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "state": "SUCCESS",
            "download_url": "/download/effects_cli-1_song.wav",
            "result_filename": "effects_cli-1_song.wav",
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/download/effects_cli-1_song.wav"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"processed".to_vec()))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let config_path = write_config(dir.path(), &server.uri());
    let input = dir.path().join("song.wav");
    fs::write(&input, b"RIFF").unwrap();
    let out_dir = dir.path().join("out");

    let mut cmd = moodshift_cmd();
    cmd.arg("-c")
        .arg(&config_path)
        .arg("process")
        .arg(&input)
        .args(["--gain", "3", "--echo", "250,0.4"])
        .arg("--output-dir")
        .arg(&out_dir);

    let output = tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap();
    output
        .assert()
        .success()
        .stdout(predicate::str::contains("Download Transformed Audio: effects_cli-1_song.wav"));

    let saved = fs::read(out_dir.join("effects_cli-1_song.wav")).unwrap();
    assert_eq!(saved, b"processed");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cli_process_failure_exit_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({
            "task_id": "cli-2",
            "status_url": "/status/cli-2",
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/status/cli-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "state": "FAILURE",
            "status_message": "ffmpeg exited with status 1",
        })))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let config_path = write_config(dir.path(), &server.uri());
    let input = dir.path().join("song.wav");
    fs::write(&input, b"RIFF").unwrap();

    let mut cmd = moodshift_cmd();
    cmd.arg("-c").arg(&config_path).arg("process").arg(&input);

    let output = tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap();
    output
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "Error processing song.wav: ffmpeg exited with status 1",
        ));
}
