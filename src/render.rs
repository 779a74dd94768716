//! Pure mapping from job state to what the user sees.
//!
//! Nothing here performs I/O; a [`crate::session::StatusView`] turns a
//! [`Presentation`] into terminal output.

use crate::client::SubmissionError;
use crate::status::{StatusSnapshot, TaskState};

/// Visual emphasis of a status line or progress bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Info,
    Primary,
    Success,
    Danger,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressBar {
    pub percent: u8,
    pub label: String,
    /// Striped/spinning while work is actually underway.
    pub animated: bool,
    pub tone: Tone,
}

impl ProgressBar {
    fn new(percent: u8, label: impl Into<String>, animated: bool, tone: Tone) -> Self {
        Self {
            percent: percent.min(100),
            label: label.into(),
            animated,
            tone,
        }
    }

    fn error() -> Self {
        Self::new(0, "Error", false, Tone::Danger)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub text: String,
    pub tone: Tone,
}

impl StatusLine {
    fn new(text: impl Into<String>, tone: Tone) -> Self {
        Self {
            text: text.into(),
            tone,
        }
    }
}

/// Link to a finished job's output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadLink {
    pub label: String,
    pub url: String,
    pub filename: String,
}

/// Terminal outcome area. A download link and an error detail never show together.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Outcome {
    #[default]
    Hidden,
    Download(DownloadLink),
    ErrorDetail(String),
}

/// Everything the status area displays at one moment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presentation {
    pub progress: ProgressBar,
    pub status: StatusLine,
    pub outcome: Outcome,
}

/// Render a normalized snapshot.
///
/// `fallback_filename` names the file when the backend did not echo
/// `original_filename` back.
pub fn render_snapshot(snap: &StatusSnapshot, fallback_filename: Option<&str>) -> Presentation {
    let filename = snap.original_filename.as_deref().or(fallback_filename);
    let percent = snap.progress_percent.min(100);

    match snap.state {
        TaskState::Pending | TaskState::Progress => Presentation {
            progress: ProgressBar::new(
                percent,
                format!("{percent}%"),
                percent > 0 && percent < 100,
                Tone::Primary,
            ),
            status: StatusLine::new(with_filename(&snap.message, filename), Tone::Info),
            outcome: Outcome::Hidden,
        },
        TaskState::Success => Presentation {
            progress: ProgressBar::new(percent, format!("{percent}%"), false, Tone::Success),
            status: StatusLine::new(snap.message.clone(), Tone::Success),
            outcome: snap
                .result
                .as_ref()
                .map(|artifact| {
                    Outcome::Download(DownloadLink {
                        label: format!("Download Transformed Audio: {}", artifact.filename),
                        url: artifact.download_url.clone(),
                        filename: artifact.filename.clone(),
                    })
                })
                .unwrap_or_default(),
        },
        TaskState::Failure => {
            let detail = snap.error_detail.as_deref().unwrap_or("Processing failed.");
            let detail = match filename {
                Some(name) => format!("Error processing {name}: {detail}"),
                None => detail.to_string(),
            };
            Presentation {
                progress: ProgressBar::error(),
                status: StatusLine::new("Effect Application Error", Tone::Danger),
                outcome: Outcome::ErrorDetail(detail),
            }
        }
        TaskState::Unknown => Presentation {
            progress: ProgressBar::new(percent, format!("{percent}%"), false, Tone::Warning),
            status: StatusLine::new(snap.message.clone(), Tone::Warning),
            outcome: Outcome::Hidden,
        },
    }
}

fn with_filename(message: &str, filename: Option<&str>) -> String {
    match filename {
        Some(name) => format!("{message} for \"{name}\""),
        None => message.to_string(),
    }
}

/// Shown while the upload request is in flight.
pub fn render_uploading() -> Presentation {
    Presentation {
        progress: ProgressBar::new(0, "Initiating Upload", false, Tone::Primary),
        status: StatusLine::new("Uploading your audio file... Please wait.", Tone::Info),
        outcome: Outcome::Hidden,
    }
}

/// Shown once the backend has accepted the job, before the first poll.
pub fn render_queued() -> Presentation {
    Presentation {
        progress: ProgressBar::new(5, "Processing Queued", true, Tone::Primary),
        status: StatusLine::new("Upload complete! Applying audio effects...", Tone::Primary),
        outcome: Outcome::Hidden,
    }
}

pub fn render_submission_error(err: &SubmissionError) -> Presentation {
    Presentation {
        progress: ProgressBar::error(),
        status: StatusLine::new("Upload Error", Tone::Danger),
        outcome: Outcome::ErrorDetail(err.to_string()),
    }
}

/// Local validation failure. Nothing was sent.
pub fn render_validation_warning(message: &str) -> Presentation {
    Presentation {
        progress: ProgressBar::new(0, "0%", false, Tone::Warning),
        status: StatusLine::new(message, Tone::Warning),
        outcome: Outcome::Hidden,
    }
}

/// A status query failed; polling continues. The bar keeps its last value.
pub fn render_poll_warning(previous: Option<&Presentation>) -> Presentation {
    let progress = previous
        .map(|p| p.progress.clone())
        .unwrap_or_else(|| ProgressBar::new(0, "0%", false, Tone::Primary));
    Presentation {
        progress,
        status: StatusLine::new("Error fetching status. Will retry.", Tone::Warning),
        outcome: Outcome::Hidden,
    }
}
