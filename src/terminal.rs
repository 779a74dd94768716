//! Terminal rendering of a session with an `indicatif` progress bar.
//!
//! When stderr is not a terminal the bar is hidden by indicatif, so status
//! changes are written as plain lines instead.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::render::{Outcome, Presentation, Tone};
use crate::session::{FormControls, StatusView};

const TICK_INTERVAL: Duration = Duration::from_millis(120);

fn tone_color(tone: Tone) -> &'static str {
    match tone {
        Tone::Info => "cyan",
        Tone::Primary => "blue",
        Tone::Success => "green",
        Tone::Danger => "red",
        Tone::Warning => "yellow",
    }
}

fn style_for(tone: Tone) -> ProgressStyle {
    let color = tone_color(tone);
    let template =
        format!("{{spinner:.{color}}} [{{bar:40.{color}/white}}] {{prefix:>17.bold}} {{wide_msg}}");
    ProgressStyle::with_template(&template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-")
}

/// [`StatusView`] that draws to the terminal.
pub struct TerminalView {
    bar: Option<ProgressBar>,
    draw_target: fn() -> ProgressDrawTarget,
    last_status: Option<String>,
}

impl Default for TerminalView {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalView {
    pub fn new() -> Self {
        Self {
            bar: None,
            draw_target: ProgressDrawTarget::stderr,
            last_status: None,
        }
    }

    /// A view whose bar never draws; only plain lines are written.
    pub fn plain() -> Self {
        Self {
            draw_target: ProgressDrawTarget::hidden,
            ..Self::new()
        }
    }

    fn bar(&mut self) -> &ProgressBar {
        let draw_target = self.draw_target;
        self.bar
            .get_or_insert_with(|| ProgressBar::with_draw_target(Some(100), draw_target()))
    }

    fn print_outcome(bar: &ProgressBar, line: String) {
        if bar.is_hidden() {
            println!("{line}");
        } else {
            bar.println(line);
        }
    }
}

impl StatusView for TerminalView {
    fn clear(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
        self.last_status = None;
    }

    fn show(&mut self, presentation: &Presentation) {
        let status_changed = self.last_status.as_deref() != Some(presentation.status.text.as_str());
        self.last_status = Some(presentation.status.text.clone());

        let bar = self.bar().clone();
        bar.set_style(style_for(presentation.progress.tone));
        bar.set_position(u64::from(presentation.progress.percent));
        bar.set_prefix(presentation.progress.label.clone());
        bar.set_message(presentation.status.text.clone());

        if presentation.progress.animated {
            bar.enable_steady_tick(TICK_INTERVAL);
        } else {
            bar.disable_steady_tick();
        }

        if bar.is_hidden() && status_changed {
            eprintln!("[{}] {}", presentation.progress.label, presentation.status.text);
        }

        match &presentation.outcome {
            Outcome::Hidden => {}
            Outcome::Download(link) => {
                Self::print_outcome(&bar, format!("{}\n  {}", link.label, link.url));
                bar.abandon();
                self.bar = None;
            }
            Outcome::ErrorDetail(detail) => {
                Self::print_outcome(&bar, format!("{}\n  {detail}", presentation.status.text));
                bar.abandon();
                self.bar = None;
            }
        }
    }

    fn controls_changed(&mut self, controls: &FormControls) {
        tracing::trace!(
            enabled = controls.enabled,
            busy = controls.busy,
            label = controls.submit_label,
            "Submission controls changed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{render_queued, render_snapshot, render_uploading};
    use crate::status::{StatusSnapshot, TaskState};

    #[test]
    fn test_styles_build_for_every_tone() {
        for tone in [
            Tone::Info,
            Tone::Primary,
            Tone::Success,
            Tone::Danger,
            Tone::Warning,
        ] {
            let template = format!("{{bar:40.{}/white}}", tone_color(tone));
            assert!(ProgressStyle::with_template(&template).is_ok());
            let _ = style_for(tone);
        }
    }

    #[test]
    fn test_bar_tracks_presentation() {
        let mut view = TerminalView::plain();
        view.show(&render_uploading());
        view.show(&render_queued());

        let bar = view.bar.as_ref().unwrap();
        assert_eq!(bar.position(), 5);
        assert_eq!(bar.prefix(), "Processing Queued");
        assert_eq!(bar.message(), "Upload complete! Applying audio effects...");

        view.clear();
        assert!(view.bar.is_none());
        assert!(view.last_status.is_none());
    }

    #[test]
    fn test_terminal_outcome_releases_bar() {
        let mut view = TerminalView::plain();
        view.show(&render_queued());

        let snapshot = StatusSnapshot {
            state: TaskState::Failure,
            raw_state: "FAILURE".into(),
            progress_percent: 0,
            message: "Task is FAILURE".into(),
            original_filename: None,
            result: None,
            error_detail: Some("decode error".into()),
        };
        view.show(&render_snapshot(&snapshot, Some("song.mp3")));
        assert!(view.bar.is_none());
    }
}
