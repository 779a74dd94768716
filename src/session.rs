//! Session controller: at most one live job, and the only writer of the
//! status display.
//!
//! A [`SessionController`] owns the backend, the view and the active job.
//! Submitting a new job cancels the previous poller before the new one is
//! armed, and every poll event is tagged with the generation of the job
//! that produced it so events from a superseded job are dropped unrendered.

use std::sync::Arc;
use std::time::Duration;

use moodshift_common::{EffectDescriptor, OutputFormat, ValidationError};
use tokio::sync::mpsc;

use crate::client::{JobBackend, PollError, SubmissionError};
use crate::config::{Config, UploadConfig};
use crate::job::{InputArtifact, JobHandle, JobRequest, SubmissionForm};
use crate::poller::{PollEvent, PollerHandle, StatusPoller, DEFAULT_POLL_INTERVAL};
use crate::render::{
    render_poll_warning, render_queued, render_snapshot, render_submission_error,
    render_uploading, render_validation_warning, Presentation,
};
use crate::status::StatusSnapshot;

/// Where the session is in the submit/poll lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Idle,
    /// Assembling the request from validated input.
    Preparing,
    /// The upload request is in flight.
    Uploading,
    /// The backend holds the job and the poller is running.
    Processing,
}

/// State of the submission controls. Derived from the phase, never set directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormControls {
    pub enabled: bool,
    pub submit_label: &'static str,
    pub busy: bool,
}

impl FormControls {
    pub fn for_phase(phase: SessionPhase) -> Self {
        match phase {
            SessionPhase::Idle => Self {
                enabled: true,
                submit_label: "Apply Effects & Process",
                busy: false,
            },
            SessionPhase::Preparing => Self {
                enabled: false,
                submit_label: "Preparing effects...",
                busy: true,
            },
            SessionPhase::Uploading => Self {
                enabled: false,
                submit_label: "Uploading...",
                busy: true,
            },
            SessionPhase::Processing => Self {
                enabled: false,
                submit_label: "Applying Effects...",
                busy: true,
            },
        }
    }
}

/// Output surface for a session.
pub trait StatusView {
    /// Remove any displayed progress, status and outcome.
    fn clear(&mut self);

    fn show(&mut self, presentation: &Presentation);

    fn controls_changed(&mut self, controls: &FormControls);
}

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub poll_interval: Duration,
    pub upload: UploadConfig,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            upload: UploadConfig::default(),
        }
    }
}

impl SessionSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            poll_interval: config.polling.interval(),
            upload: config.upload.clone(),
        }
    }
}

#[derive(Debug)]
struct ActiveJob {
    handle: JobHandle,
    filename: String,
    generation: u64,
    poller: PollerHandle,
}

/// The session's single active-job slot.
#[derive(Debug, Default)]
struct SessionState {
    active: Option<ActiveJob>,
}

impl SessionState {
    /// Cancel any live poller and forget the job.
    fn reset(&mut self) {
        if let Some(job) = self.active.take() {
            job.poller.cancel();
        }
    }
}

/// Returns the controls to idle if an upload future is dropped mid-flight.
struct UploadGuard<'a, V: StatusView> {
    phase: &'a mut SessionPhase,
    view: &'a mut V,
    armed: bool,
}

impl<V: StatusView> Drop for UploadGuard<'_, V> {
    fn drop(&mut self) {
        if self.armed {
            tracing::warn!("Upload interrupted before the server answered");
            *self.phase = SessionPhase::Idle;
            self.view
                .controls_changed(&FormControls::for_phase(SessionPhase::Idle));
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

/// One rendered step of the active job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionUpdate {
    /// A non-terminal snapshot.
    Progress(StatusSnapshot),
    /// A status query failed; the job is still being polled.
    Warning(PollError),
    /// SUCCESS or FAILURE. The session is idle again.
    Finished(StatusSnapshot),
}

pub struct SessionController<B: JobBackend + ?Sized + 'static, V: StatusView> {
    backend: Arc<B>,
    poller: StatusPoller<B>,
    view: V,
    settings: SessionSettings,
    phase: SessionPhase,
    state: SessionState,
    generation: u64,
    events_tx: mpsc::UnboundedSender<(u64, PollEvent)>,
    events_rx: mpsc::UnboundedReceiver<(u64, PollEvent)>,
    display: Option<Presentation>,
}

impl<B, V> SessionController<B, V>
where
    B: JobBackend + ?Sized + 'static,
    V: StatusView,
{
    pub fn new(backend: Arc<B>, view: V, settings: SessionSettings) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            poller: StatusPoller::new(Arc::clone(&backend), settings.poll_interval),
            backend,
            view,
            settings,
            phase: SessionPhase::Idle,
            state: SessionState::default(),
            generation: 0,
            events_tx,
            events_rx,
            display: None,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn controls(&self) -> FormControls {
        FormControls::for_phase(self.phase)
    }

    pub fn submit_label(&self) -> &'static str {
        self.controls().submit_label
    }

    pub fn active_job(&self) -> Option<&JobHandle> {
        self.state.active.as_ref().map(|job| &job.handle)
    }

    /// What the view currently shows, if anything.
    pub fn display(&self) -> Option<&Presentation> {
        self.display.as_ref()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Validate, upload and start polling a new job.
    ///
    /// Validation failures leave any active job untouched and make no
    /// network call. Past validation, the previous job (if any) is
    /// cancelled before anything is sent.
    pub async fn submit(&mut self, form: &SubmissionForm) -> Result<JobHandle, SessionError> {
        let (input, output_format, effects) = match self.validate(form).await {
            Ok(parts) => parts,
            Err(e) => {
                tracing::warn!("Submission blocked: {e}");
                self.present(render_validation_warning(&e.to_string()));
                return Err(e.into());
            }
        };

        self.state.reset();
        self.view.clear();
        self.display = None;

        self.set_phase(SessionPhase::Preparing);
        let request = JobRequest::assemble(input, output_format, effects);

        self.set_phase(SessionPhase::Uploading);
        self.present(render_uploading());
        tracing::info!(
            file = %request.input().filename(),
            bytes = request.input().len(),
            format = %request.output_format(),
            effects = request.effects().len(),
            "Submitting job"
        );

        let submitted = {
            let mut guard = UploadGuard {
                phase: &mut self.phase,
                view: &mut self.view,
                armed: true,
            };
            let submitted = self.backend.submit(&request).await;
            guard.armed = false;
            submitted
        };

        let handle = match submitted {
            Ok(handle) => handle,
            Err(e) => {
                tracing::error!("Submission failed: {e}");
                self.present(render_submission_error(&e));
                self.set_phase(SessionPhase::Idle);
                return Err(e.into());
            }
        };

        tracing::info!(task_id = %handle.task_id, status_url = %handle.status_url, "Job accepted");
        self.present(render_queued());

        self.generation += 1;
        let generation = self.generation;
        let tx = self.events_tx.clone();
        let poller = self.poller.start(&handle, move |event| {
            let _ = tx.send((generation, event));
        });

        self.state.active = Some(ActiveJob {
            handle: handle.clone(),
            filename: request.input().filename().to_string(),
            generation,
            poller,
        });
        self.set_phase(SessionPhase::Processing);

        Ok(handle)
    }

    async fn validate(
        &self,
        form: &SubmissionForm,
    ) -> Result<(InputArtifact, OutputFormat, Vec<EffectDescriptor>), ValidationError> {
        let selected = form.file.as_ref().ok_or(ValidationError::NoFileSelected)?;

        let output_format = match form.output_format.trim() {
            "" => self.settings.upload.default_format,
            raw => raw.parse()?,
        };

        let effects = form.effects.build()?;
        let input = InputArtifact::load(selected, &self.settings.upload).await?;

        Ok((input, output_format, effects))
    }

    /// Wait for the next event of the active job and render it.
    ///
    /// Returns `None` when no job is active.
    pub async fn next_update(&mut self) -> Option<SessionUpdate> {
        loop {
            let active_generation = self.state.active.as_ref()?.generation;
            let (generation, event) = self.events_rx.recv().await?;

            if generation != active_generation {
                tracing::debug!(generation, active_generation, "Dropping event from superseded job");
                continue;
            }

            return Some(self.apply(event));
        }
    }

    /// Drive the active job to SUCCESS or FAILURE.
    ///
    /// Returns `None` when no job is active.
    pub async fn run_until_terminal(&mut self) -> Option<StatusSnapshot> {
        while let Some(update) = self.next_update().await {
            if let SessionUpdate::Finished(snapshot) = update {
                return Some(snapshot);
            }
        }
        None
    }

    /// Stop the active job's poller without rendering anything. Idempotent.
    pub fn cancel(&mut self) {
        if let Some(job) = self.state.active.as_ref() {
            tracing::info!(task_id = %job.handle.task_id, "Cancelling active job");
            self.state.reset();
            self.set_phase(SessionPhase::Idle);
        }
    }

    fn apply(&mut self, event: PollEvent) -> SessionUpdate {
        match event {
            PollEvent::Snapshot(snapshot) => {
                let filename = self.state.active.as_ref().map(|job| job.filename.as_str());
                let presentation = render_snapshot(&snapshot, filename);
                self.present(presentation);

                if snapshot.state.is_terminal() {
                    tracing::info!(state = %snapshot.state, "Job finished");
                    self.state.reset();
                    self.set_phase(SessionPhase::Idle);
                    SessionUpdate::Finished(snapshot)
                } else {
                    SessionUpdate::Progress(snapshot)
                }
            }
            PollEvent::TransientError(e) => {
                self.present(render_poll_warning(self.display.as_ref()));
                SessionUpdate::Warning(e)
            }
        }
    }

    fn present(&mut self, presentation: Presentation) {
        self.view.show(&presentation);
        self.display = Some(presentation);
    }

    fn set_phase(&mut self, phase: SessionPhase) {
        self.phase = phase;
        self.view.controls_changed(&FormControls::for_phase(phase));
    }
}
