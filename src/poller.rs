//! Status poller: one repeating status query per active job.
//!
//! The poller runs as a spawned task that owns its timer. It stops on the
//! first terminal snapshot or when its [`PollerHandle`] is cancelled,
//! whichever comes first. Query failures are reported and polling goes on.

use std::sync::Arc;
use std::time::Duration;

use moodshift_common::TaskId;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::client::{JobBackend, PollError};
use crate::job::JobHandle;
use crate::status::StatusSnapshot;

/// Reference cadence between status queries.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2500);

/// What one poll tick produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollEvent {
    Snapshot(StatusSnapshot),
    /// A single query failed. Never terminal.
    TransientError(PollError),
}

impl PollEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Snapshot(snap) if snap.state.is_terminal())
    }
}

/// Starts pollers against a shared backend.
pub struct StatusPoller<B: ?Sized> {
    backend: Arc<B>,
    interval: Duration,
}

impl<B> StatusPoller<B>
where
    B: JobBackend + ?Sized + 'static,
{
    pub fn new(backend: Arc<B>, interval: Duration) -> Self {
        Self { backend, interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Spawn the polling task for `handle`.
    ///
    /// The first query happens one interval after this call. `on_event` is
    /// invoked from the polling task and never after the returned handle
    /// has been cancelled.
    pub fn start<F>(&self, handle: &JobHandle, on_event: F) -> PollerHandle
    where
        F: FnMut(PollEvent) + Send + 'static,
    {
        let token = CancellationToken::new();
        let task_id = handle.task_id.clone();

        tracing::debug!(
            task_id = %task_id,
            status_url = %handle.status_url,
            interval_ms = self.interval.as_millis() as u64,
            "Starting status poller"
        );

        tokio::spawn(run_poll_loop(
            Arc::clone(&self.backend),
            task_id.clone(),
            self.interval,
            token.clone(),
            on_event,
        ));

        PollerHandle { token, task_id }
    }
}

async fn run_poll_loop<B, F>(
    backend: Arc<B>,
    task_id: TaskId,
    interval: Duration,
    token: CancellationToken,
    mut on_event: F,
) where
    B: JobBackend + ?Sized,
    F: FnMut(PollEvent) + Send,
{
    let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let result = tokio::select! {
            biased;
            _ = token.cancelled() => break,
            result = backend.status(&task_id) => result,
        };

        // Cancelled while the query was resolving; the answer belongs to nobody.
        if token.is_cancelled() {
            tracing::debug!(task_id = %task_id, "Discarding late status response");
            break;
        }

        match result {
            Ok(response) => {
                let snapshot = StatusSnapshot::from_response(&response);
                let terminal = snapshot.state.is_terminal();
                tracing::debug!(
                    task_id = %task_id,
                    state = %snapshot.state,
                    progress = snapshot.progress_percent,
                    "Status update"
                );
                on_event(PollEvent::Snapshot(snapshot));
                if terminal {
                    token.cancel();
                    break;
                }
            }
            Err(e) => {
                tracing::warn!(task_id = %task_id, "Status poll failed, will retry: {e}");
                on_event(PollEvent::TransientError(e));
            }
        }
    }

    tracing::debug!(task_id = %task_id, "Status poller stopped");
}

/// Owner's handle on a running poller. Dropping it cancels the poller.
#[derive(Debug)]
pub struct PollerHandle {
    token: CancellationToken,
    task_id: TaskId,
}

impl PollerHandle {
    /// Stop polling. Safe to call any number of times, including after the
    /// poller stopped on its own.
    pub fn cancel(&self) {
        if !self.token.is_cancelled() {
            tracing::debug!(task_id = %self.task_id, "Cancelling status poller");
            self.token.cancel();
        }
    }

    /// True once cancelled or after a terminal snapshot.
    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn task_id(&self) -> &TaskId {
        &self.task_id
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
