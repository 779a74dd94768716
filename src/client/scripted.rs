//! In-memory [`JobBackend`] driven by per-task scripts.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use moodshift_common::TaskId;
use serde_json::Value;

use super::{JobBackend, PollError, StatusResponse, SubmissionError};
use crate::job::{JobHandle, JobRequest};

type StatusResult = Result<StatusResponse, PollError>;

#[derive(Default)]
struct TaskScript {
    pending: VecDeque<StatusResult>,
    last: Option<StatusResult>,
    calls: usize,
}

/// Submissions are answered in order from a queue; each task's status
/// queries walk its script and then repeat the final entry.
#[derive(Default)]
pub(crate) struct ScriptedBackend {
    submissions: Mutex<VecDeque<Result<JobHandle, SubmissionError>>>,
    submitted: Mutex<Vec<JobRequest>>,
    tasks: Mutex<HashMap<String, TaskScript>>,
    submit_delay: Duration,
    status_delay: Duration,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accept(self, task_id: &str) -> Self {
        self.submissions.lock().unwrap().push_back(Ok(JobHandle {
            task_id: TaskId::new(task_id),
            status_url: format!("/status/{task_id}"),
        }));
        self
    }

    pub fn reject(self, err: SubmissionError) -> Self {
        self.submissions.lock().unwrap().push_back(Err(err));
        self
    }

    pub fn script(self, task_id: &str, responses: Vec<Result<Value, PollError>>) -> Self {
        let pending = responses
            .into_iter()
            .map(|r| r.map(|v| serde_json::from_value(v).unwrap()))
            .collect();
        self.tasks.lock().unwrap().insert(
            task_id.to_string(),
            TaskScript {
                pending,
                ..Default::default()
            },
        );
        self
    }

    /// Every submission takes this long to answer.
    pub fn with_submit_delay(mut self, delay: Duration) -> Self {
        self.submit_delay = delay;
        self
    }

    /// Every status query takes this long to answer.
    pub fn with_status_delay(mut self, delay: Duration) -> Self {
        self.status_delay = delay;
        self
    }

    pub fn submit_calls(&self) -> usize {
        self.submitted.lock().unwrap().len()
    }

    pub fn submitted(&self) -> Vec<JobRequest> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn status_calls(&self, task_id: &str) -> usize {
        self.tasks
            .lock()
            .unwrap()
            .get(task_id)
            .map_or(0, |t| t.calls)
    }

    fn next_status(&self, task_id: &TaskId) -> StatusResult {
        let mut tasks = self.tasks.lock().unwrap();
        let Some(task) = tasks.get_mut(task_id.as_str()) else {
            return Err(PollError::Status(404));
        };
        task.calls += 1;
        match task.pending.pop_front() {
            Some(result) => {
                task.last = Some(result.clone());
                result
            }
            None => task
                .last
                .clone()
                .unwrap_or(Err(PollError::Transport("no scripted response".into()))),
        }
    }
}

#[async_trait::async_trait]
impl JobBackend for ScriptedBackend {
    async fn submit(&self, request: &JobRequest) -> Result<JobHandle, SubmissionError> {
        self.submitted.lock().unwrap().push(request.clone());
        if !self.submit_delay.is_zero() {
            tokio::time::sleep(self.submit_delay).await;
        }
        self.submissions
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(SubmissionError::MalformedResponse))
    }

    async fn status(&self, task_id: &TaskId) -> Result<StatusResponse, PollError> {
        if !self.status_delay.is_zero() {
            tokio::time::sleep(self.status_delay).await;
        }
        self.next_status(task_id)
    }
}
