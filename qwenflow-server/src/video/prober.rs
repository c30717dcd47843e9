use std::sync::Arc;

use tracing::{debug, warn};

use crate::extract;
use crate::upstream::{Endpoint, STATUS_TIMEOUT, Upstream};

use super::outcome::PollOutcome;
use super::state::TaskState;

/// Issues single status queries for provider jobs.
///
/// A probe never fails: transport and HTTP errors come back as an
/// [`TaskState::Unknown`] outcome carrying the error detail.
#[derive(Clone)]
pub struct TaskProber {
    upstream: Arc<dyn Upstream>,
}

impl TaskProber {
    pub fn new(upstream: Arc<dyn Upstream>) -> Self {
        Self { upstream }
    }

    pub async fn probe(&self, task_id: &str) -> PollOutcome {
        let response = match self
            .upstream
            .call(Endpoint::TaskStatus(task_id.to_owned()), None, STATUS_TIMEOUT)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(
                    task_id,
                    transport = e.is_transport(),
                    status = e.status,
                    error = %e,
                    "task status probe failed"
                );
                return PollOutcome::failed(task_id, TaskState::Unknown, e.detail);
            }
        };

        let fields = extract::task_status(&response);
        let state = TaskState::from_provider(fields.task_status.as_deref());
        debug!(task_id, raw_status = ?fields.task_status, %state, "task status probed");

        match state {
            TaskState::Pending | TaskState::Running => PollOutcome::in_progress(task_id, state),
            TaskState::Succeeded => {
                if fields.video_url.is_none() {
                    warn!(task_id, "task succeeded without a video_url");
                }
                PollOutcome::succeeded(task_id, fields.video_url)
            }
            TaskState::Failed | TaskState::Canceled | TaskState::Unknown => {
                let error = failure_message(state, fields.code, fields.message);
                PollOutcome::failed(task_id, state, error)
            }
        }
    }
}

fn failure_message(state: TaskState, code: Option<String>, message: Option<String>) -> String {
    match (code, message) {
        (Some(code), Some(message)) => format!("{code}: {message}"),
        (None, Some(message)) => message,
        (Some(code), None) => code,
        (None, None) => match state {
            TaskState::Canceled => "video task was canceled".to_owned(),
            TaskState::Unknown => "video task status is unknown".to_owned(),
            _ => "video task failed".to_owned(),
        },
    }
}
