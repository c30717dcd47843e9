use std::time::Duration;

use super::state::TaskState;

/// Result of one status probe.
///
/// `result` is only ever set for [`TaskState::Succeeded`] and `error` only
/// for failure states; the constructors enforce this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollOutcome {
    task_id: String,
    state: TaskState,
    result: Option<String>,
    error: Option<String>,
    elapsed: Duration,
}

impl PollOutcome {
    /// A job that is still queued or running.
    pub fn in_progress(task_id: impl Into<String>, state: TaskState) -> Self {
        debug_assert!(!state.is_terminal());
        Self {
            task_id: task_id.into(),
            state,
            result: None,
            error: None,
            elapsed: Duration::ZERO,
        }
    }

    /// A finished job. `video_url` may be missing if the provider omitted it.
    pub fn succeeded(task_id: impl Into<String>, video_url: Option<String>) -> Self {
        Self {
            task_id: task_id.into(),
            state: TaskState::Succeeded,
            result: video_url,
            error: None,
            elapsed: Duration::ZERO,
        }
    }

    /// A job in `Failed`, `Canceled` or `Unknown`.
    pub fn failed(task_id: impl Into<String>, state: TaskState, error: impl Into<String>) -> Self {
        debug_assert!(state.is_failure());
        Self {
            task_id: task_id.into(),
            state,
            result: None,
            error: Some(error.into()),
            elapsed: Duration::ZERO,
        }
    }

    /// Same outcome stamped with the time spent waiting so far.
    pub fn with_elapsed(self, elapsed: Duration) -> Self {
        Self { elapsed, ..self }
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    #[cfg(test)]
    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    #[cfg(test)]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn into_parts(self) -> (String, TaskState, Option<String>, Option<String>) {
        (self.task_id, self.state, self.result, self.error)
    }
}

/// How a bounded wait on a job ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The job reached a terminal state inside the budget.
    Finished(PollOutcome),
    /// The budget ran out while the job was still pending or running. The
    /// job may still complete; callers poll it out of band.
    TimedOut {
        task_id: String,
        last_state: TaskState,
        elapsed: Duration,
    },
    /// The local wait was cancelled. The provider job keeps running.
    Cancelled { task_id: String, elapsed: Duration },
}
