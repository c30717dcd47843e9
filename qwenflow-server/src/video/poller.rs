//! Bounded, cancellable polling of a provider job.

use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::outcome::WaitOutcome;
use super::prober::TaskProber;
use super::state::TaskState;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BudgetError {
    #[error("poll interval must be greater than zero")]
    ZeroInterval,
}

/// `(max_wait, interval)` pair bounding a synchronous wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollBudget {
    max_wait: Duration,
    interval: Duration,
}

impl PollBudget {
    pub fn new(max_wait: Duration, interval: Duration) -> Result<Self, BudgetError> {
        if interval.is_zero() {
            return Err(BudgetError::ZeroInterval);
        }
        Ok(Self { max_wait, interval })
    }

    pub fn max_wait(&self) -> Duration {
        self.max_wait
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

/// Probe `task_id` every `budget.interval` until it reaches a terminal state,
/// the budget is spent, or `cancel` fires.
///
/// Elapsed time advances by one interval per sleep, so a job that turns
/// terminal on the last probe before the deadline is reported as finished,
/// never as timed out. Both the probe and the sleep are cancellation points.
pub async fn await_completion(
    prober: &TaskProber,
    task_id: &str,
    budget: PollBudget,
    cancel: &CancellationToken,
) -> WaitOutcome {
    let mut elapsed = Duration::ZERO;
    let mut last_state = TaskState::Pending;

    while elapsed < budget.max_wait {
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => return cancelled(task_id, elapsed),
            outcome = prober.probe(task_id) => outcome,
        };

        if outcome.state().is_terminal() {
            info!(
                task_id,
                state = %outcome.state(),
                elapsed_secs = elapsed.as_secs(),
                "video task reached a terminal state"
            );
            return WaitOutcome::Finished(outcome.with_elapsed(elapsed));
        }

        last_state = outcome.state();
        debug!(
            task_id,
            state = %last_state,
            elapsed_secs = elapsed.as_secs(),
            "video task still in flight"
        );

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return cancelled(task_id, elapsed),
            _ = tokio::time::sleep(budget.interval) => {}
        }
        elapsed += budget.interval;
    }

    info!(
        task_id,
        state = %last_state,
        elapsed_secs = elapsed.as_secs(),
        "gave up waiting for video task"
    );
    WaitOutcome::TimedOut {
        task_id: task_id.to_owned(),
        last_state,
        elapsed,
    }
}

fn cancelled(task_id: &str, elapsed: Duration) -> WaitOutcome {
    info!(task_id, elapsed_secs = elapsed.as_secs(), "stopped waiting for video task");
    WaitOutcome::Cancelled {
        task_id: task_id.to_owned(),
        elapsed,
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
