//! Caller-facing video operations: submit (optionally waiting) and query.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::ServerError;
use crate::extract;
use crate::schemas::video::VideoRequest;
use crate::upstream::{DEFAULT_TIMEOUT, Endpoint, Upstream};

use super::outcome::{PollOutcome, WaitOutcome};
use super::poller::{PollBudget, await_completion};
use super::prober::TaskProber;
use super::state::TaskState;

pub const DEFAULT_RESOLUTION: &str = "720P";
pub const DEFAULT_DURATION_SECS: u32 = 5;
pub const DEFAULT_SHOT_TYPE: &str = "single";

/// The provider accepted a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionAck {
    pub task_id: String,
    pub task_status: TaskState,
}

/// Successful end of a submit call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoReply {
    /// Submitted without waiting.
    Accepted(SubmissionAck),
    /// Waited and the job produced a video.
    Completed { task_id: String, video_url: String },
    /// Waited for the whole budget; the job is still in flight.
    StillRunning { task_id: String, elapsed: Duration },
}

/// Entry point for video generation jobs.
#[derive(Clone)]
pub struct VideoGateway {
    upstream: Arc<dyn Upstream>,
    prober: TaskProber,
    budget: PollBudget,
    model: String,
}

impl VideoGateway {
    pub fn new(upstream: Arc<dyn Upstream>, budget: PollBudget, model: impl Into<String>) -> Self {
        Self {
            prober: TaskProber::new(Arc::clone(&upstream)),
            upstream,
            budget,
            model: model.into(),
        }
    }

    /// Provider payload for an image-to-video job.
    pub fn synthesis_payload(&self, req: &VideoRequest) -> Value {
        let mut input = json!({
            "prompt": req.prompt,
            "img_url": req.image_url.trim(),
        });
        if let Some(audio) = req.audio_url.as_deref().map(str::trim).filter(|a| !a.is_empty()) {
            input["audio_url"] = Value::from(audio);
        }
        json!({
            "model": self.model,
            "input": input,
            "parameters": {
                "resolution": req.resolution.as_deref().unwrap_or(DEFAULT_RESOLUTION),
                "duration": req.duration.unwrap_or(DEFAULT_DURATION_SECS),
                "prompt_extend": req.prompt_extend.unwrap_or(true),
                "shot_type": req.shot_type.as_deref().unwrap_or(DEFAULT_SHOT_TYPE),
            }
        })
    }

    /// Submit a job and return the provider's acknowledgment.
    pub async fn submit(&self, req: &VideoRequest) -> Result<SubmissionAck, ServerError> {
        let response = self
            .upstream
            .call(
                Endpoint::VideoSynthesis,
                Some(self.synthesis_payload(req)),
                DEFAULT_TIMEOUT,
            )
            .await?;

        let fields = extract::submission(&response)?;
        // An accepted job without a reported status has not started yet.
        let task_status = match fields.task_status.as_deref() {
            Some(raw) => TaskState::from_provider(Some(raw)),
            None => TaskState::Pending,
        };
        info!(task_id = %fields.task_id, %task_status, model = %self.model, "video task submitted");

        Ok(SubmissionAck {
            task_id: fields.task_id,
            task_status,
        })
    }

    /// Submit a job and, when `req.wait_for_completion` is set, wait for it
    /// within the configured budget.
    ///
    /// A timeout is a successful [`VideoReply::StillRunning`]; failed,
    /// canceled and unknown jobs are errors.
    pub async fn submit_and_wait(
        &self,
        req: &VideoRequest,
        cancel: &CancellationToken,
    ) -> Result<VideoReply, ServerError> {
        let ack = self.submit(req).await?;
        if !req.wait_for_completion.unwrap_or(false) {
            return Ok(VideoReply::Accepted(ack));
        }

        match await_completion(&self.prober, &ack.task_id, self.budget, cancel).await {
            WaitOutcome::Finished(outcome) => finished(outcome),
            WaitOutcome::TimedOut { task_id, elapsed, .. } => {
                Ok(VideoReply::StillRunning { task_id, elapsed })
            }
            WaitOutcome::Cancelled { task_id, .. } => Err(ServerError::Cancelled(task_id)),
        }
    }

    /// One immediate status probe.
    pub async fn query(&self, task_id: &str) -> PollOutcome {
        self.prober.probe(task_id).await
    }
}

fn finished(outcome: PollOutcome) -> Result<VideoReply, ServerError> {
    info!(
        task_id = outcome.task_id(),
        state = %outcome.state(),
        waited_secs = outcome.elapsed().as_secs(),
        "video wait finished"
    );
    let (task_id, state, result, error) = outcome.into_parts();
    match (state, result) {
        (TaskState::Succeeded, Some(video_url)) => Ok(VideoReply::Completed { task_id, video_url }),
        (TaskState::Succeeded, None) => {
            warn!(%task_id, "video task succeeded without a video_url");
            Err(ServerError::Task {
                task_id,
                state,
                message: "video task succeeded but returned no video_url".to_owned(),
            })
        }
        (state, _) => Err(ServerError::Task {
            task_id,
            state,
            message: error.unwrap_or_else(|| format!("video task ended in state {state}")),
        }),
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
