use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::video::{PollOutcome, TaskState};

/// Request body for `POST /api/video`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct VideoRequest {
    /// What should happen in the video.
    pub prompt: String,
    /// First frame of the video.
    #[validate(length(min = 1, message = "image_url must not be empty"))]
    pub image_url: String,
    /// Optional soundtrack.
    #[serde(default)]
    pub audio_url: Option<String>,
    /// `"480P"`, `"720P"` (default) or `"1080P"`.
    #[serde(default)]
    pub resolution: Option<String>,
    /// Let the provider rewrite the prompt (default `true`).
    #[serde(default)]
    pub prompt_extend: Option<bool>,
    /// Length in seconds (default `5`).
    #[serde(default)]
    pub duration: Option<u32>,
    /// `"single"` (default) or `"multi"`.
    #[serde(default)]
    pub shot_type: Option<String>,
    /// Block until the job finishes or the wait budget runs out.
    #[serde(default)]
    pub wait_for_completion: Option<bool>,
}

/// Job handle returned inside `result` when no video is available yet,
/// either because the caller did not wait or because the wait timed out.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VideoTaskHandle {
    pub task_id: String,
    pub task_status: TaskState,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// `result` of `POST /api/video`: the video URL once the job finished,
/// otherwise the job handle.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(untagged)]
pub enum VideoResult {
    Url(String),
    Task(VideoTaskHandle),
}

/// Response body for `GET /api/video/task/{task_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct VideoTaskStatus {
    pub task_id: String,
    pub task_status: TaskState,
    /// Video URL, present once the job succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    /// Same as `result`; kept for clients that read the provider's name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    /// Failure reason for failed, canceled or unknown jobs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<PollOutcome> for VideoTaskStatus {
    fn from(outcome: PollOutcome) -> Self {
        let (task_id, task_status, result, error) = outcome.into_parts();
        Self {
            task_id,
            task_status,
            video_url: result.clone(),
            result,
            error,
        }
    }
}
