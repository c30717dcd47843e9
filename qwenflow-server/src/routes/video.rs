//! Video generation routes.
//!
//! `POST /api/video` submits an image-to-video job and either returns the
//! task handle right away or waits for the job within the configured budget.
//! `GET /api/video/task/{task_id}` probes a job once.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::debug;
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::routes::body::ValidatedJson;
use crate::schemas::ResultResponse;
use crate::schemas::video::{VideoRequest, VideoResult, VideoTaskHandle, VideoTaskStatus};
use crate::state::AppState;
use crate::video::{TaskState, VideoReply};

#[derive(OpenApi)]
#[openapi(
    paths(submit_video, get_video_task),
    components(schemas(VideoRequest, VideoResult, VideoTaskHandle, VideoTaskStatus, TaskState))
)]
pub struct VideoApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/video", post(submit_video))
        .route("/video/task/{task_id}", get(get_video_task))
}

/// Submit a video job (`POST /api/video`).
///
/// With `wait_for_completion: true` the call blocks until the job finishes
/// (`{"result": "<video url>"}`) or the wait budget runs out, in which case
/// the task handle is returned with `task_status: "RUNNING"` and HTTP 200.
#[utoipa::path(
    post,
    path = "/api/video",
    tag = "video",
    request_body = VideoRequest,
    responses(
        (status = 200, description = "Video URL, or task handle when not finished", body = serde_json::Value),
        (status = 422, description = "Invalid request body"),
        (status = 500, description = "Provider or task failure"),
        (status = 503, description = "Wait abandoned during shutdown"),
    )
)]
pub async fn submit_video(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<VideoRequest>,
) -> Result<Json<ResultResponse<VideoResult>>, ServerError> {
    debug!(
        image_url = %req.image_url,
        wait = req.wait_for_completion.unwrap_or(false),
        "video request"
    );

    // Client disconnects drop this future; the guard then cancels the
    // child token alongside server shutdown.
    let cancel = state.shutdown.child_token();
    let _cancel_on_drop = cancel.clone().drop_guard();

    let result = match state.video.submit_and_wait(&req, &cancel).await? {
        VideoReply::Completed { video_url, .. } => VideoResult::Url(video_url),
        VideoReply::Accepted(ack) => VideoResult::Task(VideoTaskHandle {
            message: format!(
                "video task submitted; query GET /api/video/task/{} for the result",
                ack.task_id
            ),
            task_id: ack.task_id,
            task_status: ack.task_status,
            error: None,
        }),
        VideoReply::StillRunning { task_id, elapsed } => VideoResult::Task(VideoTaskHandle {
            message: format!(
                "video task is still running; query GET /api/video/task/{task_id} for the result"
            ),
            error: Some(format!(
                "timed out after waiting {}s for the video task",
                elapsed.as_secs()
            )),
            task_id,
            task_status: TaskState::Running,
        }),
    };

    Ok(Json(ResultResponse::new(result)))
}

/// Probe a video job once (`GET /api/video/task/{task_id}`).
#[utoipa::path(
    get,
    path = "/api/video/task/{task_id}",
    tag = "video",
    params(
        ("task_id" = String, Path, description = "Task id returned by POST /api/video")
    ),
    responses(
        (status = 200, description = "Current task state", body = VideoTaskStatus),
        (status = 400, description = "Malformed task id"),
    )
)]
pub async fn get_video_task(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
) -> Result<Json<VideoTaskStatus>, ServerError> {
    if !is_valid_task_id(&task_id) {
        return Err(ServerError::BadRequest(format!("invalid task id: {task_id}")));
    }
    let outcome = state.video.query(&task_id).await;
    Ok(Json(outcome.into()))
}

/// Provider task ids are UUID-like; anything else would alter the upstream
/// request path.
fn is_valid_task_id(task_id: &str) -> bool {
    !task_id.is_empty()
        && task_id.len() <= 128
        && task_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn task_id_charset_is_restricted() {
        assert!(is_valid_task_id("0385dc79-5ff8-4d82-bcb6-xxxxxx"));
        assert!(is_valid_task_id("task_1"));
        assert!(!is_valid_task_id(""));
        assert!(!is_valid_task_id(".."));
        assert!(!is_valid_task_id("a?b=c"));
        assert!(!is_valid_task_id(&"a".repeat(129)));
    }
}
