//! Unified server error type.
//!
//! Every handler returns `Result<T, ServerError>`, which implements
//! [`axum::response::IntoResponse`]. Errors are rendered as
//! `{"detail": "..."}` so the front-end has a single field to display.
//! Upstream HTTP errors keep the provider's status code; everything else
//! maps to a fixed status below.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::extract::MissingField;
use crate::upstream::UpstreamError;
use crate::video::TaskState;

/// All errors that can occur in the qwenflow-server request lifecycle.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The provider was unreachable or answered with a non-success status.
    #[error("upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    /// A field the gateway cannot do without was absent from a response.
    #[error("{0}")]
    MissingField(#[from] MissingField),

    /// A response was well formed but carried no usable result.
    #[error("{0}")]
    NoResult(String),

    /// A waited-on video job ended without producing a video.
    #[error("video task {task_id} ended in {state}: {message}")]
    Task {
        task_id: String,
        state: TaskState,
        message: String,
    },

    /// The local wait for a video job was abandoned.
    #[error("stopped waiting for video task {0}")]
    Cancelled(String),

    /// The caller sent an invalid or malformed request.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The request body could not be parsed or failed validation.
    #[error("unprocessable request: {0}")]
    Unprocessable(String),

    /// The request body exceeded the buffering limit.
    #[error("payload too large: {0}")]
    PayloadTooLarge(String),

    /// The caller referenced a resource that does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A failure inside the server itself, e.g. an unreadable response body.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::Upstream(e) => {
                StatusCode::from_u16(e.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            ServerError::Cancelled(_) => StatusCode::SERVICE_UNAVAILABLE,
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServerError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::MissingField(_)
            | ServerError::NoResult(_)
            | ServerError::Task { .. }
            | ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing text placed in the `detail` field.
    pub fn detail(&self) -> String {
        match self {
            ServerError::Upstream(e) => e.detail.clone(),
            ServerError::MissingField(e) => e.to_string(),
            ServerError::NoResult(m) => m.clone(),
            ServerError::Task { message, .. } => message.clone(),
            ServerError::Cancelled(task_id) => format!(
                "stopped waiting for video task {task_id}; query GET /api/video/task/{task_id} for its status"
            ),
            ServerError::BadRequest(m)
            | ServerError::Unprocessable(m)
            | ServerError::PayloadTooLarge(m)
            | ServerError::NotFound(m) => m.clone(),
            ServerError::Internal(m) => format!("Internal Server Error: {m}"),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = self.detail();

        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "request failed");
        } else {
            warn!(status = status.as_u16(), error = %self, "request rejected");
        }

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
