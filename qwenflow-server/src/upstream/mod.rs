//! Upstream provider access.
//!
//! Every call to DashScope goes through the [`Upstream`] trait so the rest of
//! the server deals with exactly one success type (`serde_json::Value`) and
//! one error type ([`UpstreamError`]) regardless of whether a failure came
//! from the network or from the provider's HTTP status.

pub mod dashscope;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use thiserror::Error;

pub use dashscope::DashScopeClient;

/// Timeout for plain text / vision calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Timeout for image generation and editing, which render synchronously.
pub const IMAGE_TIMEOUT: Duration = Duration::from_secs(120);

/// Timeout for a single task-status probe.
pub const STATUS_TIMEOUT: Duration = Duration::from_secs(30);

/// Provider endpoints the gateway talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// OpenAI-compatible chat completions (text and vision).
    ChatCompletions,
    /// Native multimodal generation (image generation and editing).
    MultimodalGeneration,
    /// Asynchronous video synthesis job submission.
    VideoSynthesis,
    /// Status of a previously submitted asynchronous job.
    TaskStatus(String),
}

impl Endpoint {
    /// Path relative to the provider root URL.
    pub fn path(&self) -> String {
        match self {
            Endpoint::ChatCompletions => "/compatible-mode/v1/chat/completions".to_owned(),
            Endpoint::MultimodalGeneration => {
                "/api/v1/services/aigc/multimodal-generation/generation".to_owned()
            }
            Endpoint::VideoSynthesis => {
                "/api/v1/services/aigc/video-generation/video-synthesis".to_owned()
            }
            Endpoint::TaskStatus(task_id) => format!("/api/v1/tasks/{task_id}"),
        }
    }

    pub fn method(&self) -> Method {
        match self {
            Endpoint::TaskStatus(_) => Method::GET,
            _ => Method::POST,
        }
    }

    /// Whether the provider must be told to run the job asynchronously.
    pub fn is_async_submission(&self) -> bool {
        matches!(self, Endpoint::VideoSynthesis)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method(), self.path())
    }
}

/// Where an [`UpstreamError`] originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamErrorKind {
    /// The provider answered with a non-success HTTP status.
    Http,
    /// The provider could not be reached or its answer could not be read.
    Transport,
}

/// Normalized provider failure.
///
/// `status` is the HTTP status the gateway should answer with and `detail`
/// is the client-facing message (`"<code>: <message>"`, raw body text, or
/// `"Internal Server Error: <cause>"`).
#[derive(Debug, Clone, Error)]
#[error("{detail}")]
pub struct UpstreamError {
    pub status: u16,
    pub detail: String,
    pub kind: UpstreamErrorKind,
}

impl UpstreamError {
    /// Wrap a connection, DNS, timeout or decode failure.
    pub fn transport(cause: impl fmt::Display) -> Self {
        Self {
            status: 500,
            detail: format!("Internal Server Error: {cause}"),
            kind: UpstreamErrorKind::Transport,
        }
    }

    /// Build the error for a non-success response from its status and body.
    ///
    /// A JSON object body yields `"<code>: <message>"`; anything else is
    /// passed through verbatim.
    pub fn from_response(status: u16, body: &str) -> Self {
        let detail = match serde_json::from_str::<Value>(body) {
            Ok(data @ Value::Object(_)) => {
                let message = non_empty_text(data.get("message"))
                    .or_else(|| match data.get("error") {
                        Some(err) => Some(
                            non_empty_text(err.get("message")).unwrap_or_else(|| data.to_string()),
                        ),
                        None => None,
                    })
                    .unwrap_or_else(|| data.to_string());
                let code = non_empty_text(data.get("code")).unwrap_or_else(|| "Error".to_owned());
                format!("{code}: {message}")
            }
            _ => body.to_owned(),
        };
        Self {
            status,
            detail,
            kind: UpstreamErrorKind::Http,
        }
    }

    pub fn is_transport(&self) -> bool {
        self.kind == UpstreamErrorKind::Transport
    }
}

fn non_empty_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// An authenticated JSON-over-HTTP provider.
#[async_trait]
pub trait Upstream: Send + Sync + 'static {
    /// Perform one call. `payload` is sent as the JSON body when present.
    async fn call(
        &self,
        endpoint: Endpoint,
        payload: Option<Value>,
        timeout: Duration,
    ) -> Result<Value, UpstreamError>;
}

#[cfg(test)]
pub mod testing {
    //! Scripted provider used by unit tests across the crate.

    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// Replays canned responses in order. The last response repeats forever
    /// so "always RUNNING" style scripts only need one entry.
    pub struct ScriptedUpstream {
        responses: Mutex<VecDeque<Result<Value, UpstreamError>>>,
        calls: Mutex<Vec<(Endpoint, Option<Value>)>>,
    }

    impl ScriptedUpstream {
        pub fn new(responses: Vec<Result<Value, UpstreamError>>) -> Self {
            assert!(!responses.is_empty(), "script needs at least one response");
            Self {
                responses: Mutex::new(responses.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> Vec<(Endpoint, Option<Value>)> {
            self.calls.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Upstream for ScriptedUpstream {
        async fn call(
            &self,
            endpoint: Endpoint,
            payload: Option<Value>,
            _timeout: Duration,
        ) -> Result<Value, UpstreamError> {
            self.calls.lock().unwrap().push((endpoint, payload));
            let mut responses = self.responses.lock().unwrap();
            if responses.len() > 1 {
                responses.pop_front().unwrap()
            } else {
                responses.front().cloned().unwrap()
            }
        }
    }

    /// Provider status body in the shape DashScope's task endpoint returns.
    pub fn status_body(status: &str) -> Value {
        serde_json::json!({
            "request_id": "req-1",
            "output": { "task_id": "task-1", "task_status": status }
        })
    }
}
