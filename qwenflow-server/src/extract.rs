//! Safe navigation over provider response envelopes.
//!
//! DashScope wraps payloads in several layers of optional containers. The
//! helpers here never fail on a missing level: they answer `None` and let the
//! caller decide whether absence is fatal.

use serde_json::Value;
use thiserror::Error;

/// Pointer to the assistant text in an OpenAI-compatible completion.
pub const CHAT_CONTENT: &str = "/choices/0/message/content";

/// Pointer to the content list of a native multimodal generation.
pub const MULTIMODAL_CONTENT: &str = "/output/choices/0/message/content";

/// A mandatory field was absent from a provider response.
#[derive(Debug, Clone, Error)]
#[error("no `{field}` in provider response: {raw}")]
pub struct MissingField {
    pub field: &'static str,
    /// The full response, rendered for diagnosis.
    pub raw: String,
}

/// Value at `pointer`, or `None` if any level is missing.
pub fn lookup<'a>(value: &'a Value, pointer: &str) -> Option<&'a Value> {
    value.pointer(pointer)
}

/// Value at `pointer` as text. Strings are returned as-is, other scalars and
/// containers are rendered as JSON; `null` counts as absent.
pub fn lookup_text(value: &Value, pointer: &str) -> Option<String> {
    match lookup(value, pointer)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Assistant text of a chat / vision completion.
pub fn chat_content(response: &Value) -> Option<String> {
    lookup_text(response, CHAT_CONTENT)
}

/// First image reference in a multimodal generation response.
pub fn first_image(response: &Value) -> Option<String> {
    lookup(response, MULTIMODAL_CONTENT)?
        .as_array()?
        .iter()
        .find_map(|item| match item.get("image")? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        })
}

/// What the provider acknowledged when an asynchronous job was accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionFields {
    pub task_id: String,
    pub task_status: Option<String>,
}

/// Pull the task handle out of a submission response. The handle is
/// mandatory; the initial status is not.
pub fn submission(response: &Value) -> Result<SubmissionFields, MissingField> {
    let task_id = lookup_text(response, "/output/task_id")
        .filter(|id| !id.is_empty())
        .ok_or_else(|| MissingField {
            field: "output.task_id",
            raw: response.to_string(),
        })?;
    Ok(SubmissionFields {
        task_id,
        task_status: lookup_text(response, "/output/task_status"),
    })
}

/// Fields of interest in a task status response. All optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusFields {
    pub task_status: Option<String>,
    pub video_url: Option<String>,
    pub code: Option<String>,
    pub message: Option<String>,
}

pub fn task_status(response: &Value) -> StatusFields {
    StatusFields {
        task_status: lookup_text(response, "/output/task_status"),
        video_url: lookup_text(response, "/output/video_url").filter(|u| !u.is_empty()),
        code: lookup_text(response, "/output/code").filter(|c| !c.is_empty()),
        message: lookup_text(response, "/output/message").filter(|m| !m.is_empty()),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_levels_are_absent_not_errors() {
        let v = json!({"choices": []});
        assert_eq!(chat_content(&v), None);
        assert_eq!(chat_content(&json!({})), None);
        assert_eq!(chat_content(&json!({"choices": [{"message": null}]})), None);
        assert_eq!(chat_content(&json!("not an object")), None);
    }

    #[test]
    fn chat_content_is_found() {
        let v = json!({"choices": [{"message": {"role": "assistant", "content": "你好"}}]});
        assert_eq!(chat_content(&v).as_deref(), Some("你好"));
    }

    #[test]
    fn first_image_skips_text_items() {
        let v = json!({"output": {"choices": [{"message": {"content": [
            {"text": "caption"},
            {"image": "https://img/1.png"},
            {"image": "https://img/2.png"}
        ]}}]}});
        assert_eq!(first_image(&v).as_deref(), Some("https://img/1.png"));
    }

    #[test]
    fn first_image_absent_when_content_is_not_a_list() {
        let v = json!({"output": {"choices": [{"message": {"content": "text only"}}]}});
        assert_eq!(first_image(&v), None);
    }

    #[test]
    fn submission_requires_task_id() {
        let err = submission(&json!({"output": {"task_status": "PENDING"}, "request_id": "r1"}))
            .unwrap_err();
        assert_eq!(err.field, "output.task_id");
        assert!(err.raw.contains("r1"));
        assert!(err.to_string().contains("request_id"));
    }

    #[test]
    fn submission_status_is_optional() {
        let fields = submission(&json!({"output": {"task_id": "t1"}})).unwrap();
        assert_eq!(fields.task_id, "t1");
        assert_eq!(fields.task_status, None);
    }

    #[test]
    fn status_fields_ignore_empty_strings() {
        let fields = task_status(&json!({"output": {
            "task_status": "FAILED", "code": "", "message": "invalid input", "video_url": ""
        }}));
        assert_eq!(fields.task_status.as_deref(), Some("FAILED"));
        assert_eq!(fields.code, None);
        assert_eq!(fields.message.as_deref(), Some("invalid input"));
        assert_eq!(fields.video_url, None);
    }
}
