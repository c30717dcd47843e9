use serde::Serialize;
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

/// Lifecycle state of a provider-side video job.
///
/// Serialized with the provider's own vocabulary so responses can echo it
/// straight back to callers.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum TaskState {
    Pending,
    Running,
    Succeeded,
    Failed,
    #[strum(to_string = "CANCELED", serialize = "CANCELLED")]
    Canceled,
    Unknown,
}

impl TaskState {
    /// Map a provider status string. Absent or unrecognised values are
    /// [`TaskState::Unknown`].
    pub fn from_provider(status: Option<&str>) -> Self {
        status
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(TaskState::Unknown)
    }

    /// `true` once no further change is expected. `Unknown` is terminal so
    /// a missing or broken task never keeps a waiter polling.
    pub fn is_terminal(self) -> bool {
        !matches!(self, TaskState::Pending | TaskState::Running)
    }

    /// Terminal states other than success.
    pub fn is_failure(self) -> bool {
        matches!(
            self,
            TaskState::Failed | TaskState::Canceled | TaskState::Unknown
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn provider_vocabulary_round_trips_through_display() {
        for (raw, state) in [
            ("PENDING", TaskState::Pending),
            ("RUNNING", TaskState::Running),
            ("SUCCEEDED", TaskState::Succeeded),
            ("FAILED", TaskState::Failed),
            ("CANCELED", TaskState::Canceled),
            ("UNKNOWN", TaskState::Unknown),
        ] {
            assert_eq!(TaskState::from_provider(Some(raw)), state);
            assert_eq!(state.to_string(), raw);
            assert_eq!(state.as_ref(), raw);
        }
    }

    #[test]
    fn british_spelling_and_case_are_accepted() {
        assert_eq!(TaskState::from_provider(Some("CANCELLED")), TaskState::Canceled);
        assert_eq!(TaskState::from_provider(Some("running")), TaskState::Running);
    }

    #[test]
    fn absent_or_garbage_status_is_unknown() {
        assert_eq!(TaskState::from_provider(None), TaskState::Unknown);
        assert_eq!(TaskState::from_provider(Some("")), TaskState::Unknown);
        assert_eq!(TaskState::from_provider(Some("QUEUED?")), TaskState::Unknown);
    }

    #[test]
    fn only_pending_and_running_keep_polling() {
        assert!(!TaskState::Pending.is_terminal());
        assert!(!TaskState::Running.is_terminal());
        for s in [
            TaskState::Succeeded,
            TaskState::Failed,
            TaskState::Canceled,
            TaskState::Unknown,
        ] {
            assert!(s.is_terminal(), "{s} should be terminal");
        }
        assert!(!TaskState::Succeeded.is_failure());
        assert!(TaskState::Unknown.is_failure());
    }

    #[test]
    fn serializes_with_provider_names() {
        assert_eq!(
            serde_json::to_value(TaskState::Succeeded).unwrap(),
            serde_json::json!("SUCCEEDED")
        );
    }
}
