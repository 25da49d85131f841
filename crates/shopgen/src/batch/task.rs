use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Pending,
    Running,
    Succeeded,
    /// Rate limited; will be retried after the backoff pause.
    FailedRetryable,
    FailedTerminal,
    /// Never completed because the run was stopped.
    Skipped,
}

impl TaskState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskState::Succeeded | TaskState::FailedTerminal | TaskState::Skipped
        )
    }
}

impl std::fmt::Display for TaskState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskState::Pending => write!(f, "Pending"),
            TaskState::Running => write!(f, "Running"),
            TaskState::Succeeded => write!(f, "Succeeded"),
            TaskState::FailedRetryable => write!(f, "Rate limited"),
            TaskState::FailedTerminal => write!(f, "Failed"),
            TaskState::Skipped => write!(f, "Skipped"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GenerationTask<P> {
    /// 0-based position in the batch.
    pub id: usize,
    /// Whatever the executor needs (images, note); never inspected here.
    pub payload: P,
    pub state: TaskState,
    /// Number of times the executor has been invoked for this task.
    pub attempts: u32,
}

impl<P> GenerationTask<P> {
    pub fn new(id: usize, payload: P) -> Self {
        Self {
            id,
            payload,
            state: TaskState::Pending,
            attempts: 0,
        }
    }
}

/// Result of a single executor invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaskOutcome {
    Succeeded,
    RateLimited { message: String },
    Failed { message: String },
}

/// A task that ended `FailedTerminal`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskFailure {
    pub task_id: usize,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_task_is_pending() {
        let task = GenerationTask::new(3, "payload");
        assert_eq!(task.id, 3);
        assert_eq!(task.state, TaskState::Pending);
        assert_eq!(task.attempts, 0);
    }

    #[test]
    fn test_terminal_states() {
        assert!(TaskState::Succeeded.is_terminal());
        assert!(TaskState::FailedTerminal.is_terminal());
        assert!(TaskState::Skipped.is_terminal());
        assert!(!TaskState::Pending.is_terminal());
        assert!(!TaskState::Running.is_terminal());
        assert!(!TaskState::FailedRetryable.is_terminal());
    }

    #[test]
    fn test_outcome_serialization() {
        let json = serde_json::to_string(&TaskOutcome::Failed {
            message: "bad json".to_string(),
        })
        .unwrap();
        assert_eq!(json, r#"{"kind":"failed","message":"bad json"}"#);
    }
}
