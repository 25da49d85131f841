//! Batch progress broadcaster for real-time status streaming.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Phase of a batch run as seen by subscribers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BatchPhase {
    Started,
    Generating,
    TaskSucceeded,
    TaskFailed,
    RateLimited,
    Progress,
    Paused,
    Resumed,
    Completed,
    Stopped,
}

impl std::fmt::Display for BatchPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BatchPhase::Started => write!(f, "Started"),
            BatchPhase::Generating => write!(f, "Generating"),
            BatchPhase::TaskSucceeded => write!(f, "Product generated"),
            BatchPhase::TaskFailed => write!(f, "Product failed"),
            BatchPhase::RateLimited => write!(f, "Rate limited"),
            BatchPhase::Progress => write!(f, "Progress"),
            BatchPhase::Paused => write!(f, "Paused"),
            BatchPhase::Resumed => write!(f, "Resumed"),
            BatchPhase::Completed => write!(f, "Completed"),
            BatchPhase::Stopped => write!(f, "Stopped"),
        }
    }
}

/// Progress event for a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchProgressEvent {
    /// Unique run identifier.
    pub run_id: String,
    pub phase: BatchPhase,
    /// Tasks processed so far.
    pub current: usize,
    pub total: usize,
    /// `round(current / total * 100)`.
    pub percent: u8,
    /// Human-readable status line.
    pub message: String,
    pub timestamp: DateTime<Utc>,
    /// Task the event refers to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<usize>,
    /// Error message (set on failure or rate limit).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Seconds left in the current pause.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_seconds: Option<u64>,
}

impl BatchProgressEvent {
    pub fn new(run_id: &str, phase: BatchPhase, current: usize, total: usize, message: &str) -> Self {
        let percent = if total == 0 {
            0
        } else {
            ((current as f64 / total as f64) * 100.0).round() as u8
        };

        Self {
            run_id: run_id.to_string(),
            phase,
            current,
            total,
            percent,
            message: message.to_string(),
            timestamp: Utc::now(),
            task_id: None,
            error: None,
            remaining_seconds: None,
        }
    }

    pub fn with_task(mut self, task_id: usize) -> Self {
        self.task_id = Some(task_id);
        self
    }

    pub fn with_error(mut self, error: &str) -> Self {
        self.error = Some(error.to_string());
        self
    }

    pub fn with_remaining(mut self, seconds: u64) -> Self {
        self.remaining_seconds = Some(seconds);
        self
    }

    pub fn is_final(&self) -> bool {
        matches!(self.phase, BatchPhase::Completed | BatchPhase::Stopped)
    }
}

/// Broadcasts batch progress events to any number of subscribers.
#[derive(Clone)]
pub struct BatchProgressBroadcaster {
    sender: Arc<broadcast::Sender<BatchProgressEvent>>,
}

impl BatchProgressBroadcaster {
    /// Creates a new broadcaster with the specified channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Sends a progress event to all subscribers.
    pub fn send(&self, event: BatchProgressEvent) {
        // Ignore errors - no active receivers is fine
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BatchProgressEvent> {
        self.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BatchProgressBroadcaster {
    fn default() -> Self {
        Self::new(100)
    }
}
