use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::broadcast::batch_progress::{BatchPhase, BatchProgressBroadcaster, BatchProgressEvent};

use super::run::RunState;
use super::task::{TaskFailure, TaskOutcome};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PauseReason {
    BatchBoundary,
    RateLimited,
}

/// Plain-data progress, suitable for a progress bar.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProgressSnapshot {
    /// Tasks the cursor has moved past.
    pub current: usize,
    pub total: usize,
    /// 1-based position of the most recently attempted task.
    pub position: usize,
    pub state: RunState,
}

impl ProgressSnapshot {
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        ((self.current as f64 / self.total as f64) * 100.0).round() as u8
    }
}

/// Events emitted by the runner over the life of a run.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchEvent {
    Started {
        run_id: String,
        total: usize,
    },
    TaskStarted {
        task_id: usize,
        position: usize,
        total: usize,
        attempt: u32,
    },
    TaskFinished {
        task_id: usize,
        outcome: TaskOutcome,
    },
    /// Emitted after every executor invocation.
    Progress(ProgressSnapshot),
    Paused {
        reason: PauseReason,
        seconds: u64,
    },
    /// Seconds left in the current pause, once per second.
    Countdown {
        remaining: u64,
    },
    Resumed,
    Finished {
        state: RunState,
        cursor: usize,
        total: usize,
        failures: Vec<TaskFailure>,
    },
}

pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: BatchEvent);
}

/// No-op reporter for unit tests.
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn report(&self, _event: BatchEvent) {}
}

#[derive(Default)]
struct RunProgress {
    run_id: String,
    current: usize,
    total: usize,
}

/// Bridges runner events onto a [`BatchProgressBroadcaster`].
pub struct BroadcastProgress {
    broadcaster: BatchProgressBroadcaster,
    state: Mutex<RunProgress>,
}

impl BroadcastProgress {
    pub fn new(broadcaster: BatchProgressBroadcaster) -> Self {
        Self {
            broadcaster,
            state: Mutex::new(RunProgress::default()),
        }
    }

    fn update<F>(&self, f: F) -> (String, usize, usize)
    where
        F: FnOnce(&mut RunProgress),
    {
        match self.state.lock() {
            Ok(mut guard) => {
                f(&mut guard);
                (guard.run_id.clone(), guard.current, guard.total)
            }
            Err(poisoned) => {
                let mut guard = poisoned.into_inner();
                f(&mut guard);
                (guard.run_id.clone(), guard.current, guard.total)
            }
        }
    }
}

impl ProgressReporter for BroadcastProgress {
    fn report(&self, event: BatchEvent) {
        let translated = match event {
            BatchEvent::Started { run_id, total } => {
                let (run_id, current, total) = self.update(|s| {
                    s.run_id = run_id;
                    s.current = 0;
                    s.total = total;
                });
                BatchProgressEvent::new(
                    &run_id,
                    BatchPhase::Started,
                    current,
                    total,
                    &format!("Starting generation of {} products", total),
                )
            }
            BatchEvent::TaskStarted {
                task_id,
                position,
                total,
                attempt,
            } => {
                let (run_id, current, _) = self.update(|_| {});
                let message = if attempt > 1 {
                    format!("Retrying product {} of {} (attempt {})", position, total, attempt)
                } else {
                    format!("Generating product {} of {}...", position, total)
                };
                BatchProgressEvent::new(&run_id, BatchPhase::Generating, current, total, &message)
                    .with_task(task_id)
            }
            BatchEvent::TaskFinished { task_id, outcome } => {
                let (run_id, current, total) = self.update(|_| {});
                match outcome {
                    TaskOutcome::Succeeded => BatchProgressEvent::new(
                        &run_id,
                        BatchPhase::TaskSucceeded,
                        current,
                        total,
                        &format!("Product {} generated", task_id + 1),
                    )
                    .with_task(task_id),
                    TaskOutcome::RateLimited { message } => BatchProgressEvent::new(
                        &run_id,
                        BatchPhase::RateLimited,
                        current,
                        total,
                        "Rate limit hit, backing off",
                    )
                    .with_task(task_id)
                    .with_error(&message),
                    TaskOutcome::Failed { message } => BatchProgressEvent::new(
                        &run_id,
                        BatchPhase::TaskFailed,
                        current,
                        total,
                        &format!("Failed to generate product {}", task_id + 1),
                    )
                    .with_task(task_id)
                    .with_error(&message),
                }
            }
            BatchEvent::Progress(snapshot) => {
                let (run_id, current, total) = self.update(|s| {
                    s.current = snapshot.current;
                    s.total = snapshot.total;
                });
                BatchProgressEvent::new(
                    &run_id,
                    BatchPhase::Progress,
                    current,
                    total,
                    &format!("{} / {} products processed", current, total),
                )
            }
            BatchEvent::Paused { reason, seconds } => {
                let (run_id, current, total) = self.update(|_| {});
                let message = match reason {
                    PauseReason::BatchBoundary => {
                        format!("Batch limit reached, pausing for {}s", seconds)
                    }
                    PauseReason::RateLimited => {
                        format!("Rate limited, retrying in {}s", seconds)
                    }
                };
                BatchProgressEvent::new(&run_id, BatchPhase::Paused, current, total, &message)
                    .with_remaining(seconds)
            }
            BatchEvent::Countdown { remaining } => {
                let (run_id, current, total) = self.update(|_| {});
                BatchProgressEvent::new(
                    &run_id,
                    BatchPhase::Paused,
                    current,
                    total,
                    &format!("Resuming in {}s", remaining),
                )
                .with_remaining(remaining)
            }
            BatchEvent::Resumed => {
                let (run_id, current, total) = self.update(|_| {});
                BatchProgressEvent::new(&run_id, BatchPhase::Resumed, current, total, "Resumed")
            }
            BatchEvent::Finished {
                state,
                cursor,
                total,
                failures,
            } => {
                let (run_id, current, total) = self.update(|s| {
                    s.current = cursor;
                    s.total = total;
                });
                let phase = match state {
                    RunState::Stopped => BatchPhase::Stopped,
                    _ => BatchPhase::Completed,
                };
                let message = match state {
                    RunState::Stopped => format!("Stopped after {} of {} products", current, total),
                    _ => format!(
                        "Processed {} products ({} failed)",
                        total,
                        failures.len()
                    ),
                };
                BatchProgressEvent::new(&run_id, phase, current, total, &message)
            }
        };

        self.broadcaster.send(translated);
    }
}
