use serde::{Deserialize, Serialize};

use super::task::{GenerationTask, TaskFailure, TaskState};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Idle,
    Running,
    Paused,
    Completed,
    Stopped,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Completed | RunState::Stopped)
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunState::Idle => write!(f, "Idle"),
            RunState::Running => write!(f, "Running"),
            RunState::Paused => write!(f, "Paused"),
            RunState::Completed => write!(f, "Completed"),
            RunState::Stopped => write!(f, "Stopped"),
        }
    }
}

/// State of one batch run. Owned and mutated only by the runner.
#[derive(Debug, Clone)]
pub struct BatchRun<P> {
    pub id: String,
    pub tasks: Vec<GenerationTask<P>>,
    /// Index of the next task to attempt. Never decreases.
    pub cursor: usize,
    pub state: RunState,
    /// Batch-boundary pauses taken.
    pub pauses: usize,
    /// Rate-limit backoffs taken across all tasks.
    pub rate_limit_retries: usize,
    pub failures: Vec<TaskFailure>,
}

impl<P> BatchRun<P> {
    pub fn new(payloads: Vec<P>) -> Self {
        let tasks = payloads
            .into_iter()
            .enumerate()
            .map(|(id, payload)| GenerationTask::new(id, payload))
            .collect();

        Self {
            id: uuid::Uuid::new_v4().to_string(),
            tasks,
            cursor: 0,
            state: RunState::Idle,
            pauses: 0,
            rate_limit_retries: 0,
            failures: Vec::new(),
        }
    }

    pub fn total(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.tasks.len()
    }

    pub fn count(&self, state: TaskState) -> usize {
        self.tasks.iter().filter(|t| t.state == state).count()
    }

    /// Marks every task that has not reached a terminal state as skipped.
    pub(crate) fn skip_unfinished(&mut self) {
        for task in self.tasks.iter_mut().skip(self.cursor) {
            if !task.state.is_terminal() {
                task.state = TaskState::Skipped;
            }
        }
    }
}

/// What a finished run hands back to the caller.
#[derive(Debug)]
pub struct BatchReport<P, O> {
    pub run: BatchRun<P>,
    /// Executor outputs keyed by task id, in completion order.
    pub outputs: Vec<(usize, O)>,
}

impl<P, O> BatchReport<P, O> {
    pub fn state(&self) -> RunState {
        self.run.state
    }

    pub fn is_completed(&self) -> bool {
        self.run.state == RunState::Completed
    }

    pub fn is_stopped(&self) -> bool {
        self.run.state == RunState::Stopped
    }

    pub fn succeeded(&self) -> usize {
        self.run.count(TaskState::Succeeded)
    }

    pub fn failures(&self) -> &[TaskFailure] {
        &self.run.failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_run_assigns_sequential_ids() {
        let run = BatchRun::new(vec!["a", "b", "c"]);
        let ids: Vec<usize> = run.tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(run.state, RunState::Idle);
        assert_eq!(run.cursor, 0);
        assert!(!run.id.is_empty());
    }

    #[test]
    fn test_skip_unfinished_only_touches_remaining_tasks() {
        let mut run = BatchRun::new(vec![1, 2, 3, 4]);
        run.tasks[0].state = TaskState::Succeeded;
        run.tasks[1].state = TaskState::FailedRetryable;
        run.cursor = 1;

        run.skip_unfinished();

        assert_eq!(run.tasks[0].state, TaskState::Succeeded);
        assert_eq!(run.tasks[1].state, TaskState::Skipped);
        assert_eq!(run.count(TaskState::Skipped), 3);
    }

    #[test]
    fn test_terminal_run_states() {
        assert!(RunState::Completed.is_terminal());
        assert!(RunState::Stopped.is_terminal());
        assert!(!RunState::Paused.is_terminal());
    }
}
