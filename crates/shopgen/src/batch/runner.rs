use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, info_span, warn, Instrument};

use crate::error::{BatchError, TaskError};

use super::config::BatchConfig;
use super::control::StopHandle;
use super::executor::TaskExecutor;
use super::progress::{BatchEvent, PauseReason, ProgressReporter, ProgressSnapshot};
use super::run::{BatchReport, BatchRun, RunState};
use super::task::{TaskFailure, TaskOutcome, TaskState};

/// Drives a batch of generation tasks one at a time.
///
/// Tasks run strictly in order with a short delay between them and a longer
/// pause every `batch_limit` tasks. A rate-limited task is retried after the
/// pause; any other failure is recorded and the run moves on.
pub struct BatchRunner<E: TaskExecutor> {
    config: BatchConfig,
    executor: Arc<E>,
    running: AtomicBool,
    stop: StopHandle,
}

/// Clears the running flag however `start` exits, including when its
/// future is dropped mid-run.
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<E: TaskExecutor> BatchRunner<E> {
    pub fn new(config: BatchConfig, executor: E) -> Self {
        Self::with_executor(config, Arc::new(executor))
    }

    pub fn with_executor(config: BatchConfig, executor: Arc<E>) -> Self {
        Self {
            config,
            executor,
            running: AtomicBool::new(false),
            stop: StopHandle::new(),
        }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Handle for stopping the current run from elsewhere, e.g. from inside
    /// the executor or a UI callback.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Stops the current run after its in-flight task, cancelling any
    /// pending pause. Idempotent.
    pub fn stop(&self) {
        if self.is_running() {
            info!("Stopping batch run");
        }
        self.stop.stop();
    }

    /// Runs every payload to a terminal state, or until stopped.
    ///
    /// Task failures are part of the report, not errors. Errors are reserved
    /// for misuse: an empty batch or a second concurrent `start`.
    ///
    /// The stop flag is cleared when the run begins, on the future's first
    /// poll. A [`stop`](Self::stop) issued before then, including one made
    /// between calling `start` and awaiting it, is discarded and the run
    /// goes ahead. Stop only once the run is underway, e.g. after
    /// [`BatchEvent::Started`] or [`is_running`](Self::is_running).
    pub async fn start(
        &self,
        payloads: Vec<E::Payload>,
        progress: &dyn ProgressReporter,
    ) -> Result<BatchReport<E::Payload, E::Output>, BatchError> {
        if payloads.is_empty() {
            return Err(BatchError::EmptyBatch);
        }

        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(BatchError::AlreadyRunning);
        }
        let _guard = RunningGuard(&self.running);
        self.stop.reset();

        let mut run = BatchRun::new(payloads);
        let span = info_span!("batch_run", run_id = %run.id, total = run.total());
        let outputs = self.drive(&mut run, progress).instrument(span).await;

        Ok(BatchReport { run, outputs })
    }

    async fn drive(
        &self,
        run: &mut BatchRun<E::Payload>,
        progress: &dyn ProgressReporter,
    ) -> Vec<(usize, E::Output)> {
        let total = run.total();
        let mut outputs = Vec::new();

        run.state = RunState::Running;
        info!("Starting batch of {} tasks", total);
        progress.report(BatchEvent::Started {
            run_id: run.id.clone(),
            total,
        });

        loop {
            if run.is_exhausted() {
                run.state = RunState::Completed;
                break;
            }
            if self.stop.is_stopped() {
                run.state = RunState::Stopped;
                break;
            }

            let index = run.cursor;
            let attempt = {
                let task = &mut run.tasks[index];
                task.state = TaskState::Running;
                task.attempts += 1;
                task.attempts
            };

            debug!(task_id = index, attempt, "Starting task");
            progress.report(BatchEvent::TaskStarted {
                task_id: index,
                position: index + 1,
                total,
                attempt,
            });

            let result = self
                .executor
                .execute(index, &run.tasks[index].payload)
                .await;

            let outcome = match result {
                Ok(output) => {
                    run.tasks[index].state = TaskState::Succeeded;
                    run.cursor += 1;
                    outputs.push((index, output));
                    TaskOutcome::Succeeded
                }
                Err(TaskError::RateLimited { message }) if self.may_retry(attempt) => {
                    warn!(task_id = index, attempt, "Rate limited: {}", message);
                    run.tasks[index].state = TaskState::FailedRetryable;
                    run.rate_limit_retries += 1;
                    TaskOutcome::RateLimited { message }
                }
                Err(e) => {
                    let message = e.message().to_string();
                    warn!(task_id = index, "Task failed: {}", message);
                    run.tasks[index].state = TaskState::FailedTerminal;
                    run.failures.push(TaskFailure {
                        task_id: index,
                        message: message.clone(),
                    });
                    run.cursor += 1;
                    TaskOutcome::Failed { message }
                }
            };

            let rate_limited = matches!(outcome, TaskOutcome::RateLimited { .. });
            progress.report(BatchEvent::TaskFinished {
                task_id: index,
                outcome,
            });
            progress.report(BatchEvent::Progress(ProgressSnapshot {
                current: run.cursor,
                total,
                position: index + 1,
                state: run.state,
            }));

            let keep_going = if rate_limited {
                self.pause(run, PauseReason::RateLimited, progress).await
            } else if run.is_exhausted() {
                true
            } else if run.cursor % self.config.batch_limit == 0 {
                run.pauses += 1;
                self.pause(run, PauseReason::BatchBoundary, progress).await
            } else {
                self.wait(self.config.inter_task_delay).await
            };

            if !keep_going {
                run.state = RunState::Stopped;
                break;
            }
        }

        if run.state == RunState::Stopped {
            run.skip_unfinished();
            info!(
                "Batch stopped at {} of {} ({} failed)",
                run.cursor,
                total,
                run.failures.len()
            );
        } else {
            info!(
                "Batch completed: {} succeeded, {} failed",
                run.count(TaskState::Succeeded),
                run.failures.len()
            );
        }

        progress.report(BatchEvent::Finished {
            state: run.state,
            cursor: run.cursor,
            total,
            failures: run.failures.clone(),
        });

        outputs
    }

    fn may_retry(&self, attempt: u32) -> bool {
        self.config
            .max_rate_limit_retries
            .map_or(true, |max| attempt <= max)
    }

    /// Pauses the run, counting down once per second. Returns `false` if the
    /// run was stopped during the pause.
    async fn pause(
        &self,
        run: &mut BatchRun<E::Payload>,
        reason: PauseReason,
        progress: &dyn ProgressReporter,
    ) -> bool {
        let seconds = self.config.batch_pause_seconds;
        run.state = RunState::Paused;
        info!(?reason, "Pausing batch for {}s", seconds);
        progress.report(BatchEvent::Paused { reason, seconds });

        for remaining in (1..=seconds).rev() {
            progress.report(BatchEvent::Countdown { remaining });
            if !self.wait(Duration::from_secs(1)).await {
                return false;
            }
        }

        if self.stop.is_stopped() {
            return false;
        }

        run.state = RunState::Running;
        progress.report(BatchEvent::Resumed);
        true
    }

    /// Sleeps for `duration` unless stopped first. Returns `false` on stop.
    async fn wait(&self, duration: Duration) -> bool {
        if duration.is_zero() {
            return !self.stop.is_stopped();
        }

        tokio::select! {
            _ = tokio::time::sleep(duration) => !self.stop.is_stopped(),
            _ = self.stop.cancelled() => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::batch::progress::NoopProgress;

    /// Records every invocation; fails according to a per-task script.
    struct ScriptedExecutor {
        calls: Mutex<Vec<usize>>,
        script: fn(usize, u32) -> Result<String, TaskError>,
    }

    impl ScriptedExecutor {
        fn new(script: fn(usize, u32) -> Result<String, TaskError>) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                script,
            }
        }

        fn calls(&self) -> Vec<usize> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TaskExecutor for ScriptedExecutor {
        type Payload = String;
        type Output = String;

        async fn execute(&self, task_id: usize, payload: &String) -> Result<String, TaskError> {
            let attempt = {
                let mut calls = self.calls.lock().unwrap();
                calls.push(task_id);
                calls.iter().filter(|&&id| id == task_id).count() as u32
            };
            (self.script)(task_id, attempt).map(|out| format!("{}:{}", payload, out))
        }
    }

    struct Recorder(Mutex<Vec<BatchEvent>>);

    impl Recorder {
        fn new() -> Self {
            Self(Mutex::new(Vec::new()))
        }

        fn events(&self) -> Vec<BatchEvent> {
            self.0.lock().unwrap().clone()
        }
    }

    impl ProgressReporter for Recorder {
        fn report(&self, event: BatchEvent) {
            self.0.lock().unwrap().push(event);
        }
    }

    fn payloads(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("product-{}", i)).collect()
    }

    fn fast_config(limit: usize) -> BatchConfig {
        BatchConfig::default()
            .with_batch_limit(limit)
            .with_batch_pause_seconds(30)
            .with_inter_task_delay(Duration::from_millis(500))
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_tasks_succeed_in_order() {
        let runner = BatchRunner::new(fast_config(10), ScriptedExecutor::new(|_, _| Ok("ok".into())));

        let report = runner.start(payloads(3), &NoopProgress).await.unwrap();

        assert!(report.is_completed());
        assert_eq!(report.run.cursor, 3);
        assert_eq!(report.succeeded(), 3);
        assert_eq!(report.run.pauses, 0);
        assert_eq!(report.outputs[0], (0, "product-0:ok".to_string()));
        assert_eq!(runner.executor.calls(), vec![0, 1, 2]);
        assert!(!runner.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_batch_rejected() {
        let runner = BatchRunner::new(fast_config(2), ScriptedExecutor::new(|_, _| Ok("ok".into())));
        let recorder = Recorder::new();

        let err = runner.start(Vec::new(), &recorder).await.unwrap_err();

        assert_eq!(err, BatchError::EmptyBatch);
        assert!(recorder.events().is_empty());
        assert!(runner.executor.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_pauses_at_batch_boundaries() {
        let runner = BatchRunner::new(fast_config(2), ScriptedExecutor::new(|_, _| Ok("ok".into())));
        let recorder = Recorder::new();
        let started = tokio::time::Instant::now();

        let report = runner.start(payloads(5), &recorder).await.unwrap();

        assert!(report.is_completed());
        assert_eq!(report.run.cursor, 5);
        assert_eq!(report.run.pauses, 2);
        assert!(started.elapsed() >= Duration::from_secs(60));

        let pause_points: Vec<usize> = {
            let events = recorder.events();
            let mut current = 0;
            let mut points = Vec::new();
            for event in events {
                match event {
                    BatchEvent::Progress(snapshot) => current = snapshot.current,
                    BatchEvent::Paused { reason, .. } => {
                        assert_eq!(reason, PauseReason::BatchBoundary);
                        points.push(current);
                    }
                    _ => {}
                }
            }
            points
        };
        assert_eq!(pause_points, vec![2, 4]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_counts_down_each_second() {
        let config = fast_config(1).with_batch_pause_seconds(3);
        let runner = BatchRunner::new(config, ScriptedExecutor::new(|_, _| Ok("ok".into())));
        let recorder = Recorder::new();

        runner.start(payloads(2), &recorder).await.unwrap();

        let countdown: Vec<u64> = recorder
            .events()
            .into_iter()
            .filter_map(|e| match e {
                BatchEvent::Countdown { remaining } => Some(remaining),
                _ => None,
            })
            .collect();
        assert_eq!(countdown, vec![3, 2, 1]);
        assert!(recorder.events().contains(&BatchEvent::Resumed));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limited_task_is_retried_not_skipped() {
        let runner = BatchRunner::new(
            fast_config(10),
            ScriptedExecutor::new(|task_id, attempt| {
                if task_id == 1 && attempt <= 2 {
                    Err(TaskError::from_message("HTTP 429: Too Many Requests"))
                } else {
                    Ok("ok".into())
                }
            }),
        );

        let report = runner.start(payloads(3), &NoopProgress).await.unwrap();

        assert!(report.is_completed());
        assert_eq!(report.run.cursor, 3);
        assert_eq!(report.run.tasks[1].state, TaskState::Succeeded);
        assert_eq!(report.run.tasks[1].attempts, 3);
        assert_eq!(report.run.rate_limit_retries, 2);
        assert_eq!(report.run.pauses, 0);
        assert!(report.failures().is_empty());
        assert_eq!(runner.executor.calls(), vec![0, 1, 1, 1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminal_failure_is_skipped() {
        let runner = BatchRunner::new(
            fast_config(10),
            ScriptedExecutor::new(|task_id, _| {
                if task_id == 0 {
                    Err(TaskError::failed("AI did not return valid product data"))
                } else {
                    Ok("ok".into())
                }
            }),
        );

        let report = runner.start(payloads(3), &NoopProgress).await.unwrap();

        assert!(report.is_completed());
        assert_eq!(report.run.tasks[0].state, TaskState::FailedTerminal);
        assert_eq!(report.run.tasks[0].attempts, 1);
        assert_eq!(report.succeeded(), 2);
        assert_eq!(
            report.failures(),
            &[TaskFailure {
                task_id: 0,
                message: "AI did not return valid product data".to_string(),
            }]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_cap_turns_rate_limit_into_failure() {
        let config = fast_config(10).with_max_rate_limit_retries(2);
        let runner = BatchRunner::new(
            config,
            ScriptedExecutor::new(|task_id, _| {
                if task_id == 0 {
                    Err(TaskError::rate_limited("quota exhausted"))
                } else {
                    Ok("ok".into())
                }
            }),
        );

        let report = runner.start(payloads(2), &NoopProgress).await.unwrap();

        assert_eq!(report.run.tasks[0].state, TaskState::FailedTerminal);
        assert_eq!(report.run.tasks[0].attempts, 3);
        assert_eq!(report.run.rate_limit_retries, 2);
        assert_eq!(report.failures()[0].message, "quota exhausted");
        assert_eq!(report.run.tasks[1].state, TaskState::Succeeded);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_during_pause_ends_run() {
        let runner = Arc::new(BatchRunner::new(
            fast_config(1),
            ScriptedExecutor::new(|_, _| Ok("ok".into())),
        ));
        let stopper = runner.stop_handle();

        let background = Arc::clone(&runner);
        let handle =
            tokio::spawn(async move { background.start(payloads(3), &NoopProgress).await });

        // First task finishes instantly, then the 30s pause begins.
        tokio::time::sleep(Duration::from_secs(5)).await;
        stopper.stop();

        let report = handle.await.unwrap().unwrap();
        assert!(report.is_stopped());
        assert_eq!(report.run.cursor, 1);
        assert_eq!(report.run.tasks[1].state, TaskState::Skipped);
        assert_eq!(report.run.tasks[2].state, TaskState::Skipped);
        assert_eq!(runner.executor.calls(), vec![0]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_start_while_running_fails() {
        let runner = Arc::new(BatchRunner::new(
            fast_config(1),
            ScriptedExecutor::new(|_, _| Ok("ok".into())),
        ));

        let background = Arc::clone(&runner);
        let handle =
            tokio::spawn(async move { background.start(payloads(2), &NoopProgress).await });

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(runner.is_running());
        let err = runner.start(payloads(1), &NoopProgress).await.unwrap_err();
        assert_eq!(err, BatchError::AlreadyRunning);

        let report = handle.await.unwrap().unwrap();
        assert!(report.is_completed());
        assert!(!runner.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_runner_is_reusable_after_stop() {
        let runner = BatchRunner::new(fast_config(10), ScriptedExecutor::new(|_, _| Ok("ok".into())));
        runner.stop();

        let report = runner.start(payloads(2), &NoopProgress).await.unwrap();
        assert!(report.is_completed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_before_first_poll_is_discarded() {
        let runner = BatchRunner::new(fast_config(10), ScriptedExecutor::new(|_, _| Ok("ok".into())));

        let pending = runner.start(payloads(2), &NoopProgress);
        runner.stop();
        let report = pending.await.unwrap();

        assert!(report.is_completed());
        assert_eq!(report.outputs.len(), 2);
    }
}
