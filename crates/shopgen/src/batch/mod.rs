//! Sequential, rate-limit-aware execution of product generation tasks.

pub mod config;
pub mod control;
pub mod executor;
pub mod progress;
pub mod run;
pub mod runner;
pub mod task;

pub use config::BatchConfig;
pub use control::StopHandle;
pub use executor::{FnExecutor, TaskExecutor};
pub use progress::{
    BatchEvent, BroadcastProgress, NoopProgress, PauseReason, ProgressReporter, ProgressSnapshot,
};
pub use run::{BatchReport, BatchRun, RunState};
pub use runner::BatchRunner;
pub use task::{GenerationTask, TaskFailure, TaskOutcome, TaskState};
