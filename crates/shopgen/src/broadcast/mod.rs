//! Broadcasting of batch progress for real-time UIs.
//!
//! Any number of subscribers (a desktop shell, an SSE endpoint, a log
//! sink) can follow a run without the runner knowing about them.

pub mod batch_progress;

pub use batch_progress::{BatchPhase, BatchProgressBroadcaster, BatchProgressEvent};
