use std::future::Future;
use std::marker::PhantomData;

use async_trait::async_trait;

use crate::error::TaskError;

/// Performs the external work for one task, e.g. calling the vision API
/// and assembling a product draft.
///
/// Return [`TaskError::RateLimited`] when the downstream service asks to
/// slow down; the runner then backs off and retries the same task. Any
/// other error skips the task.
#[async_trait]
pub trait TaskExecutor: Send + Sync {
    type Payload: Send + Sync;
    type Output: Send;

    async fn execute(
        &self,
        task_id: usize,
        payload: &Self::Payload,
    ) -> Result<Self::Output, TaskError>;
}

/// Adapts an async closure into a [`TaskExecutor`]. The payload is cloned
/// into each call.
pub struct FnExecutor<P, O, F> {
    f: F,
    _marker: PhantomData<fn(P) -> O>,
}

impl<P, O, F, Fut> FnExecutor<P, O, F>
where
    F: Fn(usize, P) -> Fut,
    Fut: Future<Output = Result<O, TaskError>>,
{
    pub fn new(f: F) -> Self {
        Self {
            f,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<P, O, F, Fut> TaskExecutor for FnExecutor<P, O, F>
where
    P: Clone + Send + Sync + 'static,
    O: Send + 'static,
    F: Fn(usize, P) -> Fut + Send + Sync,
    Fut: Future<Output = Result<O, TaskError>> + Send + 'static,
{
    type Payload = P;
    type Output = O;

    async fn execute(&self, task_id: usize, payload: &P) -> Result<O, TaskError> {
        (self.f)(task_id, payload.clone()).await
    }
}
