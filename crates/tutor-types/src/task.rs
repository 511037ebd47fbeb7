use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;

/// A unit of work that runs once after a fixed delay.
///
/// The task is owned by whoever scheduled it: calling [`cancel`](Self::cancel)
/// or dropping the handle aborts it if it has not fired yet.
#[derive(Debug)]
pub struct DeferredTask {
    handle: Option<JoinHandle<()>>,
}

impl DeferredTask {
    /// Spawn `work` to run after `delay` on the current tokio runtime
    pub fn schedule<F>(delay: Duration, work: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            work.await;
        });

        Self {
            handle: Some(handle),
        }
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }
}

impl Drop for DeferredTask {
    fn drop(&mut self) {
        self.cancel();
    }
}
