use std::future::Future;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// A debouncer that runs an action after a period of inactivity.
///
/// Each call to [`Debouncer::schedule`] aborts the timer armed by the
/// previous call if it has not fired yet. Once a timer fires, its action is
/// spawned as an independent task, so later calls never cancel work that
/// already started.
#[derive(Debug)]
pub struct Debouncer {
    /// The duration to wait after the last event before triggering
    delay: Duration,
    /// Timer armed by the most recent call
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    /// Create a new debouncer with the specified delay in milliseconds
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Arm the timer for `action`, discarding any action still waiting
    pub fn schedule<F>(&mut self, runtime: &Handle, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();

        let delay = self.delay;
        let spawner = runtime.clone();
        self.pending = Some(runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            spawner.spawn(action);
        }));
    }

    /// Cancel the pending action, if it has not fired yet
    pub fn cancel(&mut self) {
        if let Some(timer) = self.pending.take() {
            timer.abort();
        }
    }

    /// Check if there's an armed timer
    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|timer| !timer.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
