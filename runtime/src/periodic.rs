//! Cancellable periodic work, e.g. pushing driver locations into a manager.
//!
//! The interval can be changed while the task runs; the new value applies from
//! the next tick.

use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

const MIN_INTERVAL: Duration = Duration::from_millis(1);

pub struct PeriodicTask {
    name: String,
    interval: watch::Sender<Duration>,
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl PeriodicTask {
    /// Spawn `tick` on the current runtime, first run after one `interval`.
    pub fn spawn<F, Fut>(name: impl Into<String>, interval: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let name = name.into();
        let (tx, mut rx) = watch::channel(interval.max(MIN_INTERVAL));
        let cancel = CancellationToken::new();

        let task_name = name.clone();
        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            tracing::debug!(task = %task_name, "Periodic task started");
            loop {
                let period = *rx.borrow_and_update();
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    changed = rx.changed() => {
                        // sender dropped means the handle is gone
                        if changed.is_err() {
                            break;
                        }
                        continue;
                    }
                    _ = tokio::time::sleep(period) => {}
                }
                tick().await;
            }
            tracing::debug!(task = %task_name, "Periodic task stopped");
        });

        Self {
            name,
            interval: tx,
            cancel,
            handle: Some(handle),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn interval(&self) -> Duration {
        *self.interval.borrow()
    }

    /// Restart the wait with a new period.
    pub fn set_interval(&self, interval: Duration) {
        self.interval.send_replace(interval.max(MIN_INTERVAL));
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Cancel and wait for the current tick to finish.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(error) = handle.await {
                tracing::warn!(task = %self.name, %error, "Periodic task ended abnormally");
            }
        }
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl std::fmt::Debug for PeriodicTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PeriodicTask")
            .field("name", &self.name)
            .field("interval", &self.interval())
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn counting(interval: Duration) -> (PeriodicTask, Arc<AtomicU32>) {
        let ticks = Arc::new(AtomicU32::new(0));
        let counter = ticks.clone();
        let task = PeriodicTask::spawn("counter", interval, move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });
        (task, ticks)
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_on_interval() {
        let (task, ticks) = counting(Duration::from_secs(1));

        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 3);

        task.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_change_applies_to_next_wait() {
        let (task, ticks) = counting(Duration::from_secs(10));

        tokio::time::sleep(Duration::from_secs(1)).await;
        task.set_interval(Duration::from_millis(100));
        assert_eq!(task.interval(), Duration::from_millis(100));

        tokio::time::sleep(Duration::from_millis(550)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 5);

        task.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_ticking() {
        let (task, ticks) = counting(Duration::from_millis(100));

        tokio::time::sleep(Duration::from_millis(250)).await;
        task.cancel();
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_eq!(ticks.load(Ordering::SeqCst), 2);
        assert!(task.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_is_clamped() {
        let (task, _) = counting(Duration::ZERO);
        assert_eq!(task.interval(), MIN_INTERVAL);
        task.shutdown().await;
    }
}
