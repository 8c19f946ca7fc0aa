//! Fixed-delay debouncing for search boxes.
//!
//! Each trigger restarts the timer. Only a timer that has not fired yet is
//! cancelled; once the delay elapses the work runs on its own task and is
//! never aborted by later triggers.

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    pending: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Arc::new(Mutex::new(None)),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Run `work` after the delay unless another call comes first.
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&self, work: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let delay = self.delay;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tokio::spawn(work);
        });

        let previous = self
            .pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .replace(timer);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    /// Drop a timer that has not fired yet
    pub fn cancel(&self) {
        if let Some(timer) = self.pending.lock().unwrap_or_else(|e| e.into_inner()).take() {
            timer.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(|timer| !timer.is_finished())
    }
}
