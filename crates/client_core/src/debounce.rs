//! Cancelable delayed tasks and the debouncer built on them.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use tokio::task::JoinHandle;

/// A one-shot action that runs after `delay` unless canceled first.
///
/// The action is synchronous, so once the timer has fired the action runs to completion;
/// canceling afterwards has no effect. Dropping the task cancels it.
pub struct DelayedTask {
    handle: JoinHandle<()>,
    fired: Arc<AtomicBool>,
}

impl DelayedTask {
    pub fn schedule<F>(delay: Duration, action: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            flag.store(true, Ordering::SeqCst);
            action();
        });
        Self { handle, fired }
    }

    /// Returns `true` if the action was prevented from running.
    pub fn cancel(&self) -> bool {
        self.handle.abort();
        !self.fired.load(Ordering::SeqCst)
    }

    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }
}

impl Drop for DelayedTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Keeps at most one pending [`DelayedTask`]; scheduling again cancels the previous one.
pub struct Debouncer {
    window: Duration,
    pending: Option<DelayedTask>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Returns `true` if a not-yet-fired action was superseded.
    pub fn schedule<F>(&mut self, action: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        let superseded = self.cancel();
        self.pending = Some(DelayedTask::schedule(self.window, action));
        superseded
    }

    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some_and(|task| task.cancel())
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|task| !task.has_fired())
    }
}
