//! Execution contexts for the fact stream.
//!
//! The stream loop runs on a background scheduler while every publish is
//! handed to a UI scheduler. Both are injected so the handoff can be driven
//! and observed in tests.
//!
//! ```text
//! background: fetch ─→ fallback? ─→ delay ─┐
//!                                          │ run_on(ui, publish)
//! ui:                                      └─→ holder.publish(Success)
//! ```

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};

/// A unit of work submitted to a scheduler.
pub type Task = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Errors from handing work to a scheduler.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// The scheduler no longer accepts work.
    #[error("scheduler '{scheduler}' is closed")]
    Closed { scheduler: &'static str },

    /// The task was dropped before it produced a result.
    #[error("task on scheduler '{scheduler}' was dropped before completing")]
    Dropped { scheduler: &'static str },
}

pub trait Scheduler: Send + Sync {
    /// Name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Submit a task. Fails only when the scheduler is closed.
    fn spawn(&self, task: Task) -> Result<(), ScheduleError>;
}

/// Run `future` on `scheduler` and wait for its output.
pub async fn run_on<S, F>(scheduler: &S, future: F) -> Result<F::Output, ScheduleError>
where
    S: Scheduler + ?Sized,
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    scheduler.spawn(Box::pin(async move {
        if tx.send(future.await).is_err() {
            tracing::trace!("Scheduled task result dropped (caller gone)");
        }
    }))?;
    rx.await.map_err(|_| ScheduleError::Dropped {
        scheduler: scheduler.name(),
    })
}

/// Background scheduler backed by a tokio runtime.
#[derive(Clone)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Scheduler for the runtime the caller is running on.
    ///
    /// # Panics
    /// Panics when called outside a tokio runtime.
    pub fn current() -> Self {
        Self::new(Handle::current())
    }
}

impl Scheduler for TokioScheduler {
    fn name(&self) -> &'static str {
        "background"
    }

    fn spawn(&self, task: Task) -> Result<(), ScheduleError> {
        // Dropped JoinHandle detaches the task.
        self.handle.spawn(task);
        Ok(())
    }
}

/// Sending half of a UI context. Tasks run on whatever thread drives the
/// matching [`UiLoop`].
#[derive(Clone)]
pub struct UiScheduler {
    sender: mpsc::UnboundedSender<Task>,
}

/// Receiving half of a UI context.
///
/// Runs submitted tasks one at a time, in submission order, on the thread
/// that awaits [`run`](UiLoop::run). Dropping the loop closes the context.
pub struct UiLoop {
    receiver: mpsc::UnboundedReceiver<Task>,
}

/// Create a connected UI scheduler and loop.
pub fn ui_context() -> (UiScheduler, UiLoop) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (UiScheduler { sender }, UiLoop { receiver })
}

impl Scheduler for UiScheduler {
    fn name(&self) -> &'static str {
        "ui"
    }

    fn spawn(&self, task: Task) -> Result<(), ScheduleError> {
        self.sender
            .send(task)
            .map_err(|_| ScheduleError::Closed { scheduler: "ui" })
    }
}

impl UiLoop {
    /// Run tasks until every [`UiScheduler`] has been dropped.
    pub async fn run(mut self) {
        while let Some(task) = self.receiver.recv().await {
            task.await;
        }
        tracing::debug!("UI loop finished");
    }

    /// Run only the tasks already queued, then return how many ran.
    pub async fn run_pending(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(task) = self.receiver.try_recv() {
            task.await;
            ran += 1;
        }
        ran
    }
}
