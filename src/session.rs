//! Session owning one fact subscription and its result holder.
//!
//! The subscription starts when the session is created and is cancelled by
//! [`FactSession::close`] or when the session is dropped.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::cancel::CancelHandle;
use crate::config::Config;
use crate::fact::FactResult;
use crate::remote::RemoteFactProvider;
use crate::scheduler::Scheduler;
use crate::source::{FactSource, SourceError};
use crate::state::ResultHolder;
use crate::stream::FactStream;

pub struct FactSession {
    holder: Arc<ResultHolder>,
    cancel: CancelHandle,
}

impl FactSession {
    /// Start `stream` on `background`, publishing through `ui`.
    ///
    /// If the background scheduler refuses the stream, the holder is set to
    /// [`FactResult::Error`] right away.
    pub fn start(stream: FactStream, background: &dyn Scheduler, ui: Arc<dyn Scheduler>) -> Self {
        let holder = Arc::new(ResultHolder::new());
        let cancel = CancelHandle::new();

        let task_holder = Arc::clone(&holder);
        let task_cancel = cancel.clone();
        let spawned = background.spawn(Box::pin(async move {
            // The stream logs and records its own terminal error.
            let _ = stream.run(task_holder, ui, task_cancel).await;
        }));

        if let Err(e) = spawned {
            tracing::error!(error = %e, "Failed to start fact stream");
            holder.publish(FactResult::Error(e.to_string()));
        }

        Self { holder, cancel }
    }

    /// Build the source and stream from `config`, then start.
    pub fn from_config(
        config: &Config,
        provider: Arc<dyn RemoteFactProvider>,
        background: &dyn Scheduler,
        ui: Arc<dyn Scheduler>,
    ) -> Result<Self, SourceError> {
        let source = Arc::new(FactSource::new(config.facts.pool.clone())?);
        let interval = Duration::from_millis(config.stream.interval_ms);
        let stream = FactStream::new(provider, source, interval);
        Ok(Self::start(stream, background, ui))
    }

    /// Subscribe to the result holder.
    pub fn results(&self) -> watch::Receiver<Option<FactResult>> {
        self.holder.subscribe()
    }

    /// Latest published result, if any.
    pub fn latest(&self) -> Option<FactResult> {
        self.holder.latest()
    }

    /// Number of results published so far.
    pub fn generation(&self) -> u64 {
        self.holder.generation()
    }

    /// Handle that cancels this session's subscription.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Cancel the subscription. Safe to call more than once.
    pub fn close(&self) {
        if self.cancel.cancel() {
            tracing::debug!(published = self.holder.generation(), "Fact session closed");
        }
    }
}

impl Drop for FactSession {
    fn drop(&mut self) {
        self.close();
    }
}
