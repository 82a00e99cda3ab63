//! Self-repeating fetch-with-fallback fact stream.
//!
//! One subscription cycles through:
//!
//! ```text
//! Fetching ──ok──────────────┐
//!    │                       ▼
//!    └─err─→ Falling back ─→ Delaying ─→ publish Success ─→ Fetching
//!                                              │
//!                                       publish failed
//!                                              ▼
//!                                     Error (terminal)
//! ```
//!
//! Remote failures never reach the observer; they are replaced by a local
//! fact. Only a failure to publish ends the subscription.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::cancel::CancelHandle;
use crate::fact::{Fact, FactResult};
use crate::remote::RemoteFactProvider;
use crate::scheduler::{run_on, ScheduleError, Scheduler};
use crate::source::FactSource;
use crate::state::ResultHolder;

/// Default pause between emissions.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(2000);

/// Errors that end a subscription.
#[derive(Debug, Error)]
pub enum StreamError {
    /// The UI context could not take the publish.
    #[error("Failed to publish fact: {0}")]
    Publish(#[source] ScheduleError),
}

/// Fetch-or-fallback stream feeding a single [`ResultHolder`].
pub struct FactStream {
    provider: Arc<dyn RemoteFactProvider>,
    source: Arc<FactSource>,
    interval: Duration,
}

impl FactStream {
    pub fn new(
        provider: Arc<dyn RemoteFactProvider>,
        source: Arc<FactSource>,
        interval: Duration,
    ) -> Self {
        Self {
            provider,
            source,
            interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// One Fetching step: ask the provider, fall back to a local fact on any
    /// error.
    pub async fn next_fact(&self) -> Fact {
        match self.provider.fetch_fact().await {
            Ok(fact) => {
                tracing::debug!(provider = self.provider.name(), "Fetched remote fact");
                fact
            }
            Err(e) => {
                tracing::debug!(
                    provider = self.provider.name(),
                    error = %e,
                    "Remote fetch failed, falling back to local fact"
                );
                self.source.next_fact().await
            }
        }
    }

    /// Drive the subscription until cancelled or until publishing fails.
    ///
    /// Each cycle completes its publish before the next fetch starts. On a
    /// publish failure the error is written straight into `holder` as
    /// [`FactResult::Error`] and returned.
    pub async fn run(
        self,
        holder: Arc<ResultHolder>,
        ui: Arc<dyn Scheduler>,
        cancel: CancelHandle,
    ) -> Result<(), StreamError> {
        tracing::info!(
            provider = self.provider.name(),
            interval_ms = self.interval.as_millis() as u64,
            "Fact stream started"
        );

        loop {
            let fact = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                fact = self.next_fact() => fact,
            };

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }

            if cancel.is_cancelled() {
                break;
            }

            let published = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                result = publish(&holder, ui.as_ref(), &cancel, fact) => result,
            };

            if let Err(e) = published {
                let err = StreamError::Publish(e);
                tracing::warn!(error = %err, "Fact stream terminated");
                if !cancel.is_cancelled() {
                    holder.publish(FactResult::Error(err.to_string()));
                }
                return Err(err);
            }
        }

        tracing::info!("Fact stream stopped");
        Ok(())
    }
}

/// Hand `fact` to the UI context and wait until it is in the holder.
///
/// The UI task re-checks cancellation, so a publish queued just before
/// cancel never lands.
async fn publish(
    holder: &Arc<ResultHolder>,
    ui: &dyn Scheduler,
    cancel: &CancelHandle,
    fact: Fact,
) -> Result<(), ScheduleError> {
    let holder = Arc::clone(holder);
    let cancel = cancel.clone();
    run_on(ui, async move {
        if cancel.is_cancelled() {
            return;
        }
        tracing::debug!(fact = %fact, "Publishing fact");
        holder.publish(FactResult::Success(fact));
    })
    .await
}
