//! Local fact generation.
//!
//! [`FactSource`] picks random facts from a fixed pool. It backs the stream's
//! fallback path and also offers a periodic feed with adjacent duplicates
//! suppressed.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use futures_core::Stream;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tokio::time::{interval, Interval, MissedTickBehavior};

use crate::fact::Fact;

/// Built-in pool used when no configuration overrides it.
pub const DEFAULT_FACTS: [&str; 5] = [
    "Cats sleep for around 13 to 16 hours a day.",
    "A group of cats is called a clowder.",
    "Cats have five toes on their front paws but only four on the back.",
    "A cat's nose print is unique, much like a human fingerprint.",
    "Cats can rotate their ears 180 degrees.",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("Fact pool must contain at least one entry")]
    EmptyPool,
}

/// Random fact picker over a fixed, non-empty pool.
pub struct FactSource {
    pool: Vec<String>,
    rng: Mutex<StdRng>,
}

impl FactSource {
    /// Create a source seeded from OS entropy.
    pub fn new(pool: Vec<String>) -> Result<Self, SourceError> {
        Self::with_rng(pool, StdRng::from_entropy())
    }

    /// Create a source with an explicit RNG, e.g. a seeded one in tests.
    pub fn with_rng(pool: Vec<String>, rng: StdRng) -> Result<Self, SourceError> {
        if pool.is_empty() {
            return Err(SourceError::EmptyPool);
        }
        Ok(Self {
            pool,
            rng: Mutex::new(rng),
        })
    }

    pub fn pool(&self) -> &[String] {
        &self.pool
    }

    pub fn len(&self) -> usize {
        self.pool.len()
    }

    /// Always false; construction rejects empty pools.
    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    /// Pick a uniformly random fact from the pool.
    pub fn pick_random_fact(&self) -> Fact {
        let index = self.rng.lock().gen_range(0..self.pool.len());
        let fact = Fact::new(self.pool[index].as_str());
        tracing::trace!(index, fact = %fact, "Picked local fact");
        fact
    }

    /// One-shot async producer of a random fact. Never fails.
    pub fn next_fact(&self) -> impl Future<Output = Fact> + Send + 'static {
        let fact = self.pick_random_fact();
        async move { fact }
    }

    /// Infinite feed of facts, one per `period` starting immediately.
    ///
    /// A fact equal to the previously emitted one is skipped and the feed
    /// waits for the next tick instead.
    ///
    /// # Panics
    /// Panics when called outside a tokio runtime.
    pub fn periodic_facts(self: &Arc<Self>, period: Duration) -> PeriodicFacts {
        let mut ticks = interval(period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
        PeriodicFacts {
            source: Arc::clone(self),
            ticks,
            last: None,
        }
    }
}

impl Default for FactSource {
    fn default() -> Self {
        Self {
            pool: DEFAULT_FACTS.iter().map(|s| s.to_string()).collect(),
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }
}

/// Stream returned by [`FactSource::periodic_facts`].
pub struct PeriodicFacts {
    source: Arc<FactSource>,
    ticks: Interval,
    last: Option<Fact>,
}

impl Stream for PeriodicFacts {
    type Item = Fact;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            if self.ticks.poll_tick(cx).is_pending() {
                return Poll::Pending;
            }

            let fact = self.source.pick_random_fact();
            if self.last.as_ref() == Some(&fact) {
                tracing::trace!(fact = %fact, "Skipping repeated fact");
                continue;
            }

            self.last = Some(fact.clone());
            return Poll::Ready(Some(fact));
        }
    }
}
