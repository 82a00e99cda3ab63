//! Shared test utilities: scripted providers, result recorders and a mock
//! fact service.

#![allow(dead_code, unused_imports)]

pub mod mock_remote;

use async_trait::async_trait;
use catfacts::{
    Fact, FactResult, FactSource, PeriodicFacts, RemoteError, RemoteFactProvider, ResultHolder,
};
use futures_core::Stream;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::VecDeque;
use std::future::poll_fn;
use std::net::TcpListener;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

pub const POOL: [&str; 5] = ["a", "b", "c", "d", "e"];

/// Find a free port by binding to port 0.
pub fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind to free port");
    listener.local_addr().unwrap().port()
}

/// Seeded source over `items`.
pub fn seeded_source(items: &[&str], seed: u64) -> Arc<FactSource> {
    let pool = items.iter().map(|s| s.to_string()).collect();
    Arc::new(FactSource::with_rng(pool, StdRng::seed_from_u64(seed)).unwrap())
}

pub fn is_pool_fact(fact: &Fact) -> bool {
    POOL.contains(&fact.text())
}

/// Provider that replays a script of results, then repeats `exhausted`.
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Result<Fact, String>>>,
    exhausted: Result<Fact, String>,
    calls: AtomicUsize,
    holder: Option<Arc<ResultHolder>>,
    generations_at_call: Mutex<Vec<u64>>,
}

impl ScriptedProvider {
    pub fn new(script: Vec<Result<Fact, String>>, exhausted: Result<Fact, String>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            exhausted,
            calls: AtomicUsize::new(0),
            holder: None,
            generations_at_call: Mutex::new(Vec::new()),
        }
    }

    /// Always fails.
    pub fn failing() -> Self {
        Self::new(Vec::new(), Err("service unreachable".to_string()))
    }

    /// Record the holder's generation every time a fetch starts.
    pub fn observing(mut self, holder: Arc<ResultHolder>) -> Self {
        self.holder = Some(holder);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn generations_at_call(&self) -> Vec<u64> {
        self.generations_at_call.lock().clone()
    }
}

#[async_trait]
impl RemoteFactProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn fetch_fact(&self) -> Result<Fact, RemoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(holder) = &self.holder {
            self.generations_at_call.lock().push(holder.generation());
        }
        let next = self
            .script
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.exhausted.clone());
        next.map_err(RemoteError::Unavailable)
    }
}

/// Provider whose fetch takes `delay` before succeeding.
pub struct SlowProvider {
    pub delay: Duration,
    completed: AtomicBool,
}

impl SlowProvider {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            completed: AtomicBool::new(false),
        }
    }

    pub fn completed(&self) -> bool {
        self.completed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteFactProvider for SlowProvider {
    fn name(&self) -> &'static str {
        "slow"
    }

    async fn fetch_fact(&self) -> Result<Fact, RemoteError> {
        tokio::time::sleep(self.delay).await;
        self.completed.store(true, Ordering::SeqCst);
        Ok(Fact::new("slow"))
    }
}

/// Collects every result a subscriber observes.
pub struct Recorder {
    seen: Arc<Mutex<Vec<FactResult>>>,
}

impl Recorder {
    pub fn attach(mut results: watch::Receiver<Option<FactResult>>) -> Self {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        tokio::spawn(async move {
            while results.changed().await.is_ok() {
                if let Some(result) = results.borrow_and_update().clone() {
                    sink.lock().push(result);
                }
            }
        });
        Self { seen }
    }

    pub fn results(&self) -> Vec<FactResult> {
        self.seen.lock().clone()
    }

    pub fn facts(&self) -> Vec<Fact> {
        self.results()
            .iter()
            .filter_map(|result| result.fact().cloned())
            .collect()
    }

    /// Wait (real time) until at least `count` results were recorded.
    pub async fn wait_for(&self, count: usize, timeout: Duration) -> Vec<FactResult> {
        let deadline = tokio::time::Instant::now() + timeout;
        while self.seen.lock().len() < count {
            if tokio::time::Instant::now() >= deadline {
                panic!(
                    "Timed out waiting for {} results, got {:?}",
                    count,
                    self.results()
                );
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        self.results()
    }
}

/// Await the next item of a periodic feed.
pub async fn next_fact(feed: &mut PeriodicFacts) -> Option<Fact> {
    poll_fn(|cx| Pin::new(&mut *feed).poll_next(cx)).await
}
