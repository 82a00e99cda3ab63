//! Single-slot result holder observed by the session's subscriber.
//!
//! Holds only the latest [`FactResult`]; history is not retained. Every
//! publish atomically replaces the slot and wakes the subscriber.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;

use crate::fact::FactResult;

pub struct ResultHolder {
    slot: watch::Sender<Option<FactResult>>,
    generation: AtomicU64,
}

impl ResultHolder {
    /// Create an empty holder.
    pub fn new() -> Self {
        let (slot, _) = watch::channel(None);
        Self {
            slot,
            generation: AtomicU64::new(0),
        }
    }

    /// Replace the current result and notify the subscriber.
    ///
    /// The value is stored even when nobody is subscribed yet, so a late
    /// subscriber still sees the latest result.
    pub fn publish(&self, result: FactResult) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.slot.send_replace(Some(result));
    }

    /// Get a clone of the current result.
    pub fn latest(&self) -> Option<FactResult> {
        self.slot.borrow().clone()
    }

    /// Number of results published so far.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Subscribe to change notifications.
    pub fn subscribe(&self) -> watch::Receiver<Option<FactResult>> {
        self.slot.subscribe()
    }
}

impl Default for ResultHolder {
    fn default() -> Self {
        Self::new()
    }
}
