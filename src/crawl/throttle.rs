// src/crawl/throttle.rs
// =============================================================================
// Per-origin crawl delay.
//
// Each origin (host[:port]) gets a "next allowed start" instant. A task that
// wants to fetch from that origin reserves the next slot and sleeps until it.
// Reservation happens under a short std Mutex (never held across .await), so
// two tasks can never be handed the same slot.
//
// A zero delay disables throttling entirely.
// =============================================================================

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug)]
pub struct OriginThrottle {
    delay: Duration,
    next_slot: Mutex<HashMap<String, Instant>>,
}

impl OriginThrottle {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            next_slot: Mutex::new(HashMap::new()),
        }
    }

    /// Waits until `origin` may be fetched again.
    pub async fn wait(&self, origin: &str) {
        if self.delay.is_zero() {
            return;
        }
        let start_at = self.reserve(origin, Instant::now());
        tokio::time::sleep_until(start_at).await;
    }

    // Returns the instant the caller may start, and pushes the origin's next
    // free slot one delay past it.
    fn reserve(&self, origin: &str, now: Instant) -> Instant {
        let mut slots = self.next_slot.lock().unwrap_or_else(PoisonError::into_inner);
        let slot = slots.entry(origin.to_string()).or_insert(now);
        let start_at = (*slot).max(now);
        *slot = start_at + self.delay;
        start_at
    }
}
