// src/crawl/visited.rs
// =============================================================================
// The set of URLs already claimed by some crawl task during this run.
//
// One VisitedSet is created per run and shared (behind an Arc) by every task
// of every seed. try_mark() is the only way in: it checks and inserts under
// one lock, so when many tasks discover the same URL at once exactly one of
// them wins and fetches it. Entries are never removed.
// =============================================================================

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
pub struct VisitedSet {
    urls: Mutex<HashSet<String>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `url` for the caller.
    ///
    /// Returns `true` only for the first caller to present this exact string.
    pub fn try_mark(&self, url: &str) -> bool {
        let mut urls = self.lock();
        if urls.contains(url) {
            return false;
        }
        urls.insert(url.to_string())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    // A panic while holding the lock cannot leave the set half-updated
    // (insert is the only mutation), so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.urls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
