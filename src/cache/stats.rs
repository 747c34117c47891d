//! Cache Statistics Module
//!
//! Tracks cache behavior: hits, misses, remote traffic and merge outcomes.

use serde::Serialize;

// == Cache Stats ==
/// Operation counters for one entity cache.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Reads answered from the cache table
    pub hits: u64,
    /// Reads that had to fall through to the backend
    pub misses: u64,
    /// Remote calls issued (create, fetch, update)
    pub remote_calls: u64,
    /// Fetches that attached to an already in-flight request
    pub deduped_fetches: u64,
    /// Successful merges into the cache table
    pub merges: u64,
    /// Completions discarded because a newer revision was already cached
    pub stale_skips: u64,
    /// Current number of entries in the table
    pub total_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_remote_call(&mut self) {
        self.remote_calls += 1;
    }

    pub fn record_deduped_fetch(&mut self) {
        self.deduped_fetches += 1;
    }

    pub fn record_merge(&mut self) {
        self.merges += 1;
    }

    pub fn record_stale_skip(&mut self) {
        self.stale_skips += 1;
    }

    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}
