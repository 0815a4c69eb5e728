//! Request counters for the search core
//!
//! Tracks how many lookups were issued, how many failed, and how many
//! responses arrived too late to be shown.

use std::sync::atomic::{AtomicU64, Ordering};

/// Shared counters, usually held in an `Arc`
#[derive(Debug, Default)]
pub struct Metrics {
    suggestion_requests: AtomicU64,
    suggestion_failures: AtomicU64,
    stale_suggestions: AtomicU64,
    search_requests: AtomicU64,
    search_failures: AtomicU64,
    stale_results: AtomicU64,
    fixture_hits: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_suggestion_request(&self) {
        self.suggestion_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_suggestion_failure(&self) {
        self.suggestion_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_stale_suggestion(&self) {
        self.stale_suggestions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_search_request(&self) {
        self.search_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_search_failure(&self) {
        self.search_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_stale_results(&self) {
        self.stale_results.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fixture_hit(&self) {
        self.fixture_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of every counter
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            suggestion_requests: self.suggestion_requests.load(Ordering::Relaxed),
            suggestion_failures: self.suggestion_failures.load(Ordering::Relaxed),
            stale_suggestions: self.stale_suggestions.load(Ordering::Relaxed),
            search_requests: self.search_requests.load(Ordering::Relaxed),
            search_failures: self.search_failures.load(Ordering::Relaxed),
            stale_results: self.stale_results.load(Ordering::Relaxed),
            fixture_hits: self.fixture_hits.load(Ordering::Relaxed),
        }
    }
}

/// Plain copy of [`Metrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub suggestion_requests: u64,
    pub suggestion_failures: u64,
    pub stale_suggestions: u64,
    pub search_requests: u64,
    pub search_failures: u64,
    pub stale_results: u64,
    pub fixture_hits: u64,
}
