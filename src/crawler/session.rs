//! Shared state for one crawl run
//!
//! A `CrawlSession` owns everything the concurrent branches of a run share:
//! the visited set, the page cache and the failure registry. It is passed by
//! `Arc` into every controller call instead of living as ambient state, and
//! it has an explicit teardown that reports counts and releases everything
//! regardless of how the run ended.
//!
//! Locking discipline: each structure sits behind its own `std::sync::Mutex`
//! and every public method acquires, operates and releases within one call.
//! No guard is ever held across an await point.

use crate::crawler::cache::{FailureRegistry, PageCache};
use std::collections::HashSet;
use std::sync::Mutex;
use tracing::info;

/// Counts reported when a session is torn down
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub pages_visited: usize,
    pub pages_cached: usize,
    pub failures: Vec<String>,
}

/// State shared across all branches of one crawl run
#[derive(Debug, Default)]
pub struct CrawlSession {
    visited: Mutex<HashSet<String>>,
    cache: Mutex<PageCache>,
    failures: Mutex<FailureRegistry>,
}

impl CrawlSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a URL visited, returning false if it already was
    ///
    /// The check and the insert happen under one lock acquisition, which is
    /// what upholds the fetched-at-most-once invariant across branches.
    pub fn mark_visited(&self, url: &str) -> bool {
        let mut visited = self.visited.lock().unwrap();
        visited.insert(url.to_string())
    }

    pub fn is_visited(&self, url: &str) -> bool {
        let visited = self.visited.lock().unwrap();
        visited.contains(url)
    }

    /// Cached extracted text for a URL (exact match, then similarity)
    pub fn cached_text(&self, url: &str) -> Option<String> {
        let cache = self.cache.lock().unwrap();
        cache.lookup(url).map(str::to_string)
    }

    pub fn cache_text(&self, url: &str, text: String) {
        let mut cache = self.cache.lock().unwrap();
        cache.store(url, text);
    }

    pub fn mark_failed(&self, url: &str) {
        let mut failures = self.failures.lock().unwrap();
        failures.mark_failed(url);
    }

    pub fn is_failed(&self, url: &str) -> bool {
        let failures = self.failures.lock().unwrap();
        failures.is_failed(url)
    }

    /// Current counts without tearing anything down
    pub fn summary(&self) -> SessionSummary {
        let visited = self.visited.lock().unwrap();
        let cache = self.cache.lock().unwrap();
        let failures = self.failures.lock().unwrap();
        SessionSummary {
            pages_visited: visited.len(),
            pages_cached: cache.len(),
            failures: failures.urls(),
        }
    }

    /// Clears all session state and reports what was held
    ///
    /// Called at end-of-run on both success and failure paths.
    pub fn teardown(&self) -> SessionSummary {
        let summary = self.summary();

        {
            let mut visited = self.visited.lock().unwrap();
            visited.clear();
        }
        self.cache.lock().unwrap().clear();
        self.failures.lock().unwrap().clear();

        info!(
            pages_cached = summary.pages_cached,
            failures = summary.failures.len(),
            "crawl session torn down"
        );
        summary
    }
}
