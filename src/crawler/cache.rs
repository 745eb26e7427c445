//! Session-scoped page cache and failure registry
//!
//! Both structures are keyed by normalized URL strings and live for one crawl
//! session. The cache answers exact lookups first, then falls back to a
//! similarity probe so near-duplicate paginated pages (same host, paths that
//! differ only in digits) reuse an already-extracted body instead of hitting
//! the network again.

use crate::url::urls_similar;
use std::collections::{HashMap, HashSet};
use url::Url;

/// Extracted page text cached for the lifetime of a session
#[derive(Debug, Default)]
pub struct PageCache {
    pages: HashMap<String, String>,
}

impl PageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up cached text for a URL, exact match first then similarity
    pub fn lookup(&self, url: &str) -> Option<&str> {
        if let Some(text) = self.pages.get(url) {
            return Some(text.as_str());
        }
        self.lookup_similar(url)
    }

    /// Scans for a cached page whose URL is similar to the requested one
    ///
    /// Similarity never crosses hosts, so a probe with an unparsable URL or
    /// one with no cached neighbor simply misses.
    fn lookup_similar(&self, url: &str) -> Option<&str> {
        let wanted = Url::parse(url).ok()?;
        self.pages.iter().find_map(|(key, text)| {
            let cached = Url::parse(key).ok()?;
            if urls_similar(&wanted, &cached) {
                Some(text.as_str())
            } else {
                None
            }
        })
    }

    /// Stores extracted text, overwriting any previous entry for the URL
    pub fn store(&mut self, url: &str, text: String) {
        self.pages.insert(url.to_string(), text);
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Drops all entries and returns how many were held
    pub fn clear(&mut self) -> usize {
        let count = self.pages.len();
        self.pages.clear();
        count
    }
}

/// URLs that exhausted their fetch retries during this session
///
/// Once a URL lands here it is never fetched again until the registry is
/// reset, so one dead link cannot stall every branch that rediscovers it.
#[derive(Debug, Default)]
pub struct FailureRegistry {
    failed: HashSet<String>,
}

impl FailureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_failed(&mut self, url: &str) {
        self.failed.insert(url.to_string());
    }

    pub fn is_failed(&self, url: &str) -> bool {
        self.failed.contains(url)
    }

    pub fn len(&self) -> usize {
        self.failed.len()
    }

    /// Returns the failed URLs in no particular order
    pub fn urls(&self) -> Vec<String> {
        self.failed.iter().cloned().collect()
    }

    /// Drops all entries and returns how many were held
    pub fn clear(&mut self) -> usize {
        let count = self.failed.len();
        self.failed.clear();
        count
    }
}
