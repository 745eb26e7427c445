//! Depth-bounded recursive crawl controller
//!
//! The controller drives one branch of the crawl: resolve page text (cache
//! first, fetcher on miss), ask the oracle which links matter, then recurse
//! into the survivors concurrently under a per-node worker bound. Failed
//! branches simply vanish from the result tree; nothing here aborts a run.

use crate::config::Config;
use crate::crawler::priority::order_candidates;
use crate::crawler::session::CrawlSession;
use crate::fetch::PageFetcher;
use crate::oracle::{OracleResponse, RelevanceOracle};
use crate::page::CrawlNode;
use crate::url::normalize_url;
use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Recursive crawl driver for one intent over one session
pub struct Crawler {
    fetcher: Arc<dyn PageFetcher>,
    oracle: Arc<dyn RelevanceOracle>,
    session: Arc<CrawlSession>,
    intent: String,
    priority_keywords: Vec<String>,
    max_depth: u32,
    max_links_per_page: u32,
    branch_workers: usize,
    interactive: bool,
}

impl Crawler {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        oracle: Arc<dyn RelevanceOracle>,
        session: Arc<CrawlSession>,
        config: &Config,
    ) -> Self {
        Self {
            fetcher,
            oracle,
            session,
            intent: config.intent.query.clone(),
            priority_keywords: config.intent.priority_keywords.clone(),
            max_depth: config.crawler.max_depth,
            max_links_per_page: config.crawler.max_links_per_page,
            branch_workers: config.crawler.branch_workers.max(1) as usize,
            interactive: config.crawler.interactive_fetch,
        }
    }

    /// Crawls from a root URL, returning the result tree
    ///
    /// Returns None when the root itself is out of budget, already visited
    /// or unfetchable. Failures below the root shrink the tree instead.
    pub async fn crawl(&self, url: &str) -> Option<CrawlNode> {
        let root = match normalize_url(url) {
            Ok(u) => u.to_string(),
            Err(e) => {
                warn!(%url, error = %e, "root url rejected");
                return None;
            }
        };
        self.crawl_at(root, 0).await
    }

    /// One branch of the recursion
    ///
    /// Boxed because the future is recursive. `depth` counts link-following
    /// hops from the root; the last expandable layer (`depth + 1 ==
    /// max_depth`) keeps its node but discards all candidates, so nothing is
    /// ever fetched at `max_depth`.
    fn crawl_at(&self, url: String, depth: u32) -> BoxFuture<'_, Option<CrawlNode>> {
        Box::pin(async move {
            if depth >= self.max_depth {
                debug!(%url, depth, "depth budget exhausted");
                return None;
            }
            // Insert-before-fetch keeps sibling branches from re-entering
            // the same URL mid-flight
            if !self.session.mark_visited(&url) {
                debug!(%url, "already visited");
                return None;
            }
            if self.session.is_failed(&url) {
                debug!(%url, "skipping previously failed url");
                return None;
            }

            let text = self.resolve_text(&url).await?;

            let raw = match self.oracle.ask(&self.intent, &text).await {
                Ok(raw) => raw,
                Err(e) => {
                    warn!(%url, depth, error = %e, "oracle call failed, keeping page as leaf");
                    return Some(CrawlNode::leaf(url, text));
                }
            };

            let response = match OracleResponse::parse(&raw) {
                Ok(response) => response,
                Err(e) => {
                    warn!(%url, depth, error = %e, "oracle reply unparsable, keeping page as leaf");
                    return Some(CrawlNode::leaf(url, text));
                }
            };

            let candidates = order_candidates(
                response.links().to_vec(),
                &self.priority_keywords,
                response.is_ranked(),
                self.max_links_per_page,
            );

            if depth + 1 == self.max_depth {
                if !candidates.is_empty() {
                    debug!(%url, depth, discarded = candidates.len(), "last layer, not expanding");
                }
                return Some(CrawlNode {
                    url,
                    content: text,
                    sub_pages: Vec::new(),
                });
            }

            let expandable: Vec<String> = candidates
                .into_iter()
                .filter_map(|link| normalize_url(&link.url).ok())
                .map(|u| u.to_string())
                .filter(|u| !self.session.is_visited(u))
                .collect();

            info!(%url, depth, branches = expandable.len(), "expanding page");

            let limiter = Arc::new(Semaphore::new(self.branch_workers));
            let mut branches: FuturesUnordered<_> = expandable
                .into_iter()
                .map(|child| {
                    let limiter = Arc::clone(&limiter);
                    async move {
                        let _permit = match limiter.acquire().await {
                            Ok(permit) => permit,
                            Err(_) => return None,
                        };
                        self.crawl_at(child, depth + 1).await
                    }
                })
                .collect();

            // Completion order, not submission order
            let mut sub_pages = Vec::new();
            while let Some(branch) = branches.next().await {
                if let Some(node) = branch {
                    sub_pages.push(node);
                }
            }

            Some(CrawlNode {
                url,
                content: text,
                sub_pages,
            })
        })
    }

    /// Page text via cache, similarity match or a fresh fetch
    async fn resolve_text(&self, url: &str) -> Option<String> {
        if let Some(text) = self.session.cached_text(url) {
            debug!(%url, "cache hit");
            return Some(text);
        }

        match self.fetcher.fetch(url, self.interactive).await {
            Ok(text) => {
                self.session.cache_text(url, text.clone());
                Some(text)
            }
            Err(e) => {
                warn!(%url, error = %e, "fetch failed, registering permanent failure");
                self.session.mark_failed(url);
                None
            }
        }
    }
}
