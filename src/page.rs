//! Crawl result tree data model

use serde::{Deserialize, Serialize};

/// One crawled page and the sub-pages reached from it
///
/// A node is owned by its parent in the result tree; the root is owned by
/// the controller invocation. Nodes are immutable once all children have
/// resolved. A page whose fetch failed has no node at all; the parent
/// simply omits it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlNode {
    pub url: String,
    pub content: String,
    #[serde(default)]
    pub sub_pages: Vec<CrawlNode>,
}

impl CrawlNode {
    /// Creates a node with no sub-pages
    pub fn leaf(url: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            content: content.into(),
            sub_pages: Vec::new(),
        }
    }

    /// Total number of pages in this tree, including this node
    pub fn page_count(&self) -> usize {
        1 + self
            .sub_pages
            .iter()
            .map(CrawlNode::page_count)
            .sum::<usize>()
    }

    /// Depth of the tree (a leaf has depth 1)
    pub fn depth(&self) -> usize {
        1 + self
            .sub_pages
            .iter()
            .map(CrawlNode::depth)
            .max()
            .unwrap_or(0)
    }
}
