//! Page fetching boundary
//!
//! This module contains:
//! - The `PageFetcher` trait the crawl controller talks to
//! - An HTTP implementation that reduces fetched HTML to readable text
//! - The retry wrapper implementing the transient/session-corrupted/permanent
//!   failure policy the controller depends on

mod http;
mod retry;

pub use http::{build_http_client, html_to_text, HttpFetcher};
pub use retry::RetryingFetcher;

use crate::FetchError;
use async_trait::async_trait;

/// Resolves a URL to readable page text, or fails
///
/// `interactive` requests the rendering path: a bounded readiness poll that
/// returns best-available content instead of failing at the ceiling.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str, interactive: bool) -> Result<String, FetchError>;

    /// Discards and recreates the underlying session after corruption.
    /// Implementations without session state may leave the default no-op.
    async fn restart_session(&self) {}
}
