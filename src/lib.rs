//! Cardscout: an LLM-guided credit-card offer crawler
//!
//! This crate implements a depth-bounded recursive crawler for bank websites.
//! Pages are fetched and reduced to text, a language-model "oracle" proposes
//! which links are worth following and extracts structured card data, and the
//! crawl controller assembles the surviving branches into a result tree.

pub mod config;
pub mod crawler;
pub mod fetch;
pub mod oracle;
pub mod output;
pub mod page;
pub mod url;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for cardscout operations
#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Oracle error: {0}")]
    Oracle(#[from] OracleError),

    #[error("Unexpected result shape during aggregation: {0}")]
    AggregationShape(String),

    #[error("Final answer was not repairable JSON; raw text saved to {artifact}")]
    FinalJson { artifact: PathBuf },

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing authority in URL")]
    MissingAuthority,
}

/// Fetch failure classification
///
/// The retry layer keys its behavior off these variants: `Transient` is
/// retried after a short delay, `SessionCorrupted` forces a session rebuild
/// before the retry, and `Permanent` goes straight to the failure registry.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Transient fetch failure for {url}: {reason}")]
    Transient { url: String, reason: String },

    #[error("Fetch session corrupted at {url}: {reason}")]
    SessionCorrupted { url: String, reason: String },

    #[error("Permanent fetch failure for {url}: {reason}")]
    Permanent { url: String, reason: String },
}

impl FetchError {
    /// The URL the failing fetch was for
    pub fn url(&self) -> &str {
        match self {
            Self::Transient { url, .. }
            | Self::SessionCorrupted { url, .. }
            | Self::Permanent { url, .. } => url,
        }
    }

    /// Returns true if another attempt may succeed
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Permanent { .. })
    }
}

/// Oracle boundary errors
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("Oracle request failed: {0}")]
    Http(String),

    #[error("Oracle API error: {0}")]
    Api(String),

    #[error("Malformed oracle response: {0}")]
    MalformedResponse(String),
}

/// Result type alias for cardscout operations
pub type Result<T> = std::result::Result<T, ScoutError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlSession, Crawler, SessionSummary};
pub use oracle::{CandidateLink, OracleResponse, Relevance};
pub use page::CrawlNode;
pub use url::{extract_authority, normalize_url, urls_similar};
