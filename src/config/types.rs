use serde::Deserialize;

/// Main configuration structure for cardscout
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub oracle: OracleConfig,
    pub intent: IntentConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub roots: Vec<RootEntry>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of link-following hops from a root URL
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Cap on candidate links expanded per page (0 = unlimited)
    #[serde(rename = "max-links-per-page", default)]
    pub max_links_per_page: u32,

    /// Concurrent recursive branches per node
    #[serde(rename = "branch-workers", default = "default_branch_workers")]
    pub branch_workers: u32,

    /// Retry attempts per URL before escalating to permanent failure
    #[serde(rename = "fetch-retries", default = "default_fetch_retries")]
    pub fetch_retries: u32,

    /// Fixed delay between retry attempts (milliseconds)
    #[serde(rename = "retry-delay-ms", default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Maximum one-second readiness polls on the interactive fetch path
    #[serde(rename = "ready-poll-ceiling", default = "default_ready_poll_ceiling")]
    pub ready_poll_ceiling: u32,

    /// Whether fetches use the interactive (rendering) path
    #[serde(rename = "interactive-fetch", default)]
    pub interactive_fetch: bool,
}

fn default_branch_workers() -> u32 {
    5
}

fn default_fetch_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    2000
}

fn default_ready_poll_ceiling() -> u32 {
    10
}

/// Relevance oracle (LLM) configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OracleConfig {
    /// Base URL of a chat-completions compatible API
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Model name passed to the API
    pub model: String,

    /// Environment variable holding the API key
    #[serde(rename = "api-key-env", default = "default_api_key_env")]
    pub api_key_env: String,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_oracle_timeout")]
    pub timeout_secs: u64,
}

fn default_api_key_env() -> String {
    "CARDSCOUT_API_KEY".to_string()
}

fn default_oracle_timeout() -> u64 {
    60
}

/// The user intent driving the crawl
#[derive(Debug, Clone, Deserialize)]
pub struct IntentConfig {
    /// Query text given to the oracle alongside each page
    pub query: String,

    /// Keywords used to score candidate links when the oracle
    /// does not attach a relevance ranking
    #[serde(rename = "priority-keywords", default)]
    pub priority_keywords: Vec<String>,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory for serialized crawl result trees
    #[serde(rename = "results-dir")]
    pub results_dir: String,

    /// Directory where unrepairable oracle output is kept for inspection
    #[serde(rename = "raw-dir")]
    pub raw_dir: String,
}

/// A root URL to start crawling from
#[derive(Debug, Clone, Deserialize)]
pub struct RootEntry {
    pub url: String,
}
