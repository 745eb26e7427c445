//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - GET requests with error classification into the retry taxonomy
//! - A bounded readiness poll for the interactive path
//! - Reducing fetched HTML to readable text for the oracle

use crate::fetch::PageFetcher;
use crate::FetchError;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use scraper::{Html, Selector};
use std::sync::RwLock;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

const USER_AGENT: &str = concat!("cardscout/", env!("CARGO_PKG_VERSION"));

/// Elements whose text is worth showing to the oracle
const TEXT_SELECTOR: &str = "title, h1, h2, h3, h4, h5, h6, p, li, td, th, dt, dd";

/// Builds an HTTP client with proper configuration
pub fn build_http_client(timeout_secs: u64) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(5))
        .gzip(true)
        .brotli(true)
        .build()
}

/// HTTP page fetcher
///
/// Holds the shared HTTP session. The reqwest client is internally
/// synchronized, so concurrent branches may fetch through it directly; the
/// session-restart path swaps the client under a write lock.
pub struct HttpFetcher {
    client: RwLock<Client>,
    timeout_secs: u64,
    ready_poll_ceiling: u32,
    poll_interval: Duration,
}

impl HttpFetcher {
    pub fn new(timeout_secs: u64, ready_poll_ceiling: u32) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: RwLock::new(build_http_client(timeout_secs)?),
            timeout_secs,
            ready_poll_ceiling,
            poll_interval: Duration::from_secs(1),
        })
    }

    #[cfg(test)]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    fn current_client(&self) -> Client {
        self.client.read().unwrap().clone()
    }

    /// Performs one GET and returns the raw body
    async fn get_body(&self, url: &str) -> Result<String, FetchError> {
        let client = self.current_client();
        let response = client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_reqwest_error(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            // Non-2xx is not worth retrying on this path
            return Err(FetchError::Permanent {
                url: url.to_string(),
                reason: format!("HTTP {}", status.as_u16()),
            });
        }

        response.text().await.map_err(|e| FetchError::Transient {
            url: url.to_string(),
            reason: format!("body read failed: {}", e),
        })
    }

    /// Interactive path: poll until the page text settles or the ceiling hits
    ///
    /// Dynamic pages keep mutating after the first response. We re-fetch at a
    /// fixed interval until two consecutive polls agree, and return whatever
    /// we last saw when the ceiling is reached ("best available content").
    async fn fetch_interactive(&self, url: &str) -> Result<String, FetchError> {
        let mut last_text: Option<String> = None;

        for poll in 1..=self.ready_poll_ceiling {
            match self.get_body(url).await {
                Ok(body) => {
                    let text = html_to_text(&body, url);
                    if last_text.as_deref() == Some(text.as_str()) {
                        debug!(url, poll, "page content settled");
                        return Ok(text);
                    }
                    last_text = Some(text);
                }
                Err(e) => match last_text {
                    // Keep the partial content we already have
                    Some(text) => {
                        warn!(url, poll, error = %e, "poll failed, returning partial content");
                        return Ok(text);
                    }
                    None => return Err(e),
                },
            }

            if poll < self.ready_poll_ceiling {
                tokio::time::sleep(self.poll_interval).await;
            }
        }

        warn!(url, "readiness poll ceiling reached, returning best available content");
        // last_text is Some here: ceiling >= 1 and errors without content returned early
        Ok(last_text.unwrap_or_default())
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, interactive: bool) -> Result<String, FetchError> {
        if interactive {
            self.fetch_interactive(url).await
        } else {
            let body = self.get_body(url).await?;
            Ok(html_to_text(&body, url))
        }
    }

    async fn restart_session(&self) {
        match build_http_client(self.timeout_secs) {
            Ok(fresh) => {
                let mut client = self.client.write().unwrap();
                *client = fresh;
                debug!("fetch session rebuilt");
            }
            Err(e) => warn!(error = %e, "failed to rebuild fetch session, keeping old one"),
        }
    }
}

/// Maps a reqwest error onto the retry taxonomy
fn classify_reqwest_error(url: &str, e: &reqwest::Error) -> FetchError {
    if e.is_timeout() || e.is_connect() {
        FetchError::Transient {
            url: url.to_string(),
            reason: e.to_string(),
        }
    } else if e.is_builder() || e.is_request() {
        // The client itself is in a bad state
        FetchError::SessionCorrupted {
            url: url.to_string(),
            reason: e.to_string(),
        }
    } else {
        FetchError::Transient {
            url: url.to_string(),
            reason: e.to_string(),
        }
    }
}

/// Reduces an HTML document to readable text plus a link listing
///
/// The output has two parts: the text content of headline/paragraph/list
/// elements, then a "Links:" section with each anchor's label and absolute
/// URL so the oracle can propose follow-ups.
pub fn html_to_text(html: &str, base_url: &str) -> String {
    let document = Html::parse_document(html);
    let mut out = String::new();

    if let Ok(text_selector) = Selector::parse(TEXT_SELECTOR) {
        for element in document.select(&text_selector) {
            let chunk = element.text().collect::<Vec<_>>().join(" ");
            let chunk = chunk.split_whitespace().collect::<Vec<_>>().join(" ");
            if !chunk.is_empty() {
                out.push_str(&chunk);
                out.push('\n');
            }
        }
    }

    let base = Url::parse(base_url).ok();
    let mut links = String::new();

    if let Ok(link_selector) = Selector::parse("a[href]") {
        for element in document.select(&link_selector) {
            let href = match element.value().attr("href") {
                Some(h) => h,
                None => continue,
            };
            let resolved = match base.as_ref().and_then(|b| resolve_href(b, href)) {
                Some(r) => r,
                None => continue,
            };
            let label = element
                .text()
                .collect::<Vec<_>>()
                .join(" ")
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ");

            links.push_str(&format!("- {} ({})\n", label, resolved));
        }
    }

    if !links.is_empty() {
        out.push_str("\nLinks:\n");
        out.push_str(&links);
    }

    out
}

/// Resolves an href against its page URL, skipping non-navigable schemes
fn resolve_href(base: &Url, href: &str) -> Option<String> {
    if href.is_empty()
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with('#')
    {
        return None;
    }

    let mut resolved = base.join(href).ok()?;
    resolved.set_fragment(None);

    Some(resolved.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_interactive_fetch_returns_content_once_it_settles() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cards"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>still loading</p>"))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/cards"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>card listing</p>"))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(5, 5)
            .unwrap()
            .with_poll_interval(Duration::from_millis(1));
        let text = fetcher
            .fetch(&format!("{}/cards", server.uri()), true)
            .await
            .unwrap();

        assert!(text.contains("card listing"));
        assert!(!text.contains("still loading"));
    }

    #[tokio::test]
    async fn test_interactive_fetch_keeps_partial_content_on_poll_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cards"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>first render</p>"))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/cards"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(5, 5)
            .unwrap()
            .with_poll_interval(Duration::from_millis(1));
        let text = fetcher
            .fetch(&format!("{}/cards", server.uri()), true)
            .await
            .unwrap();

        assert!(text.contains("first render"));
    }

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client(30).is_ok());
    }

    #[test]
    fn test_html_to_text_extracts_headings_and_paragraphs() {
        let html = r#"<html><head><title>Cards</title>
            <script>var x = "ignore me";</script></head>
            <body><h1>All credit cards</h1><p>Gold card has 2% cashback.</p></body></html>"#;

        let text = html_to_text(html, "https://bank.example.com/cards");
        assert!(text.contains("Cards"));
        assert!(text.contains("All credit cards"));
        assert!(text.contains("Gold card has 2% cashback."));
        assert!(!text.contains("ignore me"));
    }

    #[test]
    fn test_html_to_text_resolves_relative_links() {
        let html = r#"<body><a href="/cards/gold">Gold Card</a></body>"#;
        let text = html_to_text(html, "https://bank.example.com/cards");
        assert!(text.contains("- Gold Card (https://bank.example.com/cards/gold)"));
    }

    #[test]
    fn test_html_to_text_skips_non_navigable_links() {
        let html = r##"<body>
            <a href="javascript:void(0)">JS</a>
            <a href="mailto:a@b.com">Mail</a>
            <a href="#top">Top</a>
        </body>"##;
        let text = html_to_text(html, "https://bank.example.com/");
        assert!(!text.contains("Links:"));
    }

    #[test]
    fn test_resolve_href_drops_fragment() {
        let base = Url::parse("https://bank.example.com/cards").unwrap();
        assert_eq!(
            resolve_href(&base, "/gold#rates"),
            Some("https://bank.example.com/gold".to_string())
        );
    }
}
