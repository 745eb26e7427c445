//! End-to-end crawl scenarios against a mock HTTP server
//!
//! The fetch path is real (HttpFetcher + RetryingFetcher against wiremock);
//! the oracle is a scripted stand-in keyed on page text markers.

use async_trait::async_trait;
use cardscout::config::{
    Config, CrawlerConfig, IntentConfig, OracleConfig, OutputConfig, RootEntry,
};
use cardscout::crawler::{CrawlSession, Crawler};
use cardscout::fetch::{HttpFetcher, RetryingFetcher};
use cardscout::oracle::RelevanceOracle;
use cardscout::output::combine_nodes;
use cardscout::OracleError;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Replies with the first script entry whose marker appears in the document
struct ScriptedOracle {
    scripts: Vec<(&'static str, String)>,
}

impl ScriptedOracle {
    fn new(scripts: Vec<(&'static str, String)>) -> Self {
        Self { scripts }
    }

    fn empty() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl RelevanceOracle for ScriptedOracle {
    async fn ask(&self, _intent: &str, document: &str) -> Result<String, OracleError> {
        for (marker, reply) in &self.scripts {
            if document.contains(marker) {
                return Ok(reply.clone());
            }
        }
        Ok(r#"{"related_links": []}"#.to_string())
    }
}

/// Creates a test configuration with the given depth budget
fn test_config(max_depth: u32) -> Config {
    Config {
        crawler: CrawlerConfig {
            max_depth,
            max_links_per_page: 0,
            branch_workers: 5,
            fetch_retries: 3,
            retry_delay_ms: 1, // Very short for testing
            ready_poll_ceiling: 2,
            interactive_fetch: false,
        },
        oracle: OracleConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            model: "test-model".to_string(),
            api_key_env: "CARDSCOUT_API_KEY".to_string(),
            timeout_secs: 5,
        },
        intent: IntentConfig {
            query: "find credit card offers".to_string(),
            priority_keywords: vec!["card".to_string()],
        },
        output: OutputConfig {
            results_dir: "results".to_string(),
            raw_dir: "raw".to_string(),
        },
        roots: vec![RootEntry {
            url: "https://bank.example.com/".to_string(),
        }],
    }
}

fn build_crawler(
    max_depth: u32,
    oracle: ScriptedOracle,
    session: Arc<CrawlSession>,
) -> Crawler {
    let config = test_config(max_depth);
    let http = HttpFetcher::new(5, config.crawler.ready_poll_ceiling).unwrap();
    let fetcher = RetryingFetcher::new(http, config.crawler.fetch_retries, Duration::from_millis(1));
    Crawler::new(Arc::new(fetcher), Arc::new(oracle), session, &config)
}

fn page(marker: &str) -> String {
    format!("<html><head><title>Bank</title></head><body><p>{marker}</p></body></html>")
}

fn links_reply(urls: &[String]) -> String {
    let links: Vec<String> = urls
        .iter()
        .map(|u| format!(r#"{{"title": "card page", "url": "{u}"}}"#))
        .collect();
    format!(r#"{{"related_links": [{}]}}"#, links.join(", "))
}

#[tokio::test]
async fn test_zero_max_depth_fetches_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page("root")))
        .expect(0)
        .mount(&server)
        .await;

    let crawler = build_crawler(0, ScriptedOracle::empty(), Arc::new(CrawlSession::new()));
    let result = crawler.crawl(&server.uri()).await;
    assert!(result.is_none());
}

#[tokio::test]
async fn test_linkless_root_becomes_single_leaf() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page("landing text")))
        .expect(1)
        .mount(&server)
        .await;

    let crawler = build_crawler(3, ScriptedOracle::empty(), Arc::new(CrawlSession::new()));
    let node = crawler.crawl(&server.uri()).await.unwrap();

    assert!(node.content.contains("landing text"));
    assert!(node.sub_pages.is_empty());
}

#[tokio::test]
async fn test_two_children_expand_then_stop_at_depth_two() {
    let server = MockServer::start().await;
    let b = format!("{}/b", server.uri());
    let c = format!("{}/c", server.uri());

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page("root marker")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page("page b text")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/c"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page("page c text")))
        .mount(&server)
        .await;

    let oracle = ScriptedOracle::new(vec![("root marker", links_reply(&[b.clone(), c.clone()]))]);
    let crawler = build_crawler(2, oracle, Arc::new(CrawlSession::new()));
    let node = crawler.crawl(&server.uri()).await.unwrap();

    assert_eq!(node.sub_pages.len(), 2);
    let mut urls: Vec<&str> = node.sub_pages.iter().map(|n| n.url.as_str()).collect();
    urls.sort();
    assert_eq!(urls, vec![b.as_str(), c.as_str()]);
    for child in &node.sub_pages {
        assert!(child.sub_pages.is_empty());
    }
}

#[tokio::test]
async fn test_last_layer_keeps_node_but_discards_candidates() {
    let server = MockServer::start().await;
    let b = format!("{}/b", server.uri());

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page("root marker")))
        .expect(1)
        .mount(&server)
        .await;
    // The candidate must never be fetched at the last expandable layer
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page("page b text")))
        .expect(0)
        .mount(&server)
        .await;

    let oracle = ScriptedOracle::new(vec![("root marker", links_reply(&[b]))]);
    let crawler = build_crawler(1, oracle, Arc::new(CrawlSession::new()));
    let node = crawler.crawl(&server.uri()).await.unwrap();

    assert!(node.sub_pages.is_empty());
}

#[tokio::test]
async fn test_unreachable_root_lands_in_failure_registry() {
    // Nothing listens on port 1: every attempt is a transient connect
    // failure until the retry budget runs out
    let session = Arc::new(CrawlSession::new());
    let crawler = build_crawler(2, ScriptedOracle::empty(), Arc::clone(&session));

    let result = crawler.crawl("http://127.0.0.1:1/").await;
    assert!(result.is_none());
    assert!(session.is_failed("http://127.0.0.1:1/"));
}

#[tokio::test]
async fn test_http_error_is_permanent_and_registered() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let session = Arc::new(CrawlSession::new());
    let crawler = build_crawler(2, ScriptedOracle::empty(), Arc::clone(&session));

    let result = crawler.crawl(&server.uri()).await;
    assert!(result.is_none());
    assert!(session.is_failed(&format!("{}/", server.uri())));
}

#[tokio::test]
async fn test_duplicate_candidate_fetched_at_most_once() {
    let server = MockServer::start().await;
    let b = format!("{}/b", server.uri());

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page("root marker")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page("page b text")))
        .expect(1)
        .mount(&server)
        .await;

    // The same URL listed twice, plus a fragment variant that normalizes
    // to the same key
    let candidates = links_reply(&[b.clone(), b.clone(), format!("{b}#offers")]);
    let oracle = ScriptedOracle::new(vec![("root marker", candidates)]);
    let crawler = build_crawler(3, oracle, Arc::new(CrawlSession::new()));

    let node = crawler.crawl(&server.uri()).await.unwrap();
    assert_eq!(node.sub_pages.len(), 1);
}

#[tokio::test]
async fn test_similar_url_resolves_from_cache_without_fetching() {
    let session = Arc::new(CrawlSession::new());
    session.cache_text("http://127.0.0.1:1/page/1", "cached page one".to_string());

    // Port 1 is unreachable, so success proves the similarity lookup hit
    let crawler = build_crawler(1, ScriptedOracle::empty(), Arc::clone(&session));
    let node = crawler.crawl("http://127.0.0.1:1/page/2").await.unwrap();

    assert_eq!(node.content, "cached page one");
}

#[tokio::test]
async fn test_combined_corpus_contains_every_leaf() {
    let server = MockServer::start().await;
    let b = format!("{}/b", server.uri());
    let c = format!("{}/c", server.uri());

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page("root marker")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page("gold card details")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/c"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page("travel card details")))
        .mount(&server)
        .await;

    let oracle = ScriptedOracle::new(vec![("root marker", links_reply(&[b, c]))]);
    let crawler = build_crawler(2, oracle, Arc::new(CrawlSession::new()));
    let node = crawler.crawl(&server.uri()).await.unwrap();

    let corpus = combine_nodes(&[node]);
    assert!(corpus.contains("root marker"));
    assert!(corpus.contains("gold card details"));
    assert!(corpus.contains("travel card details"));
}
