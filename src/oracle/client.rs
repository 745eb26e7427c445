//! Chat-completions oracle client
//!
//! Talks to any chat-completions compatible API. The prompt variant sent
//! with each request is selected by a keyword classification of the intent
//! text; that classification belongs here, never in the crawl controller.

use crate::config::OracleConfig;
use crate::oracle::RelevanceOracle;
use crate::OracleError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

/// Which prompt/schema variant a query maps onto
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentKind {
    /// Crawling a page for credit-card products and their detail links
    CardDiscovery,
    /// Final pass: synthesize one structured card listing from combined text
    CardSynthesis,
    /// Generic link discovery for any other query
    LinkDiscovery,
}

const CARD_KEYWORDS: &[&str] = &["credit card", "card", "信用卡", "卡片", "卡別"];
const SYNTHESIS_KEYWORDS: &[&str] = &["json", "combined content", "請根據以上內容"];

/// Classifies a query by keyword presence
pub fn classify_intent(query: &str) -> IntentKind {
    let lowered = query.to_lowercase();

    if SYNTHESIS_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        return IntentKind::CardSynthesis;
    }

    if CARD_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        return IntentKind::CardDiscovery;
    }

    IntentKind::LinkDiscovery
}

const LINK_DISCOVERY_PROMPT: &str = "\
From the page content, collect the data the user asked for and the URLs worth \
reading next. Reply with JSON only, in this shape:
{
  \"content\": \"the requested information found on this page\",
  \"related_links\": [
    {\"title\": \"link title\", \"url\": \"absolute URL\", \"description\": \"short description\"}
  ]
}";

const CARD_DISCOVERY_PROMPT: &str = "\
You analyze bank pages for credit-card products. Find every currently \
available card on the page, and every link that leads to a specific card's \
detail page. Prefer links whose path or text mentions cards; skip login, \
signup, and generic navigation links. URLs must be absolute, with the \
http/https prefix. Reply with JSON only:
{
  \"creditCards\": [
    {\"cardName\": \"full card name\", \"description\": \"short summary\", \"imageUrl\": \"card image URL\"}
  ],
  \"related_links\": [
    {\"title\": \"card name or link title\", \"url\": \"absolute URL\", \"description\": \"what the link covers\", \"relevance\": \"high|medium|low\"}
  ]
}";

const CARD_SYNTHESIS_PROMPT: &str = "\
Analyze the combined credit-card content and return well-formed JSON with \
exactly one root object holding a \"cards\" array. Rules: no text outside \
the JSON; no comments; every card inside the array, never as extra \
root-level fields; consistent structure per card; only cards that can \
currently be applied for. Shape:
{
  \"cards\": [
    {
      \"cardName\": \"...\",
      \"issuer\": \"...\",
      \"cardType\": \"...\",
      \"annualFee\": \"...\",
      \"rewardType\": \"...\",
      \"imageUrl\": \"...\",
      \"cardLink\": \"...\",
      \"benefits\": [
        {\"category\": \"...\", \"description\": \"...\", \"rate\": \"...\"}
      ]
    }
  ]
}";

fn system_prompt(kind: IntentKind) -> &'static str {
    match kind {
        IntentKind::CardDiscovery => CARD_DISCOVERY_PROMPT,
        IntentKind::CardSynthesis => CARD_SYNTHESIS_PROMPT,
        IntentKind::LinkDiscovery => LINK_DISCOVERY_PROMPT,
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponseRaw {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// Oracle backed by a chat-completions compatible HTTP API
pub struct LlmClient {
    http_client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl LlmClient {
    /// Builds a client from the oracle configuration, reading the API key
    /// from the configured environment variable
    pub fn from_config(config: &OracleConfig) -> Result<Self, OracleError> {
        let api_key = std::env::var(&config.api_key_env)
            .map_err(|_| OracleError::Api(format!("{} not set", config.api_key_env)))?;

        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| OracleError::Http(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    #[cfg(test)]
    pub fn for_tests(base_url: &str, model: &str) -> Self {
        Self {
            http_client: Client::new(),
            api_key: "test-key".to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl RelevanceOracle for LlmClient {
    async fn ask(&self, intent: &str, document: &str) -> Result<String, OracleError> {
        let kind = classify_intent(intent);
        let user_prompt = format!("User request:\n{}\n\nPage content:\n{}", intent, document);

        let messages = vec![
            ChatMessage {
                role: "system",
                content: system_prompt(kind),
            },
            ChatMessage {
                role: "user",
                content: &user_prompt,
            },
        ];
        let body = json!({
            "model": self.model,
            "temperature": 0.1,
            "response_format": {"type": "json_object"},
            "messages": messages,
        });

        let start = std::time::Instant::now();

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "oracle request failed");
                OracleError::Http(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "oracle API error");
            return Err(OracleError::Api(format!(
                "oracle API error ({}): {}",
                status, error_text
            )));
        }

        let chat_response: ChatResponseRaw = response
            .json()
            .await
            .map_err(|e| OracleError::MalformedResponse(e.to_string()))?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| OracleError::Api("no choices in oracle response".to_string()))?;

        debug!(
            model = %self.model,
            intent_kind = ?kind,
            duration_ms = start.elapsed().as_millis(),
            "oracle call complete"
        );

        Ok(content)
    }
}
