//! Relevance oracle boundary
//!
//! The oracle is the external language-model call that turns page text into
//! candidate follow-up links or structured card data. This module contains:
//! - The `RelevanceOracle` trait the controller talks to
//! - The closed set of recognized response shapes
//! - A chat-completions HTTP client with intent-keyed prompt selection
//! - Best-effort JSON repair for the final structured answer

mod client;
mod repair;
mod response;

pub use client::{classify_intent, IntentKind, LlmClient};
pub use repair::{reconcile, repair_json};
pub use response::{CandidateLink, OracleResponse, Relevance};

use crate::OracleError;
use async_trait::async_trait;

/// Given user intent and a page's text, returns a JSON-ish string of
/// candidate links and/or structured data. The returned text is
/// expected-but-not-guaranteed-valid JSON.
#[async_trait]
pub trait RelevanceOracle: Send + Sync {
    async fn ask(&self, intent: &str, document: &str) -> Result<String, OracleError>;
}
