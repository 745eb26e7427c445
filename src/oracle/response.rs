//! Recognized oracle response shapes
//!
//! The oracle replies with one of a closed set of JSON shapes, discriminated
//! by which keys are present. Parsing into a tagged variant here keeps the
//! controller free of ad hoc key probing.

use crate::OracleError;
use serde_json::Value;

/// Relevance ranking attached to a candidate link by the oracle
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Relevance {
    Low,
    Medium,
    High,
}

impl Relevance {
    /// Parses a relevance label from an oracle reply
    ///
    /// Accepts english labels and the chinese labels some upstream prompts
    /// produce (高/中/低). Unknown labels rank below Low by returning None.
    pub fn parse(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => match s.trim().to_lowercase().as_str() {
                "high" | "高" => Some(Self::High),
                "medium" | "中" => Some(Self::Medium),
                "low" | "低" => Some(Self::Low),
                _ => None,
            },
            Value::Number(n) => match n.as_u64() {
                Some(3) => Some(Self::High),
                Some(2) => Some(Self::Medium),
                Some(1) => Some(Self::Low),
                _ => None,
            },
            _ => None,
        }
    }

    /// Numeric rank for sorting (higher sorts first)
    pub fn rank(&self) -> u32 {
        match self {
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
        }
    }
}

/// A follow-up link proposed by the oracle (or synthesized locally)
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateLink {
    pub url: String,
    pub title: String,
    pub description: Option<String>,
    pub relevance: Option<Relevance>,
}

/// The closed set of oracle reply shapes
#[derive(Debug, Clone)]
pub enum OracleResponse {
    /// `{content, related_links: [{title, url, description?}]}`
    LinkList {
        content: Option<String>,
        links: Vec<CandidateLink>,
    },

    /// `{related_links: [{title, url, relevance}]}`: the oracle attached
    /// its own ranking, which the controller preserves
    RankedLinkList { links: Vec<CandidateLink> },

    /// Structured card listings (`cards` / `creditCards` key), possibly
    /// alongside further links to follow
    CardList {
        cards: Value,
        links: Vec<CandidateLink>,
    },

    /// Anything else that parsed as a JSON object without recognized keys
    Freeform(String),
}

impl OracleResponse {
    /// Parses a raw oracle reply into its tagged shape
    ///
    /// Fails with `MalformedResponse` when the text is not a JSON object;
    /// callers treat that as "no links, keep the page content" (fail-soft).
    pub fn parse(raw: &str) -> Result<Self, OracleError> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| OracleError::MalformedResponse(e.to_string()))?;

        if !value.is_object() {
            return Err(OracleError::MalformedResponse(format!(
                "expected a JSON object, got {}",
                json_type_name(&value)
            )));
        }

        Ok(Self::from_value(value))
    }

    /// Discriminates a parsed JSON object into its variant by present keys
    pub fn from_value(value: Value) -> Self {
        let links = value
            .get("related_links")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(parse_link).collect::<Vec<_>>());

        let cards = value
            .get("cards")
            .or_else(|| value.get("creditCards"))
            .cloned();

        match (cards, links) {
            (Some(cards), links) => Self::CardList {
                cards,
                links: links.unwrap_or_default(),
            },
            (None, Some(links)) => {
                if links.iter().any(|l| l.relevance.is_some()) {
                    Self::RankedLinkList { links }
                } else {
                    Self::LinkList {
                        content: value
                            .get("content")
                            .and_then(Value::as_str)
                            .map(str::to_string),
                        links,
                    }
                }
            }
            (None, None) => Self::Freeform(
                value
                    .get("content")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| value.to_string()),
            ),
        }
    }

    /// The candidate links this response carries, if any
    pub fn links(&self) -> &[CandidateLink] {
        match self {
            Self::LinkList { links, .. }
            | Self::RankedLinkList { links }
            | Self::CardList { links, .. } => links,
            Self::Freeform(_) => &[],
        }
    }

    /// Whether the oracle supplied its own relevance ordering
    pub fn is_ranked(&self) -> bool {
        matches!(self, Self::RankedLinkList { .. })
    }
}

fn parse_link(value: &Value) -> Option<CandidateLink> {
    let url = value.get("url")?.as_str()?.trim();
    if url.is_empty() {
        return None;
    }

    Some(CandidateLink {
        url: url.to_string(),
        title: value
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string(),
        description: value
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_string),
        relevance: value.get("relevance").and_then(|v| Relevance::parse(v)),
    })
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
