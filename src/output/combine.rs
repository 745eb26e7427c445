//! Result aggregation
//!
//! Flattens one or more crawl result trees into a single text corpus for the
//! final oracle synthesis call. Older persisted results are not uniform: a
//! sub-page's content may itself be a nested tree, an already-flattened
//! string, or an object with a `content` key. The dispatch here handles all
//! of those; anything unrecognized is logged and skipped, never fatal.

use crate::page::CrawlNode;
use crate::ScoutError;
use serde_json::Value;
use tracing::warn;

/// Flattens crawl trees into one text blob
///
/// Accepts a single tree, a sequence of trees, or an already-flattened
/// string, in their JSON form.
pub fn combine(results: &Value) -> String {
    let mut out = String::new();
    flatten(results, 0, &mut out);
    out
}

/// Convenience wrapper over in-memory nodes
pub fn combine_nodes(roots: &[CrawlNode]) -> String {
    let mut out = String::new();
    for root in roots {
        match serde_json::to_value(root) {
            Ok(value) => flatten(&value, 0, &mut out),
            Err(e) => warn!(url = %root.url, error = %e, "skipping unserializable tree"),
        }
    }
    out
}

/// Tagged-shape dispatch: `url` key means a tree node, `content` key means
/// a one-level wrapper, a string is already text
fn flatten(value: &Value, depth: usize, out: &mut String) {
    match value {
        Value::String(text) => {
            push_block(out, depth, text);
        }
        Value::Array(items) => {
            for item in items {
                flatten(item, depth, out);
            }
        }
        Value::Object(map) => {
            if let Some(url) = map.get("url").and_then(Value::as_str) {
                push_block(out, depth, &format!("URL: {}", url));
                if let Some(content) = map.get("content") {
                    flatten(content, depth, out);
                }
                if let Some(sub_pages) = map.get("sub_pages") {
                    flatten(sub_pages, depth + 1, out);
                }
            } else if let Some(content) = map.get("content") {
                flatten(content, depth, out);
            } else {
                let keys = map.keys().cloned().collect::<Vec<_>>().join(", ");
                let e = ScoutError::AggregationShape(format!("object with keys [{}]", keys));
                warn!(error = %e, "skipping entry");
            }
        }
        other => {
            let e = ScoutError::AggregationShape(json_kind(other).to_string());
            warn!(error = %e, "skipping entry");
        }
    }
}

fn push_block(out: &mut String, depth: usize, text: &str) {
    let indent = "  ".repeat(depth);
    for line in text.lines() {
        out.push_str(&indent);
        out.push_str(line);
        out.push('\n');
    }
    if depth == 0 {
        out.push('\n');
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_combine_contains_every_leaf_content() {
        let tree_a = CrawlNode {
            url: "https://a.example.com/".to_string(),
            content: "root a".to_string(),
            sub_pages: vec![
                CrawlNode::leaf("https://a.example.com/1", "leaf one"),
                CrawlNode::leaf("https://a.example.com/2", "leaf two"),
            ],
        };
        let tree_b = CrawlNode::leaf("https://b.example.com/", "root b");

        let text = combine_nodes(&[tree_a, tree_b]);
        for expected in ["root a", "leaf one", "leaf two", "root b"] {
            assert!(text.contains(expected), "missing {:?} in {:?}", expected, text);
        }
    }

    #[test]
    fn test_raw_string_passes_through() {
        assert_eq!(combine(&json!("already flat")), "already flat\n\n");
    }

    #[test]
    fn test_legacy_nested_content_shapes() {
        // content holding a wrapper object and a nested tree, as older
        // persisted results sometimes do
        let legacy = json!({
            "url": "https://bank.example.com/",
            "content": {"content": "wrapped once"},
            "sub_pages": [
                {
                    "url": "https://bank.example.com/inner",
                    "content": {
                        "url": "https://bank.example.com/inner/tree",
                        "content": "deep text",
                        "sub_pages": []
                    },
                    "sub_pages": []
                }
            ]
        });

        let text = combine(&legacy);
        assert!(text.contains("wrapped once"));
        assert!(text.contains("deep text"));
        assert!(text.contains("URL: https://bank.example.com/inner/tree"));
    }

    #[test]
    fn test_unrecognized_shape_is_skipped() {
        let odd = json!([{"neither": "url nor content"}, "kept text"]);
        let text = combine(&odd);
        assert!(text.contains("kept text"));
        assert!(!text.contains("neither"));
    }
}
