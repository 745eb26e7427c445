//! Best-effort repair of the final structured answer
//!
//! The oracle's last reply is expected to be one JSON object. When strict
//! parsing fails, a short ordered list of textual transforms is applied and
//! the parse is retried once. Each transform is independently testable and
//! none is required for correctness: if repair fails too, the raw text is
//! persisted for manual inspection instead of being raised to the caller.

use crate::{Result, ScoutError};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Applies the repair transforms in order and returns the rewritten text
pub fn repair_json(raw: &str) -> String {
    let trimmed = trim_to_outer_braces(raw).unwrap_or(raw);
    let without_commas = drop_trailing_commas(trimmed);
    collapse_leaked_fields(&without_commas).unwrap_or(without_commas)
}

/// Parses an expected-JSON answer, repairing once on failure
///
/// On unrepairable input the raw text is written into `raw_dir` and the
/// artifact path is reported through `ScoutError::FinalJson`; this boundary
/// never surfaces the underlying parse error itself.
pub fn reconcile(raw: &str, raw_dir: &Path) -> Result<Value> {
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => return Ok(value),
        Err(e) => info!(error = %e, "final answer failed strict parse, attempting repair"),
    }

    let repaired = repair_json(raw);
    match serde_json::from_str::<Value>(&repaired) {
        Ok(value) => {
            info!("final answer recovered by repair");
            Ok(value)
        }
        Err(e) => {
            let artifact = save_raw_artifact(raw, raw_dir)?;
            warn!(error = %e, artifact = %artifact.display(), "repair failed, raw text saved");
            Err(ScoutError::FinalJson { artifact })
        }
    }
}

/// Writes unrepairable oracle output to a timestamped file for inspection
fn save_raw_artifact(raw: &str, raw_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(raw_dir)?;
    let filename = format!(
        "oracle-raw-{}.txt",
        chrono::Utc::now().format("%Y%m%dT%H%M%S%.3f")
    );
    let path = raw_dir.join(filename);
    std::fs::write(&path, raw)?;
    Ok(path)
}

/// Trims the text down to the span between the first `{` and last `}`
///
/// Recovers answers wrapped in prose or markdown fences. Returns None when
/// no such span exists (nothing to trim to).
fn trim_to_outer_braces(s: &str) -> Option<&str> {
    let start = s.find('{')?;
    let end = s.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(&s[start..=end])
}

/// Removes commas that directly precede a closing brace or bracket
///
/// The scan is string-aware so commas inside JSON string values survive.
fn drop_trailing_commas(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_string = false;
    let mut escaped = false;

    for c in s.chars() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '}' | ']' => {
                // Drop a comma left dangling before this close
                while out
                    .trim_end()
                    .ends_with(',')
                {
                    let cut = out.trim_end().len() - 1;
                    out.truncate(cut);
                }
                out.push(c);
            }
            _ => out.push(c),
        }
    }

    out
}

/// Collapses the known malformation where a second object's fields leak
/// outside the top-level array
///
/// `{"cards": [{...}], "cardName": "X", ...}` becomes
/// `{"cards": [{...}, {"cardName": "X", ...}]}`. Returns None when the text
/// does not show the pattern.
fn collapse_leaked_fields(s: &str) -> Option<String> {
    let open = s.find('[')?;
    let close = s.rfind(']')?;
    let end = s.rfind('}')?;
    if close < open || end < close {
        return None;
    }

    let leaked = s[close + 1..end].trim().trim_start_matches(',').trim();
    if leaked.is_empty() || !leaked.contains(':') {
        return None;
    }

    let array_body = s[open + 1..close].trim();
    let separator = if array_body.is_empty() { "" } else { ", " };

    Some(format!(
        "{}{}{{{}}}]}}",
        &s[..close],
        separator,
        leaked
    ))
}
