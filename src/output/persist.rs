//! Result tree persistence
//!
//! Each run serializes its root trees to a timestamped JSON file under the
//! results directory. A later run can pick up the most recent such file and
//! resume instead of re-crawling; recency is keyed on the filename, which
//! sorts chronologically, not on content.

use crate::page::CrawlNode;
use crate::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const RESULT_PREFIX: &str = "cardscout-";
const RESULT_SUFFIX: &str = ".json";

/// Writes the run's result trees to a timestamped file, returning its path
pub fn save_results(roots: &[CrawlNode], results_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(results_dir)?;

    let filename = format!(
        "{}{}{}",
        RESULT_PREFIX,
        chrono::Utc::now().format("%Y%m%dT%H%M%S"),
        RESULT_SUFFIX
    );
    let path = results_dir.join(filename);

    let json = serde_json::to_string_pretty(roots)?;
    fs::write(&path, json)?;

    info!(path = %path.display(), roots = roots.len(), "results saved");
    Ok(path)
}

/// Finds the most recent result file in the directory, if any
pub fn latest_result_file(results_dir: &Path) -> Option<PathBuf> {
    let entries = fs::read_dir(results_dir).ok()?;

    entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with(RESULT_PREFIX) && n.ends_with(RESULT_SUFFIX))
                .unwrap_or(false)
        })
        .max()
}

/// Loads previously persisted result trees
pub fn load_results(path: &Path) -> Result<Vec<CrawlNode>> {
    let json = fs::read_to_string(path)?;
    let roots = serde_json::from_str(&json)?;
    Ok(roots)
}
