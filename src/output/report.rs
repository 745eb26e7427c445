//! End-of-run summary

use crate::crawler::SessionSummary;
use crate::page::CrawlNode;
use std::path::Path;

/// Aggregate outcome of one run
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Number of result trees (one per reachable root)
    pub roots: usize,

    /// Total pages across all result trees
    pub total_pages: usize,

    /// Session counts at teardown
    pub session: SessionSummary,
}

impl RunReport {
    pub fn new(trees: &[CrawlNode], session: SessionSummary) -> Self {
        Self {
            roots: trees.len(),
            total_pages: trees.iter().map(CrawlNode::page_count).sum(),
            session,
        }
    }
}

/// Prints the run summary to stdout in a formatted manner
pub fn print_report(report: &RunReport, results_path: Option<&Path>) {
    println!("=== Crawl Summary ===\n");

    println!("Overview:");
    println!("  Root trees: {}", report.roots);
    println!("  Total pages collected: {}", report.total_pages);
    println!("  Pages cached this run: {}", report.session.pages_cached);
    println!();

    if !report.session.failures.is_empty() {
        println!("Permanent Failures ({}):", report.session.failures.len());
        for url in &report.session.failures {
            println!("  - {}", url);
        }
        println!();
    }

    let attempted = report.session.pages_cached + report.session.failures.len();
    let success_rate = if attempted > 0 {
        (report.session.pages_cached as f64 / attempted as f64) * 100.0
    } else {
        0.0
    };
    println!(
        "Success Rate: {:.1}% ({} / {} fetched pages usable)",
        success_rate, report.session.pages_cached, attempted
    );

    if let Some(path) = results_path {
        println!("Results written to: {}", path.display());
    }
}
