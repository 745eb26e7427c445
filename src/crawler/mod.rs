//! Crawl orchestration
//!
//! This module contains:
//! - The session object owning visited/cache/failure state for one run
//! - Candidate link scoring and ordering
//! - The recursive, concurrency-bounded crawl controller

mod cache;
mod controller;
mod priority;
mod session;

pub use cache::{FailureRegistry, PageCache};
pub use controller::Crawler;
pub use priority::{order_candidates, score_link};
pub use session::{CrawlSession, SessionSummary};
