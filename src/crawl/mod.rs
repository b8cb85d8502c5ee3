// src/crawl/mod.rs
// =============================================================================
// This module handles website crawling.
//
// Features:
// - Recursive, depth-limited crawling starting from a URL
// - Never leaves the start origin, respects robots.txt
// - Bounded concurrency, each URL fetched at most once
// - Polite crawling with a delay before every request
// =============================================================================

mod orchestrator;
mod visited;

pub use orchestrator::{crawl_website, CrawlSummary};
pub use visited::VisitedSet;
