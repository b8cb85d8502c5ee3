// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// Rust concepts:
// - Structs: Custom data types that group related data
// - Derive macros: Automatically generate code for our types
// - Option<T>: for arguments the user may leave out
// =============================================================================

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{
    parse_label, CrawlConfig, RobotsFallback, DEFAULT_JS_TEXT_THRESHOLD, DEFAULT_MAX_DEPTH,
    DEFAULT_WORKERS,
};

// This struct represents our entire CLI application
//
// #[derive(Parser)] tells clap to automatically generate parsing code
// The #[command(...)] attributes configure how the CLI behaves
#[derive(Parser, Debug)]
#[command(
    name = "site-scribe",
    version = "0.1.0",
    about = "Crawl one website and save the visible text of every page as JSON",
    long_about = "site-scribe follows links from a start URL (never leaving its origin), respects \
                  robots.txt, renders script-heavy pages in headless Chrome, and appends every page \
                  to a JSON file as it goes, so an interrupted crawl keeps what it already saved."
)]
pub struct Cli {
    /// URL to start crawling from (e.g., https://example.com)
    ///
    /// If left out, you will be asked for it interactively
    pub start_url: Option<String>,

    /// Maximum crawl depth
    ///
    /// Depth 0 = just the starting page
    /// Depth 1 = starting page + all pages it links to
    /// etc.
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH, value_parser = clap::value_parser!(i32).range(0..))]
    pub max_depth: i32,

    /// Output file (default: <site>_scraped_content.json)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Number of pages fetched in parallel
    #[arg(long, default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// Milliseconds to wait before each request
    #[arg(long, default_value_t = 1000)]
    pub delay_ms: u64,

    /// Pages with less visible text than this (in characters) are rendered in a browser
    #[arg(long, default_value_t = DEFAULT_JS_TEXT_THRESHOLD)]
    pub js_threshold: usize,

    /// Never start a browser, even for script-heavy pages
    #[arg(long)]
    pub no_render: bool,

    /// Milliseconds the browser waits after page load before reading the DOM
    #[arg(long, default_value_t = 2000)]
    pub render_settle_ms: u64,

    /// Chrome/Chromium binary to use for rendering
    #[arg(long, env = "CHROME_PATH")]
    pub chrome_path: Option<PathBuf>,

    /// Seconds before a single request times out
    #[arg(long, default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// What to do when robots.txt cannot be fetched
    #[arg(long, value_enum, default_value_t = RobotsFallback::Allow)]
    pub robots_fallback: RobotsFallback,

    /// Stop starting new pages after this many seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Extra field added to every saved page (repeatable): --label source=docs
    #[arg(long = "label", value_name = "KEY=VALUE", value_parser = parse_label)]
    pub labels: Vec<(String, String)>,

    /// Print the final summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Show debug logs for this tool
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    // Turns parsed arguments into the crawl configuration
    pub fn crawl_config(&self) -> CrawlConfig {
        CrawlConfig {
            max_depth: self.max_depth,
            workers: self.workers.max(1),
            polite_delay: Duration::from_millis(self.delay_ms),
            js_text_threshold: self.js_threshold,
            render: !self.no_render,
            render_settle: Duration::from_millis(self.render_settle_ms),
            chrome_path: self.chrome_path.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            robots_fallback: self.robots_fallback,
            deadline: self.timeout_secs.map(Duration::from_secs),
            output: self.output.clone(),
            labels: self.labels.iter().cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["site-scribe", "https://example.com"]);
        let config = cli.crawl_config();

        assert_eq!(cli.start_url.as_deref(), Some("https://example.com"));
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.workers, 3);
        assert_eq!(config.polite_delay, Duration::from_secs(1));
        assert!(config.render);
        assert_eq!(config.output, None);
    }

    #[test]
    fn test_start_url_is_optional() {
        let cli = Cli::parse_from(["site-scribe"]);
        assert_eq!(cli.start_url, None);
    }

    #[test]
    fn test_all_flags() {
        let cli = Cli::parse_from([
            "site-scribe",
            "https://example.com",
            "--max-depth",
            "1",
            "-o",
            "out.json",
            "--no-render",
            "--robots-fallback",
            "deny",
            "--timeout-secs",
            "60",
            "--label",
            "a_id=aaa",
            "--label",
            "b_id=bbbb",
        ]);
        let config = cli.crawl_config();

        assert_eq!(config.max_depth, 1);
        assert_eq!(config.output, Some(PathBuf::from("out.json")));
        assert!(!config.render);
        assert_eq!(config.robots_fallback, RobotsFallback::Deny);
        assert_eq!(config.deadline, Some(Duration::from_secs(60)));
        assert_eq!(config.labels.get("b_id").map(String::as_str), Some("bbbb"));
    }

    #[test]
    fn test_negative_depth_is_rejected() {
        assert!(Cli::try_parse_from(["site-scribe", "https://example.com", "--max-depth", "-1"]).is_err());
    }

    #[test]
    fn test_bad_label_is_rejected() {
        assert!(Cli::try_parse_from(["site-scribe", "--label", "oops"]).is_err());
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why is start_url an Option<String>?
//    - The user may run the tool with no arguments at all
//    - main.rs then prompts for the URL on stdin
//
// 2. What does value_parser do?
//    - It validates the raw string before it reaches our struct
//    - range(0..) rejects negative depths with a friendly error
//    - parse_label splits "key=value" and rejects anything else
//
// 3. Why convert to CrawlConfig?
//    - The crawler should not depend on how its settings were typed in
//    - Tests build CrawlConfig directly without going through clap
// -----------------------------------------------------------------------------
