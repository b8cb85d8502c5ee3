// src/config.rs
// =============================================================================
// All the knobs that shape one crawl run, with their defaults in one place.
//
// The CLI (src/cli.rs) fills this in; tests build it directly with
// struct update syntax: CrawlConfig { max_depth: 1, ..Default::default() }
// =============================================================================

use clap::ValueEnum;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// How deep to follow links when nothing else is said
pub const DEFAULT_MAX_DEPTH: i32 = 3;

/// Pages fetched in parallel per level (and across the whole crawl)
pub const DEFAULT_WORKERS: usize = 3;

/// Pages whose visible text is shorter than this are re-fetched with a browser
pub const DEFAULT_JS_TEXT_THRESHOLD: usize = 2000;

/// What to do when robots.txt cannot be fetched (server error, network error)
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RobotsFallback {
    /// Crawl anyway, as if robots.txt were empty
    Allow,
    /// Refuse every path on the site
    Deny,
}

#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Link hops allowed from the start URL (0 = only the start page)
    pub max_depth: i32,
    /// Concurrent workers per level, also the global in-flight fetch limit
    pub workers: usize,
    /// Sleep before every page fetch
    pub polite_delay: Duration,
    /// Visible-text length (in chars) below which a page counts as script-dependent
    pub js_text_threshold: usize,
    /// Whether the browser fallback may be used at all
    pub render: bool,
    /// How long the browser waits after load before reading the DOM
    pub render_settle: Duration,
    /// Optional Chrome/Chromium binary for the renderer
    pub chrome_path: Option<PathBuf>,
    /// Per-request timeout for static fetches
    pub request_timeout: Duration,
    pub robots_fallback: RobotsFallback,
    /// Stop spawning new pages after this long
    pub deadline: Option<Duration>,
    /// Explicit output file; derived from the start URL when None
    pub output: Option<PathBuf>,
    /// Extra key/value fields written into every saved page
    pub labels: BTreeMap<String, String>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            workers: DEFAULT_WORKERS,
            polite_delay: Duration::from_secs(1),
            js_text_threshold: DEFAULT_JS_TEXT_THRESHOLD,
            render: true,
            render_settle: Duration::from_secs(2),
            chrome_path: None,
            request_timeout: Duration::from_secs(30),
            robots_fallback: RobotsFallback::Allow,
            deadline: None,
            output: None,
            labels: BTreeMap::new(),
        }
    }
}

// Parses a "key=value" label from the command line
pub fn parse_label(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected key=value, got '{}'", raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_behavior() {
        let config = CrawlConfig::default();
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.workers, 3);
        assert_eq!(config.js_text_threshold, 2000);
        assert_eq!(config.robots_fallback, RobotsFallback::Allow);
    }

    #[test]
    fn test_parse_label() {
        assert_eq!(
            parse_label("a_id=aaa"),
            Ok(("a_id".to_string(), "aaa".to_string()))
        );
        assert!(parse_label("no-equals-sign").is_err());
        assert!(parse_label("=value").is_err());
    }
}
