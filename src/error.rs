// src/error.rs
// =============================================================================
// Error types used across the crawler.
//
// Almost every error here is LOCAL to one URL: the branch that hits it logs
// it and stops, and the rest of the crawl carries on. The only error that
// ends the whole run is a start URL we cannot parse.
//
// Rust concepts:
// - thiserror: derive macro that writes the Display and Error impls for us
// - #[from]: lets the ? operator convert one error type into another
// =============================================================================

use reqwest::StatusCode;
use thiserror::Error;

// Errors that abort a crawl before it starts
#[derive(Debug, Error)]
pub enum CrawlError {
    /// The start URL could not be parsed, or it has no host to stay on
    #[error("invalid start URL '{url}': {reason}")]
    InvalidStartUrl { url: String, reason: String },

    /// The HTTP client could not be built
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

// A static GET that did not produce usable HTML
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection refused, DNS failure, timeout, body read failure...
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered, but not with a 2xx
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: StatusCode },

    /// A redirect pointed off the site; it was not followed
    #[error("{url} redirects off the site to {location}")]
    OffOriginRedirect { url: String, location: String },
}

// The headless browser could not produce rendered HTML
#[derive(Debug, Error)]
#[error("rendering {url} failed: {reason}")]
pub struct RenderError {
    pub url: String,
    pub reason: String,
}

impl RenderError {
    pub fn new(url: &str, reason: impl std::fmt::Display) -> Self {
        Self {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

// Persisting the result file failed. The previous file is left untouched.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not encode store: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("store writer task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

// robots.txt could not be fetched. Never fatal: the caller falls back
// to the configured default (allow, unless told otherwise).
#[derive(Debug, Error)]
pub enum PolicyFetchError {
    #[error("could not fetch {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("server error {status} for {url}")]
    Status { url: String, status: StatusCode },
}
