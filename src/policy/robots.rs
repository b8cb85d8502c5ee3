// src/policy/robots.rs
// =============================================================================
// This module holds the robots.txt rules for the site being crawled.
//
// How it works:
// 1. Before the crawl starts, fetch <origin>/robots.txt once
// 2. Keep the body in a RobotsPolicy value that never changes afterwards
// 3. For every URL, ask Google's matcher (the `robotstxt` crate) whether the
//    wildcard user-agent may fetch it
//
// If robots.txt cannot be fetched at all (network error, 5xx), the crawl
// still goes ahead with every path allowed. That is on purpose and can be
// flipped with --robots-fallback deny.
//
// Rust concepts:
// - Enums with data: the three shapes a policy can take
// - async fn: fetching is network I/O
// =============================================================================

use reqwest::Client;
use robotstxt::DefaultMatcher;
use url::Url;

use crate::config::RobotsFallback;
use crate::error::PolicyFetchError;

// The user-agent we evaluate rules for. "*" means only the global group
// (User-agent: *) of the file applies.
const ROBOTS_AGENT: &str = "*";

#[derive(Debug, Clone)]
enum Rules {
    /// No robots.txt, or it could not be fetched and we fail open
    AllowAll,
    /// robots.txt could not be fetched and we fail closed
    DenyAll,
    /// The raw robots.txt body
    Parsed(String),
}

// Read-only allow/deny rules for one origin
#[derive(Debug, Clone)]
pub struct RobotsPolicy {
    rules: Rules,
}

impl RobotsPolicy {
    pub fn allow_all() -> Self {
        Self { rules: Rules::AllowAll }
    }

    pub fn deny_all() -> Self {
        Self { rules: Rules::DenyAll }
    }

    // Builds a policy from a robots.txt body
    pub fn parse(body: impl Into<String>) -> Self {
        Self {
            rules: Rules::Parsed(body.into()),
        }
    }

    // Returns true when the wildcard user-agent may fetch `url`
    //
    // Parameters:
    //   url: an absolute URL; only its path and query are matched
    pub fn is_allowed(&self, url: &str) -> bool {
        match &self.rules {
            Rules::AllowAll => true,
            Rules::DenyAll => false,
            Rules::Parsed(body) => {
                let mut matcher = DefaultMatcher::default();
                matcher.one_agent_allowed_by_robots(body, ROBOTS_AGENT, url)
            }
        }
    }

    // Fetches and parses robots.txt for the origin of `start`
    //
    // Returns:
    //   Ok(policy) for a 2xx (parsed) or 4xx (no rules, everything allowed)
    //   Err(PolicyFetchError) for a 5xx or a transport failure
    pub async fn fetch(client: &Client, start: &Url) -> Result<Self, PolicyFetchError> {
        // join() on an absolute path keeps scheme, host and port
        let robots_url = start
            .join("/robots.txt")
            .map(|u| u.to_string())
            .unwrap_or_else(|_| format!("{}/robots.txt", start.origin().ascii_serialization()));

        let response = client
            .get(&robots_url)
            .send()
            .await
            .map_err(|source| PolicyFetchError::Transport {
                url: robots_url.clone(),
                source,
            })?;

        let status = response.status();
        if status.is_success() {
            let body = response
                .text()
                .await
                .map_err(|source| PolicyFetchError::Transport {
                    url: robots_url.clone(),
                    source,
                })?;
            tracing::debug!(url = %robots_url, bytes = body.len(), "parsed robots.txt");
            Ok(Self::parse(body))
        } else if status.is_client_error() {
            // 404 and friends: the site publishes no rules
            tracing::debug!(url = %robots_url, %status, "no robots.txt, everything allowed");
            Ok(Self::allow_all())
        } else {
            Err(PolicyFetchError::Status {
                url: robots_url,
                status,
            })
        }
    }

    // Like fetch(), but never fails: errors resolve to the fallback policy
    pub async fn load(client: &Client, start: &Url, fallback: RobotsFallback) -> Self {
        match Self::fetch(client, start).await {
            Ok(policy) => policy,
            Err(e) => {
                tracing::warn!(error = %e, ?fallback, "robots.txt unavailable, using fallback policy");
                match fallback {
                    RobotsFallback::Allow => Self::allow_all(),
                    RobotsFallback::Deny => Self::deny_all(),
                }
            }
        }
    }
}
