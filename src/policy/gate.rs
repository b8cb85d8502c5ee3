// src/policy/gate.rs
// =============================================================================
// The policy gate: may we crawl this URL at all?
//
// Two rules, both pure (no network, no state):
// 1. Same origin: scheme, host and port must match the start URL
// 2. robots.txt: the wildcard user-agent must be allowed on the path
// =============================================================================

use url::Url;

use super::RobotsPolicy;

// Why the gate said yes or no
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Permitted,
    /// Different scheme, host or port than the start URL (or not a URL)
    OffOrigin,
    /// robots.txt disallows the path
    RobotsDenied,
}

// Runs both rules and reports which one (if any) rejected the URL
pub fn evaluate(url: &str, origin: &Url, robots: &RobotsPolicy) -> Verdict {
    let Ok(parsed) = Url::parse(url) else {
        return Verdict::OffOrigin;
    };

    if !same_origin(&parsed, origin) {
        return Verdict::OffOrigin;
    }

    if !robots.is_allowed(url) {
        return Verdict::RobotsDenied;
    }

    Verdict::Permitted
}

// Compares scheme + host + port. Default ports count as equal to explicit
// ones, so https://example.com and https://example.com:443 match.
pub fn same_origin(url: &Url, origin: &Url) -> bool {
    url.origin() == origin.origin()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> Url {
        Url::parse("https://example.com/").unwrap()
    }

    #[test]
    fn test_same_origin_is_permitted() {
        let robots = RobotsPolicy::allow_all();
        for url in ["https://example.com/a", "https://example.com:443/b"] {
            assert_eq!(evaluate(url, &origin(), &robots), Verdict::Permitted, "{}", url);
        }
    }

    #[test]
    fn test_other_host_scheme_or_port_is_rejected() {
        let robots = RobotsPolicy::allow_all();
        for url in [
            "https://other.com/b",
            "http://example.com/a",
            "https://example.com:8443/a",
            "https://sub.example.com/a",
            "not a url",
        ] {
            assert_eq!(evaluate(url, &origin(), &robots), Verdict::OffOrigin, "{}", url);
        }
    }

    #[test]
    fn test_robots_denied_path() {
        let robots = RobotsPolicy::parse("User-agent: *\nDisallow: /private\n");
        assert_eq!(
            evaluate("https://example.com/private", &origin(), &robots),
            Verdict::RobotsDenied
        );
        assert_eq!(
            evaluate("https://example.com/public", &origin(), &robots),
            Verdict::Permitted
        );
    }

    #[test]
    fn test_origin_checked_before_robots() {
        let robots = RobotsPolicy::deny_all();
        assert_eq!(
            evaluate("https://other.com/", &origin(), &robots),
            Verdict::OffOrigin
        );
    }
}
