// src/fetch/http.rs
// =============================================================================
// Plain HTTP GET for pages.
//
// Every request goes out with a User-Agent picked at random from a fixed pool
// of real browser strings. Some sites answer default client identities with
// an error page; a browser-looking header avoids that trivial blocking.
//
// Redirects are followed only while they stay on the start origin. A hop to
// another origin stops the chain and the page fails with OffOriginRedirect,
// so nothing from another site can end up saved under one of our URLs.
//
// Anything that is not a 2xx is a FetchError. We never retry: a failed page
// is simply left out of the results.
// =============================================================================

use rand::seq::IndexedRandom;
use reqwest::header::{LOCATION, USER_AGENT};
use reqwest::redirect::Policy;
use reqwest::Client;
use std::time::Duration;
use url::Url;

use crate::error::FetchError;

pub const USER_AGENTS: [&str; 15] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537",
    "Mozilla/5.0 (Windows; U; Windows NT 6.1; en-US) AppleWebKit/532.5 (KHTML, like Gecko) Chrome/4.1.249.1045 Safari/532.5",
    "Mozilla/5.0 (Windows NT 5.1) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/35.0.2309.372 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/74.0.3729.169 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_14_6) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/13.1.1 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/60.0.3112.113 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/44.0.2403.157 Safari/537.36",
    "Mozilla/5.0 (Windows NT 6.1; WOW64; rv:64.0) Gecko/20100101 Firefox/64.0",
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:91.0) Gecko/20100101 Firefox/91.0",
    "Mozilla/5.0 (iPad; CPU OS 13_2_3 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/13.0.3 Mobile/15E148 Safari/604.1",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/63.0.3239.132 Safari/537.36",
    "Mozilla/5.0 (Windows NT 6.1; Win64; x64; rv:47.0) Gecko/20100101 Firefox/47.0",
    "Mozilla/5.0 (Windows NT 6.1; WOW64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/47.0.2526.111 Safari/537.36",
    "Mozilla/5.0 (Windows NT 6.3; WOW64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/47.0.2526.111 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/46.0.2486.0 Safari/537.36 Edge/13.10586",
];

// Longest redirect chain we follow before giving up
const MAX_REDIRECTS: usize = 5;

// Picks one entry of USER_AGENTS uniformly at random
pub fn random_user_agent() -> &'static str {
    USER_AGENTS
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or(USER_AGENTS[0])
}

// Body of a static GET and the URL it was finally served from
#[derive(Debug, Clone)]
pub struct StaticPage {
    pub url: Url,
    pub html: String,
}

// Static page fetcher
//
// Cloning is cheap: reqwest::Client is an Arc internally, so every clone
// shares one connection pool.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    // Redirects are confined to the origin of `start`
    pub fn new(timeout: Duration, start: &Url) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(same_origin_redirects(start))
            .build()?;
        Ok(Self { client })
    }

    // The underlying client, shared with the robots.txt fetch
    pub fn client(&self) -> &Client {
        &self.client
    }

    // GETs `url` and returns the body as text, with the final URL after redirects
    pub async fn fetch(&self, url: &str) -> Result<StaticPage, FetchError> {
        let transport = |source: reqwest::Error| FetchError::Transport {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .get(url)
            .header(USER_AGENT, random_user_agent())
            .send()
            .await
            .map_err(transport)?;

        // A redirect we still see here is one the policy refused to follow
        let status = response.status();
        if status.is_redirection() {
            if let Some(location) = response.headers().get(LOCATION).and_then(|v| v.to_str().ok()) {
                return Err(FetchError::OffOriginRedirect {
                    url: url.to_string(),
                    location: location.to_string(),
                });
            }
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let final_url = response.url().clone();
        let html = response.text().await.map_err(transport)?;
        Ok(StaticPage {
            url: final_url,
            html,
        })
    }
}

// Follows a redirect only if it stays on the origin of `start`
fn same_origin_redirects(start: &Url) -> Policy {
    let origin = start.origin();
    Policy::custom(move |attempt| {
        if attempt.previous().len() > MAX_REDIRECTS {
            attempt.error("too many redirects")
        } else if attempt.url().origin() != origin {
            tracing::debug!(to = %attempt.url(), "not following redirect off the site");
            attempt.stop()
        } else {
            attempt.follow()
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher(server: &MockServer) -> HttpFetcher {
        let start = Url::parse(&server.uri()).unwrap();
        HttpFetcher::new(Duration::from_secs(5), &start).unwrap()
    }

    #[test]
    fn test_random_user_agent_comes_from_pool() {
        for _ in 0..50 {
            assert!(USER_AGENTS.contains(&random_user_agent()));
        }
    }

    #[tokio::test]
    async fn test_fetch_returns_body_and_sends_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .and(header_exists("user-agent"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>hello</p>"))
            .expect(1)
            .mount(&server)
            .await;

        let page = fetcher(&server)
            .fetch(&format!("{}/page", server.uri()))
            .await
            .unwrap();
        assert_eq!(page.html, "<p>hello</p>");
        assert_eq!(page.url.path(), "/page");
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = fetcher(&server)
            .fetch(&format!("{}/broken", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Status { status, .. } if status.as_u16() == 500));
    }

    #[tokio::test]
    async fn test_connection_failure_is_transport_error() {
        // Port 9 (discard) on localhost is practically never listening
        let start = Url::parse("http://127.0.0.1:9/").unwrap();
        let fetcher = HttpFetcher::new(Duration::from_secs(5), &start).unwrap();
        let err = fetcher.fetch("http://127.0.0.1:9/").await.unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }));
    }

    #[tokio::test]
    async fn test_same_origin_redirect_reports_final_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/docs"))
            .respond_with(ResponseTemplate::new(301).insert_header("Location", "/docs/"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/docs/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>docs</p>"))
            .expect(1)
            .mount(&server)
            .await;

        let page = fetcher(&server)
            .fetch(&format!("{}/docs", server.uri()))
            .await
            .unwrap();
        assert_eq!(page.url.path(), "/docs/");
        assert_eq!(page.html, "<p>docs</p>");
    }

    #[tokio::test]
    async fn test_redirect_to_other_origin_is_not_followed() {
        let server = MockServer::start().await;
        let other = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/go"))
            .respond_with(
                ResponseTemplate::new(302).insert_header("Location", format!("{}/secret", other.uri()).as_str()),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("elsewhere"))
            .expect(0)
            .mount(&other)
            .await;

        let err = fetcher(&server)
            .fetch(&format!("{}/go", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::OffOriginRedirect { ref location, .. } if location.ends_with("/secret")));
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is redirect::Policy::custom?
//    - reqwest calls our closure before following each redirect
//    - attempt.follow() goes on, attempt.stop() hands back the 3xx response
//      as-is, attempt.error() turns it into an error
//    - Stopping off-origin hops keeps other sites' pages out of our results
//
// 2. Why is the closure `move`?
//    - It outlives this function (the client keeps it), so it must own the
//      origin it compares against
//
// 3. Why return response.url()?
//    - After redirects it is the address the body actually came from
//    - Relative links on the page are relative to THAT address
// -----------------------------------------------------------------------------
