// src/fetch/strategy.rs
// =============================================================================
// Decides how a page is fetched.
//
// 1. Always start with a cheap static GET
// 2. Measure the visible text of what came back
// 3. If there is less than `js_text_threshold` characters of it, the page
//    probably builds its content with JavaScript, so render it in a browser
//
// The browser path is slow and heavy; it only runs when the heuristic fires.
// If the browser fails we keep the static HTML rather than lose the page.
// =============================================================================

use std::sync::Arc;
use url::Url;

use super::{HttpFetcher, Renderer};
use crate::error::FetchError;
use crate::extract::visible_text;

// HTML for one page, where it was served from, and whether a browser
// produced it
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub final_url: Url,
    pub html: String,
    pub rendered: bool,
}

// True when the page has fewer than `threshold` characters of visible text
pub fn is_script_dependent(html: &str, threshold: usize) -> bool {
    visible_text(html).chars().count() < threshold
}

#[derive(Clone)]
pub struct FetchStrategy {
    http: HttpFetcher,
    renderer: Option<Arc<dyn Renderer>>,
    js_text_threshold: usize,
}

impl FetchStrategy {
    // `renderer: None` disables the browser fallback entirely
    pub fn new(
        http: HttpFetcher,
        renderer: Option<Arc<dyn Renderer>>,
        js_text_threshold: usize,
    ) -> Self {
        Self {
            http,
            renderer,
            js_text_threshold,
        }
    }

    pub fn http(&self) -> &HttpFetcher {
        &self.http
    }

    pub async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let page = self.http.fetch(url).await?;
        let final_url = page.url;
        let html = page.html;

        if !is_script_dependent(&html, self.js_text_threshold) {
            return Ok(FetchedPage {
                final_url,
                html,
                rendered: false,
            });
        }

        let Some(renderer) = &self.renderer else {
            tracing::debug!(url, "page looks script-dependent but rendering is disabled");
            return Ok(FetchedPage {
                final_url,
                html,
                rendered: false,
            });
        };

        // Render where the static fetch ended up, not where it started
        tracing::info!(url = %final_url, "page seems to rely on JavaScript, rendering in browser");
        match renderer.render(final_url.as_str()).await {
            Ok(rendered) => Ok(FetchedPage {
                final_url,
                html: rendered,
                rendered: true,
            }),
            Err(e) => {
                tracing::warn!(url = %final_url, error = %e, "rendering failed, keeping static HTML");
                Ok(FetchedPage {
                    final_url,
                    html,
                    rendered: false,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    // Counts calls and returns canned HTML (or an error)
    struct FakeRenderer {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl Renderer for FakeRenderer {
        async fn render(&self, url: &str) -> Result<String, RenderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(RenderError::new(url, "boom"))
            } else {
                Ok("<html><body>rendered</body></html>".to_string())
            }
        }
    }

    fn http_for(server: &MockServer) -> HttpFetcher {
        let start = Url::parse(&server.uri()).unwrap();
        HttpFetcher::new(Duration::from_secs(5), &start).unwrap()
    }

    fn page_with_text_len(len: usize) -> String {
        format!("<html><head><title>ignored</title></head><body><p>{}</p></body></html>", "x".repeat(len))
    }

    async fn fetch_with(body: String, fail: bool) -> (FetchedPage, usize) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;

        let renderer = Arc::new(FakeRenderer {
            calls: AtomicUsize::new(0),
            fail,
        });
        let shared: Arc<dyn Renderer> = renderer.clone();
        let strategy = FetchStrategy::new(http_for(&server), Some(shared), 2000);

        let page = strategy.fetch(&server.uri()).await.unwrap();
        (page, renderer.calls.load(Ordering::SeqCst))
    }

    #[test]
    fn test_threshold_boundary() {
        assert!(is_script_dependent(&page_with_text_len(1999), 2000));
        assert!(!is_script_dependent(&page_with_text_len(2000), 2000));
    }

    #[tokio::test]
    async fn test_short_page_is_rendered() {
        let (page, calls) = fetch_with(page_with_text_len(1999), false).await;
        assert_eq!(calls, 1);
        assert!(page.rendered);
        assert!(page.html.contains("rendered"));
    }

    #[tokio::test]
    async fn test_long_page_is_not_rendered() {
        let (page, calls) = fetch_with(page_with_text_len(2000), false).await;
        assert_eq!(calls, 0);
        assert!(!page.rendered);
    }

    #[tokio::test]
    async fn test_render_failure_keeps_static_html() {
        let (page, calls) = fetch_with(page_with_text_len(10), true).await;
        assert_eq!(calls, 1);
        assert!(!page.rendered);
        assert!(page.html.contains("xxxxxxxxxx"));
    }

    #[tokio::test]
    async fn test_rendering_disabled() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(page_with_text_len(5)))
            .mount(&server)
            .await;

        let strategy = FetchStrategy::new(http_for(&server), None, 2000);
        let page = strategy.fetch(&server.uri()).await.unwrap();
        assert!(!page.rendered);
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is Arc<dyn Renderer>?
//    - dyn Renderer: "some type that implements Renderer", chosen at runtime
//    - Arc: shared ownership, so every worker can use the same renderer
//    - Tests pass a fake renderer through the same slot
//
// 2. What does let-else do?
//    - let Some(renderer) = &self.renderer else { ... };
//    - Binds renderer if the pattern matches, otherwise runs the else block,
//      which must return
// -----------------------------------------------------------------------------
