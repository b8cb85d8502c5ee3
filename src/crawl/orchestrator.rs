// src/crawl/orchestrator.rs
// =============================================================================
// This module drives the crawl.
//
// How it works, for every URL (a CrawlTask):
// 1. Gate: stop if cancelled, if the depth budget is used up, or if another
//    worker already claimed the URL. Then apply the policy gate
//    (same origin + robots.txt).
// 2. Fetch: static GET, browser fallback for script-heavy pages. If a
//    same-origin redirect moved us, the page we landed on is claimed and
//    gated too.
// 3. Extract: clean the page text and find its links.
// 4. Persist: append a PageRecord to the result file.
// 5. Recurse: every same-origin link becomes a child task with one less
//    level of depth. Children run at most `workers` at a time, and a page
//    is only done once all of its children are done.
//
// Every failure is local to its URL: it is logged and that branch ends.
// Siblings and the rest of the crawl keep going.
//
// Politeness:
// - A fixed delay before every fetch
// - At most `workers` fetches in flight across the whole crawl
//
// Rust concepts:
// - BoxFuture: an async fn cannot call itself directly, so the recursive
//   step returns a boxed future
// - Atomics: lock-free counters shared by all workers
// - CancellationToken: a cheap, cloneable "please stop" flag
// =============================================================================

use futures::future::{BoxFuture, FutureExt};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use url::Url;

use super::VisitedSet;
use crate::config::CrawlConfig;
use crate::error::CrawlError;
use crate::extract::{clean_page_text, extract_links, normalize_url};
use crate::fetch::{ChromeRenderer, FetchStrategy, HttpFetcher, Renderer};
use crate::policy::{self, RobotsPolicy, Verdict};
use crate::store::{default_store_path, PageRecord, ResultStore};

// One unit of work: a URL and how many more link hops we may take below it
#[derive(Debug, Clone)]
pub struct CrawlTask {
    pub url: String,
    pub remaining_depth: i32,
}

// Why a task ended without fetching anything
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    DepthExhausted,
    AlreadyVisited,
    OffOrigin,
    RobotsDenied,
    Cancelled,
}

// Where a task ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// Saved; these are the links found on the page
    Persisted { links: Vec<String> },
    Skipped(SkipReason),
    /// Fetch or store error, already logged
    Failed,
}

// Totals for one run
#[derive(Debug, Clone, Serialize)]
pub struct CrawlSummary {
    pub start_url: String,
    pub output: PathBuf,
    /// Distinct URLs claimed by a worker
    pub visited: usize,
    pub persisted: usize,
    /// Persisted pages whose HTML came from the browser
    pub rendered: usize,
    pub skipped: usize,
    pub failed: usize,
    pub cancelled: bool,
}

#[derive(Debug, Default)]
struct Counters {
    persisted: AtomicUsize,
    rendered: AtomicUsize,
    skipped: AtomicUsize,
    failed: AtomicUsize,
}

pub struct Crawler {
    start: Url,
    config: CrawlConfig,
    strategy: FetchStrategy,
    robots: RobotsPolicy,
    store: Arc<ResultStore>,
    output: PathBuf,
    visited: VisitedSet,
    in_flight: Semaphore,
    cancel: CancellationToken,
    counters: Counters,
}

// Crawls a website starting from a URL and saves every page it can reach
//
// Parameters:
//   start_url: where to begin; also defines the origin we never leave
//   config: depth, concurrency, delays, output path...
//   cancel: cancel it to stop spawning new pages (in-flight pages finish)
//
// Returns: totals for the run, or an error if the crawl could not start
pub async fn crawl_website(
    start_url: &str,
    config: CrawlConfig,
    cancel: CancellationToken,
) -> Result<CrawlSummary, CrawlError> {
    let start = parse_start_url(start_url)?;

    let http = HttpFetcher::new(config.request_timeout, &start)?;
    let renderer: Option<Arc<dyn Renderer>> = if config.render {
        Some(Arc::new(ChromeRenderer::new(
            config.render_settle,
            config.chrome_path.clone(),
        )))
    } else {
        None
    };
    let strategy = FetchStrategy::new(http, renderer, config.js_text_threshold);

    // robots.txt is fetched exactly once, before any page
    let robots = RobotsPolicy::load(strategy.http().client(), &start, config.robots_fallback).await;

    // Optional global deadline: cancel ourselves after it passes
    let deadline = config.deadline.map(|limit| {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(limit).await;
            tracing::warn!(?limit, "crawl deadline reached, draining in-flight pages");
            cancel.cancel();
        })
    });

    let crawler = Crawler::new(start, config, strategy, robots, Arc::new(ResultStore::new()), cancel);
    let summary = crawler.run().await;

    if let Some(timer) = deadline {
        timer.abort();
    }

    Ok(summary)
}

// Validates and normalizes the start URL
fn parse_start_url(raw: &str) -> Result<Url, CrawlError> {
    let invalid = |reason: &str| CrawlError::InvalidStartUrl {
        url: raw.to_string(),
        reason: reason.to_string(),
    };

    let normalized = normalize_url(raw.trim()).ok_or_else(|| invalid("not an http(s) URL"))?;
    let url = Url::parse(&normalized).map_err(|e| invalid(&e.to_string()))?;
    if url.host().is_none() {
        return Err(invalid("URL has no host"));
    }
    Ok(url)
}

impl Crawler {
    pub fn new(
        start: Url,
        config: CrawlConfig,
        strategy: FetchStrategy,
        robots: RobotsPolicy,
        store: Arc<ResultStore>,
        cancel: CancellationToken,
    ) -> Self {
        let output = config
            .output
            .clone()
            .unwrap_or_else(|| default_store_path(&start));
        let workers = config.workers.max(1);

        Self {
            start,
            config,
            strategy,
            robots,
            store,
            output,
            visited: VisitedSet::new(),
            in_flight: Semaphore::new(workers),
            cancel,
            counters: Counters::default(),
        }
    }

    // Runs the whole crawl and returns once every task has finished
    pub async fn run(&self) -> CrawlSummary {
        tracing::info!(
            start = %self.start,
            max_depth = self.config.max_depth,
            workers = self.config.workers,
            output = %self.output.display(),
            "starting crawl"
        );

        let root = CrawlTask {
            url: self.start.to_string(),
            remaining_depth: self.config.max_depth,
        };
        self.crawl(root).await;

        let summary = CrawlSummary {
            start_url: self.start.to_string(),
            output: self.output.clone(),
            visited: self.visited.len(),
            persisted: self.counters.persisted.load(Ordering::SeqCst),
            rendered: self.counters.rendered.load(Ordering::SeqCst),
            skipped: self.counters.skipped.load(Ordering::SeqCst),
            failed: self.counters.failed.load(Ordering::SeqCst),
            cancelled: self.cancel.is_cancelled(),
        };
        tracing::info!(?summary, "crawl finished");
        summary
    }

    // Processes one task, then all of its children, then returns
    fn crawl(&self, task: CrawlTask) -> BoxFuture<'_, TaskOutcome> {
        async move {
            let outcome = self.process(&task).await;

            let links = match &outcome {
                TaskOutcome::Persisted { links } => links.clone(),
                TaskOutcome::Skipped(reason) => {
                    self.counters.skipped.fetch_add(1, Ordering::SeqCst);
                    tracing::debug!(url = %task.url, ?reason, "skipped");
                    return outcome;
                }
                TaskOutcome::Failed => {
                    self.counters.failed.fetch_add(1, Ordering::SeqCst);
                    return outcome;
                }
            };

            let children = links.into_iter().map(|url| CrawlTask {
                url,
                remaining_depth: task.remaining_depth - 1,
            });

            stream::iter(children)
                .for_each_concurrent(self.config.workers.max(1), |child| async move {
                    self.crawl(child).await;
                })
                .await;

            outcome
        }
        .boxed()
    }

    // Walks one task through gate -> fetch -> extract -> persist
    async fn process(&self, task: &CrawlTask) -> TaskOutcome {
        if self.cancel.is_cancelled() {
            return TaskOutcome::Skipped(SkipReason::Cancelled);
        }
        if task.remaining_depth < 0 {
            return TaskOutcome::Skipped(SkipReason::DepthExhausted);
        }
        if !self.visited.insert(&task.url) {
            return TaskOutcome::Skipped(SkipReason::AlreadyVisited);
        }

        match policy::evaluate(&task.url, &self.start, &self.robots) {
            Verdict::Permitted => {}
            Verdict::OffOrigin => return TaskOutcome::Skipped(SkipReason::OffOrigin),
            Verdict::RobotsDenied => {
                tracing::info!(url = %task.url, "skipping, disallowed by robots.txt");
                return TaskOutcome::Skipped(SkipReason::RobotsDenied);
            }
        }

        let page = {
            // Waiting for a slot is not "in flight" yet, so cancellation still applies
            let _permit = tokio::select! {
                permit = self.in_flight.acquire() => match permit {
                    Ok(permit) => permit,
                    Err(_) => return TaskOutcome::Skipped(SkipReason::Cancelled),
                },
                _ = self.cancel.cancelled() => return TaskOutcome::Skipped(SkipReason::Cancelled),
            };

            tokio::time::sleep(self.config.polite_delay).await;

            tracing::info!(url = %task.url, remaining_depth = task.remaining_depth, "scraping");
            match self.strategy.fetch(&task.url).await {
                Ok(page) => page,
                Err(e) => {
                    tracing::error!(url = %task.url, error = %e, "fetch failed");
                    return TaskOutcome::Failed;
                }
            }
        };

        if let Some(skipped) = self.check_redirect_target(task, &page.final_url) {
            return skipped;
        }

        let content = clean_page_text(&page.html);
        let links = self.same_origin_links(&page.html, page.final_url.as_str());

        let depth = u32::try_from(self.config.max_depth - task.remaining_depth).unwrap_or(0);
        let record = PageRecord::new(task.url.as_str(), content, depth, page.rendered)
            .with_labels(&self.config.labels);

        if let Err(e) = self.store.append(&self.output, record).await {
            tracing::error!(url = %task.url, error = %e, "could not save page");
            return TaskOutcome::Failed;
        }

        self.counters.persisted.fetch_add(1, Ordering::SeqCst);
        if page.rendered {
            self.counters.rendered.fetch_add(1, Ordering::SeqCst);
        }
        tracing::debug!(url = %task.url, links = links.len(), "saved page");

        TaskOutcome::Persisted { links }
    }

    // After a redirect, the URL we landed on must pass the same checks as a
    // link would: claimed once, on origin, allowed by robots.txt
    fn check_redirect_target(&self, task: &CrawlTask, final_url: &Url) -> Option<TaskOutcome> {
        let landed = normalize_url(final_url.as_str())?;
        if landed == task.url {
            return None;
        }
        tracing::debug!(from = %task.url, to = %landed, "followed redirect");

        if !self.visited.insert(&landed) {
            return Some(TaskOutcome::Skipped(SkipReason::AlreadyVisited));
        }
        match policy::evaluate(&landed, &self.start, &self.robots) {
            Verdict::Permitted => None,
            Verdict::OffOrigin => Some(TaskOutcome::Skipped(SkipReason::OffOrigin)),
            Verdict::RobotsDenied => {
                tracing::info!(url = %landed, "redirect target disallowed by robots.txt");
                Some(TaskOutcome::Skipped(SkipReason::RobotsDenied))
            }
        }
    }

    // Links on the page that stay on the start origin
    fn same_origin_links(&self, html: &str, page_url: &str) -> Vec<String> {
        extract_links(html, page_url)
            .into_iter()
            .filter(|link| {
                Url::parse(link)
                    .map(|parsed| policy::same_origin(&parsed, &self.start))
                    .unwrap_or(false)
            })
            .collect()
    }
}


// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why does crawl() return BoxFuture instead of being an async fn?
//    - An async fn compiles to a state machine that contains its own
//      sub-futures, so a recursive one would have infinite size
//    - .boxed() puts the future on the heap, which gives it a fixed size
//    - BoxFuture<'_, T> also says "this future is Send", so tokio can move
//      it between threads
//
// 2. What does for_each_concurrent do?
//    - Runs the closure for every item of a stream, at most N at a time
//    - It finishes only when every item is done, so a page "ends" after
//      all of its children end
//
// 3. Why both for_each_concurrent AND a Semaphore?
//    - for_each_concurrent limits the children of ONE page
//    - Many pages expand at once, so the Semaphore caps fetches for the
//      whole crawl
//
// 4. What does tokio::select! do here?
//    - Waits on two futures and takes whichever finishes first
//    - Either we get a fetch slot, or the crawl is cancelled while we wait
//
// 5. Why check the redirect target?
//    - /old may redirect to /private/new; robots.txt only saw /old
//    - The landed URL is claimed in the visited set so /docs and /docs/
//      do not produce two records
// -----------------------------------------------------------------------------
