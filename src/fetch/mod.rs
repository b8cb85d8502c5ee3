// src/fetch/mod.rs
// =============================================================================
// Getting HTML for a URL.
//
// Submodules:
// - http: static GET with a random browser User-Agent
// - render: headless Chrome for script-heavy pages
// - strategy: static first, browser only when the page looks empty
// =============================================================================

mod http;
mod render;
mod strategy;

pub use http::HttpFetcher;
pub use render::{ChromeRenderer, Renderer};
pub use strategy::FetchStrategy;
