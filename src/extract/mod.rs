// src/extract/mod.rs
// =============================================================================
// HTML helpers: visible text, cleaned page text and link discovery.
//
// Submodules:
// - text: turns HTML into visible / cleaned text
// - links: finds and normalizes the links on a page
// =============================================================================

mod links;
mod text;

pub use links::{extract_links, normalize_url};
pub use text::{clean_page_text, visible_text};
