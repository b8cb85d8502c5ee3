// src/policy/mod.rs
// =============================================================================
// Crawl policy: which URLs we are allowed to visit.
//
// Submodules:
// - robots: robots.txt rules for the start origin, fetched once
// - gate: same-origin + robots check applied to every URL
// =============================================================================

mod gate;
mod robots;

pub use gate::{evaluate, same_origin, Verdict};
pub use robots::RobotsPolicy;
