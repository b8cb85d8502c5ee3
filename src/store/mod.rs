// src/store/mod.rs
// =============================================================================
// Persisting scraped pages.
//
// Submodules:
// - record: PageRecord and the on-disk document shape
// - json: ResultStore, the locked read-modify-write with atomic replace
// - naming: default output filename derived from the start URL
// =============================================================================

mod json;
mod naming;
mod record;

pub use json::ResultStore;
pub use naming::default_store_path;
pub use record::{PageRecord, StoreDocument};
