// src/store/record.rs
// =============================================================================
// The shapes we write to disk.
//
// One JSON file per crawled site:
//
//   {
//     "webpages": [
//       { "url": "...", "content": "...", "depth": 0, "rendered": false,
//         "crawled_at": "2024-01-01T00:00:00Z", "a_id": "..." }
//     ]
//   }
//
// Unknown fields are kept (both on the document and on each page) so a file
// written by an older tool, or with extra labels, survives a round trip.
// =============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

// One scraped page. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    pub url: String,
    /// Cleaned text of the page body
    pub content: String,
    /// Link hops from the start URL
    #[serde(default)]
    pub depth: u32,
    /// True when the HTML came from the headless browser
    #[serde(default)]
    pub rendered: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crawled_at: Option<DateTime<Utc>>,
    /// User labels plus any fields we do not know about
    #[serde(flatten)]
    pub labels: BTreeMap<String, Value>,
}

impl PageRecord {
    pub fn new(url: impl Into<String>, content: impl Into<String>, depth: u32, rendered: bool) -> Self {
        Self {
            url: url.into(),
            content: content.into(),
            depth,
            rendered,
            crawled_at: Some(Utc::now()),
            labels: BTreeMap::new(),
        }
    }

    // Adds string labels (from --label key=value) to the record
    pub fn with_labels(mut self, labels: &BTreeMap<String, String>) -> Self {
        for (key, value) in labels {
            self.labels.insert(key.clone(), Value::String(value.clone()));
        }
        self
    }
}

// The whole file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreDocument {
    #[serde(default)]
    pub webpages: Vec<PageRecord>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
