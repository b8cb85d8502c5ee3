// src/crawl/visited.rs
// =============================================================================
// The set of URLs this crawl has already claimed.
//
// Many workers run at once, so "is it visited?" followed by "mark it visited"
// would let two workers both see "no" and both fetch the page. insert() does
// the check and the insert as ONE operation and tells the caller whether it
// won. Only the winner goes on to fetch.
// =============================================================================

use dashmap::DashSet;

#[derive(Debug, Default)]
pub struct VisitedSet {
    urls: DashSet<String>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    // Claims `url`. Returns true only for the first caller.
    pub fn insert(&self, url: &str) -> bool {
        self.urls.insert(url.to_string())
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_second_insert_loses() {
        let visited = VisitedSet::new();
        assert!(visited.insert("https://example.com/"));
        assert!(!visited.insert("https://example.com/"));
        assert_eq!(visited.len(), 1);
    }

    #[test]
    fn test_exactly_one_winner_across_threads() {
        let visited = Arc::new(VisitedSet::new());
        let winners = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let visited = Arc::clone(&visited);
                let winners = Arc::clone(&winners);
                std::thread::spawn(move || {
                    for i in 0..100 {
                        if visited.insert(&format!("https://example.com/{}", i)) {
                            winners.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(winners.load(Ordering::SeqCst), 100);
        assert_eq!(visited.len(), 100);
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is DashSet?
//    - A HashSet split into shards, each with its own lock
//    - Many threads can use it at once through a shared &self
//
// 2. Why is insert() enough on its own?
//    - DashSet::insert returns true if the value was NEW, false if it was
//      already there
//    - The check and the insert happen under one shard lock, so exactly one
//      caller sees true for a given URL
//    - contains() followed by insert() would NOT be safe: two workers could
//      both pass contains() before either inserts
// -----------------------------------------------------------------------------
