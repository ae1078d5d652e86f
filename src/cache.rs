//! Content-fingerprint cache for skipping duplicate submissions.
//!
//! Re-running the same recording or text through the model burns quota for
//! an identical answer, so the host can key processed results by a content
//! fingerprint. The cache is caller-owned: the validation core never
//! consults it.

use crate::validator::ValidatedResponse;
use log::debug;
use sha2::{Digest, Sha256};
use std::collections::VecDeque;

/// SHA-256 hex digest of the input content (text bytes or raw audio).
pub fn fingerprint(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content))
}

/// Bounded FIFO cache keyed by content fingerprint.
///
/// A capacity of 1 reproduces "skip reprocessing the last input" exactly;
/// larger capacities keep a short history. Oldest entries are evicted first.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    capacity: usize,
    entries: VecDeque<(String, ValidatedResponse)>,
}

impl ResponseCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: VecDeque::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&ValidatedResponse> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn insert(&mut self, key: String, value: ValidatedResponse) {
        self.entries.retain(|(k, _)| k != &key);
        self.entries.push_back((key, value));

        while self.entries.len() > self.capacity {
            if let Some((evicted, _)) = self.entries.pop_front() {
                debug!("Evicted cached response {}", &evicted[..8.min(evicted.len())]);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
