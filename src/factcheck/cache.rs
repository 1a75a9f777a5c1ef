//! TTL- and size-bounded cache of fact-check results, keyed by cleaned claim.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::debug;

use super::FactCheckResult;

struct CacheEntry {
    inserted_at: Instant,
    result: FactCheckResult,
}

/// Bounded cache of recent fact-check results.
pub struct ClaimCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
    max_size: usize,
}

impl ClaimCache {
    pub fn new(max_size: usize, ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            max_size,
        }
    }

    /// Look up a fresh result for the claim.
    pub async fn get(&self, claim: &str) -> Option<FactCheckResult> {
        let entries = self.entries.lock().await;
        let entry = entries.get(claim)?;
        if entry.inserted_at.elapsed() > self.ttl {
            return None;
        }
        Some(entry.result.clone())
    }

    /// Store a result, evicting the oldest entry if the cache is full.
    pub async fn insert(&self, claim: String, result: FactCheckResult) {
        let mut entries = self.entries.lock().await;

        if entries.len() >= self.max_size && !entries.contains_key(&claim) {
            if let Some(oldest) = entries
                .iter()
                .min_by_key(|(_, e)| e.inserted_at)
                .map(|(k, _)| k.clone())
            {
                entries.remove(&oldest);
            }
        }

        entries.insert(
            claim,
            CacheEntry {
                inserted_at: Instant::now(),
                result,
            },
        );
    }

    /// Drop expired entries.
    pub async fn cleanup(&self) {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, e| e.inserted_at.elapsed() <= self.ttl);
        let removed = before - entries.len();
        if removed > 0 {
            debug!("Evicted {} expired cache entries", removed);
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}
