//! In-memory result caching using moka
//!
//! Calculations are pure, so a cached result is always what a fresh
//! computation would return; the cache only saves the work.

use chrono::{DateTime, Utc};
use moka::sync::Cache;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::pricing::models::{CalculationInput, CalculationResult};

/// Default time-to-live for cached calculations (5 minutes)
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Default maximum number of cached calculations
pub const DEFAULT_CAPACITY: u64 = 1000;

/// A cached calculation and when it was computed
#[derive(Debug, Clone)]
pub struct CachedResult {
    pub result: CalculationResult,
    pub computed_at: DateTime<Utc>,
}

/// Calculation cache keyed by the full input
#[derive(Clone)]
pub struct ResultCache {
    entries: Cache<CalculationInput, Arc<CachedResult>>,
    ttl: Duration,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

impl ResultCache {
    /// Create a cache; entries older than `ttl` read as misses.
    pub fn new(ttl: Duration, max_capacity: u64) -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
            ttl,
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn get(&self, input: &CalculationInput) -> Option<Arc<CachedResult>> {
        let cached = self.entries.get(input);
        let counter = if cached.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        cached
    }

    /// Store a successfully computed result
    pub fn insert(&self, input: CalculationInput, result: CalculationResult) {
        let cached = CachedResult {
            result,
            computed_at: Utc::now(),
        };
        self.entries.insert(input, Arc::new(cached));
    }

    /// Drop every cached calculation
    pub fn clear(&self) {
        self.entries.invalidate_all();
        info!("Calculation cache cleared");
    }

    /// Get cache statistics for monitoring
    pub fn stats(&self) -> CacheStats {
        self.entries.run_pending_tasks();
        CacheStats {
            entries: self.entries.entry_count(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            ttl_secs: self.ttl.as_secs(),
        }
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_CAPACITY)
    }
}

/// Cache statistics for monitoring endpoint
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub entries: u64,
    pub hits: u64,
    pub misses: u64,
    pub ttl_secs: u64,
}
