// Copyright (c) 2025 Chetan Conikee <conikee@gmail.com>
// Licensed under the MIT License

//! Bounded, insertion-ordered cache of analysis results.

use crate::analyzer::AnalysisResult;
use crate::hash::CacheKey;
use std::collections::{HashMap, VecDeque};
use tracing::debug;

/// Cache performance statistics.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Number of evictions.
    pub evictions: u64,
}

impl CacheStats {
    /// Returns the cache hit ratio.
    #[must_use]
    pub fn hit_ratio(&self) -> f64 {
        if self.hits + self.misses == 0 {
            0.0
        } else {
            self.hits as f64 / (self.hits + self.misses) as f64
        }
    }
}

/// Result cache that evicts its oldest entry once it holds more than
/// `capacity` results.
///
/// Entries are stored and handed out by value, so no caller ever shares a
/// result with the cache.
#[derive(Debug)]
pub struct ResultCache {
    entries: HashMap<CacheKey, AnalysisResult>,
    order: VecDeque<CacheKey>,
    capacity: usize,
    stats: CacheStats,
}

impl ResultCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity,
            stats: CacheStats::default(),
        }
    }

    /// Returns a copy of the cached result for `key`.
    pub fn get(&mut self, key: &CacheKey) -> Option<AnalysisResult> {
        match self.entries.get(key) {
            Some(result) => {
                self.stats.hits += 1;
                Some(result.clone())
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    /// Stores a result, evicting the oldest entries while over capacity.
    pub fn insert(&mut self, key: CacheKey, result: AnalysisResult) {
        if self.entries.insert(key, result).is_none() {
            self.order.push_back(key);
        }
        self.evict_if_needed();
    }

    /// Drops every entry. Statistics are kept.
    pub fn clear(&mut self) {
        if !self.entries.is_empty() {
            debug!("Invalidating {} cached result(s)", self.entries.len());
        }
        self.entries.clear();
        self.order.clear();
    }

    /// Number of cached results.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns cache statistics.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    fn evict_if_needed(&mut self) {
        while self.entries.len() > self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
            self.stats.evictions += 1;
            debug!("Evicted cached result {}", oldest.short());
        }
    }
}
