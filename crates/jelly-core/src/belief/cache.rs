//! Memoized belief posteriors keyed by remaining-pool size.

use super::{BeliefDistribution, BeliefError};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Stores one posterior per remaining-pool size.
///
/// Posteriors depend only on the key, so concurrent misses for the same key
/// compute identical values and whichever insert lands last is equivalent.
#[derive(Debug, Default)]
pub struct BeliefCache {
    entries: RwLock<HashMap<usize, BeliefDistribution>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl BeliefCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, remaining: usize) -> Option<BeliefDistribution> {
        self.entries.read().get(&remaining).copied()
    }

    pub fn get_or_compute(&self, remaining: usize) -> Result<BeliefDistribution, BeliefError> {
        if let Some(belief) = self.get(remaining) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(belief);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let belief = BeliefDistribution::posterior(remaining)?;
        self.entries.write().entry(remaining).or_insert(belief);
        Ok(belief)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}
