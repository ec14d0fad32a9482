use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, warn};

use crate::error::Result;
use crate::precompute::Precomputed;

pub const DEFAULT_BUDGET: usize = 50 * 1024 * 1024;

/// Precomputed animations keyed by name.
///
/// Entries are only admitted while their payload size stays below the
/// budget, and stay until the process exits. Concurrent misses for the same
/// name may each compute the animation; the last insert wins.
pub struct AnimationCache {
    entries: RwLock<HashMap<String, Arc<Precomputed>>>,
    budget: usize,
}

impl AnimationCache {
    pub fn new(budget: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            budget,
        }
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    pub fn admits(&self, animation: &Precomputed) -> bool {
        animation.byte_size() < self.budget
    }

    pub fn get(&self, name: &str) -> Option<Arc<Precomputed>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the cached animation, or runs `compute` and tries to admit its
    /// result. Failed computations are never stored.
    pub fn get_or_compute<F>(&self, name: &str, compute: F) -> Result<Arc<Precomputed>>
    where
        F: FnOnce() -> Result<Precomputed>,
    {
        if let Some(animation) = self.get(name) {
            debug!("cache hit for {name}");

            return Ok(animation);
        }

        debug!("cache miss for {name}");
        let animation = Arc::new(compute()?);
        let size = animation.byte_size();

        if self.admits(&animation) {
            self.entries
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(name.to_owned(), animation.clone());
        } else {
            warn!(
                "animation {name} takes {size} bytes, over the cache budget of {} bytes, not caching",
                self.budget
            );
        }

        Ok(animation)
    }
}

impl Default for AnimationCache {
    fn default() -> Self {
        Self::new(DEFAULT_BUDGET)
    }
}
