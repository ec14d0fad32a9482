use std::sync::Arc;

use tracing::error;

use crate::cache::AnimationCache;
use crate::definition::{self, Source};
use crate::error::{Error, Result};
use crate::normalize;
use crate::precompute::{self, Precomputed};

/// Resolves animation names into ready-to-stream animations, going through
/// the cache first.
pub struct Library {
    source: Box<dyn Source>,
    cache: AnimationCache,
}

impl Library {
    pub fn new(source: Box<dyn Source>, cache: AnimationCache) -> Self {
        Self { source, cache }
    }

    pub fn cache(&self) -> &AnimationCache {
        &self.cache
    }

    /// Blocking: may read and parse a definition on cache miss.
    pub fn get(&self, name: &str) -> Result<Arc<Precomputed>> {
        let result = self.cache.get_or_compute(name, || self.build(name));

        if let Err(e @ Error::Load { .. }) = &result {
            error!("{e}");
        }

        result
    }

    /// Runs the whole pipeline, bypassing the cache.
    pub fn build(&self, name: &str) -> Result<Precomputed> {
        let definition = definition::load(self.source.as_ref(), name)?;
        let normalized = normalize::normalize(definition);

        Ok(precompute::precompute(&normalized))
    }
}
