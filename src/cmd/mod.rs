pub mod inspect;
pub mod play;
pub mod serve;

use crate::cache::AnimationCache;
use crate::config::Config;
use crate::definition::DirSource;
use crate::library::Library;

fn build_library(config: &Config) -> Library {
    let source = DirSource::new(&config.animations.dir);
    let cache = AnimationCache::new(config.cache.budget);

    Library::new(Box::new(source), cache)
}
