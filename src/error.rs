use std::io;

use thiserror::Error;

/// Outcome of resolving an animation name into a streamable animation.
#[derive(Debug, Error)]
pub enum Error {
    #[error("animation {0:?} not found")]
    NotFound(String),

    #[error("can't load animation {name:?}: {source}")]
    Load {
        name: String,
        #[source]
        source: LoadError,
    },
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("read failed: {0}")]
    Io(#[from] io::Error),

    #[error("malformed definition: {0}")]
    Parse(#[from] serde_json::Error),
}

impl Error {
    pub fn load<E: Into<LoadError>>(name: &str, e: E) -> Self {
        Error::Load {
            name: name.to_owned(),
            source: e.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
