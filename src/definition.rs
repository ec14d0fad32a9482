use std::fs;
use std::io::{self, ErrorKind};
use std::path::PathBuf;

use serde::{Deserialize, Deserializer};

use crate::error::{Error, Result};

/// Animation as stored, before any normalization.
///
/// Rows may contain `null` entries, which count as empty lines. Missing or
/// `null` fields fall back to an empty frame list and a zero frame rate; both
/// are fixed up by the normalizer.
#[derive(Debug, Default, Deserialize)]
pub struct Definition {
    #[serde(default, deserialize_with = "deserialize_frames")]
    pub frames: Vec<Vec<Option<String>>>,

    #[serde(default, rename = "framerate", deserialize_with = "null_as_default")]
    pub frame_rate: i64,
}

fn deserialize_frames<'de, D>(
    deserializer: D,
) -> std::result::Result<Vec<Vec<Option<String>>>, D::Error>
where
    D: Deserializer<'de>,
{
    let frames: Option<Vec<Option<Vec<Option<String>>>>> = Option::deserialize(deserializer)?;

    Ok(frames
        .unwrap_or_default()
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect())
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::deserialize(deserializer)?.unwrap_or_default())
}

/// Where definitions come from. `Ok(None)` means there is no definition
/// under the given name.
pub trait Source: Send + Sync {
    fn read(&self, name: &str) -> io::Result<Option<String>>;
}

/// Reads `<dir>/<name>.json`.
pub struct DirSource {
    dir: PathBuf,
}

impl DirSource {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, name: &str) -> Option<PathBuf> {
        if !is_valid_name(name) {
            return None;
        }

        Some(self.dir.join(format!("{name}.json")))
    }
}

impl Source for DirSource {
    fn read(&self, name: &str) -> io::Result<Option<String>> {
        let Some(path) = self.path(name) else {
            return Ok(None);
        };

        match fs::read_to_string(path) {
            Ok(json) => Ok(Some(json)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains(['/', '\\', '\0'])
        && !name.contains("..")
}

pub fn load(source: &dyn Source, name: &str) -> Result<Definition> {
    let json = source
        .read(name)
        .map_err(|e| Error::load(name, e))?
        .ok_or_else(|| Error::NotFound(name.to_owned()))?;

    parse(&json).map_err(|e| Error::load(name, e))
}

pub fn parse(json: &str) -> serde_json::Result<Definition> {
    serde_json::from_str(json)
}
