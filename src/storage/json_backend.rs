use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::{
    errors::Result,
    utils::persistence::{data_dir, write_atomic},
};

use super::KeyValueStore;

const FILE_EXTENSION: &str = "json";

/// Filesystem backend storing each key as a JSON file inside `root`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: PathBuf) -> Result<Self> {
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Opens the store under the application data directory.
    pub fn new_default() -> Result<Self> {
        Self::new(data_dir())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn key_path(&self, key: &str) -> PathBuf {
        self.root
            .join(format!("{}.{}", file_stem(key), FILE_EXTENSION))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key);
        write_atomic(&path, value.as_bytes())?;
        debug!(path = %path.display(), bytes = value.len(), "stored value");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.key_path(key);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

/// Escape marker for bytes outside the portable file-name alphabet.
const ESCAPE: char = '~';

/// Maps a key to a file stem without collisions.
///
/// Lowercase ASCII letters, digits, `-` and `_` are kept; every other byte
/// (uppercase letters included) becomes `~` followed by two lowercase hex
/// digits, so distinct keys always get distinct files.
fn file_stem(key: &str) -> String {
    if key.is_empty() {
        return ESCAPE.to_string();
    }
    let mut stem = String::with_capacity(key.len());
    for byte in key.bytes() {
        match byte {
            b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' => stem.push(char::from(byte)),
            _ => {
                stem.push(ESCAPE);
                stem.push_str(&format!("{byte:02x}"));
            }
        }
    }
    stem
}
