use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{KeyValueStore, StorageError, StorageResult};

/// One `<key>.json` file per key under a base directory.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    base_path: PathBuf,
}

impl DirectoryStore {
    /// Open a store rooted at `base_path`, creating the directory if needed.
    pub fn open(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path)?;
        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Keys are plain file stems; anything that could escape the base
    /// directory is rejected.
    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.base_path.join(format!("{key}.json")))
    }
}

impl KeyValueStore for DirectoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.key_to_path(key)?;
        match fs::read_to_string(path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.key_to_path(key)?;
        // Write then rename so a crash never leaves a half-written file.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        let path = self.key_to_path(key)?;
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
