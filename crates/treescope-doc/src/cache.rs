use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};
use treescope_core::TreeNode;

use crate::DocumentError;

/// Well-known key of the most recently loaded tree.
pub const LAST_TREE_KEY: &str = "mcts-last-tree";

/// File-backed key/value store for convenience state such as the last loaded tree.
///
/// Entries are JSON files named after their key. The cache is never a source of
/// truth: an absent or unreadable entry loads as `None`.
#[derive(Debug, Clone)]
pub struct TreeCache {
    dir: PathBuf,
}

impl TreeCache {
    /// Use `dir` as the backing directory, creating it if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, DocumentError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(TreeCache { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn store<T: Serialize>(&self, key: &str, value: &T) -> Result<(), DocumentError> {
        let path = self.entry_path(key)?;
        fs::write(&path, serde_json::to_vec(value)?)?;
        debug!(key, "cache entry stored");
        Ok(())
    }

    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, DocumentError> {
        let path = self.entry_path(key)?;
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        match serde_json::from_slice(&bytes) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                warn!(key, error = %err, "ignoring unreadable cache entry");
                Ok(None)
            }
        }
    }

    /// Remove an entry. Returns whether it existed.
    pub fn remove(&self, key: &str) -> Result<bool, DocumentError> {
        let path = self.entry_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    pub fn store_last_tree(&self, tree: &TreeNode) -> Result<(), DocumentError> {
        self.store(LAST_TREE_KEY, tree)
    }

    pub fn load_last_tree(&self) -> Result<Option<TreeNode>, DocumentError> {
        self.load(LAST_TREE_KEY)
    }

    pub fn clear_last_tree(&self) -> Result<bool, DocumentError> {
        self.remove(LAST_TREE_KEY)
    }

    fn entry_path(&self, key: &str) -> Result<PathBuf, DocumentError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(DocumentError::InvalidCacheKey {
                key: key.to_string(),
            });
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}
