//! File-backed memoization
//!
//! Decoded files are cached per path and reused while the file's modification
//! time and length are unchanged. Any change on disk triggers a reload on the
//! next lookup.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::SystemTime;

use tracing::debug;

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fingerprint {
    modified: SystemTime,
    len: u64,
}

impl Fingerprint {
    fn of(path: &Path) -> Result<Self> {
        let metadata = fs::metadata(path)?;
        Ok(Self {
            modified: metadata.modified()?,
            len: metadata.len(),
        })
    }
}

struct Entry<T> {
    fingerprint: Fingerprint,
    value: Arc<T>,
}

/// Cache of values decoded from files, keyed by path + modification time
pub struct FileCache<T> {
    entries: RwLock<HashMap<PathBuf, Entry<T>>>,
}

impl<T> Default for FileCache<T> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<T> FileCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached value for `path`, or `load(path)` if the file changed since
    /// the last load.
    ///
    /// Load errors are returned and nothing is cached for them.
    pub fn get_or_load<F>(&self, path: &Path, load: F) -> Result<Arc<T>>
    where
        F: FnOnce(&Path) -> Result<T>,
    {
        let fingerprint = Fingerprint::of(path)?;

        {
            let entries = self.entries.read().map_err(|_| poisoned())?;
            if let Some(entry) = entries.get(path) {
                if entry.fingerprint == fingerprint {
                    return Ok(Arc::clone(&entry.value));
                }
            }
        }

        debug!("Loading {} (cache miss)", path.display());
        let value = Arc::new(load(path)?);
        self.entries.write().map_err(|_| poisoned())?.insert(
            path.to_path_buf(),
            Entry {
                fingerprint,
                value: Arc::clone(&value),
            },
        );
        Ok(value)
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> Error {
    Error::Internal("file cache lock poisoned".to_string())
}
