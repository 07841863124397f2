use super::backend::{entry_bytes, StorageBackend};
use crate::error::{PrdError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Filesystem backend: one file per key inside a data directory.
///
/// ```text
/// <root>/
/// ├── prd-documents          # documents collection (JSON)
/// ├── prd-current-document   # current document id
/// ├── prd-preferences        # preferences (JSON)
/// └── prd-collapse-states    # collapse states (JSON)
/// ```
///
/// Dotfiles are ignored, so in-flight temp files never show up as keys.
/// Neither do files whose names could not be keys (`notes for later.txt`).
pub struct FsBackend {
    root: PathBuf,
    capacity: u64,
}

impl FsBackend {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            capacity: super::DEFAULT_CAPACITY,
        }
    }

    pub fn with_capacity(mut self, capacity: u64) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn key_path(&self, key: &str) -> Result<PathBuf> {
        if !is_valid_key(key) {
            return Err(PrdError::Store(format!("Invalid storage key: {}", key)));
        }
        Ok(self.root.join(key))
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(PrdError::Io)?;
        }
        Ok(())
    }

    fn used_bytes_except(&self, skip: &str) -> Result<u64> {
        let mut used = 0;
        for key in self.keys()? {
            if key == skip {
                continue;
            }
            if let Some(value) = self.get(&key)? {
                used += entry_bytes(&key, &value);
            }
        }
        Ok(used)
    }
}

fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

impl StorageBackend for FsBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key)?;
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path).map_err(PrdError::Io)?;
        Ok(Some(content))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let target_path = self.key_path(key)?;

        let needed = entry_bytes(key, value);
        let available = self.capacity.saturating_sub(self.used_bytes_except(key)?);
        if needed > available {
            return Err(PrdError::QuotaExceeded { needed, available });
        }

        self.ensure_dir()?;

        // Atomic Write
        let tmp_path = self.root.join(format!(".{}-{}.tmp", key, Uuid::new_v4()));
        fs::write(&tmp_path, value).map_err(PrdError::Io)?;
        if let Err(e) = fs::rename(&tmp_path, target_path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(PrdError::Io(e));
        }

        tracing::debug!(key, bytes = needed, "stored");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.key_path(key)?;
        if path.exists() {
            fs::remove_file(path).map_err(PrdError::Io)?;
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.root).map_err(PrdError::Io)? {
            let entry = entry.map_err(PrdError::Io)?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|s| s.to_str()) {
                if is_valid_key(name) {
                    keys.push(name.to_string());
                }
            }
        }
        Ok(keys)
    }

    fn capacity(&self) -> u64 {
        self.capacity
    }
}
