//! File-backed suffix registry
//!
//! The registry file is a JSON object with a single well-known key:
//!
//! ```json
//! { "usedInvoiceSuffixes": ["000123", "584120"] }
//! ```
//!
//! It is read once in [`FileSuffixRegistry::open`] and rewritten in full on
//! every [`persist`](SuffixRegistry::persist) through a temp file and rename,
//! so a crash mid-write leaves the previous version intact.

use crate::core::error::StorageError;
use crate::core::number::Suffix;
use crate::core::service::SuffixRegistry;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Key the suffix list is stored under
pub const REGISTRY_KEY: &str = "usedInvoiceSuffixes";

#[derive(Debug, Default, Serialize, Deserialize)]
struct RegistryFile {
    #[serde(rename = "usedInvoiceSuffixes", default)]
    used: Vec<Suffix>,
}

/// Suffix registry persisted to a JSON file
#[derive(Debug)]
pub struct FileSuffixRegistry {
    path: PathBuf,
    suffixes: HashSet<Suffix>,
}

impl FileSuffixRegistry {
    /// Load the registry at `path`. A missing file is an empty registry.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();

        let suffixes = match std::fs::read_to_string(&path) {
            Ok(content) => {
                let file: RegistryFile =
                    serde_json::from_str(&content).map_err(|e| StorageError::Serialization {
                        message: format!("{}: {}", path.display(), e),
                    })?;
                file.used.into_iter().collect()
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashSet::new(),
            Err(e) => {
                return Err(StorageError::io(
                    format!("failed to read {}", path.display()),
                    e,
                ));
            }
        };

        tracing::debug!(path = %path.display(), issued = suffixes.len(), "loaded suffix registry");

        Ok(Self { path, suffixes })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SuffixRegistry for FileSuffixRegistry {
    fn contains(&self, suffix: Suffix) -> bool {
        self.suffixes.contains(&suffix)
    }

    fn len(&self) -> usize {
        self.suffixes.len()
    }

    fn insert(&mut self, suffix: Suffix) -> bool {
        self.suffixes.insert(suffix)
    }

    fn persist(&self) -> Result<(), StorageError> {
        let mut used: Vec<Suffix> = self.suffixes.iter().copied().collect();
        used.sort_unstable();

        let bytes = serde_json::to_vec(&RegistryFile { used }).map_err(|e| {
            StorageError::Serialization {
                message: e.to_string(),
            }
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                StorageError::io(format!("failed to create {}", parent.display()), e)
            })?;
        }

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, bytes)
            .map_err(|e| StorageError::io(format!("failed to write {}", tmp.display()), e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| {
            StorageError::io(format!("failed to replace {}", self.path.display()), e)
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let registry = FileSuffixRegistry::open(dir.path().join("registry.json")).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_persist_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("registry.json");

        let mut registry = FileSuffixRegistry::open(&path).unwrap();
        registry.insert(Suffix::new(123).unwrap());
        registry.insert(Suffix::new(999_999).unwrap());
        registry.persist().unwrap();

        let reopened = FileSuffixRegistry::open(&path).unwrap();
        assert_eq!(reopened.len(), 2);
        assert!(reopened.contains(Suffix::new(123).unwrap()));
        assert!(reopened.contains(Suffix::new(999_999).unwrap()));
    }

    #[test]
    fn test_file_format_uses_well_known_key() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("registry.json");

        let mut registry = FileSuffixRegistry::open(&path).unwrap();
        registry.insert(Suffix::new(42).unwrap());
        registry.persist().unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw[REGISTRY_KEY], serde_json::json!(["000042"]));
    }

    #[test]
    fn test_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("registry.json");

        let mut registry = FileSuffixRegistry::open(&path).unwrap();
        registry.insert(Suffix::new(1).unwrap());
        registry.persist().unwrap();

        assert!(path.exists());
    }

    #[test]
    fn test_corrupt_file_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("registry.json");
        std::fs::write(&path, "not json").unwrap();

        let err = FileSuffixRegistry::open(&path).unwrap_err();
        assert!(matches!(err, StorageError::Serialization { .. }));
    }
}
