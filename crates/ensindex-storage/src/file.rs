//! JSON file backend.
//!
//! The registry is written as one JSON document:
//!
//! ```json
//! { "saved_at": 1700000000, "records": { "0xabc…": { "block_number": 1, … } } }
//! ```
//!
//! Each save writes a sibling `*.tmp` file and renames it over the target, so
//! a crash mid-save leaves the previous snapshot intact.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use ensindex_core::{ExtractorError, RegistrationMap, RegistryStore};

use crate::{DEFAULT_STORE_DIR, DEFAULT_STORE_NAME};

/// On-disk form of a saved registry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    /// Unix timestamp (seconds) of the save.
    pub saved_at: i64,
    pub records: RegistrationMap,
}

/// Registry store backed by a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<DEFAULT_STORE_DIR>/<name>.json`.
    pub fn named(name: &str) -> Self {
        Self::new(Path::new(DEFAULT_STORE_DIR).join(format!("{name}.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Load the full snapshot, including when it was saved.
    pub async fn load_snapshot(&self) -> Result<Option<RegistrySnapshot>, ExtractorError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(&self.path, e)),
        };
        let snapshot = serde_json::from_slice(&bytes).map_err(|e| {
            ExtractorError::Storage(format!("corrupt registry {}: {e}", self.path.display()))
        })?;
        Ok(Some(snapshot))
    }
}

impl Default for JsonFileStore {
    fn default() -> Self {
        Self::named(DEFAULT_STORE_NAME)
    }
}

fn io_error(path: &Path, e: std::io::Error) -> ExtractorError {
    ExtractorError::Storage(format!("{}: {e}", path.display()))
}

#[async_trait]
impl RegistryStore for JsonFileStore {
    async fn load(&self) -> Result<Option<RegistrationMap>, ExtractorError> {
        Ok(self.load_snapshot().await?.map(|s| s.records))
    }

    async fn save(&self, registry: &RegistrationMap) -> Result<(), ExtractorError> {
        let snapshot = RegistrySnapshot {
            saved_at: chrono::Utc::now().timestamp(),
            records: registry.clone(),
        };
        let bytes = serde_json::to_vec(&snapshot)
            .map_err(|e| ExtractorError::Storage(e.to_string()))?;

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| io_error(dir, e))?;
        }

        let tmp = self.tmp_path();
        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| io_error(&tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| io_error(&self.path, e))?;

        debug!(path = %self.path.display(), entries = registry.len(), "registry saved");
        Ok(())
    }

    async fn delete(&self) -> Result<(), ExtractorError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(&self.path, e)),
        }
    }
}
