//! Registry persistence.
//!
//! The whole [`RegistrationMap`] is written on every save; there is no
//! partial or streaming update format. On restart the extractor loads the
//! last saved map and skips every transaction already in it.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::ExtractorError;
use crate::registry::RegistrationMap;

/// Trait for loading and saving a registry.
///
/// Implementations include `MemoryRegistryStore`, `JsonFileStore`, and
/// `SqliteStorage`.
#[async_trait]
pub trait RegistryStore: Send + Sync {
    /// Load the persisted registry (`None` if nothing was saved yet).
    async fn load(&self) -> Result<Option<RegistrationMap>, ExtractorError>;

    /// Persist the full registry, replacing whatever was stored before.
    async fn save(&self, registry: &RegistrationMap) -> Result<(), ExtractorError>;

    /// Remove the persisted registry (e.g. when resetting).
    async fn delete(&self) -> Result<(), ExtractorError>;

    /// Load the persisted registry, or an empty one on first run.
    async fn load_or_default(&self) -> Result<RegistrationMap, ExtractorError> {
        Ok(self.load().await?.unwrap_or_default())
    }
}

// ─── In-memory store (for testing) ────────────────────────────────────────────

/// In-memory registry store for tests and dry runs.
#[derive(Default)]
pub struct MemoryRegistryStore {
    data: Mutex<Option<RegistrationMap>>,
    saves: AtomicUsize,
}

impl MemoryRegistryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an already-populated registry.
    pub fn with_registry(registry: RegistrationMap) -> Self {
        Self {
            data: Mutex::new(Some(registry)),
            saves: AtomicUsize::new(0),
        }
    }

    /// Number of `save` calls so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::Relaxed)
    }

    /// The most recently saved registry.
    pub fn snapshot(&self) -> Option<RegistrationMap> {
        self.data.lock().ok().and_then(|d| d.clone())
    }

    fn poisoned() -> ExtractorError {
        ExtractorError::Storage("memory store lock poisoned".into())
    }
}

#[async_trait]
impl RegistryStore for MemoryRegistryStore {
    async fn load(&self) -> Result<Option<RegistrationMap>, ExtractorError> {
        Ok(self.data.lock().map_err(|_| Self::poisoned())?.clone())
    }

    async fn save(&self, registry: &RegistrationMap) -> Result<(), ExtractorError> {
        *self.data.lock().map_err(|_| Self::poisoned())? = Some(registry.clone());
        self.saves.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn delete(&self) -> Result<(), ExtractorError> {
        *self.data.lock().map_err(|_| Self::poisoned())? = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::RegistrationRecord;
    use alloy_primitives::U256;

    fn one_entry() -> RegistrationMap {
        let mut map = RegistrationMap::new();
        map.insert(
            "0x01",
            RegistrationRecord {
                block_number: 1,
                owner: None,
                name: "a".into(),
                cost: U256::ZERO,
                expires: U256::ZERO,
            },
        );
        map
    }

    #[tokio::test]
    async fn memory_store_roundtrip() {
        let store = MemoryRegistryStore::new();

        // Nothing saved initially
        assert!(store.load().await.unwrap().is_none());
        assert!(store.load_or_default().await.unwrap().is_empty());

        store.save(&one_entry()).await.unwrap();
        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(store.save_count(), 1);

        store.delete().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn with_registry_preloads() {
        let store = MemoryRegistryStore::with_registry(one_entry());
        assert_eq!(store.load_or_default().await.unwrap().len(), 1);
        assert_eq!(store.save_count(), 0);
    }
}
