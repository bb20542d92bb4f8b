//! ensindex-storage — registry persistence backends for ENSIndex.
//!
//! Backends:
//! - [`MemoryRegistryStore`]: in-memory (tests and dry runs, re-exported from core)
//! - [`file`]: a single JSON snapshot, replaced atomically on every save
//! - [`sqlite`]: SQLite via `sqlx` (feature `sqlite`)

pub mod file;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use ensindex_core::store::{MemoryRegistryStore, RegistryStore};
pub use file::{JsonFileStore, RegistrySnapshot};

/// Store name used when none is given.
pub const DEFAULT_STORE_NAME: &str = "registration_logs_dict";

/// Directory that holds named stores.
pub const DEFAULT_STORE_DIR: &str = "obj";
