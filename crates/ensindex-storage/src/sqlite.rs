//! SQLite storage backend for ENSIndex.
//!
//! One row per registration in `registrations`, plus a single-row
//! `registry_meta` table recording when the registry was last saved. The
//! meta row is what distinguishes "saved an empty registry" from "never
//! saved".
//!
//! # Usage
//! ```rust,no_run
//! use ensindex_storage::sqlite::SqliteStorage;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // File-backed (persistent)
//! let store = SqliteStorage::open("./registrations.db").await?;
//!
//! // In-memory (tests / ephemeral)
//! let store = SqliteStorage::in_memory().await?;
//! # Ok(())
//! # }
//! ```

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tracing::debug;

use ensindex_core::{ExtractorError, RegistrationMap, RegistrationRecord, RegistryStore};

fn storage_err(e: impl std::fmt::Display) -> ExtractorError {
    ExtractorError::Storage(e.to_string())
}

/// SQLite-backed registry store.
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Open (or create) a SQLite database at `path`.
    ///
    /// The path may be a plain file path (`"./registrations.db"`) or a full
    /// SQLite URL (`"sqlite:./registrations.db?mode=rwc"`).
    pub async fn open(path: &str) -> Result<Self, ExtractorError> {
        let url = if path.starts_with("sqlite:") {
            path.to_string()
        } else {
            format!("sqlite:{path}?mode=rwc")
        };

        let pool = SqlitePool::connect(&url).await.map_err(storage_err)?;

        let storage = Self { pool };
        storage.init_schema(true).await?;
        Ok(storage)
    }

    /// Open an in-memory SQLite database.
    ///
    /// Every pooled connection to `:memory:` is a separate database, so the
    /// pool is capped at one connection.
    pub async fn in_memory() -> Result<Self, ExtractorError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(storage_err)?;

        let storage = Self { pool };
        storage.init_schema(false).await?;
        Ok(storage)
    }

    async fn init_schema(&self, wal: bool) -> Result<(), ExtractorError> {
        if wal {
            sqlx::query("PRAGMA journal_mode=WAL;")
                .execute(&self.pool)
                .await
                .map_err(storage_err)?;
        }

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS registrations (
                tx_hash      TEXT    PRIMARY KEY,
                block_number INTEGER NOT NULL,
                owner        TEXT,
                name         TEXT    NOT NULL,
                cost         TEXT    NOT NULL,
                expires      TEXT    NOT NULL
            );",
        )
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS registry_meta (
                id       INTEGER PRIMARY KEY CHECK (id = 0),
                saved_at INTEGER NOT NULL
            );",
        )
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_registrations_block ON registrations (block_number);",
        )
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(())
    }

    /// Number of stored registrations.
    pub async fn record_count(&self) -> Result<u64, ExtractorError> {
        let row = sqlx::query("SELECT COUNT(*) as cnt FROM registrations")
            .fetch_one(&self.pool)
            .await
            .map_err(storage_err)?;

        let cnt: i64 = row.get("cnt");
        Ok(cnt as u64)
    }

    /// Unix timestamp of the last save, if any.
    pub async fn saved_at(&self) -> Result<Option<i64>, ExtractorError> {
        let row = sqlx::query("SELECT saved_at FROM registry_meta WHERE id = 0")
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?;

        Ok(row.map(|r| r.get::<i64, _>("saved_at")))
    }
}

fn record_from_row(row: &SqliteRow) -> Result<(String, RegistrationRecord), ExtractorError> {
    let owner = row
        .get::<Option<String>, _>("owner")
        .map(|s| s.parse::<Address>())
        .transpose()
        .map_err(|e| storage_err(format!("bad owner column: {e}")))?;
    let cost = row
        .get::<String, _>("cost")
        .parse::<U256>()
        .map_err(|e| storage_err(format!("bad cost column: {e}")))?;
    let expires = row
        .get::<String, _>("expires")
        .parse::<U256>()
        .map_err(|e| storage_err(format!("bad expires column: {e}")))?;

    Ok((
        row.get("tx_hash"),
        RegistrationRecord {
            block_number: row.get::<i64, _>("block_number") as u64,
            owner,
            name: row.get("name"),
            cost,
            expires,
        },
    ))
}

// ─── RegistryStore impl ──────────────────────────────────────────────────────

#[async_trait]
impl RegistryStore for SqliteStorage {
    async fn load(&self) -> Result<Option<RegistrationMap>, ExtractorError> {
        if self.saved_at().await?.is_none() {
            return Ok(None);
        }

        let rows = sqlx::query(
            "SELECT tx_hash, block_number, owner, name, cost, expires
             FROM registrations ORDER BY tx_hash",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        let mut registry = RegistrationMap::new();
        for row in &rows {
            let (key, record) = record_from_row(row)?;
            registry.insert(key, record);
        }
        Ok(Some(registry))
    }

    async fn save(&self, registry: &RegistrationMap) -> Result<(), ExtractorError> {
        let mut tx = self.pool.begin().await.map_err(storage_err)?;

        sqlx::query("DELETE FROM registrations")
            .execute(&mut *tx)
            .await
            .map_err(storage_err)?;

        for (key, record) in registry.iter() {
            sqlx::query(
                "INSERT INTO registrations (tx_hash, block_number, owner, name, cost, expires)
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(key)
            .bind(record.block_number as i64)
            .bind(record.owner.map(|a| a.to_string()))
            .bind(&record.name)
            .bind(record.cost.to_string())
            .bind(record.expires.to_string())
            .execute(&mut *tx)
            .await
            .map_err(storage_err)?;
        }

        sqlx::query("INSERT OR REPLACE INTO registry_meta (id, saved_at) VALUES (0, ?)")
            .bind(chrono::Utc::now().timestamp())
            .execute(&mut *tx)
            .await
            .map_err(storage_err)?;

        tx.commit().await.map_err(storage_err)?;

        debug!(entries = registry.len(), "registry saved");
        Ok(())
    }

    async fn delete(&self) -> Result<(), ExtractorError> {
        let mut tx = self.pool.begin().await.map_err(storage_err)?;
        sqlx::query("DELETE FROM registrations")
            .execute(&mut *tx)
            .await
            .map_err(storage_err)?;
        sqlx::query("DELETE FROM registry_meta")
            .execute(&mut *tx)
            .await
            .map_err(storage_err)?;
        tx.commit().await.map_err(storage_err)?;
        Ok(())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
