//! Persistent Cache Module
//!
//! SQLite-backed store for upstream payloads. Every row records when it was
//! fetched and its own TTL; staleness is computed at read time and never
//! stored.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::cache::entry::current_timestamp_secs;
use crate::error::StorageError;

/// Default persistent TTL in seconds, used when a save omits its TTL.
pub const DEFAULT_PERSISTENT_TTL: u64 = 600;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS cache_entries (
        cache_key TEXT PRIMARY KEY,
        endpoint TEXT,
        payload TEXT NOT NULL,
        fetched_at INTEGER NOT NULL,
        ttl_seconds INTEGER NOT NULL
    )
";

// == Persisted Entry ==
/// A row read back from the store, with its staleness at read time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersistedEntry {
    pub payload: Value,
    /// Unix seconds of the successful upstream fetch
    pub fetched_at: i64,
    pub ttl_seconds: u64,
    /// `now - fetched_at > ttl_seconds` at the time of the read
    pub stale: bool,
}

// == Persistent Cache ==
/// Durable key-payload store surviving process restarts.
///
/// One connection is shared behind a mutex and every operation is a single
/// statement, so a write is atomic per key and readers never observe a
/// partial row.
pub struct PersistentCache {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
    default_ttl: u64,
}

impl PersistentCache {
    // == Constructors ==
    /// Opens (or creates) the database at `path` and ensures the schema.
    ///
    /// Missing parent directories are created.
    pub fn open(path: impl AsRef<Path>, default_ttl: u64) -> Result<Self, StorageError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        let mode: String = conn.query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))?;
        debug!("Persistent cache opened at {} (journal_mode={})", path.display(), mode);

        Self::init(conn, Some(path.to_path_buf()), default_ttl)
    }

    /// Opens a private in-memory database. Contents are lost on drop.
    pub fn open_in_memory(default_ttl: u64) -> Result<Self, StorageError> {
        Self::init(Connection::open_in_memory()?, None, default_ttl)
    }

    fn init(conn: Connection, path: Option<PathBuf>, default_ttl: u64) -> Result<Self, StorageError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path,
            default_ttl,
        })
    }

    // == Save ==
    /// Serializes `payload` and upserts it under `key`.
    ///
    /// `ttl_seconds` falls back to the store's default when `None`. Errors
    /// are returned as-is; nothing is retried.
    pub fn save<T: Serialize + ?Sized>(
        &self,
        key: &str,
        payload: &T,
        ttl_seconds: Option<u64>,
        endpoint: Option<&str>,
    ) -> Result<(), StorageError> {
        self.save_at(key, payload, ttl_seconds, endpoint, current_timestamp_secs())
    }

    pub(crate) fn save_at<T: Serialize + ?Sized>(
        &self,
        key: &str,
        payload: &T,
        ttl_seconds: Option<u64>,
        endpoint: Option<&str>,
        now: i64,
    ) -> Result<(), StorageError> {
        let encoded = serde_json::to_string(payload)?;
        let ttl = i64::try_from(ttl_seconds.unwrap_or(self.default_ttl)).unwrap_or(i64::MAX);

        let conn = self.conn.lock();
        conn.execute(
            "INSERT OR REPLACE INTO cache_entries
             (cache_key, endpoint, payload, fetched_at, ttl_seconds)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![key, endpoint, encoded, now, ttl],
        )?;
        Ok(())
    }

    // == Get ==
    /// Reads the entry stored under `key`.
    ///
    /// Returns `None` when no row exists, or when the row is stale and
    /// `allow_stale` is false.
    pub fn get(&self, key: &str, allow_stale: bool) -> Result<Option<PersistedEntry>, StorageError> {
        self.get_at(key, allow_stale, current_timestamp_secs())
    }

    pub(crate) fn get_at(
        &self,
        key: &str,
        allow_stale: bool,
        now: i64,
    ) -> Result<Option<PersistedEntry>, StorageError> {
        let row = {
            let conn = self.conn.lock();
            conn.query_row(
                "SELECT payload, fetched_at, ttl_seconds
                 FROM cache_entries
                 WHERE cache_key = ?1",
                params![key],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, i64>(2)?,
                    ))
                },
            )
            .optional()?
        };

        let Some((encoded, fetched_at, ttl_seconds)) = row else {
            return Ok(None);
        };

        let stale = now - fetched_at > ttl_seconds;
        if stale && !allow_stale {
            return Ok(None);
        }

        Ok(Some(PersistedEntry {
            payload: serde_json::from_str(&encoded)?,
            fetched_at,
            ttl_seconds: u64::try_from(ttl_seconds).unwrap_or(0),
            stale,
        }))
    }

    // == Length ==
    /// Number of stored rows, fresh or stale.
    pub fn len(&self) -> Result<usize, StorageError> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM cache_entries", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    pub fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len()? == 0)
    }
}

impl std::fmt::Debug for PersistentCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistentCache")
            .field("path", &self.path)
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}
