/// Durable cache of version lists, keyed by place. Entries survive process
/// restarts; the reconciler treats the store as the source of truth between
/// runs.
use crate::types::{CacheEntry, PlaceId, VersionRecord};
use parking_lot::{Mutex, RwLock};
use rusqlite::{Connection, params};
use std::collections::HashMap;
use std::path::Path;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("stored version list is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
}

pub trait VersionStore: Send + Sync {
    fn get(&self, place_id: PlaceId) -> Result<Option<CacheEntry>, StoreError>;

    /// Replaces the entry for `place_id` atomically. Readers never observe a
    /// half-written entry.
    fn put(
        &self,
        place_id: PlaceId,
        versions: &[VersionRecord],
        updated_at: u64,
    ) -> Result<(), StoreError>;

    fn list_all(&self) -> Result<HashMap<PlaceId, CacheEntry>, StoreError>;

    /// No-op when the entry is absent.
    fn remove(&self, place_id: PlaceId) -> Result<(), StoreError>;
}

/// SQLite-backed store. Version lists are stored as an opaque JSON blob next
/// to their refresh timestamp; the single-statement upsert gives per-key
/// atomicity.
pub struct SqliteVersionStore {
    conn: Mutex<Connection>,
}

impl SqliteVersionStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS versions (
                place INTEGER PRIMARY KEY,
                versions TEXT NOT NULL,
                updatedAt INTEGER NOT NULL
            )",
        )?;

        Ok(SqliteVersionStore {
            conn: Mutex::new(conn),
        })
    }
}

impl VersionStore for SqliteVersionStore {
    fn get(&self, place_id: PlaceId) -> Result<Option<CacheEntry>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT versions, updatedAt FROM versions WHERE place = ?1")?;
        let mut rows = stmt.query(params![place_id as i64])?;

        match rows.next()? {
            Some(row) => {
                let blob: String = row.get(0)?;
                let updated_at: i64 = row.get(1)?;
                Ok(Some(CacheEntry {
                    versions: serde_json::from_str(&blob)?,
                    updated_at: updated_at as u64,
                }))
            }
            None => Ok(None),
        }
    }

    fn put(
        &self,
        place_id: PlaceId,
        versions: &[VersionRecord],
        updated_at: u64,
    ) -> Result<(), StoreError> {
        let blob = serde_json::to_string(versions)?;

        self.conn.lock().execute(
            "INSERT INTO versions (place, versions, updatedAt) VALUES (?1, ?2, ?3)
             ON CONFLICT(place) DO UPDATE SET
                versions = excluded.versions,
                updatedAt = excluded.updatedAt",
            params![place_id as i64, blob, updated_at as i64],
        )?;

        Ok(())
    }

    fn list_all(&self) -> Result<HashMap<PlaceId, CacheEntry>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT place, versions, updatedAt FROM versions")?;
        let mut rows = stmt.query([])?;

        let mut entries = HashMap::new();
        while let Some(row) = rows.next()? {
            let place: i64 = row.get(0)?;
            let blob: String = row.get(1)?;
            let updated_at: i64 = row.get(2)?;

            entries.insert(
                place as PlaceId,
                CacheEntry {
                    versions: serde_json::from_str(&blob)?,
                    updated_at: updated_at as u64,
                },
            );
        }

        Ok(entries)
    }

    fn remove(&self, place_id: PlaceId) -> Result<(), StoreError> {
        self.conn
            .lock()
            .execute("DELETE FROM versions WHERE place = ?1", params![place_id as i64])?;
        Ok(())
    }
}

/// In-memory store for tests and callers that do not need durability.
#[derive(Default)]
pub struct MemoryVersionStore {
    entries: RwLock<HashMap<PlaceId, CacheEntry>>,
}

impl MemoryVersionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VersionStore for MemoryVersionStore {
    fn get(&self, place_id: PlaceId) -> Result<Option<CacheEntry>, StoreError> {
        Ok(self.entries.read().get(&place_id).cloned())
    }

    fn put(
        &self,
        place_id: PlaceId,
        versions: &[VersionRecord],
        updated_at: u64,
    ) -> Result<(), StoreError> {
        self.entries.write().insert(
            place_id,
            CacheEntry {
                versions: versions.to_vec(),
                updated_at,
            },
        );
        Ok(())
    }

    fn list_all(&self) -> Result<HashMap<PlaceId, CacheEntry>, StoreError> {
        Ok(self.entries.read().clone())
    }

    fn remove(&self, place_id: PlaceId) -> Result<(), StoreError> {
        self.entries.write().remove(&place_id);
        Ok(())
    }
}
