//! SQLite-backed key-value store.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections for durable storage.
//! - Apply schema migrations before the store is used.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - No application data is read or written before migrations succeed.

use crate::store::{KeyValueStore, StoreError, StoreResult};
use log::{error, info};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: "CREATE TABLE kv_entries (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );",
}];

/// Latest schema version known by this binary.
pub fn latest_schema_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Durable store over a single SQLite connection.
///
/// The connection is serialized behind a mutex so one store instance can be
/// shared (via `Arc`) between the embedder thread, the ticker thread and the
/// remote-delivery thread.
pub struct SqliteKeyValueStore {
    conn: Mutex<Connection>,
}

impl SqliteKeyValueStore {
    /// Opens a store file, creating and migrating it as needed.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let started_at = Instant::now();
        info!("event=store_open module=store status=start mode=file");
        match Connection::open(path).map_err(StoreError::from) {
            Ok(mut conn) => match bootstrap_connection(&mut conn) {
                Ok(()) => {
                    info!(
                        "event=store_open module=store status=ok mode=file duration_ms={}",
                        started_at.elapsed().as_millis()
                    );
                    Ok(Self {
                        conn: Mutex::new(conn),
                    })
                }
                Err(err) => {
                    error!(
                        "event=store_open module=store status=error mode=file error={err}"
                    );
                    Err(err)
                }
            },
            Err(err) => {
                error!("event=store_open module=store status=error mode=file error={err}");
                Err(err)
            }
        }
    }

    /// Opens an in-memory store, useful for tests and throwaway sessions.
    pub fn open_in_memory() -> StoreResult<Self> {
        info!("event=store_open module=store status=start mode=memory");
        let mut conn = Connection::open_in_memory()?;
        bootstrap_connection(&mut conn)?;
        info!("event=store_open module=store status=ok mode=memory");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Current `PRAGMA user_version` of the backing database.
    pub fn schema_version(&self) -> StoreResult<u32> {
        let conn = self.conn.lock().expect("store connection mutex poisoned");
        current_user_version(&conn)
    }
}

impl KeyValueStore for SqliteKeyValueStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let conn = self.conn.lock().expect("store connection mutex poisoned");
        let value = conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let conn = self.conn.lock().expect("store connection mutex poisoned");
        conn.execute(
            "INSERT INTO kv_entries (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value;",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let conn = self.conn.lock().expect("store connection mutex poisoned");
        conn.execute("DELETE FROM kv_entries WHERE key = ?1;", params![key])?;
        Ok(())
    }
}

fn bootstrap_connection(conn: &mut Connection) -> StoreResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_secs(5))?;
    apply_migrations(conn)
}

fn apply_migrations(conn: &mut Connection) -> StoreResult<()> {
    let current_version = current_user_version(conn)?;
    let latest = latest_schema_version();

    if current_version > latest {
        return Err(StoreError::UnsupportedSchemaVersion {
            db_version: current_version,
            latest_supported: latest,
        });
    }

    if current_version == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in MIGRATIONS {
        if migration.version > current_version {
            tx.execute_batch(migration.sql)?;
        }
    }
    tx.pragma_update(None, "user_version", latest)?;
    tx.commit()?;

    info!(
        "event=store_migrate module=store status=ok from_version={current_version} to_version={latest}"
    );
    Ok(())
}

fn current_user_version(conn: &Connection) -> StoreResult<u32> {
    let version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    Ok(version)
}
