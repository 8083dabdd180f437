//! Persistent string-keyed storage boundary.
//!
//! # Responsibility
//! - Define the `KeyValueStore` contract every manager persists through.
//! - Name the storage keys whose serialized shapes are a compatibility
//!   contract with existing installations.
//!
//! # Invariants
//! - Values round-trip byte-for-byte: `get` after `set` returns the exact
//!   stored string.
//! - A missing key reads as `None`, never as an error.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

mod memory;
mod sqlite;

pub use memory::MemoryKeyValueStore;
pub use sqlite::{latest_schema_version, SqliteKeyValueStore};

/// JSON array of tasks.
pub const TASKS_KEY: &str = "pomodoroTasks";
/// Completed-task counter, stored as a decimal string.
pub const TASKS_COMPLETED_KEY: &str = "pomodoroTasksCompleted";
/// JSON array of notes.
pub const NOTES_KEY: &str = "pomodoroNotesList";
/// JSON timer snapshot; written by the sync bridge only, never read back by
/// the timer.
pub const TIMER_STATE_KEY: &str = "pomodoroTimerState";

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage-layer failure.
#[derive(Debug)]
pub enum StoreError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "store schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Durable string-keyed storage used by every manager.
///
/// Implementations must be callable from the ticker and remote-delivery
/// threads, hence the `Send + Sync` bound.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
    fn remove(&self, key: &str) -> StoreResult<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        (**self).remove(key)
    }
}

/// Shared handle to one store instance, safe to hand to every manager.
pub type SharedStore = Arc<dyn KeyValueStore>;
