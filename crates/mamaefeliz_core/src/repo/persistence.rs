//! Key-value persistence capability consumed by the forum store.
//!
//! # Responsibility
//! - Define the get/put-by-key contract for structured text slots.
//! - Provide an in-memory implementation for tests and ephemeral sessions.
//!
//! # Invariants
//! - Every successful `put` bumps the slot revision by exactly one.
//! - `put` is conditional: callers state the revision they read, and a
//!   mismatch is reported as `Conflict` without writing.

use crate::db::DbError;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Mutex;

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Slot revision counter; the first write of a slot produces revision 1.
pub type Revision = u64;

/// Text payload of one slot plus the revision it was read at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredValue {
    pub text: String,
    pub revision: Revision,
}

/// Storage-medium failures.
#[derive(Debug)]
pub enum PersistenceError {
    /// The slot changed since the caller read it.
    Conflict {
        key: String,
        expected: Option<Revision>,
        actual: Option<Revision>,
    },
    Db(DbError),
    /// The medium refused the operation (quota, poisoned lock, I/O).
    Unavailable(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
}

impl Display for PersistenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Conflict {
                key,
                expected,
                actual,
            } => write!(
                f,
                "slot `{key}` changed concurrently (expected revision {}, found {})",
                revision_label(*expected),
                revision_label(*actual)
            ),
            Self::Db(err) => write!(f, "{err}"),
            Self::Unavailable(message) => write!(f, "storage unavailable: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it with `open_db`"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
        }
    }
}

impl Error for PersistenceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for PersistenceError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for PersistenceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Injectable persistence capability.
///
/// Implementations store opaque structured text under string keys.
pub trait PersistenceProvider {
    /// Reads one slot; `None` when it was never written.
    fn get(&self, key: &str) -> PersistenceResult<Option<StoredValue>>;

    /// Writes one slot when its current revision equals `expected`.
    ///
    /// `expected = None` means the slot must not exist yet. Returns the new
    /// revision.
    fn put(&self, key: &str, text: &str, expected: Option<Revision>)
        -> PersistenceResult<Revision>;
}

impl<P: PersistenceProvider + ?Sized> PersistenceProvider for &P {
    fn get(&self, key: &str) -> PersistenceResult<Option<StoredValue>> {
        (**self).get(key)
    }

    fn put(
        &self,
        key: &str,
        text: &str,
        expected: Option<Revision>,
    ) -> PersistenceResult<Revision> {
        (**self).put(key, text, expected)
    }
}

/// Process-local provider backed by a mutex-guarded map.
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    slots: Mutex<HashMap<String, StoredValue>>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersistenceProvider for MemoryPersistence {
    fn get(&self, key: &str) -> PersistenceResult<Option<StoredValue>> {
        let slots = self
            .slots
            .lock()
            .map_err(|_| PersistenceError::Unavailable("memory slots lock poisoned".into()))?;
        Ok(slots.get(key).cloned())
    }

    fn put(
        &self,
        key: &str,
        text: &str,
        expected: Option<Revision>,
    ) -> PersistenceResult<Revision> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|_| PersistenceError::Unavailable("memory slots lock poisoned".into()))?;
        let actual = slots.get(key).map(|slot| slot.revision);
        if actual != expected {
            return Err(PersistenceError::Conflict {
                key: key.to_string(),
                expected,
                actual,
            });
        }

        let revision = actual.map_or(1, |current| current + 1);
        slots.insert(
            key.to_string(),
            StoredValue {
                text: text.to_string(),
                revision,
            },
        );
        Ok(revision)
    }
}

fn revision_label(revision: Option<Revision>) -> String {
    revision.map_or_else(|| "none".to_string(), |value| value.to_string())
}
