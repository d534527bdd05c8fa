//! SQLite-backed persistence provider.
//!
//! # Responsibility
//! - Persist storage slots across sessions in the `storage_slots` table.
//! - Enforce revision checks inside SQL so separate connections cannot
//!   overwrite each other's writes.
//!
//! # Invariants
//! - The connection must come from `open_db`/`open_db_in_memory`.
//! - Read paths reject invalid persisted revisions instead of masking them.

use crate::db::migrations::{current_user_version, latest_version};
use crate::repo::persistence::{
    PersistenceError, PersistenceProvider, PersistenceResult, Revision, StoredValue,
};
use rusqlite::{params, Connection, OptionalExtension};

const SLOTS_TABLE: &str = "storage_slots";

/// Durable provider over a migrated SQLite connection.
pub struct SqlitePersistence<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePersistence<'conn> {
    /// Wraps a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when `user_version` is not the latest.
    /// - `MissingRequiredTable` when the slot table is absent.
    pub fn try_new(conn: &'conn Connection) -> PersistenceResult<Self> {
        let actual_version = current_user_version(conn)?;
        let expected_version = latest_version();
        if actual_version != expected_version {
            return Err(PersistenceError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }

        let has_table: bool = conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
            );",
            [SLOTS_TABLE],
            |row| row.get(0),
        )?;
        if !has_table {
            return Err(PersistenceError::MissingRequiredTable(SLOTS_TABLE));
        }

        Ok(Self { conn })
    }

    fn current_revision(&self, key: &str) -> PersistenceResult<Option<Revision>> {
        let revision = self
            .conn
            .query_row(
                "SELECT revision FROM storage_slots WHERE slot_key = ?1;",
                [key],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        revision.map(parse_revision).transpose()
    }
}

impl PersistenceProvider for SqlitePersistence<'_> {
    fn get(&self, key: &str) -> PersistenceResult<Option<StoredValue>> {
        let row = self
            .conn
            .query_row(
                "SELECT value, revision FROM storage_slots WHERE slot_key = ?1;",
                [key],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
            )
            .optional()?;

        match row {
            Some((text, revision)) => Ok(Some(StoredValue {
                text,
                revision: parse_revision(revision)?,
            })),
            None => Ok(None),
        }
    }

    fn put(
        &self,
        key: &str,
        text: &str,
        expected: Option<Revision>,
    ) -> PersistenceResult<Revision> {
        let changed = match expected {
            None => self.conn.execute(
                "INSERT INTO storage_slots (slot_key, value, revision)
                 VALUES (?1, ?2, 1)
                 ON CONFLICT(slot_key) DO NOTHING;",
                params![key, text],
            )?,
            Some(revision) => self.conn.execute(
                "UPDATE storage_slots
                 SET
                    value = ?1,
                    revision = revision + 1,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE slot_key = ?2 AND revision = ?3;",
                params![text, key, revision_to_db(revision)?],
            )?,
        };

        if changed == 0 {
            return Err(PersistenceError::Conflict {
                key: key.to_string(),
                expected,
                actual: self.current_revision(key)?,
            });
        }

        Ok(expected.map_or(1, |revision| revision + 1))
    }
}

fn parse_revision(value: i64) -> PersistenceResult<Revision> {
    u64::try_from(value)
        .ok()
        .filter(|revision| *revision >= 1)
        .ok_or_else(|| {
            PersistenceError::Unavailable(format!(
                "invalid revision `{value}` in storage_slots.revision"
            ))
        })
}

fn revision_to_db(revision: Revision) -> PersistenceResult<i64> {
    i64::try_from(revision).map_err(|_| {
        PersistenceError::Unavailable(format!("revision `{revision}` exceeds sqlite range"))
    })
}
