//! Persistence capability and its implementations.
//!
//! # Responsibility
//! - Define the key-value contract the forum store is written against.
//! - Isolate SQLite details from store/business orchestration.
//!
//! # Invariants
//! - Writes are revision-checked; a stale writer gets `Conflict`, never a
//!   silent overwrite.

pub mod persistence;
pub mod sqlite_persistence;
