//! Domain model for the community forum and chat personalization.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep the persisted wire shape and the in-memory shape identical.
//!
//! # Invariants
//! - Every post is identified by a stable `PostId`.
//! - Moderation is a soft flag, never a physical delete.

pub mod post;
pub mod profile;
pub mod seed;
