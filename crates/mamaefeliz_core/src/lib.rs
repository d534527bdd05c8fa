//! Core domain logic for Mamãe Feliz.
//! This crate is the single source of truth for forum invariants.

pub mod assistant;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use assistant::client::{
    build_prompt, build_system_instruction, AssistantClient, AssistantError, AssistantReply,
    AssistantRequest, AssistantService, EMPTY_REPLY_FALLBACK_MESSAGE, TECHNICAL_FALLBACK_MESSAGE,
};
pub use assistant::markers::{resolve_reply, tokenize_reply, ReplySegment, ReplyToken};
pub use assistant::video::{VideoCatalog, VideoResource};
pub use config::{AssistantConfig, StoreConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::post::{
    Comment, CommentId, ModerationStatus, Post, PostCategory, PostId, PostValidationError,
};
pub use model::profile::UserProfile;
pub use repo::persistence::{
    MemoryPersistence, PersistenceError, PersistenceProvider, PersistenceResult, Revision,
    StoredValue,
};
pub use repo::sqlite_persistence::SqlitePersistence;
pub use service::post_store::{
    filter_posts, MutationOutcome, PostListQuery, PostStore, StoreError, StoreResult,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
