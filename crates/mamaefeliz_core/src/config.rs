//! Runtime configuration for core services.
//!
//! Values are plain structs with defaults; callers override fields directly.

/// Storage slot holding the serialized forum collection.
pub const DEFAULT_FORUM_STORAGE_KEY: &str = "mamaefeliz_forum_posts";
/// Attempts per mutation before a write conflict is surfaced.
pub const DEFAULT_MAX_WRITE_ATTEMPTS: u32 = 5;
pub const DEFAULT_ASSISTANT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_ASSISTANT_TEMPERATURE: f32 = 0.7;

/// Forum store configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub storage_key: String,
    /// Clamped to at least 1 by the store.
    pub max_write_attempts: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_FORUM_STORAGE_KEY.to_string(),
            max_write_attempts: DEFAULT_MAX_WRITE_ATTEMPTS,
        }
    }
}

/// Generative-AI call parameters forwarded to the client.
#[derive(Debug, Clone, PartialEq)]
pub struct AssistantConfig {
    pub model: String,
    /// Balance between creative and factual answers.
    pub temperature: f32,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_ASSISTANT_MODEL.to_string(),
            temperature: DEFAULT_ASSISTANT_TEMPERATURE,
        }
    }
}
