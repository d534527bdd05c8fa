//! Forum post domain model.
//!
//! # Responsibility
//! - Define the canonical post/comment records shared by store and UI layers.
//! - Provide moderation and engagement helpers that keep invariants local.
//!
//! # Invariants
//! - `likes` only grows, by exactly one per like.
//! - `comments` is append-only; insertion order is display order.
//! - `is_reported` is terminal: once set it is never cleared.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Stable identifier of a forum post.
///
/// Seeded posts keep their short legacy ids (`"1"`, `"2"`, ...); new posts
/// use time-ordered UUIDv7 strings.
pub type PostId = String;

/// Identifier of a comment, unique within its parent post.
pub type CommentId = String;

/// Forum topic category.
///
/// Wire values are the short Portuguese slugs the mobile client stores.
/// Slugs this build does not know are kept verbatim in `Unknown` so that
/// rewriting the collection never alters them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PostCategory {
    Food,
    Sleep,
    Health,
    Behavior,
    Other,
    /// Persisted slug outside the known set; displayed as `Other`.
    Unknown(String),
}

impl PostCategory {
    pub const ALL: [PostCategory; 5] = [
        Self::Food,
        Self::Sleep,
        Self::Health,
        Self::Behavior,
        Self::Other,
    ];

    /// Stable wire slug.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Food => "alimentacao",
            Self::Sleep => "sono",
            Self::Health => "saude",
            Self::Behavior => "comportamento",
            Self::Other => "outros",
            Self::Unknown(slug) => slug.as_str(),
        }
    }

    /// User-facing label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Food => "Alimentação",
            Self::Sleep => "Sono",
            Self::Health => "Saúde",
            Self::Behavior => "Comportamento",
            Self::Other | Self::Unknown(_) => "Outros",
        }
    }

    /// Maps a persisted slug, keeping unrecognized values as `Unknown`.
    pub fn from_wire(slug: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == slug)
            .unwrap_or_else(|| Self::Unknown(slug.to_string()))
    }
}

impl Display for PostCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses user input; only the known categories are accepted.
impl FromStr for PostCategory {
    type Err = PostValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == normalized)
            .ok_or(PostValidationError::UnknownCategory(normalized))
    }
}

impl Serialize for PostCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PostCategory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let slug = String::deserialize(deserializer)?;
        Ok(Self::from_wire(&slug))
    }
}

/// Moderation state of a post.
///
/// The only transition is `Visible -> Reported`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModerationStatus {
    Visible,
    Reported,
}

/// Validation failures for user-submitted forum content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostValidationError {
    EmptyTitle,
    EmptyContent,
    EmptyCommentText,
    UnknownCategory(String),
}

impl Display for PostValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "post title cannot be empty"),
            Self::EmptyContent => write!(f, "post content cannot be empty"),
            Self::EmptyCommentText => write!(f, "comment text cannot be empty"),
            Self::UnknownCategory(value) => write!(f, "unknown post category `{value}`"),
        }
    }
}

impl Error for PostValidationError {}

/// Reply attached to exactly one post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub author: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    /// Marks replies from verified moms or invited experts.
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_expert: bool,
}

impl Comment {
    /// Creates a comment stamped with the current time and a fresh id.
    pub fn new(author: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: next_id(),
            author: author.into(),
            text: text.into(),
            timestamp: Utc::now(),
            is_expert: false,
        }
    }
}

/// Top-level forum topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub category: PostCategory,
    pub author: String,
    pub timestamp: DateTime<Utc>,
    pub likes: u64,
    #[serde(default)]
    pub comments: Vec<Comment>,
    /// Absent on the wire means "not reported".
    #[serde(default)]
    pub is_reported: bool,
}

impl Post {
    /// Creates a new, unreported post with a generated id and no engagement.
    ///
    /// # Errors
    /// - `EmptyTitle` / `EmptyContent` when the trimmed value is empty.
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        category: PostCategory,
        author: impl Into<String>,
    ) -> Result<Self, PostValidationError> {
        let post = Self {
            id: next_id(),
            title: title.into(),
            content: content.into(),
            category,
            author: author.into(),
            timestamp: Utc::now(),
            likes: 0,
            comments: Vec::new(),
            is_reported: false,
        };
        post.validate()?;
        Ok(post)
    }

    /// Checks the fields a user can leave blank.
    pub fn validate(&self) -> Result<(), PostValidationError> {
        if self.title.trim().is_empty() {
            return Err(PostValidationError::EmptyTitle);
        }
        if self.content.trim().is_empty() {
            return Err(PostValidationError::EmptyContent);
        }
        Ok(())
    }

    pub fn like(&mut self) {
        self.likes = self.likes.saturating_add(1);
    }

    /// Appends a comment, re-keying it if its id already exists in this post.
    pub fn push_comment(&mut self, mut comment: Comment) {
        while self.comments.iter().any(|existing| existing.id == comment.id) {
            comment.id = next_id();
        }
        self.comments.push(comment);
    }

    /// Flags the post for moderation.
    ///
    /// Returns `false` when the post was already reported.
    pub fn report(&mut self) -> bool {
        let changed = !self.is_reported;
        self.is_reported = true;
        changed
    }

    pub fn moderation_status(&self) -> ModerationStatus {
        if self.is_reported {
            ModerationStatus::Reported
        } else {
            ModerationStatus::Visible
        }
    }

    /// Returns whether browsing views may show this post.
    pub fn is_visible(&self) -> bool {
        self.moderation_status() == ModerationStatus::Visible
    }
}

fn next_id() -> String {
    Uuid::now_v7().to_string()
}

fn is_false(value: &bool) -> bool {
    !*value
}
