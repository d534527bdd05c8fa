//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose forum and chat helpers to Dart via FRB.
//! - Keep error semantics simple: envelopes with `ok` and a message.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Timestamps cross the boundary as RFC 3339 strings.

use mamaefeliz_core::db::open_db;
use mamaefeliz_core::{
    build_prompt, core_version as core_version_inner, init_logging as init_logging_inner,
    ping as ping_inner, resolve_reply, tokenize_reply, Comment, MutationOutcome, Post,
    PostCategory, PostListQuery, PostStore, ReplySegment, SqlitePersistence, StoreResult,
    UserProfile, VideoCatalog,
};
use std::path::PathBuf;
use std::sync::OnceLock;

const FORUM_DB_FILE_NAME: &str = "mamaefeliz_forum.sqlite3";
static FORUM_DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Comment row for forum detail screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForumCommentItem {
    pub id: String,
    pub author: String,
    pub text: String,
    pub timestamp: String,
    pub is_expert: bool,
}

/// Post row for forum list and detail screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForumPostItem {
    pub id: String,
    pub title: String,
    pub content: String,
    /// Wire slug (`alimentacao|sono|saude|comportamento|outros`).
    pub category: String,
    pub category_label: String,
    pub author: String,
    pub timestamp: String,
    pub likes: u64,
    pub comments: Vec<ForumCommentItem>,
    pub is_reported: bool,
}

/// Response envelope for every forum call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForumResponse {
    pub ok: bool,
    /// `false` when the target post id does not exist.
    pub found: bool,
    pub posts: Vec<ForumPostItem>,
    pub message: String,
}

impl ForumResponse {
    fn listed(posts: Vec<Post>) -> Self {
        let message = format!("{} post(s).", posts.len());
        Self {
            ok: true,
            found: true,
            posts: posts.into_iter().map(to_post_item).collect(),
            message,
        }
    }

    fn from_outcome(outcome: MutationOutcome) -> Self {
        let found = outcome.is_updated();
        Self {
            ok: true,
            found,
            message: if found {
                "Updated.".to_string()
            } else {
                "Post not found.".to_string()
            },
            posts: outcome.into_posts().into_iter().map(to_post_item).collect(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            found: false,
            posts: Vec::new(),
            message: message.into(),
        }
    }
}

/// Lists posts for the forum screen.
///
/// `category = None` means all categories; reported posts are hidden unless
/// `include_reported` is set.
#[flutter_rust_bridge::frb(sync)]
pub fn forum_list_posts(category: Option<String>, include_reported: bool) -> ForumResponse {
    let category = match category.as_deref().map(str::parse::<PostCategory>).transpose() {
        Ok(category) => category,
        Err(err) => return ForumResponse::failure(format!("forum_list_posts failed: {err}")),
    };
    let query = PostListQuery {
        category,
        include_reported,
    };
    match with_post_store(|store| store.browse(&query)) {
        Ok(posts) => ForumResponse::listed(posts),
        Err(err) => ForumResponse::failure(format!("forum_list_posts failed: {err}")),
    }
}

/// Creates one post; the response carries only the created post.
#[flutter_rust_bridge::frb(sync)]
pub fn forum_create_post(
    title: String,
    content: String,
    category: String,
    author: String,
) -> ForumResponse {
    let category = match category.parse::<PostCategory>() {
        Ok(category) => category,
        Err(err) => return ForumResponse::failure(format!("forum_create_post failed: {err}")),
    };
    match with_post_store(|store| store.create_post(title, content, category, author)) {
        Ok(post) => ForumResponse {
            message: "Post created.".to_string(),
            ..ForumResponse::listed(vec![post])
        },
        Err(err) => ForumResponse::failure(format!("forum_create_post failed: {err}")),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn forum_add_comment(post_id: String, text: String, author: String) -> ForumResponse {
    match with_post_store(|store| store.add_comment(&post_id, text, author)) {
        Ok(outcome) => ForumResponse::from_outcome(outcome),
        Err(err) => ForumResponse::failure(format!("forum_add_comment failed: {err}")),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn forum_like_post(post_id: String) -> ForumResponse {
    match with_post_store(|store| store.like_post(&post_id)) {
        Ok(outcome) => ForumResponse::from_outcome(outcome),
        Err(err) => ForumResponse::failure(format!("forum_like_post failed: {err}")),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn forum_report_post(post_id: String) -> ForumResponse {
    match with_post_store(|store| store.report_post(&post_id)) {
        Ok(outcome) => ForumResponse::from_outcome(outcome),
        Err(err) => ForumResponse::failure(format!("forum_report_post failed: {err}")),
    }
}

/// Builds the prompt sent to the assistant, with optional profile context.
///
/// Profile context is added only when all three fields are provided.
#[flutter_rust_bridge::frb(sync)]
pub fn chat_build_prompt(
    text: String,
    mom_name: Option<String>,
    baby_name: Option<String>,
    baby_birth_date: Option<String>,
) -> String {
    let profile = match (mom_name, baby_name, baby_birth_date) {
        (Some(mom_name), Some(baby_name), Some(baby_birth_date)) => Some(UserProfile {
            mom_name,
            baby_name,
            baby_birth_date,
        }),
        _ => None,
    };
    build_prompt(&text, profile.as_ref())
}

/// Renderable piece of an assistant reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReplySegment {
    /// `text` or `video`.
    pub kind: String,
    /// Plain text for `text`; empty for `video`.
    pub text: String,
    pub video_id: Option<String>,
    pub video_title: Option<String>,
    pub video_duration: Option<String>,
    pub video_thumbnail_url: Option<String>,
    pub video_url: Option<String>,
    pub video_is_premium: bool,
}

/// Splits reply text into text runs and resolved video previews.
///
/// Unknown video ids render nothing.
#[flutter_rust_bridge::frb(sync)]
pub fn chat_parse_reply(text: String) -> Vec<ChatReplySegment> {
    let catalog = VideoCatalog::builtin();
    let tokens = tokenize_reply(&text);
    resolve_reply(&tokens, &catalog)
        .into_iter()
        .map(|segment| match segment {
            ReplySegment::Text(text) => ChatReplySegment {
                kind: "text".to_string(),
                text,
                video_id: None,
                video_title: None,
                video_duration: None,
                video_thumbnail_url: None,
                video_url: None,
                video_is_premium: false,
            },
            ReplySegment::Video(video) => ChatReplySegment {
                kind: "video".to_string(),
                text: String::new(),
                video_id: Some(video.id.clone()),
                video_title: Some(video.title.clone()),
                video_duration: Some(video.duration.clone()),
                video_thumbnail_url: Some(video.thumbnail_url.clone()),
                video_url: Some(video.video_url.clone()),
                video_is_premium: video.is_premium,
            },
        })
        .collect()
}

fn resolve_forum_db_path() -> PathBuf {
    FORUM_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("MAMAEFELIZ_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(FORUM_DB_FILE_NAME)
        })
        .clone()
}

fn with_post_store<T>(
    f: impl FnOnce(&PostStore<SqlitePersistence<'_>>) -> StoreResult<T>,
) -> Result<T, String> {
    let conn = open_db(resolve_forum_db_path())
        .map_err(|err| format!("forum DB open failed: {err}"))?;
    let provider = SqlitePersistence::try_new(&conn)
        .map_err(|err| format!("forum storage init failed: {err}"))?;
    let store = PostStore::new(provider);
    f(&store).map_err(|err| err.to_string())
}

fn to_post_item(post: Post) -> ForumPostItem {
    ForumPostItem {
        category: post.category.as_str().to_string(),
        category_label: post.category.label().to_string(),
        timestamp: post.timestamp.to_rfc3339(),
        comments: post.comments.into_iter().map(to_comment_item).collect(),
        id: post.id,
        title: post.title,
        content: post.content,
        author: post.author,
        likes: post.likes,
        is_reported: post.is_reported,
    }
}

fn to_comment_item(comment: Comment) -> ForumCommentItem {
    ForumCommentItem {
        timestamp: comment.timestamp.to_rfc3339(),
        id: comment.id,
        author: comment.author,
        text: comment.text,
        is_expert: comment.is_expert,
    }
}
