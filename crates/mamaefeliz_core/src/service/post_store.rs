//! Forum post store.
//!
//! # Responsibility
//! - Own the persisted forum collection behind one storage slot.
//! - Provide create/list/comment/like/report use-cases.
//! - Seed example posts the first time an environment has no forum state.
//!
//! # Invariants
//! - Every mutation is a whole-collection read-modify-write, committed
//!   before the call returns.
//! - Writes are revision-checked; a concurrent writer forces a re-read and
//!   re-apply instead of a lost update.
//! - Unknown post ids never rewrite storage and are reported as `NotFound`.
//! - Posts are never physically deleted.

use crate::config::StoreConfig;
use crate::model::post::{Comment, Post, PostCategory, PostValidationError};
use crate::model::seed::seed_posts;
use crate::repo::persistence::{PersistenceError, PersistenceProvider, Revision};
use chrono::Utc;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Forum store error.
#[derive(Debug)]
pub enum StoreError {
    Validation(PostValidationError),
    Storage(PersistenceError),
    /// Persisted text could not be decoded into posts.
    CorruptedState(String),
    /// Every attempt lost a revision race.
    Conflict { attempts: u32 },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "{err}"),
            Self::CorruptedState(message) => write!(f, "corrupted forum state: {message}"),
            Self::Conflict { attempts } => write!(
                f,
                "forum state kept changing concurrently; gave up after {attempts} attempt(s)"
            ),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::CorruptedState(_) | Self::Conflict { .. } => None,
        }
    }
}

impl From<PostValidationError> for StoreError {
    fn from(value: PostValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<PersistenceError> for StoreError {
    fn from(value: PersistenceError) -> Self {
        Self::Storage(value)
    }
}

/// Result of a mutation addressed to one post id.
///
/// Both variants carry the collection as it is after the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    Updated(Vec<Post>),
    /// No post had the requested id; storage was left untouched.
    NotFound(Vec<Post>),
}

impl MutationOutcome {
    pub fn is_updated(&self) -> bool {
        matches!(self, Self::Updated(_))
    }

    pub fn posts(&self) -> &[Post] {
        match self {
            Self::Updated(posts) | Self::NotFound(posts) => posts,
        }
    }

    pub fn into_posts(self) -> Vec<Post> {
        match self {
            Self::Updated(posts) | Self::NotFound(posts) => posts,
        }
    }
}

/// Browse filter for display layers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostListQuery {
    pub category: Option<PostCategory>,
    pub include_reported: bool,
}

/// Applies a browse filter and sorts newest first.
pub fn filter_posts(posts: &[Post], query: &PostListQuery) -> Vec<Post> {
    let mut selected: Vec<Post> = posts
        .iter()
        .filter(|post| query.include_reported || post.is_visible())
        .filter(|post| {
            query
                .category
                .as_ref()
                .map_or(true, |category| &post.category == category)
        })
        .cloned()
        .collect();
    selected.sort_by(|left, right| right.timestamp.cmp(&left.timestamp));
    selected
}

struct Snapshot {
    posts: Vec<Post>,
    revision: Revision,
}

/// Forum store over an injected persistence capability.
pub struct PostStore<P: PersistenceProvider> {
    provider: P,
    config: StoreConfig,
}

impl<P: PersistenceProvider> PostStore<P> {
    /// Creates a store using the default storage slot.
    pub fn new(provider: P) -> Self {
        Self::with_config(provider, StoreConfig::default())
    }

    pub fn with_config(provider: P, config: StoreConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Returns every stored post, reported ones included.
    ///
    /// Seeds and persists the example posts when the slot is empty.
    pub fn list_posts(&self) -> StoreResult<Vec<Post>> {
        Ok(self.load()?.posts)
    }

    /// Returns posts matching a browse filter, newest first.
    pub fn browse(&self, query: &PostListQuery) -> StoreResult<Vec<Post>> {
        Ok(filter_posts(&self.list_posts()?, query))
    }

    /// Gets one post by id, reported or not.
    pub fn find_post(&self, post_id: &str) -> StoreResult<Option<Post>> {
        Ok(self
            .list_posts()?
            .into_iter()
            .find(|post| post.id == post_id))
    }

    /// Creates and persists a new post at the head of the collection.
    ///
    /// # Errors
    /// - `Validation` when title or content is blank.
    pub fn create_post(
        &self,
        title: impl Into<String>,
        content: impl Into<String>,
        category: PostCategory,
        author: impl Into<String>,
    ) -> StoreResult<Post> {
        let post = Post::new(title, content, category, author)?;
        self.mutate("create_post", |posts| {
            posts.insert(0, post.clone());
            true
        })?;
        info!(
            "event=forum_post_create module=forum status=ok category={}",
            post.category
        );
        Ok(post)
    }

    /// Appends a comment to a post.
    ///
    /// # Errors
    /// - `Validation` when the comment text is blank.
    pub fn add_comment(
        &self,
        post_id: &str,
        text: impl Into<String>,
        author: impl Into<String>,
    ) -> StoreResult<MutationOutcome> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(PostValidationError::EmptyCommentText.into());
        }
        let comment = Comment::new(author, text);
        self.mutate("add_comment", |posts| {
            with_post(posts, post_id, |post| {
                post.push_comment(comment.clone());
            })
        })
    }

    /// Adds exactly one like to a post.
    pub fn like_post(&self, post_id: &str) -> StoreResult<MutationOutcome> {
        self.mutate("like_post", |posts| with_post(posts, post_id, Post::like))
    }

    /// Hides a post from browsing; reporting twice changes nothing.
    pub fn report_post(&self, post_id: &str) -> StoreResult<MutationOutcome> {
        self.mutate("report_post", |posts| {
            with_post(posts, post_id, |post| {
                if post.report() {
                    info!("event=forum_post_report module=forum status=ok");
                }
            })
        })
    }

    fn mutate(
        &self,
        operation: &'static str,
        mut apply: impl FnMut(&mut Vec<Post>) -> bool,
    ) -> StoreResult<MutationOutcome> {
        let attempts = self.config.max_write_attempts.max(1);
        for attempt in 1..=attempts {
            let Snapshot {
                mut posts,
                revision,
            } = self.load()?;
            if !apply(&mut posts) {
                info!("event=forum_write module=forum status=not_found op={operation}");
                return Ok(MutationOutcome::NotFound(posts));
            }

            match self.persist(&posts, Some(revision)) {
                Ok(_) => return Ok(MutationOutcome::Updated(posts)),
                Err(StoreError::Storage(PersistenceError::Conflict { .. })) => {
                    warn!(
                        "event=forum_write module=forum status=conflict op={operation} attempt={attempt}"
                    );
                }
                Err(err) => return Err(err),
            }
        }
        Err(StoreError::Conflict { attempts })
    }

    fn load(&self) -> StoreResult<Snapshot> {
        let key = self.config.storage_key.as_str();
        let attempts = self.config.max_write_attempts.max(1);
        for _ in 0..attempts {
            if let Some(stored) = self.provider.get(key)? {
                let posts = serde_json::from_str::<Vec<Post>>(&stored.text)
                    .map_err(|err| StoreError::CorruptedState(err.to_string()))?;
                return Ok(Snapshot {
                    posts,
                    revision: stored.revision,
                });
            }

            let posts = seed_posts(Utc::now());
            match self.persist(&posts, None) {
                Ok(revision) => {
                    info!(
                        "event=forum_seed module=forum status=ok posts={}",
                        posts.len()
                    );
                    return Ok(Snapshot { posts, revision });
                }
                // Another writer seeded first; read theirs.
                Err(StoreError::Storage(PersistenceError::Conflict { .. })) => continue,
                Err(err) => return Err(err),
            }
        }
        Err(StoreError::Conflict { attempts })
    }

    fn persist(&self, posts: &[Post], expected: Option<Revision>) -> StoreResult<Revision> {
        let text = serde_json::to_string(posts)
            .map_err(|err| StoreError::CorruptedState(err.to_string()))?;
        Ok(self
            .provider
            .put(&self.config.storage_key, &text, expected)?)
    }
}

fn with_post(posts: &mut [Post], post_id: &str, change: impl FnOnce(&mut Post)) -> bool {
    match posts.iter_mut().find(|post| post.id == post_id) {
        Some(post) => {
            change(post);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::{filter_posts, PostListQuery};
    use crate::model::post::PostCategory;
    use crate::model::seed::seed_posts;
    use chrono::Utc;

    #[test]
    fn filter_hides_reported_and_sorts_newest_first() {
        let mut posts = seed_posts(Utc::now());
        posts[1].report();

        let visible = filter_posts(&posts, &PostListQuery::default());
        let ids: Vec<&str> = visible.iter().map(|post| post.id.as_str()).collect();
        // Posts 1 and 3 share a timestamp; the sort is stable.
        assert_eq!(ids, vec!["1", "3"]);

        let all = filter_posts(
            &posts,
            &PostListQuery {
                include_reported: true,
                ..PostListQuery::default()
            },
        );
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].id, "2");
    }

    #[test]
    fn filter_by_category() {
        let posts = seed_posts(Utc::now());
        let query = PostListQuery {
            category: Some(PostCategory::Sleep),
            ..PostListQuery::default()
        };
        let selected = filter_posts(&posts, &query);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].id, "2");
    }
}
