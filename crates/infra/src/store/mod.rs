//! Persistence boundary for the blog.
//!
//! The resource layer talks to storage only through [`BlogStore`]. Every
//! method is a single logical unit of work: implementations must apply each
//! mutation atomically (a lock scope in memory, a transaction in Postgres).

use async_trait::async_trait;
use thiserror::Error;

use yatube_blog::{
    Comment, Follow, Group, NewComment, NewFollow, NewGroup, NewPost, Post, User, Username,
};
use yatube_core::{CommentId, GroupId, PostId};

use crate::search::SearchTerms;

pub mod in_memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use in_memory::InMemoryBlogStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresBlogStore;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The record to update or delete no longer exists.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A unique constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A foreign reference named by the record does not exist.
    #[error("referenced {field} does not exist")]
    MissingReference { field: &'static str },

    /// The backing store failed (connection, lock poisoning, bad row).
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Limit/offset slice of an ordered listing.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Window {
    pub limit: u64,
    pub offset: u64,
}

#[async_trait]
pub trait BlogStore: Send + Sync {
    /// Register `username` on first sight and return the stored user.
    async fn ensure_user(&self, username: &Username) -> StoreResult<User>;
    async fn find_user(&self, username: &Username) -> StoreResult<Option<User>>;

    /// Administrative insert; groups have no HTTP write surface.
    async fn insert_group(&self, group: NewGroup) -> StoreResult<Group>;
    /// All groups ordered by id.
    async fn list_groups(&self) -> StoreResult<Vec<Group>>;
    async fn get_group(&self, id: GroupId) -> StoreResult<Option<Group>>;

    async fn count_posts(&self) -> StoreResult<u64>;
    /// Posts ordered by id, optionally sliced.
    async fn list_posts(&self, window: Option<Window>) -> StoreResult<Vec<Post>>;
    async fn get_post(&self, id: PostId) -> StoreResult<Option<Post>>;
    async fn insert_post(&self, post: NewPost) -> StoreResult<Post>;
    /// Persist the mutable fields (`text`, `group`, `image`) of `post`.
    async fn update_post(&self, post: &Post) -> StoreResult<Post>;
    /// Delete a post together with its comments.
    async fn delete_post(&self, id: PostId) -> StoreResult<()>;

    /// Comments of `post` ordered by id.
    async fn list_comments(&self, post: PostId) -> StoreResult<Vec<Comment>>;
    /// A comment only if it belongs to `post`.
    async fn get_comment(&self, post: PostId, id: CommentId) -> StoreResult<Option<Comment>>;
    async fn insert_comment(&self, comment: NewComment) -> StoreResult<Comment>;
    async fn update_comment(&self, comment: &Comment) -> StoreResult<Comment>;
    async fn delete_comment(&self, id: CommentId) -> StoreResult<()>;

    /// Follows where `user` is the follower, filtered by `search`, ordered by id.
    async fn list_follows(&self, user: &Username, search: &SearchTerms) -> StoreResult<Vec<Follow>>;
    /// Insert a follow. Duplicates are a `Conflict`; an unknown target is a
    /// `MissingReference { field: "following" }`.
    async fn insert_follow(&self, follow: NewFollow) -> StoreResult<Follow>;
}
