//! `yatube-blog`: blog domain records and payload validation.
//!
//! Records here are plain data. Ownership fields (`author`, `user`, `post`)
//! are never read from client input: every `*Input` type omits them, and the
//! `New*` types that carry them are built by the resource layer.

pub mod comment;
pub mod follow;
pub mod group;
pub mod post;
pub mod user;

mod serde_ext;

pub use comment::{Comment, CommentChanges, CommentInput, NewComment};
pub use follow::{Follow, FollowInput, NewFollow};
pub use group::{Group, NewGroup, Slug};
pub use post::{NewPost, Post, PostChanges, PostInput};
pub use user::{User, Username};

/// Records with a single owning author.
pub trait Authored {
    fn author(&self) -> &Username;
}

pub(crate) const REQUIRED: &str = "This field is required.";
pub(crate) const BLANK: &str = "This field may not be blank.";
