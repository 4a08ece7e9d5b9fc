//! Comments: author-owned replies attached to exactly one post.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use yatube_core::{CommentId, DomainResult, Entity, FieldErrors, PostId};

use crate::{Authored, Username};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub author: Username,
    pub post: PostId,
    pub text: String,
    pub created: DateTime<Utc>,
}

impl Comment {
    pub fn apply(&mut self, changes: CommentChanges) {
        if let Some(text) = changes.text {
            self.text = text;
        }
    }
}

impl Entity for Comment {
    type Id = CommentId;
    const KIND: &'static str = "comment";

    fn id(&self) -> CommentId {
        self.id
    }
}

impl Authored for Comment {
    fn author(&self) -> &Username {
        &self.author
    }
}

/// Client-writable comment fields. `author` and `post` are never read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CommentInput {
    #[serde(default)]
    pub text: Option<String>,
}

impl CommentInput {
    pub fn into_changes(self, partial: bool) -> DomainResult<CommentChanges> {
        let mut errors = FieldErrors::new();
        match &self.text {
            None if !partial => errors.add("text", crate::REQUIRED),
            Some(text) if text.trim().is_empty() => errors.add("text", crate::BLANK),
            _ => {}
        }
        errors.into_result()?;
        Ok(CommentChanges { text: self.text })
    }

    /// Validate for creation under the resolved parent post.
    pub fn into_new_comment(self, author: Username, post: PostId) -> DomainResult<NewComment> {
        let changes = self.into_changes(false)?;
        Ok(NewComment {
            author,
            post,
            text: changes.text.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentChanges {
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub author: Username,
    pub post: PostId,
    pub text: String,
}

impl NewComment {
    pub fn into_comment(self, id: CommentId, created: DateTime<Utc>) -> Comment {
        Comment {
            id,
            author: self.author,
            post: self.post,
            text: self.text,
            created,
        }
    }
}
