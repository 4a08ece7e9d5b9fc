//! Posts: author-owned text entries, optionally published into a group.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use yatube_core::{DomainResult, Entity, FieldErrors, GroupId, PostId};

use crate::{Authored, Username};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub author: Username,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub image: Option<String>,
    pub group: Option<GroupId>,
}

impl Post {
    /// Apply validated changes in place. Absent fields are left untouched.
    pub fn apply(&mut self, changes: PostChanges) {
        if let Some(text) = changes.text {
            self.text = text;
        }
        if let Some(group) = changes.group {
            self.group = group;
        }
        if let Some(image) = changes.image {
            self.image = image;
        }
    }
}

impl Entity for Post {
    type Id = PostId;
    const KIND: &'static str = "post";

    fn id(&self) -> PostId {
        self.id
    }
}

impl Authored for Post {
    fn author(&self) -> &Username {
        &self.author
    }
}

/// Client-writable post fields as they arrive on the wire.
///
/// `author`, `id` and `pub_date` are not part of this type; any such keys in
/// the payload are dropped during deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PostInput {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "crate::serde_ext::double_option")]
    pub group: Option<Option<GroupId>>,
    #[serde(default, deserialize_with = "crate::serde_ext::double_option")]
    pub image: Option<Option<String>>,
}

impl PostInput {
    /// Validate for an update. `partial` (PATCH) makes `text` optional.
    pub fn into_changes(self, partial: bool) -> DomainResult<PostChanges> {
        let mut errors = FieldErrors::new();
        match &self.text {
            None if !partial => errors.add("text", crate::REQUIRED),
            Some(text) if text.trim().is_empty() => errors.add("text", crate::BLANK),
            _ => {}
        }
        errors.into_result()?;

        Ok(PostChanges {
            text: self.text,
            group: self.group,
            image: self.image,
        })
    }

    /// Validate for creation and attach the server-side author.
    pub fn into_new_post(self, author: Username) -> DomainResult<NewPost> {
        let changes = self.into_changes(false)?;
        Ok(NewPost {
            author,
            text: changes.text.unwrap_or_default(),
            group: changes.group.flatten(),
            image: changes.image.flatten(),
        })
    }
}

/// Validated field updates for an existing post.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostChanges {
    pub text: Option<String>,
    pub group: Option<Option<GroupId>>,
    pub image: Option<Option<String>>,
}

/// A post ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub author: Username,
    pub text: String,
    pub group: Option<GroupId>,
    pub image: Option<String>,
}

impl NewPost {
    pub fn into_post(self, id: PostId, pub_date: DateTime<Utc>) -> Post {
        Post {
            id,
            author: self.author,
            text: self.text,
            pub_date,
            image: self.image,
            group: self.group,
        }
    }
}
