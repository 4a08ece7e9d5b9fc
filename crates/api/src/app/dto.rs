//! Query DTOs and JSON mapping of domain records.

use serde::Deserialize;

use yatube_blog::{Comment, Follow, Group, Post};

// -------------------------
// Query DTOs
// -------------------------

/// `?limit=&offset=` on list endpoints. Kept as raw strings so malformed values
/// fall back to defaults instead of rejecting the query.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn group_to_json(group: Group) -> serde_json::Value {
    serde_json::json!({
        "id": group.id,
        "title": group.title,
        "slug": group.slug.as_str(),
        "description": group.description,
    })
}

pub fn post_to_json(post: Post) -> serde_json::Value {
    serde_json::json!({
        "id": post.id,
        "author": post.author.as_str(),
        "text": post.text,
        "pub_date": post.pub_date.to_rfc3339(),
        "image": post.image,
        "group": post.group,
    })
}

pub fn comment_to_json(comment: Comment) -> serde_json::Value {
    serde_json::json!({
        "id": comment.id,
        "author": comment.author.as_str(),
        "text": comment.text,
        "created": comment.created.to_rfc3339(),
        "post": comment.post,
    })
}

pub fn follow_to_json(follow: Follow) -> serde_json::Value {
    serde_json::json!({
        "user": follow.user.as_str(),
        "following": follow.following.as_str(),
    })
}
