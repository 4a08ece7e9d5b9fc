use axum::{
    Router,
    routing::{MethodRouter, get},
};

pub mod comments;
pub mod common;
pub mod follow;
pub mod groups;
pub mod posts;
pub mod system;

/// Prefix all resource routes are nested under.
pub const API_PREFIX: &str = "/api/v1";

/// Router for all resource endpoints (relative to [`API_PREFIX`]).
///
/// Every path answers with and without a trailing slash.
pub fn router() -> Router {
    let routes: [(&str, MethodRouter); 7] = [
        ("/groups", get(groups::list_groups)),
        ("/groups/:id", get(groups::retrieve_group)),
        ("/posts", get(posts::list_posts).post(posts::create_post)),
        (
            "/posts/:id",
            get(posts::retrieve_post)
                .put(posts::replace_post)
                .patch(posts::patch_post)
                .delete(posts::delete_post),
        ),
        (
            "/posts/:post_id/comments",
            get(comments::list_comments).post(comments::create_comment),
        ),
        (
            "/posts/:post_id/comments/:id",
            get(comments::retrieve_comment)
                .put(comments::replace_comment)
                .patch(comments::patch_comment)
                .delete(comments::delete_comment),
        ),
        ("/follow", get(follow::list_follows).post(follow::create_follow)),
    ];

    routes
        .into_iter()
        .fold(Router::new(), |router, (path, method_router)| {
            router
                .route(path, method_router.clone())
                .route(&format!("{path}/"), method_router)
        })
}
