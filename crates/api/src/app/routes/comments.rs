use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
};

use yatube_blog::CommentInput;
use yatube_core::{CommentId, PostId};

use crate::app::errors::ApiResult;
use crate::app::routes::common::parse_id;
use crate::app::{dto, services::AppServices};
use crate::context::RequestIdentity;

fn parse_ids(post_id: &str, id: &str) -> ApiResult<(PostId, CommentId)> {
    Ok((parse_id(post_id, "post")?, parse_id(id, "comment")?))
}

pub async fn list_comments(
    Extension(services): Extension<Arc<AppServices>>,
    Path(post_id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let post_id: PostId = parse_id(&post_id, "post")?;
    let comments = services
        .comments()
        .list(post_id)
        .await?
        .into_iter()
        .map(dto::comment_to_json)
        .collect();
    Ok(Json(serde_json::Value::Array(comments)))
}

pub async fn create_comment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<RequestIdentity>,
    Path(post_id): Path<String>,
    payload: Result<Json<CommentInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    let post_id: PostId = parse_id(&post_id, "post")?;
    let Json(input) = payload?;
    let comment = services
        .comments()
        .create(identity.identity(), post_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(dto::comment_to_json(comment))))
}

pub async fn retrieve_comment(
    Extension(services): Extension<Arc<AppServices>>,
    Path((post_id, id)): Path<(String, String)>,
) -> ApiResult<Json<serde_json::Value>> {
    let (post_id, id) = parse_ids(&post_id, &id)?;
    let comment = services.comments().retrieve(post_id, id).await?;
    Ok(Json(dto::comment_to_json(comment)))
}

pub async fn replace_comment(
    services: Extension<Arc<AppServices>>,
    identity: Extension<RequestIdentity>,
    path: Path<(String, String)>,
    payload: Result<Json<CommentInput>, JsonRejection>,
) -> ApiResult<Json<serde_json::Value>> {
    update_comment(services, identity, path, payload, false).await
}

pub async fn patch_comment(
    services: Extension<Arc<AppServices>>,
    identity: Extension<RequestIdentity>,
    path: Path<(String, String)>,
    payload: Result<Json<CommentInput>, JsonRejection>,
) -> ApiResult<Json<serde_json::Value>> {
    update_comment(services, identity, path, payload, true).await
}

async fn update_comment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<RequestIdentity>,
    Path((post_id, id)): Path<(String, String)>,
    payload: Result<Json<CommentInput>, JsonRejection>,
    partial: bool,
) -> ApiResult<Json<serde_json::Value>> {
    let (post_id, id) = parse_ids(&post_id, &id)?;
    let Json(input) = payload?;
    let comment = services
        .comments()
        .update(identity.identity(), post_id, id, input, partial)
        .await?;
    Ok(Json(dto::comment_to_json(comment)))
}

pub async fn delete_comment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<RequestIdentity>,
    Path((post_id, id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let (post_id, id) = parse_ids(&post_id, &id)?;
    services
        .comments()
        .delete(identity.identity(), post_id, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
