use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path, Query, rejection::JsonRejection},
    http::StatusCode,
};

use yatube_blog::PostInput;
use yatube_core::PostId;

use crate::app::errors::ApiResult;
use crate::app::routes::{API_PREFIX, common::parse_id};
use crate::app::{dto, pagination, services::AppServices};
use crate::context::RequestIdentity;

pub async fn list_posts(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::PageQuery>,
) -> ApiResult<Json<serde_json::Value>> {
    let posts = services.posts();
    let body = match pagination::parse_window(&query, services.pagination()) {
        Some(window) => {
            let page = posts.list_page(window).await?;
            let results = page.results.into_iter().map(dto::post_to_json).collect();
            pagination::envelope(&format!("{API_PREFIX}/posts/"), page.window, page.count, results)
        }
        None => serde_json::Value::Array(
            posts
                .list()
                .await?
                .into_iter()
                .map(dto::post_to_json)
                .collect(),
        ),
    };
    Ok(Json(body))
}

pub async fn create_post(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<RequestIdentity>,
    payload: Result<Json<PostInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    let Json(input) = payload?;
    let post = services.posts().create(identity.identity(), input).await?;
    Ok((StatusCode::CREATED, Json(dto::post_to_json(post))))
}

pub async fn retrieve_post(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let id: PostId = parse_id(&id, "post")?;
    let post = services.posts().retrieve(id).await?;
    Ok(Json(dto::post_to_json(post)))
}

pub async fn replace_post(
    services: Extension<Arc<AppServices>>,
    identity: Extension<RequestIdentity>,
    path: Path<String>,
    payload: Result<Json<PostInput>, JsonRejection>,
) -> ApiResult<Json<serde_json::Value>> {
    update_post(services, identity, path, payload, false).await
}

pub async fn patch_post(
    services: Extension<Arc<AppServices>>,
    identity: Extension<RequestIdentity>,
    path: Path<String>,
    payload: Result<Json<PostInput>, JsonRejection>,
) -> ApiResult<Json<serde_json::Value>> {
    update_post(services, identity, path, payload, true).await
}

async fn update_post(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<RequestIdentity>,
    Path(id): Path<String>,
    payload: Result<Json<PostInput>, JsonRejection>,
    partial: bool,
) -> ApiResult<Json<serde_json::Value>> {
    let id: PostId = parse_id(&id, "post")?;
    let Json(input) = payload?;
    let post = services
        .posts()
        .update(identity.identity(), id, input, partial)
        .await?;
    Ok(Json(dto::post_to_json(post)))
}

pub async fn delete_post(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<RequestIdentity>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id: PostId = parse_id(&id, "post")?;
    services.posts().delete(identity.identity(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
