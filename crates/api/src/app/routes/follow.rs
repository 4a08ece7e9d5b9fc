use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Query, rejection::JsonRejection},
    http::StatusCode,
};

use yatube_blog::FollowInput;

use crate::app::errors::ApiResult;
use crate::app::{dto, services::AppServices};
use crate::context::RequestIdentity;

pub async fn list_follows(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<RequestIdentity>,
    Query(query): Query<dto::SearchQuery>,
) -> ApiResult<Json<serde_json::Value>> {
    let follows = services
        .follows()
        .list(identity.identity(), query.search.as_deref())
        .await?
        .into_iter()
        .map(dto::follow_to_json)
        .collect();
    Ok(Json(serde_json::Value::Array(follows)))
}

pub async fn create_follow(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<RequestIdentity>,
    payload: Result<Json<FollowInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    let Json(input) = payload?;
    let follow = services.follows().create(identity.identity(), input).await?;
    Ok((StatusCode::CREATED, Json(dto::follow_to_json(follow))))
}
