use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path},
};

use yatube_core::GroupId;

use crate::app::errors::ApiResult;
use crate::app::routes::common::parse_id;
use crate::app::{dto, services::AppServices};

pub async fn list_groups(
    Extension(services): Extension<Arc<AppServices>>,
) -> ApiResult<Json<serde_json::Value>> {
    let groups = services
        .groups()
        .list()
        .await?
        .into_iter()
        .map(dto::group_to_json)
        .collect::<Vec<_>>();
    Ok(Json(serde_json::Value::Array(groups)))
}

pub async fn retrieve_group(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let id: GroupId = parse_id(&id, "group")?;
    let group = services.groups().retrieve(id).await?;
    Ok(Json(dto::group_to_json(group)))
}
