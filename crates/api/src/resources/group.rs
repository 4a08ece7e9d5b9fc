use yatube_blog::Group;
use yatube_core::GroupId;
use yatube_infra::BlogStore;

use crate::app::errors::{ApiError, ApiResult};

/// Read-only access to groups. Anyone may read; nobody writes through here.
pub struct GroupResource<'a> {
    store: &'a dyn BlogStore,
}

impl<'a> GroupResource<'a> {
    pub fn new(store: &'a dyn BlogStore) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> ApiResult<Vec<Group>> {
        Ok(self.store.list_groups().await?)
    }

    pub async fn retrieve(&self, id: GroupId) -> ApiResult<Group> {
        self.store
            .get_group(id)
            .await?
            .ok_or(ApiError::NotFound("group"))
    }
}
