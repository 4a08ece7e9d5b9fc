use yatube_auth::{Identity, require_authenticated};
use yatube_blog::{Follow, FollowInput};
use yatube_core::FieldErrors;
use yatube_infra::{BlogStore, SearchTerms, StoreError};

use crate::app::errors::{ApiError, ApiResult};

/// Follow relationships of the current identity. Authentication is required
/// for reads as well as writes.
pub struct FollowResource<'a> {
    store: &'a dyn BlogStore,
}

impl<'a> FollowResource<'a> {
    pub fn new(store: &'a dyn BlogStore) -> Self {
        Self { store }
    }

    /// Rows where `identity` is the follower, narrowed by `search`.
    pub async fn list(&self, identity: Option<&Identity>, search: Option<&str>) -> ApiResult<Vec<Follow>> {
        let identity = require_authenticated(identity)?;
        let terms = SearchTerms::parse(search);
        Ok(self.store.list_follows(identity.username(), &terms).await?)
    }

    pub async fn create(&self, identity: Option<&Identity>, input: FollowInput) -> ApiResult<Follow> {
        let identity = require_authenticated(identity)?;
        let new = input.into_new_follow(identity.username().clone())?;
        let target = new.following.clone();

        let follow = self.store.insert_follow(new).await.map_err(|e| match e {
            StoreError::Conflict(_) => ApiError::validation(
                FieldErrors::NON_FIELD,
                "You are already following this user.",
            ),
            StoreError::MissingReference { field: "following" } => ApiError::validation(
                "following",
                format!("Object with username={target} does not exist."),
            ),
            other => other.into(),
        })?;
        tracing::info!(user = %follow.user, following = %follow.following, "follow created");
        Ok(follow)
    }
}
