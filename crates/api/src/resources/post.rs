use yatube_auth::{Identity, require_authenticated, require_owner};
use yatube_blog::{Post, PostInput};
use yatube_core::PostId;
use yatube_infra::{BlogStore, Window};

use crate::app::errors::{ApiError, ApiResult};

/// One limit/offset page of posts plus the total they were cut from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostPage {
    pub count: u64,
    pub window: Window,
    pub results: Vec<Post>,
}

/// Posts: public reads, authenticated creates, author-only updates/deletes.
pub struct PostResource<'a> {
    store: &'a dyn BlogStore,
}

impl<'a> PostResource<'a> {
    pub fn new(store: &'a dyn BlogStore) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> ApiResult<Vec<Post>> {
        Ok(self.store.list_posts(None).await?)
    }

    pub async fn list_page(&self, window: Window) -> ApiResult<PostPage> {
        let count = self.store.count_posts().await?;
        let results = self.store.list_posts(Some(window)).await?;
        Ok(PostPage {
            count,
            window,
            results,
        })
    }

    pub async fn retrieve(&self, id: PostId) -> ApiResult<Post> {
        self.store
            .get_post(id)
            .await?
            .ok_or(ApiError::NotFound("post"))
    }

    /// Create a post authored by `identity`, whatever the payload claims.
    pub async fn create(&self, identity: Option<&Identity>, input: PostInput) -> ApiResult<Post> {
        let identity = require_authenticated(identity)?;
        let new = input.into_new_post(identity.username().clone())?;
        let post = self.store.insert_post(new).await?;
        tracing::info!(post_id = %post.id, author = %post.author, "post created");
        Ok(post)
    }

    /// Full (`partial = false`) or partial update by the post's author.
    pub async fn update(
        &self,
        identity: Option<&Identity>,
        id: PostId,
        input: PostInput,
        partial: bool,
    ) -> ApiResult<Post> {
        require_authenticated(identity)?;
        let mut post = self.retrieve(id).await?;
        require_owner(identity, &post)?;

        post.apply(input.into_changes(partial)?);
        let post = self.store.update_post(&post).await?;
        tracing::info!(post_id = %post.id, partial, "post updated");
        Ok(post)
    }

    pub async fn delete(&self, identity: Option<&Identity>, id: PostId) -> ApiResult<()> {
        require_authenticated(identity)?;
        let post = self.retrieve(id).await?;
        require_owner(identity, &post)?;

        self.store.delete_post(id).await?;
        tracing::info!(post_id = %id, "post deleted");
        Ok(())
    }
}
