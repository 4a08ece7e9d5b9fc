use yatube_auth::{Identity, require_authenticated, require_owner};
use yatube_blog::{Comment, CommentInput, Post};
use yatube_core::{CommentId, PostId};
use yatube_infra::BlogStore;

use crate::app::errors::{ApiError, ApiResult};

/// Comments nested under a post taken from the request path.
///
/// The parent post is resolved first on every operation; a comment is only
/// ever visible or writable through the post it belongs to.
pub struct CommentResource<'a> {
    store: &'a dyn BlogStore,
}

impl<'a> CommentResource<'a> {
    pub fn new(store: &'a dyn BlogStore) -> Self {
        Self { store }
    }

    /// Resolve the parent post or fail with `NotFound`.
    pub async fn get_scope(&self, post_id: PostId) -> ApiResult<Post> {
        self.store
            .get_post(post_id)
            .await?
            .ok_or(ApiError::NotFound("post"))
    }

    pub async fn list(&self, post_id: PostId) -> ApiResult<Vec<Comment>> {
        let post = self.get_scope(post_id).await?;
        Ok(self.store.list_comments(post.id).await?)
    }

    pub async fn retrieve(&self, post_id: PostId, id: CommentId) -> ApiResult<Comment> {
        let post = self.get_scope(post_id).await?;
        self.find(&post, id).await
    }

    /// Create a comment on the path's post; payload `author`/`post` are ignored.
    pub async fn create(
        &self,
        identity: Option<&Identity>,
        post_id: PostId,
        input: CommentInput,
    ) -> ApiResult<Comment> {
        let identity = require_authenticated(identity)?;
        let post = self.get_scope(post_id).await?;

        let new = input.into_new_comment(identity.username().clone(), post.id)?;
        let comment = self.store.insert_comment(new).await?;
        tracing::info!(
            comment_id = %comment.id,
            post_id = %comment.post,
            author = %comment.author,
            "comment created"
        );
        Ok(comment)
    }

    pub async fn update(
        &self,
        identity: Option<&Identity>,
        post_id: PostId,
        id: CommentId,
        input: CommentInput,
        partial: bool,
    ) -> ApiResult<Comment> {
        require_authenticated(identity)?;
        let post = self.get_scope(post_id).await?;
        let mut comment = self.find(&post, id).await?;
        require_owner(identity, &comment)?;

        comment.apply(input.into_changes(partial)?);
        let comment = self.store.update_comment(&comment).await?;
        tracing::info!(comment_id = %comment.id, partial, "comment updated");
        Ok(comment)
    }

    pub async fn delete(
        &self,
        identity: Option<&Identity>,
        post_id: PostId,
        id: CommentId,
    ) -> ApiResult<()> {
        require_authenticated(identity)?;
        let post = self.get_scope(post_id).await?;
        let comment = self.find(&post, id).await?;
        require_owner(identity, &comment)?;

        self.store.delete_comment(comment.id).await?;
        tracing::info!(comment_id = %comment.id, "comment deleted");
        Ok(())
    }

    async fn find(&self, post: &Post, id: CommentId) -> ApiResult<Comment> {
        self.store
            .get_comment(post.id, id)
            .await?
            .ok_or(ApiError::NotFound("comment"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::testing::identity;
    use yatube_blog::NewPost;
    use yatube_infra::InMemoryBlogStore;

    async fn seed_post(store: &InMemoryBlogStore, author: &Identity) -> Post {
        store
            .insert_post(NewPost {
                author: author.username().clone(),
                text: "post".into(),
                group: None,
                image: None,
            })
            .await
            .unwrap()
    }

    fn input(json: serde_json::Value) -> CommentInput {
        serde_json::from_value(json).unwrap()
    }

    #[tokio::test]
    async fn create_binds_comment_to_path_post() {
        let store = InMemoryBlogStore::new();
        let alice = identity(&store, "alice").await;
        let post = seed_post(&store, &alice).await;
        let decoy = seed_post(&store, &alice).await;

        let comment = CommentResource::new(&store)
            .create(
                Some(&alice),
                post.id,
                input(serde_json::json!({"text": "nice", "post": decoy.id.get(), "author": "bob"})),
            )
            .await
            .unwrap();

        assert_eq!(comment.post, post.id);
        assert_eq!(comment.author, *alice.username());
        assert!(store.list_comments(decoy.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_post_scope_is_not_found() {
        let store = InMemoryBlogStore::new();
        let alice = identity(&store, "alice").await;
        let comments = CommentResource::new(&store);

        assert!(matches!(
            comments.list(PostId::new(9)).await,
            Err(ApiError::NotFound("post"))
        ));
        assert!(matches!(
            comments
                .create(Some(&alice), PostId::new(9), input(serde_json::json!({"text": "x"})))
                .await,
            Err(ApiError::NotFound("post"))
        ));
    }

    #[tokio::test]
    async fn comment_is_not_reachable_through_another_post() {
        let store = InMemoryBlogStore::new();
        let alice = identity(&store, "alice").await;
        let post = seed_post(&store, &alice).await;
        let other = seed_post(&store, &alice).await;
        let comments = CommentResource::new(&store);
        let comment = comments
            .create(Some(&alice), post.id, input(serde_json::json!({"text": "x"})))
            .await
            .unwrap();

        assert!(comments.retrieve(post.id, comment.id).await.is_ok());
        assert!(matches!(
            comments.retrieve(other.id, comment.id).await,
            Err(ApiError::NotFound("comment"))
        ));
        assert!(matches!(
            comments.delete(Some(&alice), other.id, comment.id).await,
            Err(ApiError::NotFound("comment"))
        ));
    }

    #[tokio::test]
    async fn ownership_policy_applies_to_comments() {
        let store = InMemoryBlogStore::new();
        let alice = identity(&store, "alice").await;
        let bob = identity(&store, "bob").await;
        let post = seed_post(&store, &alice).await;
        let comments = CommentResource::new(&store);
        let comment = comments
            .create(Some(&bob), post.id, input(serde_json::json!({"text": "by bob"})))
            .await
            .unwrap();

        // The post's author does not own comments under it.
        assert!(matches!(
            comments
                .update(Some(&alice), post.id, comment.id, input(serde_json::json!({"text": "x"})), true)
                .await,
            Err(ApiError::PermissionDenied(_))
        ));
        assert!(matches!(
            comments.delete(None, post.id, comment.id).await,
            Err(ApiError::PermissionDenied(_))
        ));

        let updated = comments
            .update(Some(&bob), post.id, comment.id, input(serde_json::json!({"text": "edited"})), false)
            .await
            .unwrap();
        assert_eq!(updated.text, "edited");

        comments.delete(Some(&bob), post.id, comment.id).await.unwrap();
        assert!(comments.list(post.id).await.unwrap().is_empty());
    }
}
