//! Resource operations behind the HTTP routes.
//!
//! Each resource borrows the store for one request and takes the caller's
//! identity as an explicit argument (`None` for anonymous callers), so every
//! operation can be exercised without HTTP. Mutations pass through the
//! ownership policy in `yatube_auth` before the store is touched.

pub mod comment;
pub mod follow;
pub mod group;
pub mod post;

pub use comment::CommentResource;
pub use follow::FollowResource;
pub use group::GroupResource;
pub use post::{PostPage, PostResource};

#[cfg(test)]
pub(crate) mod testing {
    use yatube_auth::Identity;
    use yatube_blog::Username;
    use yatube_infra::{BlogStore, InMemoryBlogStore};

    pub async fn identity(store: &InMemoryBlogStore, name: &str) -> Identity {
        let user = store
            .ensure_user(&Username::parse(name).unwrap())
            .await
            .unwrap();
        Identity::from(user)
    }
}
