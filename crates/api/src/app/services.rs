//! Service wiring: which store backs the API, plus per-request resource handles.

use std::sync::Arc;

use yatube_infra::{BlogStore, InMemoryBlogStore};

use crate::config::{PaginationConfig, StorageConfig};
use crate::resources::{CommentResource, FollowResource, GroupResource, PostResource};

/// Shared application services, cloned into every request as an `Extension`.
pub struct AppServices {
    store: Arc<dyn BlogStore>,
    pagination: PaginationConfig,
}

impl AppServices {
    pub fn new(store: Arc<dyn BlogStore>, pagination: PaginationConfig) -> Self {
        Self { store, pagination }
    }

    pub fn store(&self) -> &Arc<dyn BlogStore> {
        &self.store
    }

    pub fn pagination(&self) -> PaginationConfig {
        self.pagination
    }

    pub fn groups(&self) -> GroupResource<'_> {
        GroupResource::new(self.store.as_ref())
    }

    pub fn posts(&self) -> PostResource<'_> {
        PostResource::new(self.store.as_ref())
    }

    pub fn comments(&self) -> CommentResource<'_> {
        CommentResource::new(self.store.as_ref())
    }

    pub fn follows(&self) -> FollowResource<'_> {
        FollowResource::new(self.store.as_ref())
    }
}

/// Pick the store implementation from configuration.
///
/// Persistent storage needs the `postgres` feature; without it the request
/// for persistence is logged and the in-memory store is used.
pub async fn build_store(storage: &StorageConfig) -> anyhow::Result<Arc<dyn BlogStore>> {
    if storage.persistent {
        #[cfg(feature = "postgres")]
        {
            return build_postgres_store(storage).await;
        }
        #[cfg(not(feature = "postgres"))]
        {
            tracing::warn!(
                "USE_PERSISTENT_STORES=true but postgres feature not enabled, falling back to in-memory"
            );
        }
    }

    tracing::info!("using in-memory store");
    Ok(Arc::new(InMemoryBlogStore::new()))
}

#[cfg(feature = "postgres")]
async fn build_postgres_store(storage: &StorageConfig) -> anyhow::Result<Arc<dyn BlogStore>> {
    use anyhow::Context;
    use yatube_infra::PostgresBlogStore;

    let url = storage
        .database_url
        .as_deref()
        .context("DATABASE_URL must be set when USE_PERSISTENT_STORES=true")?;

    let store = PostgresBlogStore::connect(url, storage.max_connections)
        .await
        .context("failed to connect to Postgres")?;
    store.migrate().await.context("failed to apply schema")?;

    tracing::info!("using postgres store");
    Ok(Arc::new(store))
}
