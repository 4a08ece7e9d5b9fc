//! Infrastructure layer: persistence adapters and query helpers.

pub mod search;
pub mod store;

pub use search::SearchTerms;
pub use store::{BlogStore, InMemoryBlogStore, StoreError, StoreResult, Window};
#[cfg(feature = "postgres")]
pub use store::PostgresBlogStore;
