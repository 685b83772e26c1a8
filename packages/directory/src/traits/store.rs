//! Storage traits for location nodes and content posts.
//!
//! The store is a document database: equality lookups on a single field are
//! always available, but filtered queries with an ordering may need a
//! composite index and can fail with
//! [`StoreError::MissingIndex`](crate::error::StoreError::MissingIndex). Callers
//! go through [`crate::fallback`] to degrade to an unindexed fetch.
//!
//! - `LocationStore`: location node collection
//! - `PostStore`: content post collection
//! - `DirectoryStore`: composite trait combining both

use async_trait::async_trait;

use crate::common::{LocationId, PostId};
use crate::error::StoreResult;
use crate::locations::{LocationNode, LocationType};
use crate::posts::{ContentPost, PostLocation, PostQuery};

/// Collection of location nodes.
#[async_trait]
pub trait LocationStore: Send + Sync {
    async fn get_location(&self, id: LocationId) -> StoreResult<Option<LocationNode>>;

    async fn insert_location(&self, node: &LocationNode) -> StoreResult<()>;

    /// Replace a node only if its stored version equals `expected_version`.
    ///
    /// Fails with [`StoreError::VersionMismatch`] when another writer got
    /// there first, or [`StoreError::NotFound`] when the node is gone.
    async fn replace_location(&self, node: &LocationNode, expected_version: u64)
        -> StoreResult<()>;

    /// Delete a node. Deleting a missing node succeeds.
    async fn delete_location(&self, id: LocationId) -> StoreResult<()>;

    /// Indexed query: nodes of one tier (or all), ordered by name.
    async fn query_locations(
        &self,
        location_type: Option<LocationType>,
    ) -> StoreResult<Vec<LocationNode>>;

    /// Direct children of a node (`parentId == parent_id`).
    async fn children_of(&self, parent_id: LocationId) -> StoreResult<Vec<LocationNode>>;

    /// Unindexed fetch of the whole collection.
    async fn all_locations(&self) -> StoreResult<Vec<LocationNode>>;

    /// Cheap reachability check for `GET /health`.
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

/// Collection of content posts.
#[async_trait]
pub trait PostStore: Send + Sync {
    async fn get_post(&self, id: PostId) -> StoreResult<Option<ContentPost>>;

    async fn insert_post(&self, post: &ContentPost) -> StoreResult<()>;

    /// Overwrite (or clear, with `None`) a post's location sub-object.
    async fn set_post_location(
        &self,
        id: PostId,
        location: Option<&PostLocation>,
    ) -> StoreResult<()>;

    async fn set_post_image(&self, id: PostId, image_url: &str) -> StoreResult<()>;

    /// Indexed query: filters plus newest-first ordering and limit.
    async fn query_posts(&self, query: &PostQuery) -> StoreResult<Vec<ContentPost>>;

    /// Posts whose `location.<level>Id` equals `id`.
    async fn posts_referencing(
        &self,
        level: LocationType,
        id: LocationId,
    ) -> StoreResult<Vec<ContentPost>>;

    /// Unindexed fetch of the whole collection.
    async fn all_posts(&self) -> StoreResult<Vec<ContentPost>>;
}

/// Composite storage trait used by the location manager.
pub trait DirectoryStore: LocationStore + PostStore {}

// Blanket implementation: anything implementing both traits is a DirectoryStore
impl<T: LocationStore + PostStore + ?Sized> DirectoryStore for T {}

