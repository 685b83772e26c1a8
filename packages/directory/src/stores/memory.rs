//! In-memory storage implementation for testing and development.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::common::{LocationId, PostId};
use crate::error::{StoreError, StoreResult};
use crate::locations::{sort_by_name, LocationNode, LocationType};
use crate::posts::{ContentPost, PostLocation, PostQuery};
use crate::traits::store::{LocationStore, PostStore};

/// In-memory location and post collections.
///
/// Data is lost on restart. By default the store behaves as if every
/// composite index exists; [`MemoryStore::without_composite_indexes`] makes
/// filtered+ordered queries fail the way a freshly provisioned hosted
/// database does.
pub struct MemoryStore {
    locations: RwLock<HashMap<LocationId, LocationNode>>,
    posts: RwLock<HashMap<PostId, ContentPost>>,
    composite_indexes: bool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            locations: RwLock::new(HashMap::new()),
            posts: RwLock::new(HashMap::new()),
            composite_indexes: true,
        }
    }

    pub fn without_composite_indexes() -> Self {
        Self {
            composite_indexes: false,
            ..Self::new()
        }
    }

    pub async fn location_count(&self) -> usize {
        self.locations.read().await.len()
    }

    pub async fn post_count(&self) -> usize {
        self.posts.read().await.len()
    }

    pub async fn clear(&self) {
        self.locations.write().await.clear();
        self.posts.write().await.clear();
    }
}

#[async_trait]
impl LocationStore for MemoryStore {
    async fn get_location(&self, id: LocationId) -> StoreResult<Option<LocationNode>> {
        Ok(self.locations.read().await.get(&id).cloned())
    }

    async fn insert_location(&self, node: &LocationNode) -> StoreResult<()> {
        self.locations.write().await.insert(node.id, node.clone());
        Ok(())
    }

    async fn replace_location(
        &self,
        node: &LocationNode,
        expected_version: u64,
    ) -> StoreResult<()> {
        let mut locations = self.locations.write().await;
        let stored = locations
            .get_mut(&node.id)
            .ok_or_else(|| StoreError::NotFound(node.id.to_string()))?;

        if stored.version != expected_version {
            return Err(StoreError::VersionMismatch {
                id: node.id.to_string(),
                expected: expected_version,
                actual: stored.version,
            });
        }

        *stored = node.clone();
        Ok(())
    }

    async fn delete_location(&self, id: LocationId) -> StoreResult<()> {
        self.locations.write().await.remove(&id);
        Ok(())
    }

    async fn query_locations(
        &self,
        location_type: Option<LocationType>,
    ) -> StoreResult<Vec<LocationNode>> {
        if location_type.is_some() && !self.composite_indexes {
            return Err(StoreError::MissingIndex("locations(type, name)".into()));
        }

        let mut nodes: Vec<_> = self
            .locations
            .read()
            .await
            .values()
            .filter(|n| location_type.map_or(true, |t| n.location_type == t))
            .cloned()
            .collect();
        sort_by_name(&mut nodes);
        Ok(nodes)
    }

    async fn children_of(&self, parent_id: LocationId) -> StoreResult<Vec<LocationNode>> {
        Ok(self
            .locations
            .read()
            .await
            .values()
            .filter(|n| n.parent_id == Some(parent_id))
            .cloned()
            .collect())
    }

    async fn all_locations(&self) -> StoreResult<Vec<LocationNode>> {
        Ok(self.locations.read().await.values().cloned().collect())
    }
}

#[async_trait]
impl PostStore for MemoryStore {
    async fn get_post(&self, id: PostId) -> StoreResult<Option<ContentPost>> {
        Ok(self.posts.read().await.get(&id).cloned())
    }

    async fn insert_post(&self, post: &ContentPost) -> StoreResult<()> {
        self.posts.write().await.insert(post.id, post.clone());
        Ok(())
    }

    async fn set_post_location(
        &self,
        id: PostId,
        location: Option<&PostLocation>,
    ) -> StoreResult<()> {
        let mut posts = self.posts.write().await;
        let post = posts
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        post.location = location.cloned();
        post.updated_at = Utc::now();
        Ok(())
    }

    async fn set_post_image(&self, id: PostId, image_url: &str) -> StoreResult<()> {
        let mut posts = self.posts.write().await;
        let post = posts
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        post.image_url = Some(image_url.to_string());
        post.updated_at = Utc::now();
        Ok(())
    }

    async fn query_posts(&self, query: &PostQuery) -> StoreResult<Vec<ContentPost>> {
        if query.has_filters() && !self.composite_indexes {
            return Err(StoreError::MissingIndex(
                "posts(postType, category, createdAt desc)".into(),
            ));
        }

        let posts: Vec<_> = self.posts.read().await.values().cloned().collect();
        Ok(query.apply(posts))
    }

    async fn posts_referencing(
        &self,
        level: LocationType,
        id: LocationId,
    ) -> StoreResult<Vec<ContentPost>> {
        Ok(self
            .posts
            .read()
            .await
            .values()
            .filter(|p| p.references(level, id))
            .cloned()
            .collect())
    }

    async fn all_posts(&self) -> StoreResult<Vec<ContentPost>> {
        Ok(self.posts.read().await.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locations::Ancestry;

    #[tokio::test]
    async fn test_location_crud() {
        let store = MemoryStore::new();
        let node = LocationNode::new("Canada", LocationType::Country, Ancestry::root());

        store.insert_location(&node).await.unwrap();
        assert_eq!(store.get_location(node.id).await.unwrap(), Some(node.clone()));

        store.delete_location(node.id).await.unwrap();
        assert!(store.get_location(node.id).await.unwrap().is_none());
        // deleting again is fine
        store.delete_location(node.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_replace_checks_version() {
        let store = MemoryStore::new();
        let node = LocationNode::new("Canada", LocationType::Country, Ancestry::root());
        store.insert_location(&node).await.unwrap();

        let mut renamed = node.clone();
        renamed.name = "Kanada".into();
        renamed.touch();
        store.replace_location(&renamed, 1).await.unwrap();

        let mut stale = node.clone();
        stale.name = "Stale".into();
        stale.touch();
        let err = store.replace_location(&stale, 1).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::VersionMismatch { expected: 1, actual: 2, .. }
        ));
        assert_eq!(store.get_location(node.id).await.unwrap().unwrap().name, "Kanada");
    }

    #[tokio::test]
    async fn test_missing_indexes() {
        let store = MemoryStore::without_composite_indexes();
        assert!(matches!(
            store.query_posts(&PostQuery::of_type("article")).await,
            Err(StoreError::MissingIndex(_))
        ));
        assert!(store.query_posts(&PostQuery::default()).await.is_ok());
        assert!(matches!(
            store.query_locations(Some(LocationType::City)).await,
            Err(StoreError::MissingIndex(_))
        ));
    }

    #[tokio::test]
    async fn test_set_post_location_on_missing_post() {
        let store = MemoryStore::new();
        let err = store.set_post_location(PostId::new(), None).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }
}
