//! Testing utilities: a fault-injecting store wrapper.
//!
//! `FaultyStore` delegates to any store and fails selected operations on
//! demand, so cascade and fallback paths can be exercised without a real
//! backend outage. A [`ScanGate`] parks one `all_locations` call after it
//! has read the store, so tests can land a write under an in-flight read.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Notify;

use crate::common::{LocationId, PostId};
use crate::error::{StoreError, StoreResult};
use crate::locations::{LocationNode, LocationType};
use crate::posts::{ContentPost, PostLocation, PostQuery};
use crate::traits::store::{LocationStore, PostStore};

#[derive(Default)]
struct Faults {
    post_updates: HashSet<PostId>,
    location_deletes: HashSet<LocationId>,
    location_replaces: HashSet<LocationId>,
}

/// Holds one `all_locations` result until released.
#[derive(Default)]
pub struct ScanGate {
    entered: Notify,
    release: Notify,
}

impl ScanGate {
    /// Wait until the gated scan has read the store.
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    /// Let the gated scan return its (possibly stale) result.
    pub fn release(&self) {
        self.release.notify_one();
    }

    async fn pass(&self) {
        self.entered.notify_one();
        self.release.notified().await;
    }
}

/// Store wrapper that fails chosen operations.
pub struct FaultyStore<S> {
    inner: S,
    fail_queries: AtomicBool,
    faults: Mutex<Faults>,
    post_location_writes: AtomicUsize,
    scan_gate: Mutex<Option<Arc<ScanGate>>>,
}

impl<S> FaultyStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            fail_queries: AtomicBool::new(false),
            faults: Mutex::new(Faults::default()),
            post_location_writes: AtomicUsize::new(0),
            scan_gate: Mutex::new(None),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Make every listing/lookup query fail, indexed or not.
    pub fn fail_queries(&self, fail: bool) {
        self.fail_queries.store(fail, Ordering::SeqCst);
    }

    pub fn fail_post_update(&self, id: PostId) {
        self.faults().post_updates.insert(id);
    }

    pub fn fail_location_delete(&self, id: LocationId) {
        self.faults().location_deletes.insert(id);
    }

    pub fn fail_location_replace(&self, id: LocationId) {
        self.faults().location_replaces.insert(id);
    }

    /// Park the next `all_locations` call until the returned gate is released.
    pub fn gate_next_location_scan(&self) -> Arc<ScanGate> {
        let gate = Arc::new(ScanGate::default());
        *self.scan_gate.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) =
            Some(Arc::clone(&gate));
        gate
    }

    /// Number of successful `set_post_location` calls so far.
    pub fn post_location_writes(&self) -> usize {
        self.post_location_writes.load(Ordering::SeqCst)
    }

    fn faults(&self) -> MutexGuard<'_, Faults> {
        self.faults.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check_queries(&self) -> StoreResult<()> {
        if self.fail_queries.load(Ordering::SeqCst) {
            Err(StoreError::backend("injected query failure"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl<S: LocationStore> LocationStore for FaultyStore<S> {
    async fn get_location(&self, id: LocationId) -> StoreResult<Option<LocationNode>> {
        self.inner.get_location(id).await
    }

    async fn insert_location(&self, node: &LocationNode) -> StoreResult<()> {
        self.inner.insert_location(node).await
    }

    async fn replace_location(
        &self,
        node: &LocationNode,
        expected_version: u64,
    ) -> StoreResult<()> {
        if self.faults().location_replaces.contains(&node.id) {
            return Err(StoreError::backend(format!("injected replace failure for {}", node.id)));
        }
        self.inner.replace_location(node, expected_version).await
    }

    async fn delete_location(&self, id: LocationId) -> StoreResult<()> {
        if self.faults().location_deletes.contains(&id) {
            return Err(StoreError::backend(format!("injected delete failure for {}", id)));
        }
        self.inner.delete_location(id).await
    }

    async fn query_locations(
        &self,
        location_type: Option<LocationType>,
    ) -> StoreResult<Vec<LocationNode>> {
        self.check_queries()?;
        self.inner.query_locations(location_type).await
    }

    async fn children_of(&self, parent_id: LocationId) -> StoreResult<Vec<LocationNode>> {
        self.check_queries()?;
        self.inner.children_of(parent_id).await
    }

    async fn all_locations(&self) -> StoreResult<Vec<LocationNode>> {
        self.check_queries()?;
        let gate = self
            .scan_gate
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        let nodes = self.inner.all_locations().await?;
        if let Some(gate) = gate {
            gate.pass().await;
        }
        Ok(nodes)
    }
}

#[async_trait]
impl<S: PostStore> PostStore for FaultyStore<S> {
    async fn get_post(&self, id: PostId) -> StoreResult<Option<ContentPost>> {
        self.inner.get_post(id).await
    }

    async fn insert_post(&self, post: &ContentPost) -> StoreResult<()> {
        self.inner.insert_post(post).await
    }

    async fn set_post_location(
        &self,
        id: PostId,
        location: Option<&PostLocation>,
    ) -> StoreResult<()> {
        if self.faults().post_updates.contains(&id) {
            return Err(StoreError::backend(format!("injected update failure for post {}", id)));
        }
        self.inner.set_post_location(id, location).await?;
        self.post_location_writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn set_post_image(&self, id: PostId, image_url: &str) -> StoreResult<()> {
        self.inner.set_post_image(id, image_url).await
    }

    async fn query_posts(&self, query: &PostQuery) -> StoreResult<Vec<ContentPost>> {
        self.check_queries()?;
        self.inner.query_posts(query).await
    }

    async fn posts_referencing(
        &self,
        level: LocationType,
        id: LocationId,
    ) -> StoreResult<Vec<ContentPost>> {
        self.check_queries()?;
        self.inner.posts_referencing(level, id).await
    }

    async fn all_posts(&self) -> StoreResult<Vec<ContentPost>> {
        self.check_queries()?;
        self.inner.all_posts().await
    }
}
