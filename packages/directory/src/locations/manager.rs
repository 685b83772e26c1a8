//! Location hierarchy manager.
//!
//! All location writes go through [`LocationManager`]. It validates the
//! country -> province -> city invariant, stamps versions, and propagates
//! structural changes:
//!
//! - reparenting re-derives `countryId`/`provinceId` on direct children
//! - deleting removes the whole subtree (deepest first) and clears the
//!   matching location fields on referencing posts
//!
//! Cascades are best-effort. Each step is independent and idempotent; a
//! failed step is logged and recorded in the returned report, never turned
//! into an error for the caller.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::common::{LocationId, PostId};
use crate::error::{DirectoryError, Result, StoreError, StoreResult};
use crate::fallback::{or_empty, with_fallback};
use crate::locations::models::{
    Ancestry, CreateLocation, LocationNode, LocationTreeNode, LocationType, UpdateLocation,
};
use crate::locations::tree::{build_tree, sort_by_name};
use crate::network::{AlwaysOnline, Connectivity};
use crate::traits::store::DirectoryStore;

/// A cascade step that failed and was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "step", rename_all = "camelCase")]
pub enum CascadeStep {
    #[serde(rename_all = "camelCase")]
    FindPosts { location_id: LocationId },
    #[serde(rename_all = "camelCase")]
    ClearPostLocation {
        post_id: PostId,
        location_id: LocationId,
    },
    #[serde(rename_all = "camelCase")]
    ListChildren { location_id: LocationId },
    #[serde(rename_all = "camelCase")]
    DeleteDescendant { location_id: LocationId },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CascadeFailure {
    #[serde(flatten)]
    pub step: CascadeStep,
    pub error: String,
}

/// Outcome of a delete. Failures are informational only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteReport {
    pub deleted_descendants: usize,
    pub cleared_posts: usize,
    pub failures: Vec<CascadeFailure>,
}

impl DeleteReport {
    fn record(&mut self, step: CascadeStep, error: &StoreError) {
        warn!(?step, error = %error, "Cascade step failed, continuing");
        self.failures.push(CascadeFailure {
            step,
            error: error.to_string(),
        });
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Validating front door for the location collection.
pub struct LocationManager<S: ?Sized> {
    store: Arc<S>,
    connectivity: Arc<dyn Connectivity>,
    tree_cache: RwLock<Option<Arc<Vec<LocationTreeNode>>>>,
    /// Bumped by every invalidation; a rebuild only lands if it is unchanged.
    tree_generation: AtomicU64,
}

impl<S: DirectoryStore + ?Sized> LocationManager<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            connectivity: Arc::new(AlwaysOnline),
            tree_cache: RwLock::new(None),
            tree_generation: AtomicU64::new(0),
        }
    }

    pub fn with_connectivity(mut self, connectivity: Arc<dyn Connectivity>) -> Self {
        self.connectivity = connectivity;
        self
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    fn ensure_online(&self) -> Result<()> {
        if self.connectivity.is_online() {
            Ok(())
        } else {
            Err(DirectoryError::Offline)
        }
    }

    // ========================================================================
    // Reads
    // ========================================================================

    pub async fn get_location(&self, id: LocationId) -> Result<LocationNode> {
        self.store
            .get_location(id)
            .await?
            .ok_or(DirectoryError::NotFound { id })
    }

    /// Nodes of one tier (or all), ordered by name. Never fails; a total
    /// store failure yields an empty list.
    pub async fn list_locations(&self, location_type: Option<LocationType>) -> Vec<LocationNode> {
        let result = with_fallback(
            "list_locations",
            self.store.query_locations(location_type),
            move || async move {
                let mut nodes: Vec<_> = self
                    .store
                    .all_locations()
                    .await?
                    .into_iter()
                    .filter(|n| location_type.map_or(true, |t| n.location_type == t))
                    .collect();
                sort_by_name(&mut nodes);
                Ok::<_, StoreError>(nodes)
            },
        )
        .await;
        or_empty("list_locations", result)
    }

    /// Direct children of a node, ordered by name.
    pub async fn children(&self, id: LocationId) -> Result<Vec<LocationNode>> {
        let mut children = self.fetch_children(id).await?;
        sort_by_name(&mut children);
        Ok(children)
    }

    async fn fetch_children(&self, id: LocationId) -> StoreResult<Vec<LocationNode>> {
        with_fallback("children_of", self.store.children_of(id), move || async move {
            Ok::<_, StoreError>(self
                .store
                .all_locations()
                .await?
                .into_iter()
                .filter(|n| n.parent_id == Some(id))
                .collect::<Vec<_>>())
        })
        .await
    }

    /// Sorted display tree, cached until the next write.
    pub async fn location_tree(&self) -> Arc<Vec<LocationTreeNode>> {
        if let Some(tree) = self.tree_cache.read().await.as_ref() {
            return Arc::clone(tree);
        }

        let generation = self.tree_generation.load(Ordering::SeqCst);
        match self.store.all_locations().await {
            Ok(nodes) => {
                let tree = Arc::new(build_tree(&nodes));
                let mut cache = self.tree_cache.write().await;
                if self.tree_generation.load(Ordering::SeqCst) == generation {
                    *cache = Some(Arc::clone(&tree));
                    debug!(nodes = nodes.len(), roots = tree.len(), "Location tree rebuilt");
                } else {
                    debug!("Location tree changed during rebuild, not caching");
                }
                tree
            }
            Err(e) => {
                warn!(error = %e, "Failed to load locations for tree");
                Arc::new(Vec::new())
            }
        }
    }

    async fn invalidate_tree(&self) {
        let mut cache = self.tree_cache.write().await;
        self.tree_generation.fetch_add(1, Ordering::SeqCst);
        *cache = None;
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Resolve the ancestry a node of `location_type` gets under `parent_id`.
    async fn resolve_ancestry(
        &self,
        location_type: LocationType,
        parent_id: Option<LocationId>,
    ) -> Result<Ancestry> {
        let Some(required) = location_type.parent_type() else {
            return Ok(Ancestry::root());
        };

        let parent_id = parent_id.ok_or_else(|| {
            DirectoryError::validation(format!(
                "A {} requires a parent {}",
                location_type, required
            ))
        })?;

        let parent = self.store.get_location(parent_id).await?.ok_or_else(|| {
            DirectoryError::validation(format!("Parent {} not found", required))
        })?;

        if parent.location_type != required {
            return Err(DirectoryError::validation(format!(
                "The parent of a {} must be a {}, not a {}",
                location_type, required, parent.location_type
            )));
        }

        Ok(Ancestry::under(&parent))
    }

    pub async fn create_location(&self, input: CreateLocation) -> Result<LocationNode> {
        self.ensure_online()?;

        let name = input.name.trim();
        if name.is_empty() || input.location_type.trim().is_empty() {
            return Err(DirectoryError::validation("Name and type are required"));
        }
        let location_type: LocationType = input.location_type.parse()?;
        let ancestry = self.resolve_ancestry(location_type, input.parent_id).await?;

        let node = LocationNode::new(name, location_type, ancestry);
        self.store.insert_location(&node).await?;
        self.invalidate_tree().await;

        info!(
            location_id = %node.id,
            location_type = %node.location_type,
            name = %node.name,
            "Location created"
        );
        Ok(node)
    }

    pub async fn update_location(
        &self,
        id: LocationId,
        input: UpdateLocation,
    ) -> Result<LocationNode> {
        self.ensure_online()?;

        let current = self.get_location(id).await?;

        if let Some(expected) = input.expected_version {
            if expected != current.version {
                return Err(DirectoryError::Conflict {
                    id,
                    expected,
                    actual: current.version,
                });
            }
        }

        let mut updated = current.clone();

        if let Some(name) = input.name.as_deref() {
            let name = name.trim();
            if name.is_empty() {
                return Err(DirectoryError::validation("Name cannot be empty"));
            }
            updated.name = name.to_string();
        }

        let new_type = match input.location_type.as_deref() {
            Some(raw) => Some(raw.parse::<LocationType>()?),
            None => None,
        };
        let type_changed = new_type.is_some_and(|t| t != current.location_type);

        if type_changed {
            let children = self.fetch_children(id).await?;
            if !children.is_empty() {
                return Err(DirectoryError::validation(format!(
                    "Cannot change the type of \"{}\" while it has {} child location(s). \
                     Remove or move them first.",
                    current.name,
                    children.len()
                )));
            }
        }

        let effective_type = new_type.unwrap_or(current.location_type);
        if input.parent_id.is_some() || type_changed {
            let parent_id = input.parent_id.or(current.parent_id);
            let ancestry = self.resolve_ancestry(effective_type, parent_id).await?;
            updated.set_ancestry(ancestry);
        }
        updated.location_type = effective_type;
        updated.touch();

        self.store
            .replace_location(&updated, current.version)
            .await
            .map_err(|e| match e {
                StoreError::VersionMismatch { actual, .. } => DirectoryError::Conflict {
                    id,
                    expected: current.version,
                    actual,
                },
                StoreError::NotFound(_) => DirectoryError::NotFound { id },
                other => DirectoryError::Store(other),
            })?;

        if updated.ancestry() != current.ancestry() {
            self.rederive_children(&updated).await;
        }
        self.invalidate_tree().await;

        info!(
            location_id = %id,
            version = updated.version,
            location_type = %updated.location_type,
            "Location updated"
        );
        Ok(updated)
    }

    /// Point each direct child's ancestor references at the moved node.
    async fn rederive_children(&self, parent: &LocationNode) {
        let children = match self.fetch_children(parent.id).await {
            Ok(children) => children,
            Err(e) => {
                warn!(location_id = %parent.id, error = %e, "Could not list children to re-derive ancestry");
                return;
            }
        };

        for child in children {
            let ancestry = Ancestry::under(parent);
            if child.ancestry() == ancestry {
                continue;
            }

            let mut next = child.clone();
            next.set_ancestry(ancestry);
            next.touch();

            match self.store.replace_location(&next, child.version).await {
                Ok(()) => debug!(location_id = %child.id, "Child ancestry re-derived"),
                Err(e) => warn!(
                    location_id = %child.id,
                    parent_id = %parent.id,
                    error = %e,
                    "Failed to re-derive child ancestry"
                ),
            }
        }
    }

    pub async fn delete_location(&self, id: LocationId) -> Result<DeleteReport> {
        self.ensure_online()?;

        let target = self.get_location(id).await?;
        let mut report = DeleteReport::default();

        self.clear_post_references(&target, &mut report).await;

        let descendants = self.collect_descendants(&target, &mut report).await;
        // deepest first: reverse of pre-order puts every child before its parent
        for node in descendants.iter().rev() {
            self.clear_post_references(node, &mut report).await;
            match self.store.delete_location(node.id).await {
                Ok(()) => report.deleted_descendants += 1,
                Err(e) => report.record(
                    CascadeStep::DeleteDescendant {
                        location_id: node.id,
                    },
                    &e,
                ),
            }
        }

        let result = self.store.delete_location(id).await;
        self.invalidate_tree().await;
        result?;

        info!(
            location_id = %id,
            location_type = %target.location_type,
            deleted_descendants = report.deleted_descendants,
            cleared_posts = report.cleared_posts,
            failed_steps = report.failures.len(),
            "Location deleted"
        );
        Ok(report)
    }

    /// Pre-order list of every node below `root`, excluding `root`.
    async fn collect_descendants(
        &self,
        root: &LocationNode,
        report: &mut DeleteReport,
    ) -> Vec<LocationNode> {
        let mut seen: HashSet<LocationId> = HashSet::from([root.id]);
        let mut ordered = Vec::new();
        let mut stack = vec![root.id];

        while let Some(parent_id) = stack.pop() {
            let children = match self.fetch_children(parent_id).await {
                Ok(children) => children,
                Err(e) => {
                    report.record(
                        CascadeStep::ListChildren {
                            location_id: parent_id,
                        },
                        &e,
                    );
                    continue;
                }
            };

            for child in children {
                if seen.insert(child.id) {
                    stack.push(child.id);
                    ordered.push(child);
                }
            }
        }

        ordered
    }

    /// Clear the fields referencing `node` on every post that points at it.
    async fn clear_post_references(&self, node: &LocationNode, report: &mut DeleteReport) {
        let level = node.location_type;
        let posts = with_fallback(
            "posts_referencing",
            self.store.posts_referencing(level, node.id),
            move || async move {
                Ok::<_, StoreError>(self
                    .store
                    .all_posts()
                    .await?
                    .into_iter()
                    .filter(|p| p.references(level, node.id))
                    .collect::<Vec<_>>())
            },
        )
        .await;

        let posts = match posts {
            Ok(posts) => posts,
            Err(e) => {
                report.record(
                    CascadeStep::FindPosts {
                        location_id: node.id,
                    },
                    &e,
                );
                return;
            }
        };

        for post in posts {
            let cleared = post
                .location
                .as_ref()
                .and_then(|location| location.cleared_for(level));

            match self.store.set_post_location(post.id, cleared.as_ref()).await {
                Ok(()) => report.cleared_posts += 1,
                Err(e) => report.record(
                    CascadeStep::ClearPostLocation {
                        post_id: post.id,
                        location_id: node.id,
                    },
                    &e,
                ),
            }
        }
    }
}
