//! Being Happy directory core.
//!
//! Location hierarchy (country -> province -> city) with validated writes and
//! best-effort cascades onto content posts, a sorted tree builder for display,
//! and post listings that survive missing composite indexes.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use directory::{CreateLocation, LocationManager, LocationType, MemoryStore};
//!
//! let manager = LocationManager::new(Arc::new(MemoryStore::new()));
//! let canada = manager
//!     .create_location(CreateLocation::new("Canada", LocationType::Country, None))
//!     .await?;
//! let ontario = manager
//!     .create_location(CreateLocation::new("Ontario", LocationType::Province, Some(canada.id)))
//!     .await?;
//! let tree = manager.location_tree().await;
//! ```
//!
//! # Modules
//!
//! - [`locations`] - Location models, [`LocationManager`], tree builder
//! - [`posts`] - Content posts and listings
//! - [`traits`] - Store abstractions
//! - [`stores`] - Store implementations (MemoryStore, PostgresStore)
//! - [`network`] - Connectivity precondition for writes
//! - [`testing`] - Fault-injecting store wrapper

pub mod common;
pub mod error;
pub mod fallback;
pub mod locations;
pub mod network;
pub mod posts;
pub mod stores;
pub mod testing;
pub mod traits;

pub use common::{LocationId, PostId};
pub use error::{DirectoryError, Result, StoreError, StoreResult};
pub use locations::{
    build_tree, flatten, Ancestry, CascadeFailure, CascadeStep, CreateLocation, DeleteReport,
    LocationManager, LocationNode, LocationTreeNode, LocationType, UpdateLocation,
};
pub use network::{AlwaysOnline, Connectivity, ConnectivityFlag};
pub use posts::{list_posts, ContentPost, PostLocation, PostQuery};
pub use stores::MemoryStore;
pub use traits::store::{DirectoryStore, LocationStore, PostStore};

#[cfg(feature = "postgres")]
pub use stores::PostgresStore;
