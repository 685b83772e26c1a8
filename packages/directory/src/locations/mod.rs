//! Location hierarchy: models, the validating manager, and the tree builder.

pub mod manager;
pub mod models;
pub mod tree;

pub use manager::{CascadeFailure, CascadeStep, DeleteReport, LocationManager};
pub use models::{
    Ancestry, CreateLocation, LocationNode, LocationTreeNode, LocationType, UpdateLocation,
    INITIAL_VERSION,
};
pub use tree::{build_tree, compare_names, flatten, sort_by_name};
