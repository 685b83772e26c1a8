//! Content posts: records, query filters and listings.

pub mod listing;
pub mod models;

pub use listing::list_posts;
pub use models::{ContentPost, PostLocation, PostQuery};
