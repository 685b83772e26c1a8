//! Id aliases for the two document collections.

use super::id::Id;

/// Marker for location nodes (country, province, city).
pub struct Location;

/// Marker for content posts.
pub struct Post;

pub type LocationId = Id<Location>;

pub type PostId = Id<Post>;
