use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{LocationId, PostId};
use crate::locations::LocationType;

/// Denormalized location labels carried by a post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostLocation {
    #[serde(default)]
    pub country_id: Option<LocationId>,
    #[serde(default)]
    pub country_name: Option<String>,
    #[serde(default)]
    pub province_id: Option<LocationId>,
    #[serde(default)]
    pub province_name: Option<String>,
    #[serde(default)]
    pub city_id: Option<LocationId>,
    #[serde(default)]
    pub city_name: Option<String>,
}

impl PostLocation {
    /// The id stored at the given tier.
    pub fn id_at(&self, level: LocationType) -> Option<LocationId> {
        match level {
            LocationType::Country => self.country_id,
            LocationType::Province => self.province_id,
            LocationType::City => self.city_id,
        }
    }

    pub fn references(&self, level: LocationType, id: LocationId) -> bool {
        self.id_at(level) == Some(id)
    }

    /// Location left on a post after the node at `level` is deleted.
    ///
    /// Deleting a country drops the whole location, a province keeps only
    /// the country, a city keeps country and province.
    pub fn cleared_for(&self, level: LocationType) -> Option<PostLocation> {
        match level {
            LocationType::Country => None,
            LocationType::Province => Some(PostLocation {
                province_id: None,
                province_name: None,
                city_id: None,
                city_name: None,
                ..self.clone()
            }),
            LocationType::City => Some(PostLocation {
                city_id: None,
                city_name: None,
                ..self.clone()
            }),
        }
    }
}

/// Content record (article, audio, video or directory entry).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentPost {
    pub id: PostId,
    pub title: String,
    pub post_type: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub location: Option<PostLocation>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContentPost {
    pub fn new(title: impl Into<String>, post_type: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: PostId::new(),
            title: title.into(),
            post_type: post_type.into(),
            category: None,
            image_url: None,
            location: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_location(mut self, location: PostLocation) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self.updated_at = created_at;
        self
    }

    pub fn references(&self, level: LocationType, id: LocationId) -> bool {
        self.location
            .as_ref()
            .map(|location| location.references(level, id))
            .unwrap_or(false)
    }
}

/// Filters for post listings. Results are ordered newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostQuery {
    #[serde(default, rename = "type")]
    pub post_type: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl PostQuery {
    pub fn of_type(post_type: impl Into<String>) -> Self {
        Self {
            post_type: Some(post_type.into()),
            ..Default::default()
        }
    }

    pub fn in_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether the query filters on any field (and so needs a composite
    /// index together with the `createdAt` ordering).
    pub fn has_filters(&self) -> bool {
        self.post_type.is_some() || self.category.is_some()
    }

    pub fn matches(&self, post: &ContentPost) -> bool {
        let type_ok = self
            .post_type
            .as_deref()
            .map_or(true, |t| post.post_type == t);
        let category_ok = self
            .category
            .as_deref()
            .map_or(true, |c| post.category.as_deref() == Some(c));
        type_ok && category_ok
    }

    /// Filter, order and limit an unindexed result set client-side.
    pub fn apply(&self, posts: Vec<ContentPost>) -> Vec<ContentPost> {
        let mut matching: Vec<_> = posts.into_iter().filter(|p| self.matches(p)).collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = self.limit {
            matching.truncate(limit);
        }
        matching
    }
}
