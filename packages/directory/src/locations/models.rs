use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::common::LocationId;
use crate::error::DirectoryError;

/// Tier of a node in the country -> province -> city hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationType {
    Country,
    Province,
    City,
}

impl LocationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationType::Country => "country",
            LocationType::Province => "province",
            LocationType::City => "city",
        }
    }

    /// The tier a node of this type must hang under, if any.
    pub fn parent_type(&self) -> Option<LocationType> {
        match self {
            LocationType::Country => None,
            LocationType::Province => Some(LocationType::Country),
            LocationType::City => Some(LocationType::Province),
        }
    }

    pub fn variants() -> &'static [LocationType] {
        &[
            LocationType::Country,
            LocationType::Province,
            LocationType::City,
        ]
    }
}

impl fmt::Display for LocationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LocationType {
    type Err = DirectoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "country" => Ok(LocationType::Country),
            "province" => Ok(LocationType::Province),
            "city" => Ok(LocationType::City),
            other => Err(DirectoryError::validation(format!(
                "Invalid location type \"{}\". Must be one of: country, province, city",
                other
            ))),
        }
    }
}

/// Starting value of the optimistic version stamp.
pub const INITIAL_VERSION: u64 = 1;

fn initial_version() -> u64 {
    INITIAL_VERSION
}

/// One country, province or city in the directory hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationNode {
    pub id: LocationId,
    pub name: String,
    #[serde(rename = "type")]
    pub location_type: LocationType,
    pub parent_id: Option<LocationId>,
    pub country_id: Option<LocationId>,
    pub province_id: Option<LocationId>,
    #[serde(default = "initial_version")]
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LocationNode {
    pub fn new(name: impl Into<String>, location_type: LocationType, ancestry: Ancestry) -> Self {
        let now = Utc::now();
        Self {
            id: LocationId::new(),
            name: name.into(),
            location_type,
            parent_id: ancestry.parent_id,
            country_id: ancestry.country_id,
            province_id: ancestry.province_id,
            version: INITIAL_VERSION,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn ancestry(&self) -> Ancestry {
        Ancestry {
            parent_id: self.parent_id,
            country_id: self.country_id,
            province_id: self.province_id,
        }
    }

    pub fn set_ancestry(&mut self, ancestry: Ancestry) {
        self.parent_id = ancestry.parent_id;
        self.country_id = ancestry.country_id;
        self.province_id = ancestry.province_id;
    }

    /// Stamp a successful mutation.
    pub fn touch(&mut self) {
        self.version += 1;
        self.updated_at = Utc::now();
    }
}

/// The parent pointer plus denormalized ancestor references of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Ancestry {
    pub parent_id: Option<LocationId>,
    pub country_id: Option<LocationId>,
    pub province_id: Option<LocationId>,
}

impl Ancestry {
    /// Countries are always roots.
    pub fn root() -> Self {
        Self::default()
    }

    /// Ancestry of a node attached directly under `parent`.
    pub fn under(parent: &LocationNode) -> Self {
        match parent.location_type {
            LocationType::Country => Self {
                parent_id: Some(parent.id),
                country_id: Some(parent.id),
                province_id: None,
            },
            LocationType::Province => Self {
                parent_id: Some(parent.id),
                country_id: parent.country_id,
                province_id: Some(parent.id),
            },
            // cities never have children; keep the pointer, nothing to denormalize
            LocationType::City => Self {
                parent_id: Some(parent.id),
                country_id: parent.country_id,
                province_id: parent.province_id,
            },
        }
    }
}

/// Input for creating a location. `location_type` stays a string so that
/// unrecognized values are reported as validation errors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLocation {
    pub name: String,
    #[serde(rename = "type")]
    pub location_type: String,
    #[serde(default)]
    pub parent_id: Option<LocationId>,
}

impl CreateLocation {
    pub fn new(name: impl Into<String>, location_type: LocationType, parent_id: Option<LocationId>) -> Self {
        Self {
            name: name.into(),
            location_type: location_type.as_str().to_string(),
            parent_id,
        }
    }
}

/// Partial update of a location. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLocation {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub parent_id: Option<LocationId>,
    #[serde(default, rename = "type")]
    pub location_type: Option<String>,
    /// Version the caller last read; a mismatch fails with a conflict.
    #[serde(default)]
    pub expected_version: Option<u64>,
}

impl UpdateLocation {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn reparent(parent_id: LocationId) -> Self {
        Self {
            parent_id: Some(parent_id),
            ..Default::default()
        }
    }

    pub fn retype(location_type: LocationType) -> Self {
        Self {
            location_type: Some(location_type.as_str().to_string()),
            ..Default::default()
        }
    }

    pub fn with_expected_version(mut self, version: u64) -> Self {
        self.expected_version = Some(version);
        self
    }
}

/// A location with its sorted children, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationTreeNode {
    #[serde(flatten)]
    pub node: LocationNode,
    pub children: Vec<LocationTreeNode>,
}
