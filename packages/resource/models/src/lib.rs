#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Community resource types and category definitions.
//!
//! This crate defines the canonical [`Resource`] record that every
//! upstream map feature is normalized into, the closed
//! [`ResourceCategory`] taxonomy, and the transient [`RankedResource`]
//! view used when sorting by distance from an active center.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Placeholder name for features without a `name` tag.
pub const UNNAMED: &str = "Unnamed";

/// Placeholder address when no address tags are present.
pub const ADDRESS_UNAVAILABLE: &str = "Address unavailable";

/// Placeholder phone number when no phone tags are present.
pub const PHONE_UNAVAILABLE: &str = "N/A";

/// A WGS84 coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
}

impl Coordinate {
    /// Creates a new coordinate without validating it.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Returns `true` if both components are finite and within the valid
    /// latitude/longitude ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        is_valid_lat(self.lat) && is_valid_lng(self.lng)
    }
}

/// Returns `true` if `lat` is finite and within `-90..=90`.
#[must_use]
pub fn is_valid_lat(lat: f64) -> bool {
    lat.is_finite() && (-90.0..=90.0).contains(&lat)
}

/// Returns `true` if `lng` is finite and within `-180..=180`.
#[must_use]
pub fn is_valid_lng(lng: f64) -> bool {
    lng.is_finite() && (-180.0..=180.0).contains(&lng)
}

/// Top-level resource categories.
///
/// `Unclassified` is assigned to features whose tags match none of the
/// known aid categories. It is never treated as emergency-relevant.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum ResourceCategory {
    /// Food banks and soup kitchens
    Food,
    /// Hospitals
    Health,
    /// Shelters
    Shelter,
    /// Tag combinations outside the known aid categories
    Unclassified,
}

impl ResourceCategory {
    /// Returns `true` for categories offered by the nearest-help
    /// shortcut (`Health` and `Shelter`).
    #[must_use]
    pub const fn is_emergency(self) -> bool {
        matches!(self, Self::Health | Self::Shelter)
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Food, Self::Health, Self::Shelter, Self::Unclassified]
    }
}

/// A community aid resource as normalized from an upstream map feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    /// Upstream element type and id, e.g. `"node-42"`.
    pub id: String,
    /// Display name, [`UNNAMED`] when absent upstream.
    pub name: String,
    /// Derived category.
    pub category: ResourceCategory,
    /// Composed street address, [`ADDRESS_UNAVAILABLE`] when absent.
    pub address: String,
    /// Phone number, [`PHONE_UNAVAILABLE`] when absent.
    pub phone: String,
    /// Free-text opening hours, possibly empty.
    pub hours: String,
    /// Whether the feature is tagged `wheelchair=yes`.
    pub wheelchair: bool,
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
}

impl Resource {
    /// Returns the resource position.
    #[must_use]
    pub const fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }
}

/// A [`Resource`] annotated with its distance from the active center.
///
/// Computed per query and never persisted. `distance_km` is `None` when
/// no center was available.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedResource {
    /// The underlying resource.
    #[serde(flatten)]
    pub resource: Resource,
    /// Great-circle distance from the active center, in kilometers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

impl RankedResource {
    /// Wraps a resource without a distance.
    #[must_use]
    pub const fn unranked(resource: Resource) -> Self {
        Self {
            resource,
            distance_km: None,
        }
    }
}
