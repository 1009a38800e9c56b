//! Overpass QL query construction.
//!
//! One query covers every aid kind and every geometry type so a single
//! round trip returns the whole neighborhood. Ways and relations are
//! requested with `out center` so they carry a representative point.

use std::fmt::Write as _;

use resource_map_resource_models::{Coordinate, ResourceCategory};

use crate::Tags;

/// `OpenStreetMap` geometry types queried for each kind.
pub const GEOMETRY_TYPES: &[&str] = &["node", "way", "relation"];

/// The kinds of aid facility requested from Overpass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// `amenity=hospital`
    Hospital,
    /// `amenity=social_facility` + `social_facility=food_bank`
    FoodBank,
    /// `amenity=social_facility` + `social_facility=soup_kitchen`
    SoupKitchen,
    /// `amenity=social_facility` + `social_facility=shelter`
    Shelter,
}

impl ResourceKind {
    /// Returns all kinds in query order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Hospital, Self::FoodBank, Self::SoupKitchen, Self::Shelter]
    }

    /// Returns the `(key, value)` tag pairs that select this kind.
    #[must_use]
    pub const fn tag_selectors(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Hospital => &[("amenity", "hospital")],
            Self::FoodBank => &[("amenity", "social_facility"), ("social_facility", "food_bank")],
            Self::SoupKitchen => &[
                ("amenity", "social_facility"),
                ("social_facility", "soup_kitchen"),
            ],
            Self::Shelter => &[("amenity", "social_facility"), ("social_facility", "shelter")],
        }
    }

    /// Returns `true` if `tags` carries every selector of this kind.
    #[must_use]
    pub fn matches(self, tags: &Tags) -> bool {
        self.tag_selectors()
            .iter()
            .all(|(key, value)| tags.get(*key).is_some_and(|v| v == value))
    }

    /// Returns the category resources of this kind are normalized into.
    #[must_use]
    pub const fn category(self) -> ResourceCategory {
        match self {
            Self::Hospital => ResourceCategory::Health,
            Self::FoodBank | Self::SoupKitchen => ResourceCategory::Food,
            Self::Shelter => ResourceCategory::Shelter,
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Hospital => "Hospitals",
            Self::FoodBank => "Food banks",
            Self::SoupKitchen => "Soup kitchens",
            Self::Shelter => "Shelters",
        }
    }
}

/// Builds the Overpass QL query for every [`ResourceKind`] within
/// `radius_m` meters of `center`.
///
/// `center` and `radius_m` are embedded verbatim. `timeout_secs` is the
/// server-side timeout declared in the query header.
#[must_use]
pub fn build_query(center: Coordinate, radius_m: u32, timeout_secs: u32) -> String {
    let Coordinate { lat, lng } = center;
    let mut query = format!("[out:json][timeout:{timeout_secs}];\n(\n");

    for kind in ResourceKind::all() {
        let selectors: String = kind
            .tag_selectors()
            .iter()
            .map(|(key, value)| format!("[\"{key}\"=\"{value}\"]"))
            .collect();

        let _ = writeln!(query, "  // {}", kind.label());
        for geometry in GEOMETRY_TYPES {
            let _ = writeln!(
                query,
                "  {geometry}(around:{radius_m},{lat},{lng}){selectors};"
            );
        }
    }

    query.push_str(");\nout center tags;\n");
    query
}
