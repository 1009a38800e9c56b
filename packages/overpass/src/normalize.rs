//! Normalization of Overpass elements into canonical resources.
//!
//! Category inference reuses the [`ResourceKind`] selectors the query is
//! built from, so only tag combinations that were asked for get a known
//! category:
//!
//! | `amenity`         | `social_facility`           | category       |
//! |-------------------|-----------------------------|----------------|
//! | `hospital`        | *any*                       | `Health`       |
//! | `social_facility` | `shelter`                   | `Shelter`      |
//! | `social_facility` | `food_bank`, `soup_kitchen` | `Food`         |
//! | *anything else*   |                             | `Unclassified` |

use resource_map_resource_models::{
    ADDRESS_UNAVAILABLE, Coordinate, PHONE_UNAVAILABLE, Resource, ResourceCategory, UNNAMED,
};

use crate::query::ResourceKind;
use crate::{OverpassElement, Tags};

/// Address tags joined, in order, to compose a street address.
const ADDRESS_PART_TAGS: &[&str] = &[
    "addr:housenumber",
    "addr:street",
    "addr:city",
    "addr:postcode",
];

/// Infers the resource category from an element's tags.
#[must_use]
pub fn infer_category(tags: &Tags) -> ResourceCategory {
    ResourceKind::all()
        .iter()
        .find(|kind| kind.matches(tags))
        .map_or(ResourceCategory::Unclassified, |kind| kind.category())
}

/// Composes a display address from structured `addr:*` tags.
///
/// Falls back to `addr:full`, then to [`ADDRESS_UNAVAILABLE`].
#[must_use]
pub fn compose_address(tags: &Tags) -> String {
    let composed = ADDRESS_PART_TAGS
        .iter()
        .filter_map(|key| non_empty(tags, key))
        .collect::<Vec<_>>()
        .join(" ");

    if !composed.is_empty() {
        return composed;
    }

    non_empty(tags, "addr:full").map_or_else(|| ADDRESS_UNAVAILABLE.to_string(), String::from)
}

/// Extracts a usable position, preferring direct coordinates over the
/// computed center one component at a time. Both components must be
/// finite.
#[must_use]
pub fn extract_coordinate(element: &OverpassElement) -> Option<Coordinate> {
    let center = element.center.unwrap_or_default();
    let lat = element.lat.or(center.lat)?;
    let lng = element.lon.or(center.lon)?;

    (lat.is_finite() && lng.is_finite()).then(|| Coordinate::new(lat, lng))
}

/// Converts one element into a [`Resource`].
///
/// Returns `None` when the element has no usable coordinates.
#[must_use]
pub fn to_resource(element: &OverpassElement) -> Option<Resource> {
    let position = extract_coordinate(element)?;
    let tags = &element.tags;

    Some(Resource {
        id: format!("{}-{}", element.element_type, element.id),
        name: non_empty(tags, "name").unwrap_or(UNNAMED).to_string(),
        category: infer_category(tags),
        address: compose_address(tags),
        phone: non_empty(tags, "phone")
            .or_else(|| non_empty(tags, "contact:phone"))
            .unwrap_or(PHONE_UNAVAILABLE)
            .to_string(),
        hours: non_empty(tags, "opening_hours").unwrap_or_default().to_string(),
        wheelchair: tags.get("wheelchair").is_some_and(|v| v == "yes"),
        lat: position.lat,
        lng: position.lng,
    })
}

/// Normalizes a batch of elements, dropping those without usable
/// coordinates. Input order is preserved.
#[must_use]
pub fn normalize_elements(elements: &[OverpassElement]) -> Vec<Resource> {
    let resources: Vec<Resource> = elements
        .iter()
        .filter_map(|element| {
            let resource = to_resource(element);
            if resource.is_none() {
                log::debug!(
                    "Dropping {}-{}: no usable coordinates",
                    element.element_type,
                    element.id
                );
            }
            resource
        })
        .collect();

    log::debug!(
        "Normalized {} of {} Overpass elements",
        resources.len(),
        elements.len()
    );

    resources
}

fn non_empty<'a>(tags: &'a Tags, key: &str) -> Option<&'a str> {
    tags.get(key).map(String::as_str).filter(|v| !v.is_empty())
}
