#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Distance ranking for community resources.
//!
//! Given the resources around a center, this crate applies the display
//! filters, annotates each survivor with its great-circle distance from
//! the active center, and sorts nearest first. It also answers the
//! "nearest help" question: the closest `Health` or `Shelter` resource.

pub mod distance;
pub mod filter;

use resource_map_resource_models::{Coordinate, RankedResource, Resource};

pub use distance::haversine_km;
pub use filter::{CategoryFilter, ResourceFilter, UnknownCategoryError};

/// Picks the center distances are measured from.
///
/// A searched area wins over the device location.
#[must_use]
pub const fn active_center(area: Option<Coordinate>, device: Option<Coordinate>) -> Option<Coordinate> {
    match area {
        Some(center) => Some(center),
        None => device,
    }
}

/// Filters `resources` and, when a center is known, sorts them by
/// ascending distance from it.
///
/// Without a center the filtered resources keep their input order and
/// carry no distance. The order of equidistant resources is unspecified.
#[must_use]
pub fn rank(
    resources: &[Resource],
    filter: &ResourceFilter,
    center: Option<Coordinate>,
) -> Vec<RankedResource> {
    let filtered = resources.iter().filter(|r| filter.matches(r)).cloned();

    let Some(center) = center else {
        return filtered.map(RankedResource::unranked).collect();
    };

    let mut ranked: Vec<RankedResource> = filtered.map(|r| with_distance(r, center)).collect();
    ranked.sort_unstable_by(|a, b| distance_of(a).total_cmp(&distance_of(b)));
    ranked
}

/// Returns the closest emergency-relevant resource (`Health` or
/// `Shelter`) to `center`.
///
/// Returns `None` without a center or when no such resource exists.
#[must_use]
pub fn nearest_emergency(resources: &[Resource], center: Option<Coordinate>) -> Option<RankedResource> {
    let center = center?;

    resources
        .iter()
        .filter(|r| r.category.is_emergency())
        .map(|r| (r, haversine_km(center, r.coordinate())))
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(resource, distance_km)| RankedResource {
            resource: resource.clone(),
            distance_km: Some(distance_km),
        })
}

fn with_distance(resource: Resource, center: Coordinate) -> RankedResource {
    let distance_km = haversine_km(center, resource.coordinate());
    RankedResource {
        resource,
        distance_km: Some(distance_km),
    }
}

fn distance_of(ranked: &RankedResource) -> f64 {
    ranked.distance_km.unwrap_or(f64::INFINITY)
}

#[cfg(test)]
mod tests {
    use resource_map_resource_models::ResourceCategory;

    use super::*;

    const CENTER: Coordinate = Coordinate::new(0.0, 0.0);

    /// One degree of latitude is ~111.19 km, so `km` kilometers north of
    /// the origin is `km / 111.19` degrees.
    fn resource_at_km(id: &str, category: ResourceCategory, km: f64) -> Resource {
        Resource {
            id: id.to_string(),
            name: format!("{category} {id}"),
            category,
            address: "Address unavailable".to_string(),
            phone: "N/A".to_string(),
            hours: String::new(),
            wheelchair: false,
            lat: km / (distance::EARTH_RADIUS_KM.to_radians()),
            lng: 0.0,
        }
    }

    fn three_categories() -> Vec<Resource> {
        vec![
            resource_at_km("food", ResourceCategory::Food, 1.0),
            resource_at_km("health", ResourceCategory::Health, 5.0),
            resource_at_km("shelter", ResourceCategory::Shelter, 2.0),
        ]
    }

    #[test]
    fn category_filter_keeps_only_matching() {
        let filter = ResourceFilter {
            category: CategoryFilter::Only(ResourceCategory::Shelter),
            ..ResourceFilter::default()
        };
        let ranked = rank(&three_categories(), &filter, None);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].resource.id, "shelter");
    }

    #[test]
    fn sorts_by_distance_when_centered() {
        let ranked = rank(&three_categories(), &ResourceFilter::default(), Some(CENTER));
        let ids: Vec<_> = ranked.iter().map(|r| r.resource.id.as_str()).collect();
        assert_eq!(ids, vec!["food", "shelter", "health"]);

        let first = ranked[0].distance_km.unwrap();
        assert!((first - 1.0).abs() < 1e-9, "got {first}");
    }

    #[test]
    fn keeps_input_order_without_center() {
        let ranked = rank(&three_categories(), &ResourceFilter::default(), None);
        let ids: Vec<_> = ranked.iter().map(|r| r.resource.id.as_str()).collect();
        assert_eq!(ids, vec!["food", "health", "shelter"]);
        assert!(ranked.iter().all(|r| r.distance_km.is_none()));
    }

    #[test]
    fn wheelchair_and_text_filters() {
        let mut resources = three_categories();
        resources[1].wheelchair = true;
        resources[2].address = "55 Rebecca St, Oakville".to_string();

        let accessible = ResourceFilter {
            wheelchair_only: true,
            ..ResourceFilter::default()
        };
        let ranked = rank(&resources, &accessible, Some(CENTER));
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].resource.id, "health");

        let by_address = ResourceFilter {
            text: "REBECCA".to_string(),
            ..ResourceFilter::default()
        };
        let ranked = rank(&resources, &by_address, Some(CENTER));
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].resource.id, "shelter");

        let padded = ResourceFilter {
            text: "  REBECCA ".to_string(),
            ..ResourceFilter::default()
        };
        assert!(rank(&resources, &padded, Some(CENTER)).is_empty());

        let blank = ResourceFilter {
            text: "   ".to_string(),
            ..ResourceFilter::default()
        };
        assert_eq!(rank(&resources, &blank, None).len(), 3);

        let by_name = ResourceFilter {
            text: "food".to_string(),
            ..ResourceFilter::default()
        };
        assert_eq!(rank(&resources, &by_name, None).len(), 1);
    }

    #[test]
    fn nearest_emergency_skips_food() {
        let nearest = nearest_emergency(&three_categories(), Some(CENTER)).unwrap();
        assert_eq!(nearest.resource.id, "shelter");
        assert!((nearest.distance_km.unwrap() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn nearest_emergency_none_cases() {
        assert!(nearest_emergency(&three_categories(), None).is_none());

        let only_food = vec![
            resource_at_km("food", ResourceCategory::Food, 1.0),
            resource_at_km("other", ResourceCategory::Unclassified, 0.5),
        ];
        assert!(nearest_emergency(&only_food, Some(CENTER)).is_none());
        assert!(nearest_emergency(&[], Some(CENTER)).is_none());
    }

    #[test]
    fn area_center_wins_over_device() {
        let area = Coordinate::new(43.65, -79.38);
        let device = Coordinate::new(43.46, -79.68);
        assert_eq!(active_center(Some(area), Some(device)), Some(area));
        assert_eq!(active_center(None, Some(device)), Some(device));
        assert_eq!(active_center(None, None), None);
    }

    #[test]
    fn category_filter_parsing() {
        assert_eq!("All".parse::<CategoryFilter>().unwrap(), CategoryFilter::All);
        assert_eq!("".parse::<CategoryFilter>().unwrap(), CategoryFilter::All);
        assert_eq!(
            "health".parse::<CategoryFilter>().unwrap(),
            CategoryFilter::Only(ResourceCategory::Health)
        );
        let err = "pharmacy".parse::<CategoryFilter>().unwrap_err();
        assert_eq!(err.value, "pharmacy");
        assert_eq!(
            err.to_string(),
            "unknown category \"pharmacy\": expected All, Food, Health, Shelter or Unclassified"
        );

        let parsed: CategoryFilter = serde_json::from_str("\"Shelter\"").unwrap();
        assert_eq!(parsed, CategoryFilter::Only(ResourceCategory::Shelter));
        assert_eq!(parsed.to_string(), "Shelter");
    }
}
