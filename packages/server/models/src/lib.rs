#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the resource map server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the domain types so the API contract can evolve independently.
//! The client deserializes the same types.

use chrono::{DateTime, Utc};
use resource_map_resource_models::{Coordinate, RankedResource};
use serde::{Deserialize, Serialize};

/// Response header naming how a resource listing was obtained.
pub const FRESHNESS_HEADER: &str = "X-Resource-Freshness";

/// Response header with the RFC 3339 time the listing was fetched
/// upstream.
pub const FETCHED_AT_HEADER: &str = "X-Resource-Fetched-At";

/// Query parameters for the resource endpoints.
///
/// Numbers arrive as raw strings so that malformed values fall back to
/// defaults instead of failing the request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceQueryParams {
    /// Latitude of the search center.
    pub lat: Option<String>,
    /// Longitude of the search center.
    pub lng: Option<String>,
    /// Search radius in meters.
    pub radius: Option<String>,
    /// `All` or a category name.
    pub category: Option<String>,
    /// `true`/`1`/`yes` to keep only wheelchair-accessible resources.
    pub wheelchair: Option<String>,
    /// Case-insensitive text matched against name or address.
    pub q: Option<String>,
}

impl ResourceQueryParams {
    /// Parsed latitude, if present and numeric.
    #[must_use]
    pub fn lat(&self) -> Option<f64> {
        parse_number(self.lat.as_deref())
    }

    /// Parsed longitude, if present and numeric.
    #[must_use]
    pub fn lng(&self) -> Option<f64> {
        parse_number(self.lng.as_deref())
    }

    /// Parsed radius, if present and numeric.
    #[must_use]
    pub fn radius(&self) -> Option<f64> {
        parse_number(self.radius.as_deref())
    }

    /// Whether the wheelchair filter was requested.
    #[must_use]
    pub fn wheelchair_only(&self) -> bool {
        self.wheelchair.as_deref().is_some_and(|v| {
            let v = v.trim();
            v == "1" || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes")
        })
    }
}

fn parse_number(value: Option<&str>) -> Option<f64> {
    value?.trim().parse().ok()
}

/// Query parameters for the geocode endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeocodeQueryParams {
    /// Free-text place query.
    pub q: Option<String>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the server is healthy.
    pub healthy: bool,
    /// Server version.
    pub version: String,
}

/// Error body for non-2xx responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable message.
    pub error: String,
}

impl ApiError {
    /// Creates an error body.
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Geocode response: either a match or `{ "found": false }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiGeocodeResponse {
    /// Whether a match was found.
    pub found: bool,
    /// Latitude of the match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    /// Longitude of the match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    /// Display label of the match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl ApiGeocodeResponse {
    /// A successful match.
    #[must_use]
    pub const fn found(lat: f64, lng: f64, label: String) -> Self {
        Self {
            found: true,
            lat: Some(lat),
            lng: Some(lng),
            label: Some(label),
        }
    }

    /// No match.
    #[must_use]
    pub const fn not_found() -> Self {
        Self {
            found: false,
            lat: None,
            lng: None,
            label: None,
        }
    }

    /// Returns the matched coordinate, if any.
    #[must_use]
    pub fn coordinate(&self) -> Option<Coordinate> {
        match (self.found, self.lat, self.lng) {
            (true, Some(lat), Some(lng)) => Some(Coordinate::new(lat, lng)),
            _ => None,
        }
    }
}

/// Filtered, ranked resources.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRankedResponse {
    /// Center distances were measured from, if the caller gave one.
    pub center: Option<Coordinate>,
    /// `live`, `cached`, `stale` or `unavailable`.
    pub freshness: String,
    /// When the resources were fetched upstream.
    pub fetched_at: Option<DateTime<Utc>>,
    /// Ranked resources.
    pub resources: Vec<RankedResource>,
}

/// Nearest emergency resource response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiNearestResponse {
    /// Whether an emergency resource was found.
    pub found: bool,
    /// The closest `Health` or `Shelter` resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<RankedResource>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geocode_not_found_is_bare() {
        let json = serde_json::to_value(ApiGeocodeResponse::not_found()).unwrap();
        assert_eq!(json, serde_json::json!({ "found": false }));
    }

    #[test]
    fn geocode_found_shape() {
        let json = serde_json::to_value(ApiGeocodeResponse::found(
            43.65,
            -79.38,
            "Toronto".to_string(),
        ))
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "found": true, "lat": 43.65, "lng": -79.38, "label": "Toronto" })
        );

        let back: ApiGeocodeResponse = serde_json::from_value(json).unwrap();
        assert_eq!(back.coordinate(), Some(Coordinate::new(43.65, -79.38)));
    }

    #[test]
    fn malformed_numbers_are_ignored() {
        let params = ResourceQueryParams {
            lat: Some("43.5".to_string()),
            lng: Some("west".to_string()),
            radius: Some(" 2500 ".to_string()),
            wheelchair: Some("Yes".to_string()),
            ..ResourceQueryParams::default()
        };
        assert_eq!(params.lat(), Some(43.5));
        assert_eq!(params.lng(), None);
        assert_eq!(params.radius(), Some(2500.0));
        assert!(params.wheelchair_only());
        assert!(!ResourceQueryParams::default().wheelchair_only());
    }
}
