#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Free-text geocoding for the resource map.
//!
//! Resolves a place name such as `"Toronto"` to coordinates and a display
//! label so it can become the active search center. The upstream lookup
//! sits behind [`PlaceLookup`]; [`nominatim::NominatimClient`] is the
//! production implementation.
//!
//! [`geocode`] distinguishes three outcomes:
//!
//! * `Ok(Some(place))` — the first (best) match,
//! * `Ok(None)` — the upstream answered but found nothing,
//! * `Err(_)` — the query was blank or the request itself failed.

pub mod config;
pub mod nominatim;

use async_trait::async_trait;
use thiserror::Error;

pub use config::NominatimConfig;
pub use nominatim::NominatimClient;

/// A geocoded place.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedPlace {
    /// Latitude (WGS84).
    pub lat: f64,
    /// Longitude (WGS84).
    pub lng: f64,
    /// Human-readable label for the match.
    pub label: String,
}

/// Errors from geocoding operations.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// The query was empty or whitespace-only.
    #[error("Geocode query is empty")]
    EmptyQuery,

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status.
    #[error("Geocoder returned HTTP {status}")]
    Status {
        /// The HTTP status code.
        status: u16,
    },

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },
}

/// An upstream free-text place search.
#[async_trait]
pub trait PlaceLookup: Send + Sync {
    /// Searches for `query` (already trimmed and non-empty) and returns
    /// the raw upstream JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the request fails or the upstream
    /// answers with a non-success status.
    async fn search(&self, query: &str) -> Result<serde_json::Value, GeocodeError>;
}

/// Geocodes a free-text query, returning the best match.
///
/// Blank queries are rejected before `lookup` is called.
///
/// # Errors
///
/// Returns [`GeocodeError::EmptyQuery`] for a blank query, or any error
/// from the lookup or from parsing its response.
pub async fn geocode(
    lookup: &dyn PlaceLookup,
    query: &str,
) -> Result<Option<GeocodedPlace>, GeocodeError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(GeocodeError::EmptyQuery);
    }

    let body = lookup.search(query).await?;
    let place = nominatim::parse_response(&body, query)?;

    match &place {
        Some(hit) => log::debug!("Geocoded {query:?} to ({}, {})", hit.lat, hit.lng),
        None => log::debug!("No geocoding match for {query:?}"),
    }

    Ok(place)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct FixtureLookup {
        body: serde_json::Value,
        calls: AtomicUsize,
    }

    impl FixtureLookup {
        fn new(body: serde_json::Value) -> Self {
            Self {
                body,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PlaceLookup for FixtureLookup {
        async fn search(&self, _query: &str) -> Result<serde_json::Value, GeocodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.body.clone())
        }
    }

    struct FailingLookup;

    #[async_trait]
    impl PlaceLookup for FailingLookup {
        async fn search(&self, _query: &str) -> Result<serde_json::Value, GeocodeError> {
            Err(GeocodeError::Status { status: 503 })
        }
    }

    #[tokio::test]
    async fn geocodes_toronto() {
        let lookup = FixtureLookup::new(serde_json::json!([{
            "lat": "43.6534817",
            "lon": "-79.3839347",
            "display_name": "Toronto, Golden Horseshoe, Ontario, Canada"
        }]));

        let place = geocode(&lookup, "Toronto").await.unwrap().unwrap();
        assert!((place.lat - 43.653_481_7).abs() < 1e-9);
        assert!((place.lng - -79.383_934_7).abs() < 1e-9);
        assert_eq!(place.label, "Toronto, Golden Horseshoe, Ontario, Canada");
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn blank_query_never_reaches_lookup() {
        let lookup = FixtureLookup::new(serde_json::json!([]));

        assert!(matches!(
            geocode(&lookup, "").await,
            Err(GeocodeError::EmptyQuery)
        ));
        assert!(matches!(
            geocode(&lookup, "   ").await,
            Err(GeocodeError::EmptyQuery)
        ));
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn no_match_is_not_an_error() {
        let lookup = FixtureLookup::new(serde_json::json!([]));
        assert!(geocode(&lookup, "Atlantis").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn upstream_failure_is_an_error() {
        assert!(matches!(
            geocode(&FailingLookup, "Toronto").await,
            Err(GeocodeError::Status { status: 503 })
        ));
    }
}
