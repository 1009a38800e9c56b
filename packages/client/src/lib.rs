#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! HTTP client for the resource map backend.
//!
//! Fetches resources and geocodes areas through the server API. Every
//! successful resource fetch is persisted to a [`SnapshotStore`]; when
//! the backend cannot be reached the last snapshot is served instead,
//! and the listing says so through [`ListingOrigin`].

pub mod snapshot;

use resource_map_resource_models::{Coordinate, Resource};
use resource_map_server_models::{ApiError, ApiGeocodeResponse, FRESHNESS_HEADER};
use thiserror::Error;

pub use snapshot::SnapshotStore;

/// Backend used when none is configured.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5000";

/// Environment variable overriding the backend URL.
pub const BACKEND_URL_ENV: &str = "RESOURCE_MAP_BACKEND_URL";

/// Radius the client requests resources for, in meters.
pub const DEFAULT_RADIUS_M: u32 = 7000;

/// Errors from backend and snapshot operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("Backend returned HTTP {status}: {message}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// Error message from the body, if any.
        message: String,
    },

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Snapshot file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The geocode query was empty or whitespace-only.
    #[error("Search text is empty")]
    EmptyQuery,
}

/// Where a listing's resources came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingOrigin {
    /// Fetched from the backend.
    Backend,
    /// Backend unreachable; served the persisted snapshot.
    Snapshot,
    /// Backend unreachable and no snapshot exists.
    Empty,
}

/// Resources as seen by the client.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientListing {
    /// The resources.
    pub resources: Vec<Resource>,
    /// Where they came from.
    pub origin: ListingOrigin,
    /// The backend's freshness header, when fetched from the backend.
    pub freshness: Option<String>,
}

impl ClientListing {
    /// Returns `true` when the resources may not reflect the current
    /// area: served offline, or the backend itself fell back.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.origin != ListingOrigin::Backend
            || matches!(self.freshness.as_deref(), Some("stale" | "unavailable"))
    }
}

/// A geocoded area.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedArea {
    /// Center of the area.
    pub center: Coordinate,
    /// Display label, or the search text when the backend gave none.
    pub label: String,
}

/// Client for the resource map backend.
#[derive(Debug, Clone)]
pub struct ResourceMapClient {
    client: reqwest::Client,
    base_url: String,
    snapshot: SnapshotStore,
}

impl ResourceMapClient {
    /// Creates a client for `base_url` persisting to `snapshot`.
    #[must_use]
    pub fn new(base_url: impl Into<String>, snapshot: SnapshotStore) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            snapshot,
        }
    }

    /// Creates a client from `RESOURCE_MAP_BACKEND_URL` and
    /// `RESOURCE_MAP_SNAPSHOT_PATH`, falling back to the defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let base_url = std::env::var(BACKEND_URL_ENV)
            .ok()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());
        Self::new(base_url, SnapshotStore::from_env())
    }

    /// Returns the backend base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches resources around `center` (or the backend's default center).
    ///
    /// Never fails: if the backend cannot be reached the persisted
    /// snapshot is returned, else an empty list.
    pub async fn fetch_resources(&self, center: Option<Coordinate>, radius_m: u32) -> ClientListing {
        match self.request_resources(center, radius_m).await {
            Ok((resources, freshness)) => {
                if let Err(e) = self.snapshot.save(&resources) {
                    log::warn!(
                        "Failed to save snapshot to {}: {e}",
                        self.snapshot.path().display()
                    );
                }
                ClientListing {
                    resources,
                    origin: ListingOrigin::Backend,
                    freshness,
                }
            }
            Err(e) => {
                log::warn!("Backend unavailable, using offline snapshot: {e}");
                self.offline_listing()
            }
        }
    }

    /// Geocodes free-text `query` through the backend.
    ///
    /// Returns `Ok(None)` when the backend found no match.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::EmptyQuery`] for blank input, or any error
    /// reaching the backend or decoding its answer.
    pub async fn geocode(&self, query: &str) -> Result<Option<GeocodedArea>, ClientError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ClientError::EmptyQuery);
        }

        let resp = self
            .client
            .get(format!("{}/geocode", self.base_url))
            .query(&[("q", query)])
            .send()
            .await?;

        let status = resp.status();
        let body = resp.bytes().await?;

        if !status.is_success() {
            return Err(status_error(status.as_u16(), &body));
        }

        let answer: ApiGeocodeResponse = serde_json::from_slice(&body)?;
        Ok(answer.coordinate().map(|center| GeocodedArea {
            center,
            label: answer
                .label
                .filter(|l| !l.trim().is_empty())
                .unwrap_or_else(|| query.to_string()),
        }))
    }

    async fn request_resources(
        &self,
        center: Option<Coordinate>,
        radius_m: u32,
    ) -> Result<(Vec<Resource>, Option<String>), ClientError> {
        let mut params = vec![("radius", radius_m.to_string())];
        if let Some(center) = center {
            params.push(("lat", center.lat.to_string()));
            params.push(("lng", center.lng.to_string()));
        }

        let resp = self
            .client
            .get(format!("{}/resources", self.base_url))
            .query(&params)
            .send()
            .await?;

        let status = resp.status();
        let freshness = resp
            .headers()
            .get(FRESHNESS_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = resp.bytes().await?;

        if !status.is_success() {
            return Err(status_error(status.as_u16(), &body));
        }

        Ok((parse_resources(&body)?, freshness))
    }

    fn offline_listing(&self) -> ClientListing {
        let snapshot = self.snapshot.load().unwrap_or_else(|e| {
            log::warn!(
                "Ignoring unreadable snapshot {}: {e}",
                self.snapshot.path().display()
            );
            None
        });

        match snapshot {
            Some(resources) => ClientListing {
                resources,
                origin: ListingOrigin::Snapshot,
                freshness: None,
            },
            None => ClientListing {
                resources: Vec::new(),
                origin: ListingOrigin::Empty,
                freshness: None,
            },
        }
    }
}

/// Decodes a `/resources` body. Anything but an array is an empty list.
fn parse_resources(body: &[u8]) -> Result<Vec<Resource>, ClientError> {
    let value: serde_json::Value = serde_json::from_slice(body)?;
    if !value.is_array() {
        log::debug!("Backend answered with a non-array resource body");
        return Ok(Vec::new());
    }
    Ok(serde_json::from_value(value)?)
}

fn status_error(status: u16, body: &[u8]) -> ClientError {
    let message = serde_json::from_slice::<ApiError>(body)
        .map(|e| e.error)
        .unwrap_or_default();
    ClientError::Status { status, message }
}
