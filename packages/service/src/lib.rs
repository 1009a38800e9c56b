#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Resource service.
//!
//! Ties the pieces together: resolves the request center and radius,
//! consults the [`ProximityCache`], and on a miss builds the Overpass
//! query, fetches, normalizes and caches the result.
//!
//! Upstream failures are never returned to the caller. Instead the
//! service serves the most recent cached entry (whatever its center) or
//! an empty list, and reports how the data was obtained through
//! [`Freshness`] so callers can tell a degraded answer from a genuinely
//! empty neighborhood.

pub mod config;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use resource_map_cache::{Clock, ProximityCache};
use resource_map_overpass::{ElementSource, normalize, query};
use resource_map_ranking::ResourceFilter;
use resource_map_resource_models::{
    Coordinate, RankedResource, Resource, is_valid_lat, is_valid_lng,
};
use serde::Serialize;
use strum_macros::Display;

pub use config::{ConfigError, ServiceConfig};

/// How a listing was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Freshness {
    /// Fetched from the upstream for this request.
    Live,
    /// Served from the cache within its TTL.
    Cached,
    /// Upstream failed; served the most recent cache entry, which may be
    /// expired or for a different center.
    Stale,
    /// Upstream failed and nothing was cached.
    Unavailable,
}

impl Freshness {
    /// Returns `true` when the upstream failed for this request.
    #[must_use]
    pub const fn is_degraded(self) -> bool {
        matches!(self, Self::Stale | Self::Unavailable)
    }
}

/// Resources around a resolved center.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceListing {
    /// Center the resources were requested for.
    pub center: Coordinate,
    /// Radius the resources were requested for, in meters.
    pub radius_m: u32,
    /// The resources.
    pub resources: Vec<Resource>,
    /// How the resources were obtained.
    pub freshness: Freshness,
    /// When the resources were fetched upstream, if any were.
    pub fetched_at: Option<DateTime<Utc>>,
}

/// A request for resources around an optional center.
///
/// Absent or invalid components fall back to the configured defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ResourceRequest {
    /// Requested latitude.
    pub lat: Option<f64>,
    /// Requested longitude.
    pub lng: Option<f64>,
    /// Requested radius in meters.
    pub radius_m: Option<f64>,
}

impl ResourceRequest {
    /// Returns the caller's own center, if both components are valid.
    ///
    /// This is the center distances are ranked from; the configured
    /// default center is only used to fetch.
    #[must_use]
    pub fn caller_center(&self) -> Option<Coordinate> {
        let lat = self.lat.filter(|v| is_valid_lat(*v))?;
        let lng = self.lng.filter(|v| is_valid_lng(*v))?;
        Some(Coordinate::new(lat, lng))
    }
}

/// Filtered, distance-ranked resources.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedListing {
    /// Center distances were measured from, if the caller gave one.
    pub center: Option<Coordinate>,
    /// Ranked resources, nearest first when a center is known.
    pub resources: Vec<RankedResource>,
    /// How the underlying resources were obtained.
    pub freshness: Freshness,
    /// When the underlying resources were fetched upstream.
    pub fetched_at: Option<DateTime<Utc>>,
}

/// The nearest emergency resource, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct NearestEmergency {
    /// Closest `Health` or `Shelter` resource.
    pub resource: Option<RankedResource>,
    /// How the underlying resources were obtained.
    pub freshness: Freshness,
}

/// Fetches, normalizes and caches community resources.
pub struct ResourceService {
    config: ServiceConfig,
    source: Arc<dyn ElementSource>,
    clock: Arc<dyn Clock>,
    cache: Mutex<ProximityCache>,
}

impl std::fmt::Debug for ResourceService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ResourceService {
    /// Creates a service with an empty cache.
    #[must_use]
    pub fn new(config: ServiceConfig, source: Arc<dyn ElementSource>, clock: Arc<dyn Clock>) -> Self {
        let cache = ProximityCache::new(config.cache_ttl, config.cache_max_entries, clock.clone());
        Self {
            config,
            source,
            clock,
            cache: Mutex::new(cache),
        }
    }

    /// Resolves the center and radius a request will be served for.
    ///
    /// Each coordinate component that is absent or out of range falls
    /// back to the default center's component. The radius is rounded to
    /// whole meters and falls back to the default when absent, non-finite
    /// or below one meter. It is capped at the configured maximum.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn resolve(&self, request: &ResourceRequest) -> (Coordinate, u32) {
        let fallback = self.config.default_center;
        let lat = request.lat.filter(|v| is_valid_lat(*v)).unwrap_or(fallback.lat);
        let lng = request.lng.filter(|v| is_valid_lng(*v)).unwrap_or(fallback.lng);

        let radius_m = request
            .radius_m
            .map(f64::round)
            .filter(|r| r.is_finite() && *r >= 1.0)
            .map_or(self.config.default_radius_m, |r| {
                r.min(f64::from(self.config.max_radius_m)) as u32
            });

        (Coordinate::new(lat, lng), radius_m)
    }

    /// Lists the resources around the request's center.
    ///
    /// Never fails: upstream errors degrade to [`Freshness::Stale`] or
    /// [`Freshness::Unavailable`].
    pub async fn list_resources(&self, request: &ResourceRequest) -> ResourceListing {
        let (center, radius_m) = self.resolve(request);

        let cached = self.lock_cache().get(center, radius_m);
        if let Some(hit) = cached {
            log::debug!(
                "Cache hit for ({}, {}) r={radius_m}m: {} resources",
                center.lat,
                center.lng,
                hit.resources.len()
            );
            return ResourceListing {
                center,
                radius_m,
                resources: hit.resources,
                freshness: Freshness::Cached,
                fetched_at: Some(hit.stored_at),
            };
        }

        let overpass_query = query::build_query(center, radius_m, self.config.query_timeout_secs);

        match self.source.fetch_elements(&overpass_query).await {
            Ok(elements) => {
                let resources = normalize::normalize_elements(&elements);
                let fetched_at = self.clock.now();
                let cached_areas = {
                    let mut cache = self.lock_cache();
                    cache.put(center, radius_m, resources.clone());
                    cache.len()
                };
                log::info!(
                    "Fetched {} resources for ({}, {}) r={radius_m}m, {cached_areas} areas cached",
                    resources.len(),
                    center.lat,
                    center.lng
                );

                ResourceListing {
                    center,
                    radius_m,
                    resources,
                    freshness: Freshness::Live,
                    fetched_at: Some(fetched_at),
                }
            }
            Err(e) => {
                log::warn!("Overpass fetch failed, serving fallback: {e}");
                let fallback = self.lock_cache().any_entry();

                match fallback {
                    Some(entry) => ResourceListing {
                        center,
                        radius_m,
                        resources: entry.resources,
                        freshness: Freshness::Stale,
                        fetched_at: Some(entry.stored_at),
                    },
                    None => ResourceListing {
                        center,
                        radius_m,
                        resources: Vec::new(),
                        freshness: Freshness::Unavailable,
                        fetched_at: None,
                    },
                }
            }
        }
    }

    /// Lists, filters and ranks resources by distance from the caller's
    /// center.
    pub async fn ranked(&self, request: &ResourceRequest, filter: &ResourceFilter) -> RankedListing {
        let listing = self.list_resources(request).await;
        let center = request.caller_center();

        RankedListing {
            center,
            resources: resource_map_ranking::rank(&listing.resources, filter, center),
            freshness: listing.freshness,
            fetched_at: listing.fetched_at,
        }
    }

    /// Finds the closest `Health` or `Shelter` resource to the caller's
    /// center.
    ///
    /// Without caller coordinates there is no active center, so no
    /// resource is selected and nothing is fetched.
    pub async fn nearest_emergency(&self, request: &ResourceRequest) -> Option<NearestEmergency> {
        let center = request.caller_center()?;
        let listing = self.list_resources(request).await;

        Some(NearestEmergency {
            resource: resource_map_ranking::nearest_emergency(&listing.resources, Some(center)),
            freshness: listing.freshness,
        })
    }

    fn lock_cache(&self) -> MutexGuard<'_, ProximityCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
