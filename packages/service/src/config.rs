//! Resource service configuration.
//!
//! Built from defaults and overridden by `RESOURCE_MAP_*` environment
//! variables. Invalid values are rejected at startup rather than
//! silently ignored.

use std::time::Duration;

use resource_map_cache::{DEFAULT_MAX_ENTRIES, DEFAULT_TTL};
use resource_map_resource_models::Coordinate;

/// Center used when a request carries no usable coordinates (Oakville,
/// Ontario).
pub const DEFAULT_CENTER: Coordinate = Coordinate::new(43.4675, -79.6877);

/// Search radius used when a request carries none, in meters.
pub const DEFAULT_RADIUS_M: u32 = 7000;

/// Upper bound on the search radius, in meters.
pub const MAX_RADIUS_M: u32 = 50_000;

/// Server-side Overpass timeout used when none is configured.
pub const DEFAULT_QUERY_TIMEOUT_SECS: u32 = 25;

/// Errors from loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An environment variable held an unusable value.
    #[error("Invalid value {value:?} for {name}: {reason}")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// The rejected value.
        value: String,
        /// Why it was rejected.
        reason: &'static str,
    },
}

/// Resource service settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    /// Fallback center for requests without coordinates.
    pub default_center: Coordinate,
    /// Fallback radius in meters.
    pub default_radius_m: u32,
    /// Requested radii are clamped to this many meters.
    pub max_radius_m: u32,
    /// Server-side timeout embedded in each Overpass query.
    pub query_timeout_secs: u32,
    /// Lifetime of cached results.
    pub cache_ttl: Duration,
    /// Maximum number of cached center/radius entries.
    pub cache_max_entries: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            default_center: DEFAULT_CENTER,
            default_radius_m: DEFAULT_RADIUS_M,
            max_radius_m: MAX_RADIUS_M,
            query_timeout_secs: DEFAULT_QUERY_TIMEOUT_SECS,
            cache_ttl: DEFAULT_TTL,
            cache_max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

impl ServiceConfig {
    /// Returns the defaults with `RESOURCE_MAP_*` overrides applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a variable is set but cannot be
    /// parsed or is out of range.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`Self::from_env`] but reads variables through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] on an unusable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(lat) = parse_var::<f64, _>(&lookup, "RESOURCE_MAP_DEFAULT_LAT")? {
            config.default_center.lat = lat;
        }
        if let Some(lng) = parse_var::<f64, _>(&lookup, "RESOURCE_MAP_DEFAULT_LNG")? {
            config.default_center.lng = lng;
        }
        if !config.default_center.is_valid() {
            return Err(ConfigError::Invalid {
                name: "RESOURCE_MAP_DEFAULT_LAT/RESOURCE_MAP_DEFAULT_LNG",
                value: format!("{:?}", config.default_center),
                reason: "not a valid coordinate",
            });
        }

        if let Some(radius) = parse_var(&lookup, "RESOURCE_MAP_DEFAULT_RADIUS_M")? {
            config.default_radius_m = radius;
        }
        if let Some(max) = parse_var(&lookup, "RESOURCE_MAP_MAX_RADIUS_M")? {
            config.max_radius_m = max;
        }
        if config.default_radius_m == 0 || config.default_radius_m > config.max_radius_m {
            return Err(ConfigError::Invalid {
                name: "RESOURCE_MAP_DEFAULT_RADIUS_M",
                value: config.default_radius_m.to_string(),
                reason: "must be between 1 and the maximum radius",
            });
        }

        if let Some(secs) = parse_var(&lookup, "RESOURCE_MAP_CACHE_TTL_SECS")? {
            config.cache_ttl = Duration::from_secs(secs);
        }
        if let Some(max) = parse_var(&lookup, "RESOURCE_MAP_CACHE_MAX_ENTRIES")? {
            config.cache_max_entries = max;
        }

        Ok(config)
    }
}

fn parse_var<T, F>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(name).filter(|v| !v.trim().is_empty()) else {
        return Ok(None);
    };

    value
        .trim()
        .parse()
        .map(Some)
        .map_err(|_| ConfigError::Invalid {
            name,
            value,
            reason: "could not be parsed",
        })
}
