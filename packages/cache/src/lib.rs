#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Proximity cache for normalized resources.
//!
//! Results are keyed by the query center rounded to three decimal places
//! (about 110 m) plus the exact radius, so nearby requests share one
//! upstream query. Entries expire lazily: an entry older than the TTL is
//! dropped when it is next read. The cache is bounded; inserting a new
//! key into a full cache first purges expired entries and then evicts
//! the oldest one.
//!
//! Time comes from an injected [`Clock`] so expiry can be tested without
//! sleeping.

pub mod clock;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use resource_map_resource_models::{Coordinate, Resource};

pub use clock::{Clock, ManualClock, SystemClock};

/// Default entry lifetime.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Default maximum number of entries.
pub const DEFAULT_MAX_ENTRIES: usize = 1024;

/// Cache key: center rounded to thousandths of a degree plus radius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CacheKey {
    lat_e3: i64,
    lng_e3: i64,
    radius_m: u32,
}

impl CacheKey {
    /// Builds the key for a query center and radius.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn new(center: Coordinate, radius_m: u32) -> Self {
        Self {
            lat_e3: (center.lat * 1000.0).round() as i64,
            lng_e3: (center.lng * 1000.0).round() as i64,
            radius_m,
        }
    }
}

/// A cached resource list and when it was stored.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedResources {
    /// The stored resources.
    pub resources: Vec<Resource>,
    /// When the entry was stored.
    pub stored_at: DateTime<Utc>,
}

/// Bounded TTL cache of resource lists.
#[derive(Debug)]
pub struct ProximityCache {
    entries: BTreeMap<CacheKey, CachedResources>,
    ttl: TimeDelta,
    max_entries: usize,
    clock: Arc<dyn Clock>,
}

impl ProximityCache {
    /// Creates an empty cache.
    ///
    /// A `max_entries` of zero is treated as one.
    #[must_use]
    pub fn new(ttl: Duration, max_entries: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: BTreeMap::new(),
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
            max_entries: max_entries.max(1),
            clock,
        }
    }

    /// Returns the cached resources for `center`/`radius_m` if they were
    /// stored less than one TTL ago.
    ///
    /// An expired entry is removed and reported as a miss.
    pub fn get(&mut self, center: Coordinate, radius_m: u32) -> Option<CachedResources> {
        let key = CacheKey::new(center, radius_m);
        let now = self.clock.now();

        let entry = self.entries.get(&key)?;
        if self.is_fresh(entry, now) {
            return Some(entry.clone());
        }

        log::debug!("Cache entry {key:?} expired");
        self.entries.remove(&key);
        None
    }

    /// Stores `resources` for `center`/`radius_m`, replacing any previous
    /// entry for the same key.
    pub fn put(&mut self, center: Coordinate, radius_m: u32, resources: Vec<Resource>) {
        let key = CacheKey::new(center, radius_m);
        let now = self.clock.now();

        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            self.make_room(now);
        }

        self.entries.insert(
            key,
            CachedResources {
                resources,
                stored_at: now,
            },
        );
    }

    /// Returns the most recently stored entry regardless of key or age.
    ///
    /// Used as a best-effort fallback when the upstream is unreachable.
    #[must_use]
    pub fn any_entry(&self) -> Option<CachedResources> {
        self.entries
            .values()
            .max_by_key(|entry| entry.stored_at)
            .cloned()
    }

    /// Returns the number of stored entries, including expired ones not
    /// yet purged.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn is_fresh(&self, entry: &CachedResources, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(entry.stored_at) < self.ttl
    }

    fn make_room(&mut self, now: DateTime<Utc>) {
        let ttl = self.ttl;
        self.entries
            .retain(|_, entry| now.signed_duration_since(entry.stored_at) < ttl);

        if self.entries.len() < self.max_entries {
            return;
        }

        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.stored_at)
            .map(|(key, _)| *key);

        if let Some(key) = oldest {
            log::debug!("Cache full, evicting {key:?}");
            self.entries.remove(&key);
        }
    }
}
