#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Overpass (`OpenStreetMap`) access for community resources.
//!
//! Builds the radius query for every aid category ([`query`]), fetches
//! raw elements from the Overpass interpreter ([`client`]), and
//! normalizes each tagged element into a canonical
//! [`resource_map_resource_models::Resource`] ([`normalize`]).
//!
//! The fetch side is abstracted behind [`ElementSource`] so callers can
//! substitute a fixture-backed source in tests.

pub mod client;
pub mod config;
pub mod element;
pub mod normalize;
pub mod query;
pub mod retry;

use async_trait::async_trait;

pub use client::OverpassClient;
pub use config::OverpassConfig;
pub use element::{ElementCenter, OverpassElement, Tags};

/// Errors from Overpass operations.
#[derive(Debug, thiserror::Error)]
pub enum OverpassError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status.
    #[error("Overpass returned HTTP {status}")]
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

/// A source of raw Overpass elements for a query.
#[async_trait]
pub trait ElementSource: Send + Sync {
    /// Runs the Overpass QL `query` and returns the raw elements.
    ///
    /// # Errors
    ///
    /// Returns [`OverpassError`] if the request fails, the upstream
    /// answers with a non-success status, or the body cannot be parsed.
    async fn fetch_elements(&self, query: &str) -> Result<Vec<OverpassElement>, OverpassError>;
}
