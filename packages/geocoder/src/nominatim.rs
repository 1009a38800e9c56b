//! Nominatim / `OpenStreetMap` geocoder client.
//!
//! Nominatim has strict usage rules: an identifying `User-Agent` and at
//! most **1 request per second** on the public instance. This client
//! sends one request per user search and does not retry.
//!
//! See <https://nominatim.org/release-docs/develop/api/Search/>

use async_trait::async_trait;

use crate::{GeocodeError, GeocodedPlace, NominatimConfig, PlaceLookup};

/// [`PlaceLookup`] backed by a Nominatim search endpoint.
#[derive(Debug, Clone)]
pub struct NominatimClient {
    client: reqwest::Client,
    config: NominatimConfig,
}

impl NominatimClient {
    /// Creates a client for the given configuration.
    #[must_use]
    pub const fn new(client: reqwest::Client, config: NominatimConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl PlaceLookup for NominatimClient {
    async fn search(&self, query: &str) -> Result<serde_json::Value, GeocodeError> {
        let limit = self.config.limit.to_string();

        let resp = self
            .client
            .get(&self.config.base_url)
            .header(reqwest::header::USER_AGENT, &self.config.user_agent)
            .query(&[
                ("format", "json"),
                ("q", query),
                ("limit", limit.as_str()),
                ("addressdetails", "1"),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(GeocodeError::Status {
                status: resp.status().as_u16(),
            });
        }

        let text = resp.text().await?;
        serde_json::from_str(&text).map_err(|e| GeocodeError::Parse {
            message: format!("JSON parse failed: {e}"),
        })
    }
}

/// Parses a Nominatim `format=json` response, returning the first match.
///
/// `query` labels the match when Nominatim omits `display_name`.
///
/// # Errors
///
/// Returns [`GeocodeError::Parse`] if the body is not an array or the
/// first match lacks numeric coordinates.
pub fn parse_response(
    body: &serde_json::Value,
    query: &str,
) -> Result<Option<GeocodedPlace>, GeocodeError> {
    let results = body.as_array().ok_or_else(|| GeocodeError::Parse {
        message: "Nominatim response is not an array".to_string(),
    })?;

    let Some(first) = results.first() else {
        return Ok(None);
    };

    let lat = coordinate(&first["lat"]).ok_or_else(|| GeocodeError::Parse {
        message: "Missing lat in Nominatim response".to_string(),
    })?;

    let lng = coordinate(&first["lon"]).ok_or_else(|| GeocodeError::Parse {
        message: "Missing lon in Nominatim response".to_string(),
    })?;

    let label = first["display_name"]
        .as_str()
        .filter(|s| !s.is_empty())
        .unwrap_or(query)
        .to_string();

    Ok(Some(GeocodedPlace { lat, lng, label }))
}

/// Nominatim encodes coordinates as strings; accept plain numbers too.
fn coordinate(value: &serde_json::Value) -> Option<f64> {
    value
        .as_str()
        .and_then(|s| s.trim().parse::<f64>().ok())
        .or_else(|| value.as_f64())
        .filter(|v| v.is_finite())
}
