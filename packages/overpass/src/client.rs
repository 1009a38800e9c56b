//! HTTP client for the Overpass interpreter.
//!
//! Queries are posted as the form field `data`, which is what the
//! interpreter expects for queries too long for a GET URL.
//!
//! See <https://wiki.openstreetmap.org/wiki/Overpass_API>

use async_trait::async_trait;

use crate::{ElementSource, OverpassConfig, OverpassElement, OverpassError, element, retry};

/// [`ElementSource`] backed by a live Overpass interpreter.
#[derive(Debug, Clone)]
pub struct OverpassClient {
    client: reqwest::Client,
    config: OverpassConfig,
}

impl OverpassClient {
    /// Creates a client for the given configuration.
    #[must_use]
    pub const fn new(client: reqwest::Client, config: OverpassConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl ElementSource for OverpassClient {
    async fn fetch_elements(&self, query: &str) -> Result<Vec<OverpassElement>, OverpassError> {
        log::debug!("Posting Overpass query to {}", self.config.base_url);

        let body = retry::send_json(
            || {
                self.client
                    .post(&self.config.base_url)
                    .header(reqwest::header::USER_AGENT, &self.config.user_agent)
                    .form(&[("data", query)])
            },
            self.config.max_retries,
        )
        .await?;

        let elements = element::parse_elements(&body)?;
        log::info!("Overpass returned {} elements", elements.len());
        Ok(elements)
    }
}
