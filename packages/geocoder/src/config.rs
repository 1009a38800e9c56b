//! Nominatim service configuration.
//!
//! Defaults are embedded from `services/nominatim.toml`;
//! `NOMINATIM_URL` overrides the search endpoint at runtime.

use serde::Deserialize;

const NOMINATIM_TOML: &str = include_str!("../services/nominatim.toml");

/// Environment variable overriding [`NominatimConfig::base_url`].
pub const BASE_URL_ENV: &str = "NOMINATIM_URL";

/// Nominatim configuration loaded from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct NominatimConfig {
    /// Unique identifier (`"nominatim"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Search endpoint (e.g. `"https://nominatim.openstreetmap.org/search"`).
    pub base_url: String,
    /// `User-Agent` required by the Nominatim usage policy.
    pub user_agent: String,
    /// Maximum number of matches requested.
    #[serde(default = "default_limit")]
    pub limit: u32,
}

const fn default_limit() -> u32 {
    1
}

impl NominatimConfig {
    /// Returns the embedded configuration.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML is malformed (a build-time guarantee
    /// since the file is compiled in).
    #[must_use]
    pub fn embedded() -> Self {
        toml::de::from_str(NOMINATIM_TOML)
            .unwrap_or_else(|e| panic!("Failed to parse embedded nominatim.toml: {e}"))
    }

    /// Returns the embedded configuration with environment overrides
    /// applied.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::embedded();
        if let Some(url) = std::env::var(BASE_URL_ENV).ok().filter(|u| !u.is_empty()) {
            log::info!("Using Nominatim endpoint from {BASE_URL_ENV}: {url}");
            config.base_url = url;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_config_is_complete() {
        let config = NominatimConfig::embedded();
        assert_eq!(config.id, "nominatim");
        assert!(!config.name.is_empty());
        assert!(!config.base_url.is_empty());
        assert!(!config.user_agent.is_empty());
        assert_eq!(config.limit, 1);
    }
}
