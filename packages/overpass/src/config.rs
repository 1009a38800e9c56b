//! Overpass service configuration.
//!
//! The defaults live in `services/overpass.toml`, embedded at compile
//! time. `OVERPASS_URL` overrides the interpreter endpoint at runtime
//! (useful for a self-hosted instance or a local mirror).

use serde::Deserialize;

const OVERPASS_TOML: &str = include_str!("../services/overpass.toml");

/// Environment variable overriding [`OverpassConfig::base_url`].
pub const BASE_URL_ENV: &str = "OVERPASS_URL";

/// Overpass interpreter configuration loaded from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct OverpassConfig {
    /// Unique identifier (`"overpass"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Interpreter endpoint the query is posted to.
    pub base_url: String,
    /// `User-Agent` sent with every request.
    pub user_agent: String,
    /// Server-side timeout declared in the query header.
    pub timeout_secs: u32,
    /// Retries for transient failures.
    #[serde(default)]
    pub max_retries: u32,
}

impl OverpassConfig {
    /// Returns the embedded configuration.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML is malformed (a build-time guarantee
    /// since the file is compiled in).
    #[must_use]
    pub fn embedded() -> Self {
        toml::de::from_str(OVERPASS_TOML)
            .unwrap_or_else(|e| panic!("Failed to parse embedded overpass.toml: {e}"))
    }

    /// Returns the embedded configuration with environment overrides
    /// applied.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::embedded();
        if let Some(url) = std::env::var(BASE_URL_ENV).ok().filter(|u| !u.is_empty()) {
            log::info!("Using Overpass endpoint from {BASE_URL_ENV}: {url}");
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
        let config = OverpassConfig::embedded();
        assert_eq!(config.id, "overpass");
        assert!(!config.name.is_empty());
        assert!(config.base_url.starts_with("https://"));
        assert!(!config.user_agent.is_empty());
        assert_eq!(config.timeout_secs, 25);
    }
}
