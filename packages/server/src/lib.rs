#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the community resource map.
//!
//! Serves nearby community resources (food banks, soup kitchens,
//! shelters, hospitals) fetched from Overpass through the
//! [`ResourceService`], distance-ranked listings, the nearest emergency
//! resource, and free-text geocoding through Nominatim.
//!
//! Resource endpoints always answer 200. How the data was obtained is
//! reported in the `X-Resource-Freshness` header.

mod handlers;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use resource_map_cache::SystemClock;
use resource_map_geocoder::{NominatimClient, NominatimConfig, PlaceLookup};
use resource_map_overpass::{OverpassClient, OverpassConfig};
use resource_map_service::{ConfigError, ResourceService};

/// Port used when `PORT` is unset or invalid.
pub const DEFAULT_PORT: u16 = 5000;

/// Shared application state.
pub struct AppState {
    /// Resource fetching, caching and ranking.
    pub service: Arc<ResourceService>,
    /// Free-text place lookup.
    pub geocoder: Arc<dyn PlaceLookup>,
}

impl AppState {
    /// Builds the production state: live Overpass and Nominatim clients
    /// configured from the embedded service definitions and environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a `RESOURCE_MAP_*` variable is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let overpass = OverpassConfig::from_env();
        let nominatim = NominatimConfig::from_env();

        let config = resource_map_service::ServiceConfig {
            query_timeout_secs: overpass.timeout_secs,
            ..resource_map_service::ServiceConfig::from_env()?
        };

        log::info!("Overpass endpoint: {}", overpass.base_url);
        log::info!("Nominatim endpoint: {}", nominatim.base_url);
        log::info!(
            "Default center ({}, {}), radius {}m, cache TTL {}s",
            config.default_center.lat,
            config.default_center.lng,
            config.default_radius_m,
            config.cache_ttl.as_secs()
        );

        let http = reqwest::Client::new();
        let source = Arc::new(OverpassClient::new(http.clone(), overpass));
        let service = ResourceService::new(config, source, Arc::new(SystemClock));

        Ok(Self {
            service: Arc::new(service),
            geocoder: Arc::new(NominatimClient::new(http, nominatim)),
        })
    }
}

/// Registers every API route.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(handlers::index))
        .route("/health", web::get().to(handlers::health))
        .route("/resources", web::get().to(handlers::resources))
        .route("/resources/ranked", web::get().to(handlers::ranked))
        .route(
            "/resources/nearest-emergency",
            web::get().to(handlers::nearest_emergency),
        )
        .route("/geocode", web::get().to(handlers::geocode));
}

/// Starts the resource map API server.
///
/// Builds the application state from the environment and starts the
/// Actix-Web HTTP server on `BIND_ADDR`:`PORT` (default
/// `127.0.0.1:5000`). This is a regular async function; the caller is
/// responsible for providing the async runtime (e.g. via
/// `#[actix_web::main]`) and for initializing logging.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the configuration is invalid,
/// the HTTP server fails to bind, or it encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    let state = web::Data::new(AppState::from_env().map_err(std::io::Error::other)?);

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(routes)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
