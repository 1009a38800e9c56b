#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line interface for the community resource map.
//!
//! Starts the API server, or talks to a running one to list nearby
//! resources, find the nearest emergency resource, and geocode areas.
//! Listings fall back to the last saved snapshot when the backend is
//! unreachable.

mod render;

use clap::{Args, Parser, Subcommand};
use resource_map_client::{ClientListing, ListingOrigin, ResourceMapClient, SnapshotStore};
use resource_map_ranking::{CategoryFilter, ResourceFilter};
use resource_map_resource_models::Coordinate;

/// Find food banks, shelters and hospitals nearby.
#[derive(Parser)]
#[command(name = "resource_map_cli")]
#[command(about = "Find food banks, shelters and hospitals nearby")]
struct Cli {
    /// Backend base URL (default: `RESOURCE_MAP_BACKEND_URL` or
    /// `http://localhost:5000`).
    #[arg(long, global = true)]
    backend: Option<String>,

    /// Subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server.
    Serve,

    /// List resources around a location, nearest first.
    Nearby {
        #[command(flatten)]
        location: LocationArgs,

        /// Search radius in meters.
        #[arg(long, default_value_t = resource_map_client::DEFAULT_RADIUS_M)]
        radius: u32,

        /// `All`, `Food`, `Health`, `Shelter` or `Unclassified`.
        #[arg(long, default_value = "All")]
        category: CategoryFilter,

        /// Only wheelchair-accessible resources.
        #[arg(long)]
        wheelchair: bool,

        /// Only resources whose name or address contains this text.
        #[arg(long)]
        filter: Option<String>,

        /// Maximum number of resources to print.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show the nearest hospital or shelter.
    Emergency {
        #[command(flatten)]
        location: LocationArgs,
    },

    /// Resolve a place name to coordinates.
    Geocode {
        /// Place to look up, e.g. "Toronto, Ontario".
        text: String,
    },
}

/// Where to search from. A searched `--area` wins over `--lat`/`--lng`.
#[derive(Args)]
struct LocationArgs {
    /// Your latitude.
    #[arg(long, requires = "lng", allow_negative_numbers = true)]
    lat: Option<f64>,

    /// Your longitude.
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lng: Option<f64>,

    /// Area to search instead, e.g. "Mississauga, Ontario".
    #[arg(long)]
    area: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let cli = Cli::parse();

    let client = cli.backend.map_or_else(ResourceMapClient::from_env, |url| {
        ResourceMapClient::new(url, SnapshotStore::from_env())
    });

    match cli.command {
        Commands::Serve => {
            // The server uses actix-web's runtime, so we need to run it
            // in a blocking task to avoid nesting tokio runtimes.
            tokio::task::spawn_blocking(|| {
                actix_web::rt::System::new().block_on(resource_map_server::run_server())
            })
            .await??;
        }
        Commands::Nearby {
            location,
            radius,
            category,
            wheelchair,
            filter,
            limit,
        } => {
            let center = resolve_center(&client, &location).await?;
            let listing = client.fetch_resources(center, radius).await;
            report_origin(&listing);

            let filter = ResourceFilter {
                category,
                wheelchair_only: wheelchair,
                text: filter.unwrap_or_default(),
            };
            let ranked = resource_map_ranking::rank(&listing.resources, &filter, center);

            if ranked.is_empty() {
                println!("No resources match.");
                return Ok(());
            }

            println!("{} resources", ranked.len());
            for resource in ranked.iter().take(limit.unwrap_or(usize::MAX)) {
                println!();
                println!("{}", render::resource_block(resource));
            }
        }
        Commands::Emergency { location } => {
            let Some(center) = resolve_center(&client, &location).await? else {
                println!("Set --lat/--lng or --area to find the nearest help.");
                return Ok(());
            };

            let listing = client
                .fetch_resources(Some(center), resource_map_client::DEFAULT_RADIUS_M)
                .await;
            report_origin(&listing);

            match resource_map_ranking::nearest_emergency(&listing.resources, Some(center)) {
                Some(nearest) => {
                    println!("Nearest help:");
                    println!("{}", render::resource_block(&nearest));
                }
                None => println!("No hospital or shelter found nearby."),
            }
        }
        Commands::Geocode { text } => match client.geocode(&text).await? {
            Some(area) => println!("{} ({}, {})", area.label, area.center.lat, area.center.lng),
            None => println!("Location not found. Try: city, province, country."),
        },
    }

    Ok(())
}

/// Resolves the active center from the location arguments.
///
/// `--area` is geocoded through the backend and takes precedence over
/// the device coordinates.
async fn resolve_center(
    client: &ResourceMapClient,
    location: &LocationArgs,
) -> Result<Option<Coordinate>, Box<dyn std::error::Error>> {
    let device = match (location.lat, location.lng) {
        (Some(lat), Some(lng)) => {
            let coordinate = Coordinate::new(lat, lng);
            if !coordinate.is_valid() {
                return Err(format!("Invalid coordinate ({lat}, {lng})").into());
            }
            Some(coordinate)
        }
        _ => None,
    };

    let area = match location.area.as_deref() {
        Some(text) => match client.geocode(text).await? {
            Some(area) => {
                println!("Showing resources near {}", area.label);
                Some(area.center)
            }
            None => return Err(format!("Location {text:?} not found").into()),
        },
        None => None,
    };

    Ok(resource_map_ranking::active_center(area, device))
}

fn report_origin(listing: &ClientListing) {
    match listing.origin {
        ListingOrigin::Backend if listing.is_degraded() => {
            println!("Backend could not reach the map service; showing older results.");
        }
        ListingOrigin::Backend => {}
        ListingOrigin::Snapshot => println!("Offline: showing the last saved results."),
        ListingOrigin::Empty => println!("Offline and no saved results."),
    }
}
