//! Plain-text rendering of resources for the terminal.

use std::fmt::Write as _;

use resource_map_resource_models::{RankedResource, Resource};

/// Directions link for a resource.
#[must_use]
pub fn directions_url(resource: &Resource) -> String {
    format!(
        "https://www.google.com/maps/dir/?api=1&destination={},{}",
        resource.lat, resource.lng
    )
}

/// Renders one resource as an indented block.
#[must_use]
pub fn resource_block(ranked: &RankedResource) -> String {
    let r = &ranked.resource;

    let mut out = format!("{} [{}]", r.name, r.category.to_string().to_uppercase());
    if let Some(km) = ranked.distance_km {
        let _ = write!(out, "  {km:.1} km");
    }
    out.push('\n');

    let _ = writeln!(out, "    Address: {}", r.address);
    let _ = writeln!(out, "    Phone:   {}", r.phone);
    if !r.hours.is_empty() {
        let _ = writeln!(out, "    Hours:   {}", r.hours);
    }
    let _ = writeln!(
        out,
        "    {}",
        if r.wheelchair {
            "Wheelchair accessible"
        } else {
            "Not wheelchair accessible"
        }
    );
    let _ = write!(out, "    Directions: {}", directions_url(r));

    out
}
