//! HTTP handler functions for the resource map API.

use actix_web::{HttpResponse, HttpResponseBuilder, web};
use chrono::{DateTime, Utc};
use resource_map_geocoder::GeocodeError;
use resource_map_ranking::{CategoryFilter, ResourceFilter};
use resource_map_server_models::{
    ApiError, ApiGeocodeResponse, ApiHealth, ApiNearestResponse, ApiRankedResponse,
    FETCHED_AT_HEADER, FRESHNESS_HEADER, GeocodeQueryParams, ResourceQueryParams,
};
use resource_map_service::{Freshness, ResourceRequest};

use crate::AppState;

/// `GET /`
pub async fn index() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("Community resource map API is running")
}

/// `GET /health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /resources`
///
/// Lists resources around `lat`/`lng` within `radius` meters. Always
/// answers 200; degraded results are flagged by the freshness header.
pub async fn resources(
    state: web::Data<AppState>,
    params: web::Query<ResourceQueryParams>,
) -> HttpResponse {
    let listing = state.service.list_resources(&resource_request(&params)).await;

    let mut resp = HttpResponse::Ok();
    freshness_headers(&mut resp, listing.freshness, listing.fetched_at);
    resp.json(listing.resources)
}

/// `GET /resources/ranked`
///
/// Lists, filters and distance-ranks resources. An unknown `category`
/// is rejected with 400.
pub async fn ranked(
    state: web::Data<AppState>,
    params: web::Query<ResourceQueryParams>,
) -> HttpResponse {
    let category: CategoryFilter = match params.category.as_deref().unwrap_or_default().parse() {
        Ok(category) => category,
        Err(e) => return HttpResponse::BadRequest().json(ApiError::new(e.to_string())),
    };

    let filter = ResourceFilter {
        category,
        wheelchair_only: params.wheelchair_only(),
        text: params.q.clone().unwrap_or_default(),
    };

    let listing = state.service.ranked(&resource_request(&params), &filter).await;

    let mut resp = HttpResponse::Ok();
    freshness_headers(&mut resp, listing.freshness, listing.fetched_at);
    resp.json(ApiRankedResponse {
        center: listing.center,
        freshness: listing.freshness.to_string(),
        fetched_at: listing.fetched_at,
        resources: listing.resources,
    })
}

/// `GET /resources/nearest-emergency`
///
/// Returns the closest `Health` or `Shelter` resource to `lat`/`lng`.
/// Without both coordinates there is no center and nothing is found.
pub async fn nearest_emergency(
    state: web::Data<AppState>,
    params: web::Query<ResourceQueryParams>,
) -> HttpResponse {
    let Some(nearest) = state
        .service
        .nearest_emergency(&resource_request(&params))
        .await
    else {
        return HttpResponse::Ok().json(ApiNearestResponse {
            found: false,
            resource: None,
        });
    };

    let mut resp = HttpResponse::Ok();
    freshness_headers(&mut resp, nearest.freshness, None);
    resp.json(ApiNearestResponse {
        found: nearest.resource.is_some(),
        resource: nearest.resource,
    })
}

/// `GET /geocode`
///
/// Resolves the free-text `q` to a coordinate. Blank queries are a 400;
/// upstream failures are a 500, distinct from `{ "found": false }`.
pub async fn geocode(
    state: web::Data<AppState>,
    params: web::Query<GeocodeQueryParams>,
) -> HttpResponse {
    let query = params.q.as_deref().unwrap_or_default();

    match resource_map_geocoder::geocode(state.geocoder.as_ref(), query).await {
        Ok(Some(place)) => {
            HttpResponse::Ok().json(ApiGeocodeResponse::found(place.lat, place.lng, place.label))
        }
        Ok(None) => HttpResponse::Ok().json(ApiGeocodeResponse::not_found()),
        Err(GeocodeError::EmptyQuery) => {
            HttpResponse::BadRequest().json(ApiError::new("Query parameter q is required"))
        }
        Err(e) => {
            log::error!("Failed to geocode {query:?}: {e}");
            HttpResponse::InternalServerError().json(ApiError::new("Geocoding request failed"))
        }
    }
}

fn resource_request(params: &ResourceQueryParams) -> ResourceRequest {
    ResourceRequest {
        lat: params.lat(),
        lng: params.lng(),
        radius_m: params.radius(),
    }
}

fn freshness_headers(
    resp: &mut HttpResponseBuilder,
    freshness: Freshness,
    fetched_at: Option<DateTime<Utc>>,
) {
    resp.insert_header((FRESHNESS_HEADER, freshness.to_string()));
    if let Some(at) = fetched_at {
        resp.insert_header((FETCHED_AT_HEADER, at.to_rfc3339()));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use async_trait::async_trait;
    use resource_map_cache::ManualClock;
    use resource_map_geocoder::PlaceLookup;
    use resource_map_overpass::{ElementSource, OverpassElement, OverpassError};
    use resource_map_resource_models::{Resource, ResourceCategory};
    use resource_map_service::{ResourceService, ServiceConfig};

    use super::*;

    struct FixedSource {
        elements: Option<Vec<OverpassElement>>,
    }

    #[async_trait]
    impl ElementSource for FixedSource {
        async fn fetch_elements(&self, _query: &str) -> Result<Vec<OverpassElement>, OverpassError> {
            self.elements
                .clone()
                .ok_or(OverpassError::Status { status: 504 })
        }
    }

    struct FixtureLookup {
        body: Option<serde_json::Value>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PlaceLookup for FixtureLookup {
        async fn search(&self, _query: &str) -> Result<serde_json::Value, GeocodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.body.clone().ok_or(GeocodeError::Status { status: 503 })
        }
    }

    fn node(id: i64, lat: f64, lon: f64, pairs: &[(&str, &str)]) -> OverpassElement {
        serde_json::from_value(serde_json::json!({
            "type": "node",
            "id": id,
            "lat": lat,
            "lon": lon,
            "tags": pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), serde_json::Value::from(*v)))
                .collect::<serde_json::Map<_, _>>(),
        }))
        .unwrap()
    }

    fn neighborhood() -> Vec<OverpassElement> {
        vec![
            node(1, 43.470, -79.690, &[("amenity", "social_facility"), ("social_facility", "food_bank")]),
            node(2, 43.500, -79.700, &[("amenity", "hospital"), ("name", "Trafalgar")]),
            node(3, 43.480, -79.680, &[("amenity", "social_facility"), ("social_facility", "shelter")]),
        ]
    }

    fn app_state(
        elements: Option<Vec<OverpassElement>>,
        geocode_body: Option<serde_json::Value>,
    ) -> (web::Data<AppState>, Arc<FixtureLookup>) {
        let clock = Arc::new(ManualClock::new(
            DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        ));
        let service = ResourceService::new(
            ServiceConfig::default(),
            Arc::new(FixedSource { elements }),
            clock,
        );
        let lookup = Arc::new(FixtureLookup {
            body: geocode_body,
            calls: AtomicUsize::new(0),
        });
        let state = web::Data::new(AppState {
            service: Arc::new(service),
            geocoder: lookup.clone(),
        });
        (state, lookup)
    }

    #[actix_web::test]
    async fn banner_and_health() {
        let (state, _) = app_state(Some(Vec::new()), None);
        let app = test::init_service(App::new().app_data(state).configure(crate::routes)).await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let health: ApiHealth =
            test::call_and_read_body_json(&app, test::TestRequest::get().uri("/health").to_request())
                .await;
        assert!(health.healthy);
    }

    #[actix_web::test]
    async fn resources_sets_freshness_header() {
        let (state, _) = app_state(Some(neighborhood()), None);
        let app = test::init_service(App::new().app_data(state).configure(crate::routes)).await;

        let req = test::TestRequest::get()
            .uri("/resources?lat=43.47&lng=-79.69&radius=3000")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get(FRESHNESS_HEADER).unwrap(), "live");
        assert_eq!(
            resp.headers().get(FETCHED_AT_HEADER).unwrap(),
            "2023-11-14T22:13:20+00:00"
        );
        let body: Vec<Resource> = test::read_body_json(resp).await;
        assert_eq!(body.len(), 3);

        let req = test::TestRequest::get()
            .uri("/resources?lat=43.47&lng=-79.69&radius=3000")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.headers().get(FRESHNESS_HEADER).unwrap(), "cached");
    }

    #[actix_web::test]
    async fn resources_degrade_without_upstream() {
        let (state, _) = app_state(None, None);
        let app = test::init_service(App::new().app_data(state).configure(crate::routes)).await;

        let req = test::TestRequest::get()
            .uri("/resources?lat=abc&radius=-1")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get(FRESHNESS_HEADER).unwrap(), "unavailable");
        assert!(resp.headers().get(FETCHED_AT_HEADER).is_none());
        let body: Vec<Resource> = test::read_body_json(resp).await;
        assert!(body.is_empty());
    }

    #[actix_web::test]
    async fn ranked_filters_by_category() {
        let (state, _) = app_state(Some(neighborhood()), None);
        let app = test::init_service(App::new().app_data(state).configure(crate::routes)).await;

        let req = test::TestRequest::get()
            .uri("/resources/ranked?lat=43.47&lng=-79.69&category=shelter")
            .to_request();
        let body: ApiRankedResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.freshness, "live");
        assert_eq!(body.resources.len(), 1);
        assert_eq!(body.resources[0].resource.category, ResourceCategory::Shelter);
        assert!(body.resources[0].distance_km.is_some());

        let req = test::TestRequest::get()
            .uri("/resources/ranked?category=pharmacy")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn nearest_emergency_endpoint() {
        let (state, _) = app_state(Some(neighborhood()), None);
        let app = test::init_service(App::new().app_data(state).configure(crate::routes)).await;

        let req = test::TestRequest::get()
            .uri("/resources/nearest-emergency")
            .to_request();
        let body: ApiNearestResponse = test::call_and_read_body_json(&app, req).await;
        assert!(!body.found);

        let req = test::TestRequest::get()
            .uri("/resources/nearest-emergency?lat=43.47&lng=-79.69")
            .to_request();
        let body: ApiNearestResponse = test::call_and_read_body_json(&app, req).await;
        assert!(body.found);
        assert_eq!(body.resource.unwrap().resource.id, "node-3");
    }

    #[actix_web::test]
    async fn geocode_blank_query_is_bad_request() {
        let (state, lookup) = app_state(Some(Vec::new()), Some(serde_json::json!([])));
        let app = test::init_service(App::new().app_data(state).configure(crate::routes)).await;

        for uri in ["/geocode", "/geocode?q=", "/geocode?q=%20%20"] {
            let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
        }
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
    }

    #[actix_web::test]
    async fn geocode_found_and_not_found() {
        let toronto = serde_json::json!([{
            "lat": "43.6534817",
            "lon": "-79.3839347",
            "display_name": "Toronto, Ontario, Canada"
        }]);
        let (state, _) = app_state(Some(Vec::new()), Some(toronto));
        let app = test::init_service(App::new().app_data(state).configure(crate::routes)).await;

        let req = test::TestRequest::get().uri("/geocode?q=Toronto").to_request();
        let body: ApiGeocodeResponse = test::call_and_read_body_json(&app, req).await;
        assert!(body.found);
        assert_eq!(body.label.as_deref(), Some("Toronto, Ontario, Canada"));
        assert!((body.lat.unwrap() - 43.653_481_7).abs() < 1e-9);

        let (state, _) = app_state(Some(Vec::new()), Some(serde_json::json!([])));
        let app = test::init_service(App::new().app_data(state).configure(crate::routes)).await;
        let req = test::TestRequest::get().uri("/geocode?q=Atlantis").to_request();
        let body: ApiGeocodeResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, ApiGeocodeResponse::not_found());
    }

    #[actix_web::test]
    async fn geocode_upstream_failure_is_server_error() {
        let (state, _) = app_state(Some(Vec::new()), None);
        let app = test::init_service(App::new().app_data(state).configure(crate::routes)).await;

        let req = test::TestRequest::get().uri("/geocode?q=Toronto").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: ApiError = test::read_body_json(resp).await;
        assert!(!body.error.is_empty());
    }
}
