use async_trait::async_trait;
use axum::http::StatusCode;
use serde::Deserialize;

use crate::{
    error::SeatError,
    models::{Coordinate, Route},
};

/// Routing collaborator.
///
/// # Contract
/// - Returns the provider's primary route only; alternates are discarded
/// - `SeatError::NoRouteFound` when there is no drivable path
/// - `SeatError::Upstream` for transport failures and malformed responses
#[async_trait]
pub trait RouteProvider: Send + Sync {
    async fn route(&self, from: Coordinate, to: Coordinate) -> Result<Route, SeatError>;
}

/// OSRM HTTP API client (`/route/v1/{profile}`), GeoJSON geometry.
#[derive(Debug, Clone)]
pub struct Osrm {
    client: reqwest::Client,
    base_url: String,
    profile: String,
}

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    geometry: OsrmGeometry,
    distance: f64,
    duration: f64,
}

#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    coordinates: Vec<[f64; 2]>,
}

impl Osrm {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            profile: "driving".to_string(),
        }
    }

    /// Coordinates are longitude-first in the URL path.
    fn route_url(&self, from: Coordinate, to: Coordinate) -> String {
        format!(
            "{}/route/v1/{}/{},{};{},{}",
            self.base_url, self.profile, from.lon, from.lat, to.lon, to.lat
        )
    }
}

#[async_trait]
impl RouteProvider for Osrm {
    async fn route(&self, from: Coordinate, to: Coordinate) -> Result<Route, SeatError> {
        let response = self
            .client
            .get(self.route_url(from, to))
            .query(&[("overview", "full"), ("geometries", "geojson")])
            .send()
            .await?;
        let status = response.status();
        let body = response.bytes().await?;
        parse_route_response(status, &body)
    }
}

/// OSRM reports "no route" through `code`, sometimes with a 400 status.
pub(crate) fn parse_route_response(status: StatusCode, body: &[u8]) -> Result<Route, SeatError> {
    let parsed: OsrmResponse = match serde_json::from_slice(body) {
        Ok(parsed) => parsed,
        Err(_) if !status.is_success() => {
            return Err(SeatError::Upstream(format!("routing provider returned {status}")));
        }
        Err(e) => {
            return Err(SeatError::Upstream(format!("malformed routing response: {e}")));
        }
    };

    match parsed.code.as_str() {
        "Ok" => {}
        "NoRoute" | "NoSegment" => return Err(SeatError::NoRouteFound),
        other => {
            return Err(SeatError::Upstream(format!(
                "routing provider error {other}: {}",
                parsed.message.unwrap_or_default()
            )));
        }
    }

    let primary = parsed
        .routes
        .into_iter()
        .next()
        .ok_or(SeatError::NoRouteFound)?;
    let points = primary
        .geometry
        .coordinates
        .into_iter()
        .map(Coordinate::from_lon_lat)
        .collect();
    Route::new(points, primary.distance, primary.duration)
}
