use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::{error::SeatError, models::Coordinate};

/// Geocoding collaborator.
///
/// # Contract
/// - `geocode` returns the best match or `SeatError::NotFound` naming the place
/// - `suggest` and `reverse` are passthroughs: provider JSON, unmodified
/// - Transport failures, timeouts and malformed bodies are `SeatError::Upstream`
/// - No retries
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, place: &str) -> Result<Coordinate, SeatError>;

    async fn suggest(&self, query: &str, limit: usize) -> Result<Value, SeatError>;

    async fn reverse(&self, coord: Coordinate) -> Result<Value, SeatError>;
}

/// OpenStreetMap Nominatim client.
///
/// The identifying User-Agent required by the provider's usage policy is set
/// on the shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct Nominatim {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchHit {
    lat: String,
    lon: String,
}

impl Nominatim {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, SeatError> {
        let value = self
            .client
            .get(self.endpoint(path))
            .query(query)
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;
        Ok(value)
    }
}

#[async_trait]
impl Geocoder for Nominatim {
    async fn geocode(&self, place: &str) -> Result<Coordinate, SeatError> {
        tracing::debug!("geocoding {place:?}");
        let body = self
            .get_json(
                "search",
                &[
                    ("format", "json".to_string()),
                    ("limit", "1".to_string()),
                    ("q", place.to_string()),
                ],
            )
            .await?;
        first_hit(body, place)
    }

    async fn suggest(&self, query: &str, limit: usize) -> Result<Value, SeatError> {
        self.get_json(
            "search",
            &[
                ("format", "json".to_string()),
                ("addressdetails", "1".to_string()),
                ("limit", limit.to_string()),
                ("q", query.to_string()),
            ],
        )
        .await
    }

    async fn reverse(&self, coord: Coordinate) -> Result<Value, SeatError> {
        self.get_json(
            "reverse",
            &[
                ("format", "json".to_string()),
                ("lat", coord.lat.to_string()),
                ("lon", coord.lon.to_string()),
            ],
        )
        .await
    }
}

/// Nominatim returns coordinates as decimal strings.
pub(crate) fn first_hit(body: Value, place: &str) -> Result<Coordinate, SeatError> {
    let hits: Vec<SearchHit> = serde_json::from_value(body)
        .map_err(|e| SeatError::Upstream(format!("malformed geocoder response: {e}")))?;
    let hit = hits
        .into_iter()
        .next()
        .ok_or_else(|| SeatError::NotFound(place.to_string()))?;

    let parse = |raw: &str, field: &str| {
        raw.trim()
            .parse::<f64>()
            .map_err(|_| SeatError::Upstream(format!("geocoder returned non-numeric {field} {raw:?}")))
    };
    let coord = Coordinate::new(parse(&hit.lat, "lat")?, parse(&hit.lon, "lon")?);
    if !coord.is_valid() {
        return Err(SeatError::Upstream(format!(
            "geocoder returned out-of-range coordinate ({}, {})",
            coord.lat, coord.lon
        )));
    }
    Ok(coord)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn takes_first_candidate() {
        let body = json!([
            {"lat": "45.7578137", "lon": "4.8320114", "display_name": "Lyon, France"},
            {"lat": "1.0", "lon": "2.0", "display_name": "Lyon, elsewhere"}
        ]);
        let coord = first_hit(body, "Lyon").unwrap();
        assert!((coord.lat - 45.7578137).abs() < 1e-9);
        assert!((coord.lon - 4.8320114).abs() < 1e-9);
    }

    #[test]
    fn empty_result_is_not_found() {
        let err = first_hit(json!([]), "Atlantis").unwrap_err();
        assert!(matches!(err, SeatError::NotFound(ref p) if p == "Atlantis"));
    }

    #[test]
    fn non_array_body_is_upstream_error() {
        let err = first_hit(json!({"error": "rate limited"}), "Lyon").unwrap_err();
        assert!(matches!(err, SeatError::Upstream(_)));
    }

    #[test]
    fn non_numeric_coordinate_is_upstream_error() {
        let err = first_hit(json!([{"lat": "north", "lon": "4.8"}]), "Lyon").unwrap_err();
        assert!(matches!(err, SeatError::Upstream(_)));
    }

    #[test]
    fn out_of_range_coordinate_is_upstream_error() {
        let err = first_hit(json!([{"lat": "123.0", "lon": "4.8"}]), "Lyon").unwrap_err();
        assert!(matches!(err, SeatError::Upstream(_)));
    }

    #[test]
    fn base_url_trailing_slash_is_ignored() {
        let geocoder = Nominatim::new(reqwest::Client::new(), "https://example.test/");
        assert_eq!(geocoder.endpoint("search"), "https://example.test/search");
    }
}
