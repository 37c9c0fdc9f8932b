//! Request orchestration for `find-seat`.
//!
//! One run per request, no state shared between runs:
//!
//! ```text
//! START -> GEOCODING -> ROUTING -> SOLAR_COMPUTE -> EXPOSURE_COMPUTE -> RESPOND
//!    \________\___________\_____________\________________\_________-> ERROR
//! ```
//!
//! Input is validated before any outbound call. Nothing is persisted, so a
//! failure at any stage simply terminates the run.

use std::{fmt, sync::Arc};

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;
use shared::{SeatRequest, SeatResponse};

use crate::{
    error::SeatError,
    exposure::{self, TrafficSide},
    geocoding::Geocoder,
    models::{Coordinate, format_distance_km, format_duration, round2},
    routing::RouteProvider,
    solar::{SolarAngle, SolarEphemeris},
};

/// Autocomplete queries shorter than this are answered with an empty list.
pub const MIN_SUGGEST_CHARS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    Geocoding,
    Routing,
    SolarCompute,
    ExposureCompute,
    Respond,
    Error,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Start => "START",
            Stage::Geocoding => "GEOCODING",
            Stage::Routing => "ROUTING",
            Stage::SolarCompute => "SOLAR_COMPUTE",
            Stage::ExposureCompute => "EXPOSURE_COMPUTE",
            Stage::Respond => "RESPOND",
            Stage::Error => "ERROR",
        };
        f.write_str(name)
    }
}

/// Validated `find-seat` input.
#[derive(Debug, Clone, PartialEq)]
pub struct Journey {
    pub start: String,
    pub end: String,
    pub departure: DateTime<Utc>,
}

impl Journey {
    pub fn from_request(req: &SeatRequest, now: DateTime<Utc>) -> Result<Self, SeatError> {
        let start = required(req.start.as_deref(), "start")?;
        let end = required(req.end.as_deref(), "end")?;
        let departure = parse_departure(req.time.as_deref(), now)?;
        Ok(Self {
            start,
            end,
            departure,
        })
    }
}

fn required(value: Option<&str>, field: &str) -> Result<String, SeatError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(SeatError::Validation(format!("{field} is required"))),
    }
}

const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

/// RFC 3339, naive date-times (server-local time) or a bare date (UTC midnight).
pub fn parse_departure(raw: Option<&str>, now: DateTime<Utc>) -> Result<DateTime<Utc>, SeatError> {
    let raw = match raw.map(str::trim) {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Ok(now),
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return local_to_utc(naive, raw);
        }
    }
    if let Some(midnight) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(midnight.and_utc());
    }

    Err(SeatError::Validation(format!("invalid time {raw:?}, expected ISO-8601")))
}

/// Ambiguous wall-clock times (DST fold) take the earlier instant.
fn local_to_utc(naive: NaiveDateTime, raw: &str) -> Result<DateTime<Utc>, SeatError> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| {
            SeatError::Validation(format!("time {raw:?} does not exist in the server time zone"))
        })
}

/// Explicitly constructed service object holding the three collaborators.
#[derive(Clone)]
pub struct SeatService {
    geocoder: Arc<dyn Geocoder>,
    router: Arc<dyn RouteProvider>,
    ephemeris: Arc<dyn SolarEphemeris>,
    traffic: TrafficSide,
}

impl SeatService {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        router: Arc<dyn RouteProvider>,
        ephemeris: Arc<dyn SolarEphemeris>,
    ) -> Self {
        Self {
            geocoder,
            router,
            ephemeris,
            traffic: TrafficSide::default(),
        }
    }

    pub fn with_traffic(mut self, traffic: TrafficSide) -> Self {
        self.traffic = traffic;
        self
    }

    pub fn traffic(&self) -> TrafficSide {
        self.traffic
    }

    pub async fn find_seat(&self, req: &SeatRequest) -> Result<SeatResponse, SeatError> {
        self.find_seat_at(req, Utc::now()).await
    }

    /// Runs the pipeline with `now` standing in for the wall clock.
    pub async fn find_seat_at(
        &self,
        req: &SeatRequest,
        now: DateTime<Utc>,
    ) -> Result<SeatResponse, SeatError> {
        let mut stage = Stage::Start;
        let result = self.run(req, now, &mut stage).await;

        match &result {
            Ok(response) => tracing::debug!(
                "{} -> {}: side={} heading={} sun_azimuth={}",
                stage,
                Stage::Respond,
                response.side,
                response.heading,
                response.sun_azimuth
            ),
            Err(err) if err.is_client_error() => {
                tracing::warn!("{stage} -> {}: {err}", Stage::Error)
            }
            Err(err) => tracing::error!("{stage} -> {}: {err}", Stage::Error),
        }

        result
    }

    async fn run(
        &self,
        req: &SeatRequest,
        now: DateTime<Utc>,
        stage: &mut Stage,
    ) -> Result<SeatResponse, SeatError> {
        let journey = Journey::from_request(req, now)?;

        *stage = Stage::Geocoding;
        tracing::debug!("{stage}: {:?} -> {:?}", journey.start, journey.end);
        let (from, to) = tokio::try_join!(
            self.geocoder.geocode(&journey.start),
            self.geocoder.geocode(&journey.end)
        )?;

        *stage = Stage::Routing;
        tracing::debug!("{stage}: ({}, {}) -> ({}, {})", from.lat, from.lon, to.lat, to.lon);
        let route = self.router.route(from, to).await?;

        *stage = Stage::SolarCompute;
        let origin = route.start();
        let solar = SolarAngle::from_position(self.ephemeris.position(journey.departure, origin));
        tracing::debug!(
            "{stage}: at {} azimuth={:.2} altitude={:.2}",
            journey.departure,
            solar.azimuth,
            solar.altitude
        );

        *stage = Stage::ExposureCompute;
        let (a, b) = route.first_leg();
        let recommendation = exposure::recommend(exposure::heading(a, b), solar, self.traffic);

        Ok(SeatResponse {
            suggestion: recommendation.suggestion,
            heading: round2(recommendation.heading),
            sun_azimuth: round2(recommendation.solar.azimuth),
            sun_altitude: round2(recommendation.solar.altitude),
            exposure: recommendation.exposure,
            side: recommendation.side,
            route: route.to_lon_lat(),
            distance: format_distance_km(route.distance_m),
            duration: format_duration(route.duration_s),
        })
    }

    /// Autocomplete passthrough.
    pub async fn suggest(&self, query: &str, limit: usize) -> Result<Value, SeatError> {
        let query = query.trim();
        if query.chars().count() < MIN_SUGGEST_CHARS {
            return Ok(Value::Array(Vec::new()));
        }
        self.geocoder.suggest(query, limit).await
    }

    /// Reverse-geocode passthrough.
    pub async fn reverse(&self, coord: Coordinate) -> Result<Value, SeatError> {
        if !coord.is_valid() {
            return Err(SeatError::Validation(format!(
                "coordinate ({}, {}) is out of range",
                coord.lat, coord.lon
            )));
        }
        self.geocoder.reverse(coord).await
    }
}
