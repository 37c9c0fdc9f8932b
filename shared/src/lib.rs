use serde::{Deserialize, Serialize};

/// Body of `POST /find-seat`.
///
/// Both place names are optional at the wire level so that a missing field
/// reaches the service as a validation error instead of a JSON rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeatRequest {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    /// ISO-8601 departure time; absent or blank means "now".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

impl SeatRequest {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: Some(start.into()),
            end: Some(end.into()),
            time: None,
        }
    }

    pub fn at(mut self, time: impl Into<String>) -> Self {
        self.time = Some(time.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Left,
    Right,
    /// Sun below the horizon, every seat is equivalent.
    Any,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Left => "LEFT",
            Side::Right => "RIGHT",
            Side::Any => "ANY",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Estimated sunlight incidence per side, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Exposure {
    #[serde(rename = "LEFT")]
    pub left: u8,
    #[serde(rename = "RIGHT")]
    pub right: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatResponse {
    pub suggestion: String,
    pub heading: f64,
    pub sun_azimuth: f64,
    pub sun_altitude: f64,
    pub exposure: Exposure,
    pub side: Side,
    /// Route polyline as `[longitude, latitude]` pairs.
    pub route: Vec<[f64; 2]>,
    /// Kilometres with one decimal.
    pub distance: String,
    /// `"{h}h {m}m"`, hour segment omitted when zero.
    pub duration: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}

/// Query of `GET /autocomplete`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuggestQuery {
    #[serde(default)]
    pub q: String,
}

/// Query of `GET /reverse-geocode`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReverseQuery {
    pub lat: f64,
    pub lon: f64,
}
