use serde::{Deserialize, Serialize};

use crate::error::SeatError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Latitude in [-90, 90], longitude in [-180, 180], both finite.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    /// Provider ordering used by OSRM and GeoJSON.
    pub fn to_lon_lat(self) -> [f64; 2] {
        [self.lon, self.lat]
    }

    pub fn from_lon_lat([lon, lat]: [f64; 2]) -> Self {
        Self { lat, lon }
    }
}

/// Primary driving route returned by the router adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    points: Vec<Coordinate>,
    pub distance_m: f64,
    pub duration_s: f64,
}

impl Route {
    /// Builds a route, rejecting polylines that cannot yield a heading.
    pub fn new(points: Vec<Coordinate>, distance_m: f64, duration_s: f64) -> Result<Self, SeatError> {
        if points.len() < 2 {
            return Err(SeatError::Upstream(format!(
                "route geometry has {} point(s), at least 2 required",
                points.len()
            )));
        }
        if let Some(bad) = points.iter().find(|p| !p.is_valid()) {
            return Err(SeatError::Upstream(format!(
                "route geometry contains an out-of-range point ({}, {})",
                bad.lat, bad.lon
            )));
        }
        Ok(Self {
            points,
            distance_m,
            duration_s,
        })
    }

    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    pub fn start(&self) -> Coordinate {
        self.points[0]
    }

    /// First two polyline points; guaranteed by construction.
    pub fn first_leg(&self) -> (Coordinate, Coordinate) {
        (self.points[0], self.points[1])
    }

    pub fn to_lon_lat(&self) -> Vec<[f64; 2]> {
        self.points.iter().map(|p| p.to_lon_lat()).collect()
    }
}

/// Metres to a kilometre label with one decimal, e.g. `"12.3"`.
pub fn format_distance_km(distance_m: f64) -> String {
    format!("{:.1}", distance_m.max(0.0) / 1000.0)
}

/// Seconds to `"{h}h {m}m"`, dropping the hour segment when it is zero.
pub fn format_duration(duration_s: f64) -> String {
    let total = if duration_s.is_finite() {
        duration_s.max(0.0) as u64
    } else {
        0
    };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

/// Round to two decimals for the JSON payload.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_with_hours() {
        assert_eq!(format_duration(5400.0), "1h 30m");
        assert_eq!(format_duration(7260.0), "2h 1m");
    }

    #[test]
    fn duration_omits_zero_hours() {
        assert_eq!(format_duration(300.0), "5m");
        assert_eq!(format_duration(59.0), "0m");
    }

    #[test]
    fn duration_handles_garbage() {
        assert_eq!(format_duration(-10.0), "0m");
        assert_eq!(format_duration(f64::NAN), "0m");
    }

    #[test]
    fn distance_has_one_decimal() {
        assert_eq!(format_distance_km(12_345.0), "12.3");
        assert_eq!(format_distance_km(0.0), "0.0");
        assert_eq!(format_distance_km(999.0), "1.0");
    }

    #[test]
    fn round2_keeps_two_decimals() {
        assert_eq!(round2(12.3456), 12.35);
        assert_eq!(round2(-45.0), -45.0);
    }

    #[test]
    fn route_requires_two_points() {
        let one = vec![Coordinate::new(45.0, 5.0)];
        assert!(matches!(
            Route::new(one, 10.0, 1.0),
            Err(SeatError::Upstream(_))
        ));
    }

    #[test]
    fn route_rejects_out_of_range_points() {
        let points = vec![Coordinate::new(45.0, 5.0), Coordinate::new(95.0, 5.0)];
        assert!(Route::new(points, 10.0, 1.0).is_err());
    }

    #[test]
    fn route_exposes_lon_lat_polyline() {
        let route = Route::new(
            vec![Coordinate::new(45.0, 5.0), Coordinate::new(45.1, 5.2)],
            1000.0,
            60.0,
        )
        .unwrap();
        assert_eq!(route.to_lon_lat(), vec![[5.0, 45.0], [5.2, 45.1]]);
        assert_eq!(route.start(), Coordinate::new(45.0, 5.0));
    }

    #[test]
    fn coordinate_validity() {
        assert!(Coordinate::new(-90.0, 180.0).is_valid());
        assert!(!Coordinate::new(0.0, 180.5).is_valid());
        assert!(!Coordinate::new(f64::NAN, 0.0).is_valid());
    }
}
