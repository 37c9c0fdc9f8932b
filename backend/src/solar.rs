//! Solar position.
//!
//! Low-precision ephemeris following the algorithm popularised by the
//! `suncalc` library. Azimuth comes out measured from south towards west and
//! is rebased to a north-referenced compass bearing by [`SolarAngle`].
//! No atmospheric refraction correction is applied.

use std::f64::consts::PI;

use chrono::{DateTime, Utc};

use crate::models::Coordinate;

const MS_PER_DAY: f64 = 86_400_000.0;
const J1970: f64 = 2_440_588.0;
const J2000: f64 = 2_451_545.0;
const OBLIQUITY_DEG: f64 = 23.4397;
const PERIHELION_DEG: f64 = 102.9372;

/// Raw ephemeris output, both angles in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunPosition {
    /// Measured from south, positive towards west.
    pub azimuth: f64,
    pub altitude: f64,
}

/// Sun direction in degrees, as reported to callers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarAngle {
    /// Compass bearing, 0 = north, clockwise.
    pub azimuth: f64,
    /// Negative below the horizon.
    pub altitude: f64,
}

impl SolarAngle {
    pub fn from_position(pos: SunPosition) -> Self {
        Self {
            azimuth: pos.azimuth.to_degrees() + 180.0,
            altitude: pos.altitude.to_degrees(),
        }
    }

    pub fn is_daylight(&self) -> bool {
        self.altitude > 0.0
    }
}

/// Solar-ephemeris collaborator.
///
/// Pure and cheap; implementations must not perform I/O.
pub trait SolarEphemeris: Send + Sync {
    fn position(&self, at: DateTime<Utc>, coord: Coordinate) -> SunPosition;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SunCalc;

impl SolarEphemeris for SunCalc {
    fn position(&self, at: DateTime<Utc>, coord: Coordinate) -> SunPosition {
        sun_position(at, coord.lat, coord.lon)
    }
}

fn rad(deg: f64) -> f64 {
    deg * PI / 180.0
}

fn to_days(at: DateTime<Utc>) -> f64 {
    at.timestamp_millis() as f64 / MS_PER_DAY - 0.5 + J1970 - J2000
}

fn right_ascension(l: f64, b: f64) -> f64 {
    let e = rad(OBLIQUITY_DEG);
    (l.sin() * e.cos() - b.tan() * e.sin()).atan2(l.cos())
}

fn declination(l: f64, b: f64) -> f64 {
    let e = rad(OBLIQUITY_DEG);
    (b.sin() * e.cos() + b.cos() * e.sin() * l.sin()).asin()
}

fn azimuth(h: f64, phi: f64, dec: f64) -> f64 {
    h.sin().atan2(h.cos() * phi.sin() - dec.tan() * phi.cos())
}

fn altitude(h: f64, phi: f64, dec: f64) -> f64 {
    (phi.sin() * dec.sin() + phi.cos() * dec.cos() * h.cos()).asin()
}

fn sidereal_time(d: f64, lw: f64) -> f64 {
    rad(280.16 + 360.985_623_5 * d) - lw
}

fn solar_mean_anomaly(d: f64) -> f64 {
    rad(357.5291 + 0.985_600_28 * d)
}

fn ecliptic_longitude(m: f64) -> f64 {
    let center = rad(1.9148 * m.sin() + 0.02 * (2.0 * m).sin() + 0.0003 * (3.0 * m).sin());
    m + center + rad(PERIHELION_DEG) + PI
}

/// Sun azimuth/altitude in radians for an instant and a position.
pub fn sun_position(at: DateTime<Utc>, lat: f64, lon: f64) -> SunPosition {
    let lw = rad(-lon);
    let phi = rad(lat);
    let d = to_days(at);

    let l = ecliptic_longitude(solar_mean_anomaly(d));
    let dec = declination(l, 0.0);
    let ra = right_ascension(l, 0.0);
    let h = sidereal_time(d, lw) - ra;

    SunPosition {
        azimuth: azimuth(h, phi, dec),
        altitude: altitude(h, phi, dec),
    }
}
