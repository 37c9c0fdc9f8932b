//! Exposure engine: heading + sun direction to a seat side.
//!
//! Pure computation, total over its numeric domain. Upstream guarantees a
//! route with at least two points and a defined sun position.

use clap::ValueEnum;
use shared::{Exposure, Side};

use crate::models::Coordinate;
use crate::solar::SolarAngle;

/// Which side of the road vehicles drive on.
///
/// The reference mapping (relative angle 0-180 means sun on the right) is the
/// right-hand one; left-hand traffic mirrors the two percentages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TrafficSide {
    #[default]
    #[value(name = "right")]
    RightHand,
    #[value(name = "left")]
    LeftHand,
}

pub const NIGHT_SUGGESTION: &str = "No sunlight at this time, sit on any side 🌙";

#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub side: Side,
    pub suggestion: String,
    pub heading: f64,
    pub solar: SolarAngle,
    pub exposure: Exposure,
}

/// Initial heading in degrees, `atan2(Δlon, Δlat)` on raw degree deltas.
///
/// Not a great-circle bearing and not renormalised to [0, 360); every
/// recommendation depends on this exact formula.
pub fn heading(from: Coordinate, to: Coordinate) -> f64 {
    (to.lon - from.lon).atan2(to.lat - from.lat).to_degrees()
}

/// Sun bearing relative to the vehicle's nose, in [0, 360).
pub fn relative_angle(sun_azimuth: f64, heading: f64) -> f64 {
    normalize(sun_azimuth - heading)
}

fn normalize(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

fn percent(fraction: f64) -> u8 {
    (fraction * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Piecewise-linear split for a relative angle (right-hand convention).
///
/// Up to 180 the right side stays fully exposed, past 180 the left side does.
pub fn exposure_for(relative_angle: f64) -> Exposure {
    let angle = normalize(relative_angle);
    if angle > 180.0 {
        Exposure {
            left: 100,
            right: 100 - percent((angle - 180.0) / 180.0),
        }
    } else {
        Exposure {
            left: 100 - percent(angle / 180.0),
            right: 100,
        }
    }
}

/// LEFT only when strictly more exposed; ties go RIGHT.
pub fn choose_side(exposure: Exposure) -> Side {
    if exposure.left > exposure.right {
        Side::Left
    } else {
        Side::Right
    }
}

pub fn day_suggestion(side: Side) -> String {
    format!("Sit on the {side} side to avoid sunlight ☀️")
}

pub fn recommend(heading: f64, solar: SolarAngle, traffic: TrafficSide) -> Recommendation {
    if !solar.is_daylight() {
        return Recommendation {
            side: Side::Any,
            suggestion: NIGHT_SUGGESTION.to_string(),
            heading,
            solar,
            exposure: Exposure::default(),
        };
    }

    let mut exposure = exposure_for(relative_angle(solar.azimuth, heading));
    if traffic == TrafficSide::LeftHand {
        exposure = Exposure {
            left: exposure.right,
            right: exposure.left,
        };
    }
    let side = choose_side(exposure);

    Recommendation {
        side,
        suggestion: day_suggestion(side),
        heading,
        solar,
        exposure,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sun(azimuth: f64, altitude: f64) -> SolarAngle {
        SolarAngle { azimuth, altitude }
    }

    #[test]
    fn heading_uses_lon_as_x_term() {
        let origin = Coordinate::new(45.0, 5.0);
        assert!((heading(origin, Coordinate::new(46.0, 5.0)) - 0.0).abs() < 1e-9);
        assert!((heading(origin, Coordinate::new(45.0, 6.0)) - 90.0).abs() < 1e-9);
        assert!((heading(origin, Coordinate::new(45.0, 4.0)) + 90.0).abs() < 1e-9);
        assert!((heading(origin, Coordinate::new(44.0, 5.0)) - 180.0).abs() < 1e-9);
    }

    #[test]
    fn relative_angle_wraps_negative_differences() {
        assert!((relative_angle(10.0, 350.0) - 20.0).abs() < 1e-9);
        assert!((relative_angle(90.0, -90.0) - 180.0).abs() < 1e-9);
        assert_eq!(relative_angle(90.0, 90.0), 0.0);
    }

    #[test]
    fn relative_angle_never_reaches_full_turn() {
        let r = relative_angle(-1e-18, 0.0);
        assert_eq!(r, 0.0);
    }

    #[test]
    fn sun_dead_ahead_is_a_tie_resolved_right() {
        let rec = recommend(90.0, sun(90.0, 20.0), TrafficSide::RightHand);
        assert_eq!(rec.exposure, Exposure { left: 100, right: 100 });
        assert_eq!(rec.side, Side::Right);
    }

    #[test]
    fn sun_on_the_left_quarter() {
        let rec = recommend(0.0, sun(270.0, 10.0), TrafficSide::RightHand);
        assert_eq!(rec.exposure, Exposure { left: 100, right: 50 });
        assert_eq!(rec.side, Side::Left);
        assert!(rec.suggestion.contains("LEFT"));
    }

    #[test]
    fn sun_on_the_right_quarter() {
        let rec = recommend(0.0, sun(90.0, 10.0), TrafficSide::RightHand);
        assert_eq!(rec.exposure, Exposure { left: 50, right: 100 });
        assert_eq!(rec.side, Side::Right);
    }

    #[test]
    fn sun_directly_behind_favours_right() {
        assert_eq!(exposure_for(180.0), Exposure { left: 0, right: 100 });
        assert_eq!(choose_side(exposure_for(180.0)), Side::Right);
    }

    #[test]
    fn night_means_any_side() {
        let rec = recommend(123.0, sun(250.0, -5.0), TrafficSide::RightHand);
        assert_eq!(rec.side, Side::Any);
        assert_eq!(rec.exposure, Exposure { left: 0, right: 0 });
        assert!(rec.suggestion.contains("No sunlight"));
    }

    #[test]
    fn horizon_counts_as_night() {
        let rec = recommend(0.0, sun(90.0, 0.0), TrafficSide::RightHand);
        assert_eq!(rec.side, Side::Any);
    }

    #[test]
    fn left_hand_traffic_mirrors_exposure() {
        let rec = recommend(0.0, sun(270.0, 10.0), TrafficSide::LeftHand);
        assert_eq!(rec.exposure, Exposure { left: 50, right: 100 });
        assert_eq!(rec.side, Side::Right);

        let rec = recommend(0.0, sun(90.0, 10.0), TrafficSide::LeftHand);
        assert_eq!(rec.exposure, Exposure { left: 100, right: 50 });
        assert_eq!(rec.side, Side::Left);
    }

    #[test]
    fn rounding_matches_half_up() {
        // 0.9 / 180 * 100 = 0.5 exactly rounds up
        assert_eq!(exposure_for(0.9).left, 99);
        assert_eq!(exposure_for(180.9).right, 99);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_night_is_always_any(
                heading in -180.0f64..=180.0,
                azimuth in 0.0f64..360.0,
                altitude in -90.0f64..=0.0
            ) {
                let rec = recommend(heading, sun(azimuth, altitude), TrafficSide::RightHand);
                prop_assert_eq!(rec.side, Side::Any);
                prop_assert_eq!(rec.exposure, Exposure { left: 0, right: 0 });
            }

            #[test]
            fn prop_front_half_keeps_right_full(angle in 0.0f64..=180.0) {
                let exposure = exposure_for(angle);
                prop_assert_eq!(exposure.right, 100);
                let expected = 100 - (angle / 180.0 * 100.0).round() as u8;
                prop_assert_eq!(exposure.left, expected);
                prop_assert!(exposure.left <= 100);
            }

            #[test]
            fn prop_back_half_keeps_left_full(angle in 180.0001f64..360.0) {
                prop_assert_eq!(exposure_for(angle).left, 100);
            }

            #[test]
            fn prop_side_follows_strict_comparison(
                heading in -180.0f64..=180.0,
                azimuth in 0.0f64..360.0,
                altitude in 0.01f64..90.0
            ) {
                let rec = recommend(heading, sun(azimuth, altitude), TrafficSide::RightHand);
                let expected = if rec.exposure.left > rec.exposure.right { Side::Left } else { Side::Right };
                prop_assert_eq!(rec.side, expected);
            }

            #[test]
            fn prop_day_exposure_is_bounded(
                heading in -180.0f64..=180.0,
                azimuth in 0.0f64..360.0,
                altitude in 0.01f64..90.0
            ) {
                let rec = recommend(heading, sun(azimuth, altitude), TrafficSide::RightHand);
                let sum = rec.exposure.left as u16 + rec.exposure.right as u16;
                prop_assert!((100..=200).contains(&sum));
                prop_assert!(rec.exposure.left == 100 || rec.exposure.right == 100);
            }

            #[test]
            fn prop_full_turn_is_continuous(base in 0.0f64..360.0) {
                prop_assert_eq!(exposure_for(base), exposure_for(base + 360.0));
                prop_assert_eq!(exposure_for(base), exposure_for(base - 360.0));
            }
        }

        #[test]
        fn zero_and_full_turn_agree() {
            assert_eq!(exposure_for(0.0), exposure_for(360.0));
        }
    }
}
