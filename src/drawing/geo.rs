//! Great-circle math on latitude/longitude pairs.

use serde::{Deserialize, Serialize};

/// Mean Earth radius used by the haversine formula, in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// A geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Haversine distance between two positions, in meters.
///
/// Symmetric and zero for identical inputs. Inputs must be finite degrees.
pub fn distance_meters(a: LatLng, b: LatLng) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_METERS * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_to_self_is_zero() {
        let p = LatLng::new(7.0840, 125.6277);
        assert_eq!(distance_meters(p, p), 0.0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let pairs = [
            (LatLng::new(0.0, 0.0), LatLng::new(0.0, 0.0003)),
            (LatLng::new(7.083483, 125.627247), LatLng::new(7.084852, 125.628412)),
            (LatLng::new(-33.86, 151.21), LatLng::new(51.5, -0.12)),
            (LatLng::new(89.9, 10.0), LatLng::new(-89.9, -170.0)),
        ];
        for (a, b) in pairs {
            assert_eq!(distance_meters(a, b), distance_meters(b, a));
        }
    }

    #[test]
    fn test_small_longitude_step_at_equator() {
        // 0.0001 degrees of longitude on the equator is about 11.1 m
        let d = distance_meters(LatLng::new(0.0, 0.0), LatLng::new(0.0, 0.0001));
        assert!((d - 11.119).abs() < 0.01, "got {}", d);
    }

    #[test]
    fn test_quarter_meridian() {
        let d = distance_meters(LatLng::new(0.0, 0.0), LatLng::new(90.0, 0.0));
        let expected = EARTH_RADIUS_METERS * std::f64::consts::FRAC_PI_2;
        assert!((d - expected).abs() < 1e-6);
    }

    #[test]
    fn test_antipodes() {
        let d = distance_meters(LatLng::new(0.0, 0.0), LatLng::new(0.0, 180.0));
        let expected = EARTH_RADIUS_METERS * std::f64::consts::PI;
        assert!((d - expected).abs() < 1e-3);
    }
}
