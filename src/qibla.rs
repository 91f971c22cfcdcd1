//! # Qibla Bearing
//!
//! Great-circle initial bearing from an observer to the Kaaba.
//!
//! With φ the observer's latitude, φk the target latitude and Δλ the longitude
//! difference (all in radians):
//!
//! ```text
//! y = sin(Δλ)
//! x = cos(φ)·tan(φk) − sin(φ)·cos(Δλ)
//! bearing = atan2(y, x)
//! ```
//!
//! The result is converted to degrees and normalized into `[0, 360)`, measured
//! clockwise from true north.

use crate::{GeoCoordinate, KAABA};

/// Initial bearing in degrees from `origin` to `target`, in `[0, 360)`.
///
/// Coincident points have no defined direction; they return `0.0` (north).
///
/// # Example
/// ```
/// use salat_lib::{qibla::compute_bearing, GeoCoordinate};
///
/// let east = compute_bearing(GeoCoordinate::new(0.0, 0.0), GeoCoordinate::new(0.0, 1.0));
/// assert!((east - 90.0).abs() < 1e-9);
/// ```
pub fn compute_bearing(origin: GeoCoordinate, target: GeoCoordinate) -> f64 {
    let phi = origin.latitude.to_radians();
    let phi_k = target.latitude.to_radians();
    let delta_lambda = (target.longitude - origin.longitude).to_radians();

    let y = delta_lambda.sin();
    let x = phi.cos() * phi_k.tan() - phi.sin() * delta_lambda.cos();

    // Coincident points leave x as rounding noise of either sign, which atan2
    // would turn into 0 or 180 at random.
    if x.abs() < 1e-12 && y.abs() < 1e-12 {
        return 0.0;
    }

    normalize_degrees(y.atan2(x).to_degrees())
}

/// Bearing from `origin` to the Kaaba.
pub fn qibla_bearing(origin: GeoCoordinate) -> f64 {
    compute_bearing(origin, KAABA)
}

/// Fold any finite angle into `[0, 360)`.
pub fn normalize_degrees(deg: f64) -> f64 {
    let folded = ((deg % 360.0) + 360.0) % 360.0;
    // 359.999...9 + 360 can round up to exactly 360.0
    if folded >= 360.0 {
        0.0
    } else {
        folded
    }
}

const POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// 16-point compass label for a bearing, e.g. `118.9` → `"ESE"`.
pub fn cardinal(bearing: f64) -> &'static str {
    let idx = ((normalize_degrees(bearing) / 22.5) + 0.5).floor() as usize % POINTS.len();
    POINTS[idx]
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONDON: GeoCoordinate = GeoCoordinate::new(51.5074, -0.1278);

    #[test]
    fn london_points_south_east() {
        let bearing = qibla_bearing(LONDON);
        assert!(
            (118.0..=120.0).contains(&bearing),
            "London bearing {bearing} outside 118-120"
        );
    }

    #[test]
    fn same_point_is_north() {
        assert_eq!(compute_bearing(KAABA, KAABA), 0.0);
        assert_eq!(compute_bearing(LONDON, LONDON), 0.0);
    }

    #[test]
    fn near_kaaba_is_still_in_range() {
        let near = GeoCoordinate::new(21.3891, 39.8579);
        let bearing = qibla_bearing(near);
        assert!((0.0..360.0).contains(&bearing));
    }

    #[test]
    fn known_cities() {
        // Jakarta faces roughly west-north-west, New York roughly north-east.
        let jakarta = qibla_bearing(GeoCoordinate::new(-6.2088, 106.8456));
        assert!((294.0..=296.0).contains(&jakarta), "jakarta {jakarta}");

        let new_york = qibla_bearing(GeoCoordinate::new(40.7128, -74.0060));
        assert!((57.0..=60.0).contains(&new_york), "new york {new_york}");
    }

    #[test]
    fn normalization_folds_negative_and_large_angles() {
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert_eq!(normalize_degrees(720.0), 0.0);
        assert_eq!(normalize_degrees(360.0), 0.0);
        assert!((normalize_degrees(-0.5) - 359.5).abs() < 1e-12);
    }

    #[test]
    fn cardinal_labels() {
        assert_eq!(cardinal(0.0), "N");
        assert_eq!(cardinal(359.0), "N");
        assert_eq!(cardinal(90.0), "E");
        assert_eq!(cardinal(118.9), "ESE");
        assert_eq!(cardinal(225.0), "SW");
    }
}
