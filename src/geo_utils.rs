//! # Geographic Utilities
//!
//! Small geographic helpers used when handing cached segments to a renderer.
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`haversine_distance`] | Great-circle distance between two waypoints |
//! | [`polyline_length`] | Total length of a segment geometry in meters |
//! | [`compute_bounds`] | Bounding box of a segment geometry |
//!
//! All functions expect WGS84 coordinates (latitude/longitude in degrees).

use geo::{Distance, Haversine, Point};

use crate::{Bounds, Waypoint};

/// Great-circle distance between two waypoints in meters.
///
/// ```rust
/// use route_segments::{Waypoint, geo_utils};
///
/// let london = Waypoint::new(51.5074, -0.1278);
/// let paris = Waypoint::new(48.8566, 2.3522);
///
/// let distance = geo_utils::haversine_distance(&london, &paris);
/// assert!((distance - 343_560.0).abs() < 1000.0); // ~344 km
/// ```
#[inline]
pub fn haversine_distance(p1: &Waypoint, p2: &Waypoint) -> f64 {
    let point1 = Point::new(p1.longitude, p1.latitude);
    let point2 = Point::new(p2.longitude, p2.latitude);
    Haversine::distance(point1, point2)
}

/// Total length of a polyline in meters. Empty or single-point input is 0.
pub fn polyline_length(points: &[Waypoint]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }

    points
        .windows(2)
        .map(|w| haversine_distance(&w[0], &w[1]))
        .sum()
}

/// Bounding box enclosing all points.
///
/// For empty input the result has inverted MIN/MAX values; use
/// [`Bounds::from_points`] when the input may be empty.
pub fn compute_bounds(points: &[Waypoint]) -> Bounds {
    let mut min_lat = f64::MAX;
    let mut max_lat = f64::MIN;
    let mut min_lng = f64::MAX;
    let mut max_lng = f64::MIN;

    for p in points {
        min_lat = min_lat.min(p.latitude);
        max_lat = max_lat.max(p.latitude);
        min_lng = min_lng.min(p.longitude);
        max_lng = max_lng.max(p.longitude);
    }

    Bounds { min_lat, max_lat, min_lng, max_lng }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_distance_same_point() {
        let p = Waypoint::new(25.0330, 121.5654);
        assert_eq!(haversine_distance(&p, &p), 0.0);
    }

    #[test]
    fn test_polyline_length_short_input() {
        assert_eq!(polyline_length(&[]), 0.0);
        assert_eq!(polyline_length(&[Waypoint::new(25.0330, 121.5654)]), 0.0);
    }

    #[test]
    fn test_polyline_length_sums_legs() {
        let a = Waypoint::new(25.0000, 121.5000);
        let b = Waypoint::new(25.0010, 121.5000);
        let c = Waypoint::new(25.0020, 121.5000);
        let total = polyline_length(&[a, b, c]);
        let expected = haversine_distance(&a, &b) + haversine_distance(&b, &c);
        assert!((total - expected).abs() < 1e-9);
        // 0.002 degrees of latitude is roughly 222m
        assert!(total > 200.0 && total < 250.0);
    }

    #[test]
    fn test_compute_bounds() {
        let track = vec![
            Waypoint::new(25.03, 121.56),
            Waypoint::new(25.05, 121.51),
            Waypoint::new(25.04, 121.53),
        ];
        let bounds = compute_bounds(&track);
        assert_eq!(bounds.min_lat, 25.03);
        assert_eq!(bounds.max_lat, 25.05);
        assert_eq!(bounds.min_lng, 121.51);
        assert_eq!(bounds.max_lng, 121.56);
    }
}
