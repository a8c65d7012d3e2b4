//! Great-circle and 3D distance between GPS samples.

use crate::models::TrackPoint;

/// Mean Earth radius used for the haversine sphere, in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance in meters between two lat/lon pairs given in degrees.
///
/// Coordinates are not range-checked.
pub fn horizontal_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    // Rounding can push h a hair above 1.0 for antipodal points.
    let c = 2.0 * h.sqrt().min(1.0).asin();

    EARTH_RADIUS_M * c
}

/// Distance in meters between two samples, treating the great-circle leg and
/// the elevation change as orthogonal sides of a right triangle.
///
/// Only meaningful for short hops such as consecutive GPS fixes.
pub fn spatial_distance(from: &TrackPoint, to: &TrackPoint) -> f64 {
    let horizontal = horizontal_distance(from.lat, from.lon, to.lat, to.lon);
    let vertical = to.elevation - from.elevation;
    horizontal.hypot(vertical)
}
