//! Spherical Web-Mercator projection onto the unit square.
//!
//! Clustering runs in projected space so a fixed pixel radius maps to a
//! fixed distance at every latitude. `x` grows eastward from 0 at -180°,
//! `y` grows southward from 0 at the northern clip latitude (about 85.05°).
//! Points beyond the clip latitude are pinned to the edge.

use std::f64::consts::PI;

use eventmap_types::GeoPoint;

/// Project a longitude in degrees to `x` in `[0, 1]`.
pub fn lng_to_x(lng: f64) -> f64 {
    lng / 360.0 + 0.5
}

/// Project a latitude in degrees to `y` in `[0, 1]`.
pub fn lat_to_y(lat: f64) -> f64 {
    let sin = (lat * PI / 180.0).sin();
    let y = 0.5 - 0.25 * ((1.0 + sin) / (1.0 - sin)).ln() / PI;
    y.clamp(0.0, 1.0)
}

/// Inverse of [`lng_to_x`].
pub fn x_to_lng(x: f64) -> f64 {
    (x - 0.5) * 360.0
}

/// Inverse of [`lat_to_y`].
pub fn y_to_lat(y: f64) -> f64 {
    let angle = (180.0 - y * 360.0) * PI / 180.0;
    360.0 * angle.exp().atan() / PI - 90.0
}

/// Project a coordinate to `(x, y)`.
pub fn project(point: GeoPoint) -> (f64, f64) {
    (lng_to_x(point.lng), lat_to_y(point.lat))
}

/// Unproject `(x, y)` back to a coordinate.
pub fn unproject(x: f64, y: f64) -> GeoPoint {
    GeoPoint::new(y_to_lat(y), x_to_lng(x))
}

/// Clustering radius in projected units for an integer zoom level.
///
/// `radius` and `extent` are both in pixels; at zoom `z` the world is
/// `extent * 2^z` pixels wide.
pub fn radius_at(radius: f64, extent: f64, zoom: u8) -> f64 {
    radius / (extent * 2.0_f64.powi(i32::from(zoom)))
}
