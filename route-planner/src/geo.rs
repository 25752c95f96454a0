//! Great-circle calculations on a spherical Earth.
//!
//! All distances are in meters. Trip planning converts to kilometers at
//! the point where it applies an average speed, so a single radius is
//! used throughout the crate.

use crate::domain::GeoPoint;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine great-circle distance between two points, in meters.
///
/// # Examples
///
/// ```
/// use route_planner::domain::GeoPoint;
/// use route_planner::geo::distance;
///
/// let seoul = GeoPoint::new(37.5665, 126.9780);
/// let busan = GeoPoint::new(35.1796, 129.0756);
/// let km = distance(seoul, busan) / 1000.0;
/// assert!(km > 320.0 && km < 330.0);
/// ```
pub fn distance(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lon = (b.longitude - a.longitude).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().min(1.0).asin();

    EARTH_RADIUS_M * c
}

/// Initial bearing from `a` towards `b`, in degrees clockwise from north
/// in `[0, 360)`.
pub fn bearing(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let delta_lon = (b.longitude - a.longitude).to_radians();

    let y = delta_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * delta_lon.cos();

    y.atan2(x).to_degrees().rem_euclid(360.0)
}

/// Point reached by travelling `meters` from `origin` along `bearing_deg`.
pub fn destination_point(origin: GeoPoint, bearing_deg: f64, meters: f64) -> GeoPoint {
    let angular = meters / EARTH_RADIUS_M;
    let theta = bearing_deg.to_radians();
    let lat1 = origin.latitude.to_radians();
    let lon1 = origin.longitude.to_radians();

    let lat2 = (lat1.sin() * angular.cos() + lat1.cos() * angular.sin() * theta.cos()).asin();
    let lon2 = lon1
        + (theta.sin() * angular.sin() * lat1.cos()).atan2(angular.cos() - lat1.sin() * lat2.sin());

    GeoPoint::new(
        lat2.to_degrees(),
        (lon2.to_degrees() + 540.0).rem_euclid(360.0) - 180.0,
    )
}
