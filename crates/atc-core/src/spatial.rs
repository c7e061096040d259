//! Great-circle distance and separation math.

use crate::models::Waypoint;

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;
pub const KM_PER_NM: f64 = 1.852;

/// Great-circle distance in kilometers using the haversine formula.
///
/// Symmetric in its arguments and exactly zero for identical points.
pub fn haversine_km(a: Waypoint, b: Waypoint) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let dphi = (b.lat - a.lat).to_radians();
    let dlambda = (b.lon - a.lon).to_radians();
    let h = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    // Rounding can push h a hair past 1 for antipodal points.
    let h = h.clamp(0.0, 1.0);
    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Great-circle distance in nautical miles.
pub fn haversine_nm(a: Waypoint, b: Waypoint) -> f64 {
    km_to_nm(haversine_km(a, b))
}

pub fn horizontal_separation_nm(a: Waypoint, b: Waypoint) -> f64 {
    haversine_nm(a, b)
}

pub fn vertical_separation_ft(alt_ft_a: f64, alt_ft_b: f64) -> f64 {
    (alt_ft_a - alt_ft_b).abs()
}

pub fn km_to_nm(km: f64) -> f64 {
    km / KM_PER_NM
}

pub fn nm_to_km(nm: f64) -> f64 {
    nm * KM_PER_NM
}

/// Nautical miles spanned by one degree of arc on the model sphere.
pub fn nm_per_degree() -> f64 {
    km_to_nm(EARTH_RADIUS_KM.to_radians())
}

/// Offset a position by distance and bearing.
///
/// # Arguments
/// * `origin` - Starting position
/// * `distance_nm` - Distance in nautical miles
/// * `bearing_rad` - Bearing in radians (0 = north, π/2 = east)
pub fn offset_by_bearing(origin: Waypoint, distance_nm: f64, bearing_rad: f64) -> Waypoint {
    if distance_nm.abs() <= f64::EPSILON {
        return origin;
    }

    let lat1 = origin.lat.to_radians();
    let lon1 = origin.lon.to_radians();
    let angular_distance = nm_to_km(distance_nm) / EARTH_RADIUS_KM;

    let sin_lat1 = lat1.sin();
    let cos_lat1 = lat1.cos();
    let sin_ad = angular_distance.sin();
    let cos_ad = angular_distance.cos();

    let sin_lat2 = sin_lat1 * cos_ad + cos_lat1 * sin_ad * bearing_rad.cos();
    let lat2 = sin_lat2.clamp(-1.0, 1.0).asin();

    let y = bearing_rad.sin() * sin_ad * cos_lat1;
    let x = cos_ad - sin_lat1 * sin_lat2;
    let mut lon2 = lon1 + y.atan2(x);
    lon2 =
        (lon2 + std::f64::consts::PI).rem_euclid(2.0 * std::f64::consts::PI) - std::f64::consts::PI;

    Waypoint::new(lat2.to_degrees(), lon2.to_degrees())
}
