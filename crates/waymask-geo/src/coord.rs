use crate::GeoPoint;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Wraps a longitude into [-180, 180). 181 -> -179, -181 -> 179, 180 -> -180.
pub fn normalize_longitude(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}

/// Great-circle distance in km (haversine).
pub fn distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();
    let h = (dlat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// Point reached from `from` after `distance_km` along the initial bearing
/// `bearing_deg` (0 = north, clockwise).
///
/// Latitude is returned as computed; the projection is not validated near
/// the poles. Longitude is wrapped with [`normalize_longitude`].
pub fn destination_point(from: GeoPoint, distance_km: f64, bearing_deg: f64) -> GeoPoint {
    let lat1 = from.lat.to_radians();
    let lon1 = from.lon.to_radians();
    let brg = bearing_deg.to_radians();
    let ang = distance_km / EARTH_RADIUS_KM;

    let lat2 = (lat1.sin() * ang.cos() + lat1.cos() * ang.sin() * brg.cos()).asin();
    let lon2 = lon1
        + (brg.sin() * ang.sin() * lat1.cos()).atan2(ang.cos() - lat1.sin() * lat2.sin());

    GeoPoint { lat: lat2.to_degrees(), lon: normalize_longitude(lon2.to_degrees()) }
}

/// Forward azimuth from `a` to `b`, in [0, 360).
pub fn initial_bearing_deg(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlon = (b.lon - a.lon).to_radians();
    let y = dlon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
    y.atan2(x).to_degrees().rem_euclid(360.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_wraps_both_sides() {
        assert_eq!(normalize_longitude(181.0), -179.0);
        assert_eq!(normalize_longitude(-181.0), 179.0);
        assert_eq!(normalize_longitude(180.0), -180.0);
        assert_eq!(normalize_longitude(540.0), -180.0);
    }

    #[test]
    fn zero_distance_is_identity() {
        let p = GeoPoint::new(45.0, -122.0);
        let q = destination_point(p, 0.0, 123.0);
        assert!((q.lat - p.lat).abs() < 1e-12);
        assert!((q.lon - p.lon).abs() < 1e-12);
    }
}
