//! Great-circle distance between two points.

use crate::domain::GeoPoint;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine great-circle distance in kilometres.
///
/// Uses the `0.5 - cos(dLat)/2` form of the haversine term, which is
/// algebraically identical to `sin²(dLat/2)`.
///
/// # Examples
///
/// ```
/// use bike_server::domain::GeoPoint;
/// use bike_server::estimate::great_circle_distance_km;
///
/// let spire = GeoPoint::new(53.3498, -6.2603).unwrap();
/// let dame_street = GeoPoint::new(53.3441, -6.2675).unwrap();
///
/// let d = great_circle_distance_km(spire, dame_street);
/// assert!((d - 0.7938).abs() < 1e-3);
/// assert_eq!(great_circle_distance_km(spire, spire), 0.0);
/// ```
pub fn great_circle_distance_km(origin: GeoPoint, destination: GeoPoint) -> f64 {
    let d_lat = (destination.latitude() - origin.latitude()).to_radians();
    let d_lon = (destination.longitude() - origin.longitude()).to_radians();

    let a = 0.5 - d_lat.cos() / 2.0
        + origin.latitude().to_radians().cos()
            * destination.latitude().to_radians().cos()
            * (1.0 - d_lon.cos())
            / 2.0;

    // Rounding can push `a` a hair outside [0, 1] for (near-)antipodal or
    // identical points; sqrt/asin would then return NaN.
    let a = a.clamp(0.0, 1.0);

    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(lat, lon).unwrap()
    }

    /// Textbook `sin²` haversine, used to cross-check the cosine form.
    fn reference_haversine(a: GeoPoint, b: GeoPoint) -> f64 {
        let d_lat = (b.latitude() - a.latitude()).to_radians();
        let d_lon = (b.longitude() - a.longitude()).to_radians();
        let h = (d_lat / 2.0).sin().powi(2)
            + a.latitude().to_radians().cos()
                * b.latitude().to_radians().cos()
                * (d_lon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
    }

    #[test]
    fn same_point_is_zero() {
        let dublin = point(53.3498, -6.2603);
        assert_eq!(great_circle_distance_km(dublin, dublin), 0.0);
    }

    #[test]
    fn dublin_city_centre_fixture() {
        let spire = point(53.3498, -6.2603);
        let dame_street = point(53.3441, -6.2675);

        let d = great_circle_distance_km(spire, dame_street);
        assert!((d - 0.793_812_304_627_621_4).abs() < 1e-6, "got {d}");
    }

    #[test]
    fn symmetric_fixture() {
        let a = point(53.3498, -6.2603);
        let b = point(53.3441, -6.2675);
        assert_eq!(
            great_circle_distance_km(a, b),
            great_circle_distance_km(b, a)
        );
    }

    #[test]
    fn one_degree_of_latitude() {
        // 2πR / 360
        let d = great_circle_distance_km(point(0.0, 0.0), point(1.0, 0.0));
        assert!((d - 111.194_926_644_558_7).abs() < 1e-6, "got {d}");
    }

    #[test]
    fn antipodes_are_half_circumference() {
        let d = great_circle_distance_km(point(0.0, 0.0), point(0.0, 180.0));
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
        assert!(d.is_finite());
    }

    #[test]
    fn matches_sine_form() {
        let pairs = [
            (point(53.3498, -6.2603), point(53.3441, -6.2675)),
            (point(51.5074, -0.1278), point(48.8566, 2.3522)),
            (point(-33.8688, 151.2093), point(40.7128, -74.0060)),
        ];
        for (a, b) in pairs {
            let ours = great_circle_distance_km(a, b);
            let theirs = reference_haversine(a, b);
            assert!((ours - theirs).abs() < 1e-6, "{a:?} -> {b:?}: {ours} vs {theirs}");
        }
    }
}
