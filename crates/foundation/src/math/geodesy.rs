/// Mean Earth radius (kilometers).
pub const EARTH_RADIUS_KM: f64 = 6371.0;
/// The single unit-conversion constant in the tree.
pub const KILOMETERS_PER_MILE: f64 = 1.609344;
/// Mean Earth radius (miles), derived from the two constants above.
pub const EARTH_RADIUS_MILES: f64 = EARTH_RADIUS_KM / KILOMETERS_PER_MILE;

/// Geographic coordinates in degrees.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GeoCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoCoordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Validated constructor: latitude in [-90, 90], longitude in [-180, 180].
    pub fn try_new(latitude: f64, longitude: f64) -> Option<Self> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return None;
        }
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return None;
        }
        Some(Self::new(latitude, longitude))
    }
}

/// Great-circle distance in miles via the haversine formula.
///
/// Computed in kilometers (R = 6371) and converted once through
/// `KILOMETERS_PER_MILE`.
pub fn haversine_miles(a: GeoCoordinate, b: GeoCoordinate) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin() * (d_lat / 2.0).sin()
        + a.latitude.to_radians().cos()
            * b.latitude.to_radians().cos()
            * (d_lon / 2.0).sin()
            * (d_lon / 2.0).sin();
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c / KILOMETERS_PER_MILE
}

/// Angular radius (degrees of arc) subtended by a linear radius in miles.
pub fn angular_radius_deg(radius_miles: f64) -> f64 {
    let circumference = 2.0 * std::f64::consts::PI * EARTH_RADIUS_MILES;
    radius_miles / circumference * 360.0
}

/// Point reached by travelling `distance_miles` from `origin` along the
/// initial bearing `bearing_deg` (clockwise from north).
pub fn destination(origin: GeoCoordinate, bearing_deg: f64, distance_miles: f64) -> GeoCoordinate {
    let delta = distance_miles / EARTH_RADIUS_MILES;
    let theta = bearing_deg.to_radians();
    let lat1 = origin.latitude.to_radians();
    let lon1 = origin.longitude.to_radians();

    let lat2 = (lat1.sin() * delta.cos() + lat1.cos() * delta.sin() * theta.cos()).asin();
    let lon2 = lon1
        + (theta.sin() * delta.sin() * lat1.cos()).atan2(delta.cos() - lat1.sin() * lat2.sin());

    GeoCoordinate::new(lat2.to_degrees(), wrap_longitude(lon2.to_degrees()))
}

/// Closed ring of points at constant great-circle distance from `center`.
///
/// Bearings advance in `step_deg` increments; the ring is not explicitly
/// closed (the consumer treats it as cyclic). A radius of 0 yields a
/// degenerate ring of copies of the center, which is still valid geometry.
pub fn small_circle_ring(
    center: GeoCoordinate,
    radius_miles: f64,
    step_deg: f64,
) -> Vec<GeoCoordinate> {
    let step = step_deg.max(1.0);
    let steps = (360.0 / step).ceil() as usize;
    let mut ring = Vec::with_capacity(steps);
    for i in 0..steps {
        ring.push(destination(center, i as f64 * step, radius_miles.max(0.0)));
    }
    ring
}

fn wrap_longitude(lon_deg: f64) -> f64 {
    let wrapped = (lon_deg + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 && lon_deg > 0.0 {
        180.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::{
        GeoCoordinate, angular_radius_deg, destination, haversine_miles, small_circle_ring,
    };

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn haversine_zero_for_identical_points() {
        let p = GeoCoordinate::new(37.0, -76.3);
        assert_close(haversine_miles(p, p), 0.0, 1e-12);
    }

    #[test]
    fn haversine_known_pair() {
        // Norfolk, VA to Richmond, VA is roughly 75 miles.
        let norfolk = GeoCoordinate::new(36.85, -76.29);
        let richmond = GeoCoordinate::new(37.54, -77.44);
        let d = haversine_miles(norfolk, richmond);
        assert!((70.0..80.0).contains(&d), "got {d}");
    }

    #[test]
    fn destination_round_trips_distance() {
        let origin = GeoCoordinate::new(40.0, -100.0);
        for bearing in [0.0, 45.0, 90.0, 180.0, 270.0] {
            let p = destination(origin, bearing, 120.0);
            assert_close(haversine_miles(origin, p), 120.0, 1e-6);
        }
    }

    #[test]
    fn angular_radius_scales_linearly() {
        assert_close(angular_radius_deg(0.0), 0.0, 1e-12);
        assert_close(
            angular_radius_deg(100.0) * 2.0,
            angular_radius_deg(200.0),
            1e-12,
        );
    }

    #[test]
    fn ring_points_sit_at_requested_distance() {
        let center = GeoCoordinate::new(37.0, -76.3);
        let ring = small_circle_ring(center, 50.0, 6.0);
        assert_eq!(ring.len(), 60);
        for p in &ring {
            assert_close(haversine_miles(center, *p), 50.0, 1e-6);
        }
    }

    #[test]
    fn zero_radius_ring_is_degenerate_but_valid() {
        let center = GeoCoordinate::new(10.0, 10.0);
        let ring = small_circle_ring(center, 0.0, 6.0);
        assert_eq!(ring.len(), 60);
        for p in &ring {
            assert_close(p.latitude, center.latitude, 1e-9);
            assert_close(p.longitude, center.longitude, 1e-9);
        }
    }

    #[test]
    fn try_new_rejects_out_of_range() {
        assert!(GeoCoordinate::try_new(91.0, 0.0).is_none());
        assert!(GeoCoordinate::try_new(0.0, -181.0).is_none());
        assert!(GeoCoordinate::try_new(f64::NAN, 0.0).is_none());
        assert!(GeoCoordinate::try_new(90.0, 180.0).is_some());
    }
}
