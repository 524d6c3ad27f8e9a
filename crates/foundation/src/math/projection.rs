//! Forward/inverse map projections.
//!
//! Two families cover the two views: a composite conic equal-area
//! projection for the national view (a conterminous main zone plus two
//! inset zones for the northwest and pacific territories) and a
//! pseudocylindrical polynomial projection for the world view.
//!
//! Both are parameterized by a fixed scale and translate chosen so the
//! subject area fills the default viewport; the pan/zoom transform is
//! layered on top by the viewport controller and is *not* part of the
//! projection.

use super::geodesy::GeoCoordinate;
use super::vec::Vec2;

/// Deterministic mapping between geographic and surface coordinates.
///
/// `project` returns `None` when the coordinate falls outside the
/// projection's valid domain; `invert` is the approximate inverse over
/// the projected image and returns `None` off the map.
pub trait Projection {
    fn project(&self, coord: GeoCoordinate) -> Option<Vec2>;
    fn invert(&self, point: Vec2) -> Option<GeoCoordinate>;
}

/// Single-zone conic equal-area projection (Albers).
///
/// `rotate_lon_deg` rotates the globe before projecting; `center` is the
/// post-rotation coordinate that maps exactly to `translate`. Screen y
/// grows downward.
#[derive(Debug, Copy, Clone)]
pub struct ConicEqualArea {
    n: f64,
    c: f64,
    r0: f64,
    rotate_lon_deg: f64,
    center_raw: (f64, f64),
    scale: f64,
    translate: Vec2,
}

impl ConicEqualArea {
    pub fn new(
        parallels: (f64, f64),
        rotate_lon_deg: f64,
        center: (f64, f64),
        scale: f64,
        translate: Vec2,
    ) -> Self {
        let sy0 = parallels.0.to_radians().sin();
        let n = (sy0 + parallels.1.to_radians().sin()) / 2.0;
        let c = 1.0 + sy0 * (2.0 * n - sy0);
        let r0 = c.sqrt() / n;

        let mut proj = Self {
            n,
            c,
            r0,
            rotate_lon_deg,
            center_raw: (0.0, 0.0),
            scale,
            translate,
        };
        proj.center_raw = proj.raw(center.0.to_radians(), center.1.to_radians());
        proj
    }

    fn raw(&self, lambda_rad: f64, phi_rad: f64) -> (f64, f64) {
        let r = (self.c - 2.0 * self.n * phi_rad.sin()).max(0.0).sqrt() / self.n;
        let a = lambda_rad * self.n;
        (r * a.sin(), self.r0 - r * a.cos())
    }

    fn raw_invert(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let r0y = self.r0 - y;
        let mut l = x.atan2(r0y.abs()) * r0y.signum();
        if r0y * self.n < 0.0 {
            l -= std::f64::consts::PI * x.signum() * r0y.signum();
        }
        let s = (self.c - (x * x + r0y * r0y) * self.n * self.n) / (2.0 * self.n);
        if !(-1.0..=1.0).contains(&s) {
            return None;
        }
        Some((l / self.n, s.asin()))
    }

    pub fn project(&self, coord: GeoCoordinate) -> Vec2 {
        let lambda = normalize_lon_deg(coord.longitude + self.rotate_lon_deg).to_radians();
        let (x, y) = self.raw(lambda, coord.latitude.to_radians());
        Vec2::new(
            self.translate.x + self.scale * (x - self.center_raw.0),
            self.translate.y - self.scale * (y - self.center_raw.1),
        )
    }

    pub fn invert(&self, point: Vec2) -> Option<GeoCoordinate> {
        let x = self.center_raw.0 + (point.x - self.translate.x) / self.scale;
        let y = self.center_raw.1 - (point.y - self.translate.y) / self.scale;
        let (lambda, phi) = self.raw_invert(x, y)?;
        Some(GeoCoordinate::new(
            phi.to_degrees(),
            normalize_lon_deg(lambda.to_degrees() - self.rotate_lon_deg),
        ))
    }
}

/// Which sub-projection of the composite a coordinate or pixel belongs to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum CompositeZone {
    Main,
    Northwest,
    Pacific,
}

/// Composite equal-area projection for the national view.
///
/// Three conic equal-area zones: the conterminous main zone and two
/// insets drawn below-left of it. Forward projection routes by
/// geographic bounds and rejects coordinates far outside the covered
/// territory; the inverse routes by each zone's screen-space extent.
/// A projected point is only reported when both routings agree, which
/// makes `invert(project(c))` exact up to floating-point error.
#[derive(Debug, Copy, Clone)]
pub struct AlbersComposite {
    main: ConicEqualArea,
    northwest: ConicEqualArea,
    pacific: ConicEqualArea,
    scale: f64,
    translate: Vec2,
}

impl AlbersComposite {
    pub fn new(scale: f64, translate: Vec2) -> Self {
        let main = ConicEqualArea::new((29.5, 45.5), 96.0, (-0.6, 38.7), scale, translate);
        let northwest = ConicEqualArea::new(
            (55.0, 65.0),
            154.0,
            (-2.0, 58.5),
            scale * 0.35,
            translate + Vec2::new(-0.307 * scale, 0.201 * scale),
        );
        let pacific = ConicEqualArea::new(
            (8.0, 18.0),
            157.0,
            (-3.0, 19.9),
            scale,
            translate + Vec2::new(-0.205 * scale, 0.212 * scale),
        );
        Self {
            main,
            northwest,
            pacific,
            scale,
            translate,
        }
    }

    fn zone_for_coord(&self, coord: GeoCoordinate) -> Option<CompositeZone> {
        let lat = coord.latitude;
        let lon = coord.longitude;
        if lat >= 50.0 && (lon <= -127.0 || lon >= 170.0) {
            return Some(CompositeZone::Northwest);
        }
        if (18.0..24.0).contains(&lat) && (-162.0..-154.0).contains(&lon) {
            return Some(CompositeZone::Pacific);
        }
        if (22.0..=52.0).contains(&lat) && (-129.0..=-64.0).contains(&lon) {
            return Some(CompositeZone::Main);
        }
        None
    }

    fn zone_for_point(&self, point: Vec2) -> Option<CompositeZone> {
        let x = (point.x - self.translate.x) / self.scale;
        let y = (point.y - self.translate.y) / self.scale;
        if !(-0.455..=0.455).contains(&x) || !(-0.238..=0.238).contains(&y) {
            return None;
        }
        if (0.120..0.234).contains(&y) && (-0.425..-0.214).contains(&x) {
            return Some(CompositeZone::Northwest);
        }
        if (0.166..0.234).contains(&y) && (-0.214..-0.115).contains(&x) {
            return Some(CompositeZone::Pacific);
        }
        Some(CompositeZone::Main)
    }

    fn zone(&self, zone: CompositeZone) -> &ConicEqualArea {
        match zone {
            CompositeZone::Main => &self.main,
            CompositeZone::Northwest => &self.northwest,
            CompositeZone::Pacific => &self.pacific,
        }
    }
}

impl Projection for AlbersComposite {
    fn project(&self, coord: GeoCoordinate) -> Option<Vec2> {
        let zone = self.zone_for_coord(coord)?;
        let point = self.zone(zone).project(coord);
        // Inset screen rects overlap the main zone's image; only report
        // points whose inverse routing lands back in the same zone.
        if self.zone_for_point(point) == Some(zone) {
            Some(point)
        } else {
            None
        }
    }

    fn invert(&self, point: Vec2) -> Option<GeoCoordinate> {
        let zone = self.zone_for_point(point)?;
        self.zone(zone).invert(point)
    }
}

// Natural Earth polynomial coefficients (pseudocylindrical world view).
const NE_EPSILON: f64 = 1e-12;
const NE_MAX_ITERATIONS: usize = 25;

fn natural_earth_x_factor(phi: f64) -> f64 {
    let phi2 = phi * phi;
    let phi4 = phi2 * phi2;
    0.8707 - 0.131979 * phi2 + phi4 * (-0.013791 + phi4 * (0.003971 * phi2 - 0.001529 * phi4))
}

fn natural_earth_y(phi: f64) -> f64 {
    let phi2 = phi * phi;
    let phi4 = phi2 * phi2;
    phi * (1.007226 + phi2 * (0.015085 + phi4 * (-0.044475 + 0.028874 * phi2 - 0.005916 * phi4)))
}

fn natural_earth_dy(phi: f64) -> f64 {
    let phi2 = phi * phi;
    let phi4 = phi2 * phi2;
    1.007226 + phi2 * (0.045255 + phi4 * (-0.311325 + 0.259866 * phi2 - 0.005916 * 11.0 * phi4))
}

/// Natural Earth world projection with a fixed scale and translate.
///
/// The inverse recovers latitude by Newton iteration on the y polynomial.
#[derive(Debug, Copy, Clone)]
pub struct NaturalEarth {
    scale: f64,
    translate: Vec2,
}

impl NaturalEarth {
    pub fn new(scale: f64, translate: Vec2) -> Self {
        Self { scale, translate }
    }
}

impl Projection for NaturalEarth {
    fn project(&self, coord: GeoCoordinate) -> Option<Vec2> {
        let coord = GeoCoordinate::try_new(coord.latitude, coord.longitude)?;
        let lambda = coord.longitude.to_radians();
        let phi = coord.latitude.to_radians();
        let x = lambda * natural_earth_x_factor(phi);
        let y = natural_earth_y(phi);
        Some(Vec2::new(
            self.translate.x + self.scale * x,
            self.translate.y - self.scale * y,
        ))
    }

    fn invert(&self, point: Vec2) -> Option<GeoCoordinate> {
        let x = (point.x - self.translate.x) / self.scale;
        let y = -(point.y - self.translate.y) / self.scale;

        let mut phi = y;
        for _ in 0..NE_MAX_ITERATIONS {
            let delta = (natural_earth_y(phi) - y) / natural_earth_dy(phi);
            phi -= delta;
            if delta.abs() <= NE_EPSILON {
                break;
            }
        }

        let lambda = x / natural_earth_x_factor(phi);
        GeoCoordinate::try_new(phi.to_degrees(), lambda.to_degrees())
    }
}

fn normalize_lon_deg(lon_deg: f64) -> f64 {
    let wrapped = (lon_deg + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 && lon_deg > 0.0 {
        180.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::{AlbersComposite, NaturalEarth, Projection};
    use crate::math::{GeoCoordinate, Vec2};

    fn assert_round_trip(proj: &dyn Projection, coord: GeoCoordinate) {
        let point = proj
            .project(coord)
            .unwrap_or_else(|| panic!("{coord:?} should be inside the domain"));
        let back = proj
            .invert(point)
            .unwrap_or_else(|| panic!("{point:?} should invert"));
        assert!(
            (back.latitude - coord.latitude).abs() <= 1e-3,
            "lat {} vs {}",
            back.latitude,
            coord.latitude
        );
        assert!(
            (back.longitude - coord.longitude).abs() <= 1e-3,
            "lon {} vs {}",
            back.longitude,
            coord.longitude
        );
    }

    fn national() -> AlbersComposite {
        AlbersComposite::new(1280.0, Vec2::new(480.0, 300.0))
    }

    fn world() -> NaturalEarth {
        NaturalEarth::new(200.0, Vec2::new(475.0, 300.0))
    }

    #[test]
    fn national_round_trips_mainland_points() {
        let proj = national();
        for coord in [
            GeoCoordinate::new(37.0, -76.3),
            GeoCoordinate::new(47.6, -122.3),
            GeoCoordinate::new(25.76, -80.19),
            GeoCoordinate::new(44.97, -93.27),
        ] {
            assert_round_trip(&proj, coord);
        }
    }

    #[test]
    fn national_round_trips_inset_points() {
        let proj = national();
        // Anchorage and Honolulu land in the inset zones.
        assert_round_trip(&proj, GeoCoordinate::new(61.2, -149.9));
        assert_round_trip(&proj, GeoCoordinate::new(21.3, -157.85));
    }

    #[test]
    fn national_rejects_far_outside_coordinates() {
        let proj = national();
        // London, Sydney, central Mexico.
        assert!(proj.project(GeoCoordinate::new(51.5, -0.1)).is_none());
        assert!(proj.project(GeoCoordinate::new(-33.8, 151.2)).is_none());
        assert!(proj.project(GeoCoordinate::new(19.4, -99.1)).is_none());
    }

    #[test]
    fn inset_pixels_route_back_to_inset_zones() {
        let proj = national();
        let anchorage = GeoCoordinate::new(61.2, -149.9);
        let px = proj.project(anchorage).unwrap();
        let back = proj.invert(px).unwrap();
        assert!((back.latitude - anchorage.latitude).abs() < 1e-3);
    }

    #[test]
    fn world_round_trips_global_points() {
        let proj = world();
        for coord in [
            GeoCoordinate::new(37.0, -76.3),
            GeoCoordinate::new(51.5, -0.1),
            GeoCoordinate::new(-33.8, 151.2),
            GeoCoordinate::new(64.1, -21.9),
            GeoCoordinate::new(0.0, 0.0),
        ] {
            assert_round_trip(&proj, coord);
        }
    }

    #[test]
    fn world_center_maps_to_translate() {
        let proj = world();
        let p = proj.project(GeoCoordinate::new(0.0, 0.0)).unwrap();
        assert!((p.x - 475.0).abs() < 1e-9);
        assert!((p.y - 300.0).abs() < 1e-9);
    }

    #[test]
    fn world_rejects_invalid_coordinates() {
        let proj = world();
        assert!(proj.project(GeoCoordinate::new(95.0, 0.0)).is_none());
        assert!(proj.project(GeoCoordinate::new(f64::NAN, 10.0)).is_none());
    }
}
