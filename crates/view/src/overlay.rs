use foundation::math::{
    GeoCoordinate, Projection, Vec2, destination, small_circle_ring,
};

/// Bearing step for the rendered small-circle ring (degrees).
const RING_STEP_DEG: f64 = 6.0;
/// Baseline distance used to measure the local projection scale (miles).
const SCALE_PROBE_MILES: f64 = 10.0;

/// Ephemeral drag bookkeeping. Created on drag start, destroyed on drag
/// end; distances are tracked relative to the previous move position so
/// non-monotonic drag paths stay smooth.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DragState {
    pub last_pointer: Vec2,
    pub last_distance_px: f64,
    pub radius_miles: f64,
}

/// Geodesic search-radius indicator.
///
/// The stored radius is zoom-invariant; only its pixel rendering changes
/// with projection and viewport. Drag-resizing converts pointer pixel
/// deltas into mile deltas through the local projection scale measured at
/// the origin, and clamps at zero.
#[derive(Debug, Clone)]
pub struct RadiusSearchOverlay {
    center: GeoCoordinate,
    radius_miles: f64,
    drag: Option<DragState>,
}

impl RadiusSearchOverlay {
    pub fn new(center: GeoCoordinate, radius_miles: f64) -> Self {
        Self {
            center,
            radius_miles: radius_miles.max(0.0),
            drag: None,
        }
    }

    pub fn center(&self) -> GeoCoordinate {
        self.center
    }

    pub fn radius_miles(&self) -> f64 {
        self.radius_miles
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Reposition/resize from the coordinator; interrupts any drag.
    pub fn set(&mut self, center: GeoCoordinate, radius_miles: f64) {
        self.center = center;
        self.radius_miles = radius_miles.max(0.0);
        self.drag = None;
    }

    /// The circle outline in geographic coordinates. A zero radius yields
    /// a degenerate (zero-area) ring, which still renders without error.
    pub fn ring(&self) -> Vec<GeoCoordinate> {
        small_circle_ring(self.center, self.radius_miles, RING_STEP_DEG)
    }

    /// Current circle radius in surface pixels, when the origin projects.
    pub fn surface_radius_px(&self, projection: &dyn Projection) -> Option<f64> {
        Some(self.radius_miles * px_per_mile(projection, self.center)?)
    }

    /// Begin a resize drag at a pointer position in surface space. The
    /// starting radius is read from the overlay's own stored state.
    pub fn drag_start(&mut self, pointer: Vec2, projection: &dyn Projection) -> bool {
        let Some(origin_px) = projection.project(self.center) else {
            return false;
        };
        self.drag = Some(DragState {
            last_pointer: pointer,
            last_distance_px: pointer.distance(origin_px),
            radius_miles: self.radius_miles,
        });
        true
    }

    /// Process a drag move; returns the updated radius. State is read
    /// fresh from the projection on every event, never captured at drag
    /// start.
    pub fn drag_move(&mut self, pointer: Vec2, projection: &dyn Projection) -> Option<f64> {
        let drag = self.drag.as_mut()?;
        let origin_px = projection.project(self.center)?;
        let scale = px_per_mile(projection, self.center)?;

        let distance_px = pointer.distance(origin_px);
        let delta_miles = (distance_px - drag.last_distance_px) / scale;

        drag.radius_miles = (drag.radius_miles + delta_miles).max(0.0);
        drag.last_distance_px = distance_px;
        drag.last_pointer = pointer;

        self.radius_miles = drag.radius_miles;
        Some(self.radius_miles)
    }

    /// End the drag and emit the final radius. An interrupted drag
    /// (pointer leaving the surface) goes through the same path, so the
    /// last known radius is never lost.
    pub fn drag_end(&mut self) -> Option<f64> {
        let drag = self.drag.take()?;
        self.radius_miles = drag.radius_miles;
        Some(self.radius_miles)
    }
}

/// Surface pixels per mile around `origin`, measured along a short
/// northward arc.
pub fn px_per_mile(projection: &dyn Projection, origin: GeoCoordinate) -> Option<f64> {
    let a = projection.project(origin)?;
    let b = projection.project(destination(origin, 0.0, SCALE_PROBE_MILES))?;
    let px = a.distance(b);
    if px <= 0.0 {
        return None;
    }
    Some(px / SCALE_PROBE_MILES)
}

#[cfg(test)]
mod tests {
    use super::{RadiusSearchOverlay, px_per_mile};
    use foundation::math::{GeoCoordinate, NaturalEarth, Projection, Vec2};

    fn world() -> NaturalEarth {
        NaturalEarth::new(200.0, Vec2::new(475.0, 300.0))
    }

    fn origin() -> GeoCoordinate {
        GeoCoordinate::new(37.0, -76.3)
    }

    #[test]
    fn outward_drag_grows_radius_by_pixel_equivalent() {
        let projection = world();
        let ppm = px_per_mile(&projection, origin()).unwrap();
        let center_px = projection.project(origin()).unwrap();

        let mut overlay = RadiusSearchOverlay::new(origin(), 100.0);
        let start = center_px + Vec2::new(5.0, 0.0);
        assert!(overlay.drag_start(start, &projection));

        // Move outward by the pixel equivalent of ten miles.
        let moved = center_px + Vec2::new(5.0 + 10.0 * ppm, 0.0);
        overlay.drag_move(moved, &projection);
        let final_radius = overlay.drag_end().unwrap();
        assert!(
            (final_radius - 110.0).abs() < 1e-6,
            "got {final_radius}, expected 110"
        );
    }

    #[test]
    fn inward_drag_clamps_radius_at_zero() {
        let projection = world();
        let center_px = projection.project(origin()).unwrap();

        let mut overlay = RadiusSearchOverlay::new(origin(), 5.0);
        overlay.drag_start(center_px + Vec2::new(400.0, 0.0), &projection);
        overlay.drag_move(center_px, &projection);
        let final_radius = overlay.drag_end().unwrap();
        assert_eq!(final_radius, 0.0);

        // The degenerate ring is still valid geometry.
        let ring = overlay.ring();
        assert_eq!(ring.len(), 60);
        for p in &ring {
            assert!(p.latitude.is_finite() && p.longitude.is_finite());
        }
    }

    #[test]
    fn deltas_are_relative_to_previous_move() {
        let projection = world();
        let ppm = px_per_mile(&projection, origin()).unwrap();
        let center_px = projection.project(origin()).unwrap();

        let mut overlay = RadiusSearchOverlay::new(origin(), 50.0);
        overlay.drag_start(center_px + Vec2::new(10.0, 0.0), &projection);

        // Out 20 miles, back 5, out 5: the net is +20.
        overlay.drag_move(center_px + Vec2::new(10.0 + 20.0 * ppm, 0.0), &projection);
        overlay.drag_move(center_px + Vec2::new(10.0 + 15.0 * ppm, 0.0), &projection);
        overlay.drag_move(center_px + Vec2::new(10.0 + 20.0 * ppm, 0.0), &projection);
        let final_radius = overlay.drag_end().unwrap();
        assert!((final_radius - 70.0).abs() < 1e-6, "got {final_radius}");
    }

    #[test]
    fn drag_start_reads_current_stored_radius() {
        let projection = world();
        let center_px = projection.project(origin()).unwrap();

        let mut overlay = RadiusSearchOverlay::new(origin(), 100.0);
        overlay.set(origin(), 250.0);
        overlay.drag_start(center_px + Vec2::new(20.0, 0.0), &projection);
        overlay.drag_move(center_px + Vec2::new(20.0, 0.0), &projection);
        assert_eq!(overlay.drag_end().unwrap(), 250.0);
    }

    #[test]
    fn set_interrupts_active_drag() {
        let projection = world();
        let center_px = projection.project(origin()).unwrap();

        let mut overlay = RadiusSearchOverlay::new(origin(), 10.0);
        overlay.drag_start(center_px, &projection);
        overlay.set(GeoCoordinate::new(40.0, -100.0), 75.0);
        assert!(!overlay.is_dragging());
        assert_eq!(overlay.drag_end(), None);
        assert_eq!(overlay.radius_miles(), 75.0);
    }
}
