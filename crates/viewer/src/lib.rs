//! The map component facade.
//!
//! `MapView` wires the projection, scene graph, render surface, viewport
//! controller, radius overlay, and search coordinator behind the
//! interface the surrounding UI shell consumes: imperative map
//! operations, pointer/wheel/resize entry points, a reactive search
//! input, and one output callback for user-driven search changes.

use datasets::AtlasData;
use foundation::bounds::Aabb2;
use foundation::math::{
    AlbersComposite, GeoCoordinate, NaturalEarth, Projection, Vec2, ViewportTransform,
};
use render::{DisplayList, Legend, Palette, RenderSurface, parse_hex_color};
use runtime::{EventLog, Frame, Notice};
use scene::{Hover, Indicator, SceneGraph};
use search::{
    InteractionMode, LocationState, LocationTracker, PostalTable, ProximityIndex, ProximityResult,
    RequestToken, SearchCoordinator, SearchQuery, SearchUpdate,
};
use view::{RadiusSearchOverlay, ViewportController};

pub const DEFAULT_WIDTH: f64 = 960.0;
pub const DEFAULT_HEIGHT: f64 = 660.0;

const NATIONAL_PROJECTION_SCALE: f64 = 1280.0;
const NATIONAL_PROJECTION_TRANSLATE: Vec2 = Vec2 { x: 480.0, y: 300.0 };
const WORLD_PROJECTION_SCALE: f64 = 200.0;
const WORLD_PROJECTION_TRANSLATE: Vec2 = Vec2 { x: 475.0, y: 300.0 };

const SEARCH_CIRCLE_COLOR: &str = "#ff000040";
const SEARCH_PIN_ICON: &str = "location-pin";
const DEFAULT_INDICATOR_COLOR: &str = "#ff0000";
const DEFAULT_INDICATOR_RADIUS_PX: f64 = 8.0;
/// Pick slop around markers and the overlay edge, in screen pixels.
const PICK_TOLERANCE_PX: f64 = 4.0;

/// Invoked with (coordinate, radius) when the user changes the search by
/// clicking the map or dragging the overlay; exactly one side is `Some`.
pub type SearchChangeCallback = Box<dyn FnMut(Option<GeoCoordinate>, Option<f64>)>;

pub struct MapView {
    projection: Box<dyn Projection>,
    graph: SceneGraph,
    surface: RenderSurface,
    viewport: ViewportController,
    overlay: Option<RadiusSearchOverlay>,
    coordinator: SearchCoordinator,
    postal: PostalTable,
    tracker: LocationTracker,
    events: EventLog,
    frame: Frame,
    on_search_change: Option<SearchChangeCallback>,
    results: Vec<ProximityResult>,
}

impl MapView {
    /// National view: composite equal-area projection, county palette.
    pub fn national(data: AtlasData) -> Self {
        Self::with_projection(
            Box::new(AlbersComposite::new(
                NATIONAL_PROJECTION_SCALE,
                NATIONAL_PROJECTION_TRANSLATE,
            )),
            Palette::national(),
            data,
        )
    }

    /// World view: pseudocylindrical projection, country palette.
    pub fn world(data: AtlasData) -> Self {
        Self::with_projection(
            Box::new(NaturalEarth::new(
                WORLD_PROJECTION_SCALE,
                WORLD_PROJECTION_TRANSLATE,
            )),
            Palette::world(),
            data,
        )
    }

    pub fn with_projection(
        projection: Box<dyn Projection>,
        palette: Palette,
        data: AtlasData,
    ) -> Self {
        let mut graph = SceneGraph::new();
        graph.set_regions(data.regions);
        graph.set_records(data.records);
        graph.set_aggregates(data.aggregates);

        let mut map = Self {
            projection,
            graph,
            surface: RenderSurface::new(palette),
            viewport: ViewportController::new(DEFAULT_WIDTH, DEFAULT_HEIGHT),
            overlay: None,
            coordinator: SearchCoordinator::new(ProximityIndex::new()),
            postal: PostalTable::new(data.postal_entries),
            tracker: LocationTracker::new(),
            events: EventLog::new(),
            frame: Frame::start(),
            on_search_change: None,
            results: Vec::new(),
        };
        map.center(true);
        map
    }

    // ------------------------------------------------------------------
    // Imperative map operations
    // ------------------------------------------------------------------

    pub fn set_zoom(&mut self, level: f64) {
        self.viewport.set_zoom(level);
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
    }

    /// Fit all rendered content into the viewport and center it.
    pub fn center(&mut self, instant: bool) {
        if let Some(bounds) = self.content_bounds() {
            self.viewport.center(bounds, instant);
        }
    }

    pub fn add_circle(
        &mut self,
        latitude: f64,
        longitude: f64,
        radius_px: Option<f64>,
        color: Option<&str>,
    ) {
        let color = color
            .and_then(parse_hex_color)
            .or_else(|| parse_hex_color(DEFAULT_INDICATOR_COLOR))
            .unwrap_or([1.0, 0.0, 0.0, 1.0]);
        self.graph.add_indicator(Indicator::Dot {
            location: GeoCoordinate::new(latitude, longitude),
            radius_px: radius_px.unwrap_or(DEFAULT_INDICATOR_RADIUS_PX),
            color,
        });
    }

    pub fn add_geo_circle(&mut self, latitude: f64, longitude: f64, radius_miles: f64, color: &str) {
        let color = parse_hex_color(color).unwrap_or([1.0, 0.0, 0.0, 0.25]);
        self.graph.add_indicator(Indicator::GeoCircle {
            center: GeoCoordinate::new(latitude, longitude),
            radius_miles: radius_miles.max(0.0),
            color,
        });
    }

    pub fn add_marker(&mut self, latitude: f64, longitude: f64, icon: &str) {
        self.graph.add_indicator(Indicator::Pin {
            location: GeoCoordinate::new(latitude, longitude),
            icon: icon.to_string(),
        });
    }

    pub fn remove_indicators(&mut self) {
        self.graph.remove_indicators();
    }

    pub fn legend(&self) -> Legend {
        self.surface.palette().legend()
    }

    /// Traverse the scene into a display list for the current transform.
    pub fn render(&self) -> DisplayList {
        self.surface
            .render(&self.graph, &*self.projection, self.viewport.transform())
    }

    // ------------------------------------------------------------------
    // Search input (reactive and source arbitration)
    // ------------------------------------------------------------------

    pub fn set_on_search_change(&mut self, callback: SearchChangeCallback) {
        self.on_search_change = Some(callback);
    }

    /// Reactive search input from the surrounding shell; does not fire
    /// the output callback.
    pub fn apply_search(&mut self, search: Option<(GeoCoordinate, f64)>) {
        let update = match search {
            Some((origin, radius_miles)) => {
                self.coordinator
                    .set_search(origin, radius_miles, self.graph.records())
            }
            None => self.coordinator.clear(),
        };
        self.apply_update(update);
    }

    /// Resolve a typed postal code into the search origin. An unknown
    /// code clears the search and raises a warning notice.
    pub fn search_postal(&mut self, code: &str) {
        let update = self.coordinator.resolve_postal(
            code,
            &self.postal,
            self.graph.records(),
            self.frame,
            &mut self.events,
        );
        self.apply_update(update);
    }

    /// Nearest postal code to a coordinate (first-encountered minimum).
    pub fn nearest_postal(&self, target: GeoCoordinate) -> Option<&str> {
        self.postal.nearest(target)
    }

    pub fn interaction_mode(&self) -> InteractionMode {
        self.coordinator.mode()
    }

    pub fn toggle_interaction_mode(&mut self) -> InteractionMode {
        self.coordinator.toggle_mode()
    }

    // ------------------------------------------------------------------
    // Geolocation
    // ------------------------------------------------------------------

    pub fn request_location(&mut self) -> RequestToken {
        self.tracker.begin(self.frame)
    }

    pub fn location_state(&self) -> LocationState {
        self.tracker.state()
    }

    /// Device geolocation success callback. Stale tokens are ignored.
    pub fn location_success(&mut self, token: RequestToken, location: GeoCoordinate) {
        if self.tracker.resolve_success(token, location) {
            let update = self.coordinator.set_origin(location, self.graph.records());
            self.apply_update(update);
        }
    }

    /// Device geolocation error callback (denied or unsupported).
    pub fn location_error(&mut self, token: RequestToken) {
        if self.tracker.resolve_error(token) {
            self.events
                .warning(self.frame, "geolocation", "no location available");
        }
    }

    // ------------------------------------------------------------------
    // Event-loop entry points
    // ------------------------------------------------------------------

    /// Advance animations and timeouts by `dt_s` seconds.
    pub fn tick(&mut self, dt_s: f64) {
        self.frame = self.frame.advance(dt_s);
        self.viewport.tick(self.frame);
        if self.tracker.tick(self.frame) {
            self.events
                .warning(self.frame, "geolocation", "no location available");
        }
    }

    pub fn pointer_down(&mut self, screen: Vec2) {
        let transform = self.viewport.transform();
        let surface = transform.unapply(screen);

        // The overlay's resize drag wins over both panning and targeting
        // when the pointer lands inside the circle.
        if self.overlay_hit(surface, transform) {
            if let Some(overlay) = &mut self.overlay {
                overlay.drag_start(surface, &*self.projection);
            }
            return;
        }

        if self.coordinator.targeting() {
            // Suppresses the pan gesture on this channel entirely.
            if let Some(origin) = self.projection.invert(surface) {
                let update = self.coordinator.set_origin(origin, self.graph.records());
                self.apply_update(update);
                self.emit_search_change(Some(origin), None);
            }
        } else {
            self.viewport.pan_begin(screen);
        }
    }

    pub fn pointer_move(&mut self, screen: Vec2) {
        let transform = self.viewport.transform();
        let surface = transform.unapply(screen);

        if let Some(overlay) = &mut self.overlay {
            if overlay.is_dragging() {
                if let Some(radius) = overlay.drag_move(surface, &*self.projection) {
                    // Synchronous re-render path: the retained circle
                    // tracks every move without waiting for drag end.
                    self.graph.set_geo_circle_radius(radius);
                }
                return;
            }
        }

        if self.viewport.is_panning() {
            self.viewport.pan_move(screen);
            return;
        }

        let hover = self
            .graph
            .hit_test(surface, &*self.projection, PICK_TOLERANCE_PX / transform.scale);
        self.graph.set_hover(hover);
    }

    pub fn pointer_up(&mut self) {
        self.finish_gestures();
    }

    /// The pointer left the surface: treated as drag end with the last
    /// known radius, never as silent state loss.
    pub fn pointer_leave(&mut self) {
        self.finish_gestures();
        self.graph.set_hover(Hover::None);
    }

    pub fn wheel(&mut self, screen: Vec2, delta_y: f64) {
        self.viewport.wheel(screen, delta_y);
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.viewport.resize(width, height);
        self.center(true);
    }

    pub fn toggle_fullscreen(&mut self, screen_width: f64, screen_height: f64) -> bool {
        let on = !self.viewport.is_fullscreen();
        self.viewport.set_fullscreen(on, screen_width, screen_height);
        self.center(true);
        on
    }

    // ------------------------------------------------------------------
    // Read-side accessors
    // ------------------------------------------------------------------

    pub fn query(&self) -> SearchQuery {
        self.coordinator.query()
    }

    pub fn results(&self) -> &[ProximityResult] {
        &self.results
    }

    pub fn overlay_radius_miles(&self) -> Option<f64> {
        self.overlay.as_ref().map(|o| o.radius_miles())
    }

    /// Radius of the retained geodesic circle indicator, if present.
    pub fn indicator_radius_miles(&self) -> Option<f64> {
        self.graph.geo_circle().map(|(_, radius)| radius)
    }

    pub fn viewport_transform(&self) -> ViewportTransform {
        self.viewport.transform()
    }

    pub fn viewport_size(&self) -> (f64, f64) {
        self.viewport.viewport_size()
    }

    pub fn hover(&self) -> Hover {
        self.graph.hover()
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.events.drain()
    }

    pub fn projection(&self) -> &dyn Projection {
        &*self.projection
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn finish_gestures(&mut self) {
        let finished = self.overlay.as_mut().and_then(|o| o.drag_end());
        if let Some(radius) = finished {
            let update = self.coordinator.set_radius(radius, self.graph.records());
            self.apply_update(update);
            self.emit_search_change(None, Some(radius));
        }
        self.viewport.pan_end();
    }

    fn overlay_hit(&self, surface: Vec2, transform: ViewportTransform) -> bool {
        let Some(overlay) = &self.overlay else {
            return false;
        };
        let Some(origin_px) = self.projection.project(overlay.center()) else {
            return false;
        };
        let Some(ring_px) = overlay.surface_radius_px(&*self.projection) else {
            return false;
        };
        surface.distance(origin_px) <= ring_px + PICK_TOLERANCE_PX / transform.scale
    }

    /// Apply one atomic search snapshot: result set, overlay model, and
    /// retained indicators all change in the same step, so no consumer
    /// can observe them disagreeing.
    fn apply_update(&mut self, update: SearchUpdate) {
        self.results = update.results;
        self.graph.remove_indicators();

        match update.query.origin {
            Some(origin) => {
                let radius = update.query.radius_miles;
                match &mut self.overlay {
                    Some(overlay) => overlay.set(origin, radius),
                    None => self.overlay = Some(RadiusSearchOverlay::new(origin, radius)),
                }
                self.add_marker(origin.latitude, origin.longitude, SEARCH_PIN_ICON);
                self.add_geo_circle(
                    origin.latitude,
                    origin.longitude,
                    radius,
                    SEARCH_CIRCLE_COLOR,
                );
            }
            None => {
                self.overlay = None;
            }
        }
    }

    fn emit_search_change(&mut self, coord: Option<GeoCoordinate>, radius: Option<f64>) {
        if let Some(callback) = &mut self.on_search_change {
            callback(coord, radius);
        }
    }

    fn content_bounds(&self) -> Option<Aabb2> {
        let mut points: Vec<Vec2> = Vec::new();
        for region in self.graph.regions() {
            for ring in &region.rings {
                for coord in ring {
                    if let Some(p) = self.projection.project(*coord) {
                        points.push(p);
                    }
                }
            }
        }
        for marker in self.graph.markers() {
            if let Some(p) = self.projection.project(marker.location) {
                points.push(p);
            }
        }
        Aabb2::from_points(&points)
    }
}
