use foundation::math::GeoCoordinate;
use runtime::{EventLog, Frame};
use scene::MediaRecord;

use crate::postal::PostalTable;
use crate::proximity::{ProximityIndex, ProximityResult, sanitize_radius};

/// Radius applied when a search starts without one.
pub const DEFAULT_RADIUS_MILES: f64 = 1000.0;

/// Governs what a map pointer-down does: pan the viewport or set a new
/// search origin. Exactly one is active; the two behaviors are mutually
/// exclusive on the same gesture channel.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum InteractionMode {
    Navigate,
    Target,
}

impl InteractionMode {
    pub fn toggled(self) -> Self {
        match self {
            InteractionMode::Navigate => InteractionMode::Target,
            InteractionMode::Target => InteractionMode::Navigate,
        }
    }
}

/// The current search. `origin == None` means no search is active: no
/// overlay, no result set.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SearchQuery {
    pub origin: Option<GeoCoordinate>,
    pub radius_miles: f64,
}

impl SearchQuery {
    pub fn inactive() -> Self {
        Self {
            origin: None,
            radius_miles: 0.0,
        }
    }
}

/// One atomic snapshot handed to consumers: the query and the result set
/// it produced. Consumers never observe the query and results out of
/// step.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchUpdate {
    pub query: SearchQuery,
    pub results: Vec<ProximityResult>,
}

/// Owns the search query and interaction mode, and arbitrates between
/// origin sources (geolocation, postal resolution, map targeting, manual
/// selection). Every change recomputes the result set in the same step.
#[derive(Debug)]
pub struct SearchCoordinator {
    query: SearchQuery,
    mode: InteractionMode,
    index: ProximityIndex,
}

impl SearchCoordinator {
    pub fn new(index: ProximityIndex) -> Self {
        Self {
            query: SearchQuery::inactive(),
            mode: InteractionMode::Target,
            index,
        }
    }

    pub fn query(&self) -> SearchQuery {
        self.query
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: InteractionMode) {
        self.mode = mode;
    }

    pub fn toggle_mode(&mut self) -> InteractionMode {
        self.mode = self.mode.toggled();
        self.mode
    }

    /// Whether map pointer-downs currently set a new origin.
    pub fn targeting(&self) -> bool {
        self.mode == InteractionMode::Target
    }

    /// Set a new origin, keeping the current radius (or the default when
    /// none is in effect yet).
    pub fn set_origin(
        &mut self,
        origin: GeoCoordinate,
        candidates: &[MediaRecord],
    ) -> SearchUpdate {
        self.query.origin = Some(origin);
        if !(self.query.radius_miles > 0.0) {
            self.query.radius_miles = DEFAULT_RADIUS_MILES;
        }
        self.snapshot(candidates)
    }

    /// Set the radius. With no active origin the query still records the
    /// value, but the result set stays empty.
    pub fn set_radius(&mut self, radius_miles: f64, candidates: &[MediaRecord]) -> SearchUpdate {
        self.query.radius_miles = sanitize_radius(radius_miles);
        self.snapshot(candidates)
    }

    /// Replace origin and radius together (reactive input from the
    /// surrounding shell).
    pub fn set_search(
        &mut self,
        origin: GeoCoordinate,
        radius_miles: f64,
        candidates: &[MediaRecord],
    ) -> SearchUpdate {
        self.query.origin = Some(origin);
        self.query.radius_miles = sanitize_radius(radius_miles);
        self.snapshot(candidates)
    }

    /// Drop the active search entirely.
    pub fn clear(&mut self) -> SearchUpdate {
        self.query = SearchQuery::inactive();
        SearchUpdate {
            query: self.query,
            results: Vec::new(),
        }
    }

    /// Resolve a typed postal code to an origin. An unknown code clears
    /// the search and raises a non-fatal warning.
    pub fn resolve_postal(
        &mut self,
        code: &str,
        table: &PostalTable,
        candidates: &[MediaRecord],
        frame: Frame,
        events: &mut EventLog,
    ) -> SearchUpdate {
        match table.get(code) {
            Some(origin) => self.set_origin(origin, candidates),
            None => {
                events.warning(frame, "postal", format!("code {code} not found"));
                self.clear()
            }
        }
    }

    fn snapshot(&self, candidates: &[MediaRecord]) -> SearchUpdate {
        let results = match self.query.origin {
            Some(origin) => self
                .index
                .query(origin, self.query.radius_miles, candidates),
            None => Vec::new(),
        };
        SearchUpdate {
            query: self.query,
            results,
        }
    }
}
