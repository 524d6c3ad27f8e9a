use foundation::math::{GeoCoordinate, haversine_miles, stable_total_cmp_f64};
use scene::MediaRecord;

pub const DEFAULT_RESULT_LIMIT: usize = 500;

/// One ranked result: a candidate index plus its computed distance.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ProximityResult {
    pub record: usize,
    pub distance_miles: f64,
}

/// Filter + sort + limit over a candidate set.
///
/// Pure: identical inputs always produce the identical ordered list.
/// No spatial index; a full scan per query is deterministic and fast
/// enough at this dataset scale.
#[derive(Debug, Copy, Clone)]
pub struct ProximityIndex {
    limit: usize,
}

impl ProximityIndex {
    pub fn new() -> Self {
        Self {
            limit: DEFAULT_RESULT_LIMIT,
        }
    }

    pub fn with_limit(limit: usize) -> Self {
        Self { limit }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Candidates within `radius_miles` of `origin`, ascending by
    /// distance. Ties keep input order (stable sort); an empty result is
    /// valid, not an error.
    pub fn query(
        &self,
        origin: GeoCoordinate,
        radius_miles: f64,
        candidates: &[MediaRecord],
    ) -> Vec<ProximityResult> {
        let radius = sanitize_radius(radius_miles);

        let mut out: Vec<ProximityResult> = Vec::new();
        for (record, candidate) in candidates.iter().enumerate() {
            let distance_miles = haversine_miles(origin, candidate.location);
            if distance_miles <= radius {
                out.push(ProximityResult {
                    record,
                    distance_miles,
                });
            }
        }

        out.sort_by(|a, b| stable_total_cmp_f64(a.distance_miles, b.distance_miles));
        out.truncate(self.limit);
        out
    }
}

impl Default for ProximityIndex {
    fn default() -> Self {
        Self::new()
    }
}

/// Malformed radii (negative, NaN, infinite) clamp to 0 before they reach
/// distance filtering.
pub fn sanitize_radius(radius_miles: f64) -> f64 {
    if radius_miles.is_finite() && radius_miles > 0.0 {
        radius_miles
    } else {
        0.0
    }
}
