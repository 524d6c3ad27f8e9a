use std::collections::BTreeMap;

use foundation::math::{GeoCoordinate, Projection, Vec2};

use crate::drawable::{Indicator, MarkerDot, RegionShape};
use crate::records::{AggregateBucket, MediaRecord, RegionId};

/// What the pointer is currently over, by layer list index.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Hover {
    #[default]
    None,
    Region(usize),
    Marker(usize),
}

/// Retained scene graph: three ordered layers of typed drawables.
///
/// Draw order is region layer, then indicators, then markers, matching
/// the layered groups of the rendered map. Regions, records, and
/// aggregates are loaded once and never mutated; indicators come and go
/// with the active search and the imperative overlay operations.
#[derive(Debug, Default)]
pub struct SceneGraph {
    regions: Vec<RegionShape>,
    records: Vec<MediaRecord>,
    markers: Vec<MarkerDot>,
    indicators: Vec<Indicator>,
    aggregates: BTreeMap<RegionId, AggregateBucket>,
    hover: Hover,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_regions(&mut self, regions: Vec<RegionShape>) {
        self.regions = regions;
        self.hover = Hover::None;
    }

    pub fn set_records(&mut self, records: Vec<MediaRecord>) {
        self.markers = records
            .iter()
            .enumerate()
            .map(|(record, r)| MarkerDot {
                record,
                location: r.location,
                class: r.class,
            })
            .collect();
        self.records = records;
        self.hover = Hover::None;
    }

    pub fn set_aggregates(&mut self, buckets: Vec<AggregateBucket>) {
        self.aggregates = buckets.into_iter().map(|b| (b.region.clone(), b)).collect();
    }

    pub fn regions(&self) -> &[RegionShape] {
        &self.regions
    }

    pub fn records(&self) -> &[MediaRecord] {
        &self.records
    }

    pub fn markers(&self) -> &[MarkerDot] {
        &self.markers
    }

    pub fn indicators(&self) -> &[Indicator] {
        &self.indicators
    }

    pub fn bucket(&self, region: &RegionId) -> Option<&AggregateBucket> {
        self.aggregates.get(region)
    }

    pub fn add_indicator(&mut self, indicator: Indicator) {
        // Geodesic circles sit under pins and dots within the layer.
        match indicator {
            Indicator::GeoCircle { .. } => self.indicators.insert(0, indicator),
            _ => self.indicators.push(indicator),
        }
    }

    pub fn remove_indicators(&mut self) {
        self.indicators.clear();
    }

    /// The active geodesic circle, if any.
    pub fn geo_circle(&self) -> Option<(GeoCoordinate, f64)> {
        self.indicators.iter().find_map(|i| match i {
            Indicator::GeoCircle {
                center,
                radius_miles,
                ..
            } => Some((*center, *radius_miles)),
            _ => None,
        })
    }

    /// Resize the active geodesic circle in place (overlay drag).
    pub fn set_geo_circle_radius(&mut self, radius_miles: f64) {
        for indicator in &mut self.indicators {
            if let Indicator::GeoCircle {
                radius_miles: r, ..
            } = indicator
            {
                *r = radius_miles.max(0.0);
            }
        }
    }

    pub fn hover(&self) -> Hover {
        self.hover
    }

    pub fn set_hover(&mut self, hover: Hover) {
        self.hover = hover;
    }

    /// Hit-test a surface-space point (the caller has already undone the
    /// viewport transform). Markers win over regions; `tolerance_px` is
    /// the pick slop around a marker in surface pixels.
    pub fn hit_test(
        &self,
        surface: Vec2,
        projection: &dyn Projection,
        tolerance_px: f64,
    ) -> Hover {
        for (idx, marker) in self.markers.iter().enumerate() {
            let Some(p) = projection.project(marker.location) else {
                continue;
            };
            if p.distance(surface) <= tolerance_px {
                return Hover::Marker(idx);
            }
        }

        if let Some(geo) = projection.invert(surface) {
            for (idx, region) in self.regions.iter().enumerate() {
                if point_in_rings(&region.rings, geo) {
                    return Hover::Region(idx);
                }
            }
        }

        Hover::None
    }
}

/// Even-odd containment test in geographic coordinates. The first ring is
/// the outer boundary; further rings are holes and flip containment.
pub fn point_in_rings(rings: &[Vec<GeoCoordinate>], point: GeoCoordinate) -> bool {
    let mut inside = false;
    for ring in rings {
        if point_in_ring(ring, point) {
            inside = !inside;
        }
    }
    inside
}

fn point_in_ring(ring: &[GeoCoordinate], point: GeoCoordinate) -> bool {
    let mut inside = false;
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut j = n - 1;
    for i in 0..n {
        let a = ring[i];
        let b = ring[j];
        if (a.latitude > point.latitude) != (b.latitude > point.latitude) {
            let t = (point.latitude - a.latitude) / (b.latitude - a.latitude);
            let x = a.longitude + t * (b.longitude - a.longitude);
            if point.longitude < x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::{Hover, SceneGraph, point_in_rings};
    use crate::drawable::{Indicator, RegionShape};
    use crate::records::{MediaClass, MediaRecord, RegionId, SocialLinks};
    use foundation::math::{GeoCoordinate, NaturalEarth, Projection, Vec2};

    fn square(lat0: f64, lon0: f64, size: f64) -> Vec<Vec<GeoCoordinate>> {
        vec![vec![
            GeoCoordinate::new(lat0, lon0),
            GeoCoordinate::new(lat0, lon0 + size),
            GeoCoordinate::new(lat0 + size, lon0 + size),
            GeoCoordinate::new(lat0 + size, lon0),
        ]]
    }

    fn record(name: &str, lat: f64, lon: f64) -> MediaRecord {
        MediaRecord {
            name: name.to_string(),
            class: MediaClass::Newspaper,
            subclass: None,
            location: GeoCoordinate::new(lat, lon),
            socials: SocialLinks::default(),
            region: None,
            locality: None,
            admin_area: None,
        }
    }

    #[test]
    fn point_in_rings_handles_holes() {
        let mut rings = square(0.0, 0.0, 10.0);
        rings.push(square(4.0, 4.0, 2.0).remove(0));

        assert!(point_in_rings(&rings, GeoCoordinate::new(1.0, 1.0)));
        assert!(!point_in_rings(&rings, GeoCoordinate::new(5.0, 5.0)));
        assert!(!point_in_rings(&rings, GeoCoordinate::new(11.0, 1.0)));
    }

    #[test]
    fn geo_circles_draw_below_other_indicators() {
        let mut graph = SceneGraph::new();
        graph.add_indicator(Indicator::Pin {
            location: GeoCoordinate::new(0.0, 0.0),
            icon: "pin".to_string(),
        });
        graph.add_indicator(Indicator::GeoCircle {
            center: GeoCoordinate::new(0.0, 0.0),
            radius_miles: 50.0,
            color: [1.0, 0.0, 0.0, 0.25],
        });
        assert!(matches!(graph.indicators()[0], Indicator::GeoCircle { .. }));
        assert!(matches!(graph.indicators()[1], Indicator::Pin { .. }));
    }

    #[test]
    fn set_geo_circle_radius_clamps_at_zero() {
        let mut graph = SceneGraph::new();
        graph.add_indicator(Indicator::GeoCircle {
            center: GeoCoordinate::new(0.0, 0.0),
            radius_miles: 50.0,
            color: [1.0, 0.0, 0.0, 0.25],
        });
        graph.set_geo_circle_radius(-5.0);
        assert_eq!(graph.geo_circle().unwrap().1, 0.0);
    }

    #[test]
    fn hit_test_prefers_markers_over_regions() {
        let projection = NaturalEarth::new(200.0, Vec2::new(475.0, 300.0));
        let mut graph = SceneGraph::new();
        graph.set_regions(vec![RegionShape {
            id: RegionId::new("R1"),
            name: "Square".to_string(),
            rings: square(-5.0, -5.0, 10.0),
        }]);
        graph.set_records(vec![record("Paper", 0.0, 0.0)]);

        let at_marker = projection.project(GeoCoordinate::new(0.0, 0.0)).unwrap();
        assert_eq!(
            graph.hit_test(at_marker, &projection, 4.0),
            Hover::Marker(0)
        );

        let in_region = projection.project(GeoCoordinate::new(3.0, 3.0)).unwrap();
        assert_eq!(
            graph.hit_test(in_region, &projection, 1.0),
            Hover::Region(0)
        );

        let outside = projection.project(GeoCoordinate::new(40.0, 40.0)).unwrap();
        assert_eq!(graph.hit_test(outside, &projection, 1.0), Hover::None);
    }
}
