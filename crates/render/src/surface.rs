use earcutr::earcut;
use foundation::math::{Projection, Vec2, ViewportTransform, small_circle_ring};
use scene::{Color, Hover, Indicator, SceneGraph};

use crate::display::{DisplayList, DrawCommand};
use crate::symbology::{Palette, darken};

const MARKER_FILL: Color = [1.0, 0.843, 0.0, 1.0];
const STROKE_BLACK: Color = [0.0, 0.0, 0.0, 1.0];
const MARKER_RADIUS_PX: f64 = 2.0;
const THIN_STROKE_PX: f64 = 0.25;
const HOVER_DARKEN: f64 = 0.75;
const PIN_SIZE_PX: f64 = 16.0;
const CIRCLE_STEP_DEG: f64 = 6.0;

/// Traverses the scene graph into a display list.
///
/// Layer order is regions, indicators, markers. Geometry that fails to
/// project is omitted rather than failing the pass; a missing aggregate
/// bucket renders in the palette's lowest bin.
#[derive(Debug, Clone)]
pub struct RenderSurface {
    palette: Palette,
}

impl RenderSurface {
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn render(
        &self,
        graph: &SceneGraph,
        projection: &dyn Projection,
        transform: ViewportTransform,
    ) -> DisplayList {
        let mut out = DisplayList::new();
        self.render_regions(graph, projection, transform, &mut out);
        self.render_indicators(graph, projection, transform, &mut out);
        self.render_markers(graph, projection, transform, &mut out);
        out
    }

    fn render_regions(
        &self,
        graph: &SceneGraph,
        projection: &dyn Projection,
        transform: ViewportTransform,
        out: &mut DisplayList,
    ) {
        for (idx, region) in graph.regions().iter().enumerate() {
            let mut rings: Vec<Vec<Vec2>> = Vec::with_capacity(region.rings.len());
            for ring in &region.rings {
                if let Some(projected) = project_ring(ring, projection) {
                    rings.push(projected);
                }
            }
            let Some(_outer) = rings.first() else {
                continue;
            };

            let total = graph
                .bucket(&region.id)
                .map(|b| b.total as f64)
                .unwrap_or(0.0);
            let mut fill = self.palette.color_for(total);
            if graph.hover() == Hover::Region(idx) {
                fill = darken(fill, HOVER_DARKEN);
            }

            let triangles = triangulate_rings(&rings);
            if !triangles.is_empty() {
                out.push(DrawCommand::Mesh {
                    vertices: triangles.iter().map(|v| transform.apply(*v)).collect(),
                    color: fill,
                });
            }

            for ring in &rings {
                out.push(DrawCommand::Polyline {
                    points: ring.iter().map(|v| transform.apply(*v)).collect(),
                    color: self.palette.highest(),
                    width_px: THIN_STROKE_PX * transform.scale,
                    closed: true,
                });
            }
        }
    }

    fn render_indicators(
        &self,
        graph: &SceneGraph,
        projection: &dyn Projection,
        transform: ViewportTransform,
        out: &mut DisplayList,
    ) {
        for indicator in graph.indicators() {
            match indicator {
                Indicator::GeoCircle {
                    center,
                    radius_miles,
                    color,
                } => {
                    let ring = small_circle_ring(*center, *radius_miles, CIRCLE_STEP_DEG);
                    let projected: Vec<Vec2> = ring
                        .iter()
                        .filter_map(|c| projection.project(*c))
                        .collect();
                    if projected.len() < 3 {
                        continue;
                    }
                    let rings = vec![projected];
                    let triangles = triangulate_rings(&rings);
                    if !triangles.is_empty() {
                        out.push(DrawCommand::Mesh {
                            vertices: triangles.iter().map(|v| transform.apply(*v)).collect(),
                            color: *color,
                        });
                    }
                    out.push(DrawCommand::Polyline {
                        points: rings[0].iter().map(|v| transform.apply(*v)).collect(),
                        color: *color,
                        width_px: THIN_STROKE_PX * transform.scale,
                        closed: true,
                    });
                }
                Indicator::Dot {
                    location,
                    radius_px,
                    color,
                } => {
                    let Some(p) = projection.project(*location) else {
                        continue;
                    };
                    out.push(DrawCommand::Dot {
                        center: transform.apply(p),
                        radius_px: radius_px * transform.scale,
                        fill: *color,
                        stroke: *color,
                        stroke_width_px: 0.0,
                    });
                }
                Indicator::Pin { location, icon } => {
                    let Some(p) = projection.project(*location) else {
                        continue;
                    };
                    out.push(DrawCommand::Sprite {
                        center: transform.apply(p),
                        size_px: PIN_SIZE_PX * transform.scale,
                        icon: icon.clone(),
                    });
                }
            }
        }
    }

    fn render_markers(
        &self,
        graph: &SceneGraph,
        projection: &dyn Projection,
        transform: ViewportTransform,
        out: &mut DisplayList,
    ) {
        for (idx, marker) in graph.markers().iter().enumerate() {
            let Some(p) = projection.project(marker.location) else {
                continue;
            };
            let mut fill = MARKER_FILL;
            if graph.hover() == Hover::Marker(idx) {
                fill = darken(fill, HOVER_DARKEN);
            }
            out.push(DrawCommand::Dot {
                center: transform.apply(p),
                radius_px: MARKER_RADIUS_PX * transform.scale,
                fill,
                stroke: STROKE_BLACK,
                stroke_width_px: THIN_STROKE_PX * transform.scale,
            });
        }
    }
}

fn project_ring(ring: &[foundation::math::GeoCoordinate], projection: &dyn Projection) -> Option<Vec<Vec2>> {
    let mut out = Vec::with_capacity(ring.len());
    for coord in ring {
        out.push(projection.project(*coord)?);
    }
    if out.len() < 3 { None } else { Some(out) }
}

/// Flatten rings into earcut's layout and return a flat triangle list.
fn triangulate_rings(rings: &[Vec<Vec2>]) -> Vec<Vec2> {
    let mut vertices: Vec<Vec2> = Vec::new();
    let mut coords: Vec<f64> = Vec::new();
    let mut hole_indices: Vec<usize> = Vec::new();

    for (ring_i, ring) in rings.iter().enumerate() {
        let mut ring_pts: Vec<Vec2> = ring.clone();
        drop_closing_duplicate(&mut ring_pts);
        if ring_pts.len() < 3 {
            continue;
        }

        if ring_i > 0 {
            hole_indices.push(vertices.len());
        }

        for p in ring_pts {
            coords.push(p.x);
            coords.push(p.y);
            vertices.push(p);
        }
    }

    if vertices.len() < 3 {
        return Vec::new();
    }

    let indices = match earcut(&coords, &hole_indices, 2) {
        Ok(ix) => ix,
        Err(_) => return Vec::new(),
    };

    let mut out: Vec<Vec2> = Vec::with_capacity(indices.len());
    for idx in indices {
        if let Some(v) = vertices.get(idx) {
            out.push(*v);
        }
    }
    out
}

fn drop_closing_duplicate(points: &mut Vec<Vec2>) {
    if points.len() >= 2 {
        let first = points[0];
        let last = *points.last().unwrap();
        if (first.x - last.x).abs() < 1e-9 && (first.y - last.y).abs() < 1e-9 {
            points.pop();
        }
    }
}
