use foundation::math::Vec2;
use scene::Color;

/// Renderer-agnostic draw primitives in screen coordinates.
///
/// The surface emits these in back-to-front order; any concrete renderer
/// (canvas, SVG, GPU) can replay the list without touching scene state.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Flat triangle list (3 vertices per triangle).
    Mesh { vertices: Vec<Vec2>, color: Color },
    Polyline {
        points: Vec<Vec2>,
        color: Color,
        width_px: f64,
        closed: bool,
    },
    Dot {
        center: Vec2,
        radius_px: f64,
        fill: Color,
        stroke: Color,
        stroke_width_px: f64,
    },
    Sprite {
        center: Vec2,
        size_px: f64,
        icon: String,
    },
}

pub type DisplayList = Vec<DrawCommand>;
