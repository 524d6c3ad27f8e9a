use foundation::math::GeoCoordinate;

use crate::records::{MediaClass, RegionId};

/// RGBA color, components in [0, 1].
pub type Color = [f32; 4];

/// A region polygon on the base layer. The first ring is the outer
/// boundary; any further rings are holes.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionShape {
    pub id: RegionId,
    pub name: String,
    pub rings: Vec<Vec<GeoCoordinate>>,
}

/// A point marker on the marker layer, derived from a media record.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MarkerDot {
    /// Index of the backing record in the graph's record list.
    pub record: usize,
    pub location: GeoCoordinate,
    pub class: MediaClass,
}

/// Overlay indicators on the interactable layer.
///
/// Geodesic circles are stored by their geodesic radius; their pixel
/// rendering is derived at draw time so it always tracks the current
/// projection and zoom.
#[derive(Debug, Clone, PartialEq)]
pub enum Indicator {
    Dot {
        location: GeoCoordinate,
        radius_px: f64,
        color: Color,
    },
    Pin {
        location: GeoCoordinate,
        icon: String,
    },
    GeoCircle {
        center: GeoCoordinate,
        radius_miles: f64,
        color: Color,
    },
}
