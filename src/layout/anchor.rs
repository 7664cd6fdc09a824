use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use super::{LayoutNode, Point};

const DEFAULT_CURVATURE: f32 = 0.25;

/// Compass side of a box where a connector attaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorSide {
    Top,
    Bottom,
    Left,
    Right,
}

impl AnchorSide {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// Axis-aligned box described by its center and half extents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxGeometry {
    pub center: Point,
    pub half_width: f32,
    pub half_height: f32,
}

impl BoxGeometry {
    pub fn new(center: Point, width: f32, height: f32) -> Self {
        Self {
            center,
            half_width: width / 2.0,
            half_height: height / 2.0,
        }
    }

    /// Box from a top-left corner and size, the shape nodes are stored in.
    pub fn from_top_left(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(Point::new(x + width / 2.0, y + height / 2.0), width, height)
    }
}

impl From<&LayoutNode> for BoxGeometry {
    fn from(node: &LayoutNode) -> Self {
        Self::from_top_left(node.position.x, node.position.y, node.width, node.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeAnchors {
    pub source: Point,
    pub target: Point,
    pub source_side: AnchorSide,
    pub target_side: AnchorSide,
}

/// Where the straight line between two box centers leaves each box, and the
/// side it leaves through.
pub fn resolve_anchors(source: &BoxGeometry, target: &BoxGeometry) -> EdgeAnchors {
    let source_point = boundary_intersection(source, target.center);
    let target_point = boundary_intersection(target, source.center);
    EdgeAnchors {
        source: source_point,
        target: target_point,
        source_side: side_of(source, source_point),
        target_side: side_of(target, target_point),
    }
}

fn boundary_intersection(node: &BoxGeometry, toward: Point) -> Point {
    let Point { x: cx, y: cy } = node.center;
    let dx = toward.x - cx;
    let dy = toward.y - cy;
    if dx == 0.0 && dy == 0.0 {
        return node.center;
    }

    let slope = dy / dx;
    if slope.abs() <= node.half_height / node.half_width {
        let x = if dx > 0.0 {
            cx + node.half_width
        } else {
            cx - node.half_width
        };
        Point::new(x, cy + slope * (x - cx))
    } else {
        let y = if dy > 0.0 {
            cy + node.half_height
        } else {
            cy - node.half_height
        };
        Point::new(cx + (y - cy) / slope, y)
    }
}

fn side_of(node: &BoxGeometry, point: Point) -> AnchorSide {
    let px = (point.x - node.center.x) / node.half_width;
    let py = (point.y - node.center.y) / node.half_height;
    if px.abs() > py.abs() {
        if px > 0.0 {
            AnchorSide::Right
        } else {
            AnchorSide::Left
        }
    } else if py > 0.0 {
        AnchorSide::Bottom
    } else {
        AnchorSide::Top
    }
}

/// Cubic connector between two anchors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BezierPath {
    pub source: Point,
    pub control_source: Point,
    pub control_target: Point,
    pub target: Point,
    pub label_point: Point,
}

impl BezierPath {
    pub fn from_anchors(anchors: &EdgeAnchors, curvature: f32) -> Self {
        let control_source = control_point(anchors.source, anchors.target, anchors.source_side, curvature);
        let control_target = control_point(anchors.target, anchors.source, anchors.target_side, curvature);
        let label_point = Point::new(
            anchors.source.x * 0.125
                + control_source.x * 0.375
                + control_target.x * 0.375
                + anchors.target.x * 0.125,
            anchors.source.y * 0.125
                + control_source.y * 0.375
                + control_target.y * 0.375
                + anchors.target.y * 0.125,
        );
        Self {
            source: anchors.source,
            control_source,
            control_target,
            target: anchors.target,
            label_point,
        }
    }

    pub fn to_svg_path(&self) -> String {
        let mut d = String::new();
        let _ = write!(
            d,
            "M{:.2},{:.2} C{:.2},{:.2} {:.2},{:.2} {:.2},{:.2}",
            self.source.x,
            self.source.y,
            self.control_source.x,
            self.control_source.y,
            self.control_target.x,
            self.control_target.y,
            self.target.x,
            self.target.y
        );
        d
    }
}

/// Floating connector between two boxes with the default curvature.
pub fn floating_edge_path(source: &BoxGeometry, target: &BoxGeometry) -> BezierPath {
    BezierPath::from_anchors(&resolve_anchors(source, target), DEFAULT_CURVATURE)
}

fn control_offset(distance: f32, curvature: f32) -> f32 {
    if distance >= 0.0 {
        0.5 * distance
    } else {
        curvature * 25.0 * (-distance).sqrt()
    }
}

/// Pushes `from` outward along the normal of `side`.
fn control_point(from: Point, to: Point, side: AnchorSide, curvature: f32) -> Point {
    match side {
        AnchorSide::Left => Point::new(from.x - control_offset(from.x - to.x, curvature), from.y),
        AnchorSide::Right => Point::new(from.x + control_offset(to.x - from.x, curvature), from.y),
        AnchorSide::Top => Point::new(from.x, from.y - control_offset(from.y - to.y, curvature)),
        AnchorSide::Bottom => Point::new(from.x, from.y + control_offset(to.y - from.y, curvature)),
    }
}
