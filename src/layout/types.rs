use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::theme::ThemeId;

/// Reserved id given to the root of every laid-out tree.
pub const ROOT_ID: &str = "root";

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
    Root,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    TopBottom,
    BottomTop,
    #[default]
    LeftRight,
    RightLeft,
}

impl Direction {
    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::LeftRight | Self::RightLeft)
    }
}

/// Visual attributes handed to the canvas; geometry never reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStyle {
    pub background: String,
    pub border: String,
    pub border_radius: String,
    pub color: String,
    pub font_family: String,
    pub font_size: f32,
    pub font_weight: u16,
    pub padding: f32,
    pub box_shadow: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeStyle {
    pub stroke: String,
    pub stroke_width: f32,
    pub filter: String,
    pub connector: String,
    pub marker_end: String,
    pub animated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutNode {
    pub id: String,
    pub label: String,
    pub width: f32,
    pub height: f32,
    /// Top-left corner.
    pub position: Point,
    pub side: Side,
    pub branch_color: Option<String>,
    pub branch_index: Option<usize>,
    pub depth: usize,
    pub is_root: bool,
    pub style: NodeStyle,
}

impl LayoutNode {
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.position.x + self.width / 2.0,
            self.position.y + self.height / 2.0,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub stroke_color: String,
    pub label: Option<String>,
    pub style: EdgeStyle,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MindMapLayout {
    pub theme_id: ThemeId,
    pub nodes: Vec<LayoutNode>,
    pub edges: Vec<LayoutEdge>,
    pub min_x: f32,
    pub min_y: f32,
    pub width: f32,
    pub height: f32,
}

impl MindMapLayout {
    pub fn empty(theme_id: ThemeId) -> Self {
        Self {
            theme_id,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Linear scan. Use [`MindMapLayout::node_index`] for per-edge lookups.
    pub fn node(&self, id: &str) -> Option<&LayoutNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn node_index(&self) -> HashMap<&str, &LayoutNode> {
        self.nodes.iter().map(|node| (node.id.as_str(), node)).collect()
    }

    pub fn root(&self) -> Option<&LayoutNode> {
        self.nodes.iter().find(|node| node.is_root)
    }
}
