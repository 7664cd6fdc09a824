use crate::layout::{AnchorSide, BezierPath, MindMapLayout, Side, resolve_anchors};
use crate::theme::ThemeId;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Flat JSON view of a layout, with edge geometry resolved for consumers
/// that do not run the anchor resolver themselves.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDump {
    pub theme: ThemeId,
    pub min_x: f32,
    pub min_y: f32,
    pub width: f32,
    pub height: f32,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDump {
    pub id: String,
    pub label: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub side: Side,
    pub depth: usize,
    pub branch_color: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeDump {
    pub id: String,
    pub source: String,
    pub target: String,
    pub stroke: String,
    pub source_side: Option<AnchorSide>,
    pub target_side: Option<AnchorSide>,
    pub path: Option<String>,
    pub label_point: Option<[f32; 2]>,
}

impl LayoutDump {
    pub fn from_layout(layout: &MindMapLayout) -> Self {
        let nodes = layout
            .nodes
            .iter()
            .map(|node| NodeDump {
                id: node.id.clone(),
                label: node.label.clone(),
                x: node.position.x,
                y: node.position.y,
                width: node.width,
                height: node.height,
                side: node.side,
                depth: node.depth,
                branch_color: node.branch_color.clone(),
            })
            .collect();

        let edges = layout
            .edges
            .iter()
            .zip(layout.edge_boxes())
            .map(|(edge, boxes)| {
                let anchors = boxes.map(|(source, target)| resolve_anchors(&source, &target));
                let path = anchors.map(|anchors| BezierPath::from_anchors(&anchors, 0.25));
                EdgeDump {
                    id: edge.id.clone(),
                    source: edge.source.clone(),
                    target: edge.target.clone(),
                    stroke: edge.stroke_color.clone(),
                    source_side: anchors.map(|a| a.source_side),
                    target_side: anchors.map(|a| a.target_side),
                    path: path.map(|p| p.to_svg_path()),
                    label_point: path.map(|p| [p.label_point.x, p.label_point.y]),
                }
            })
            .collect();

        LayoutDump {
            theme: layout.theme_id,
            min_x: layout.min_x,
            min_y: layout.min_y,
            width: layout.width,
            height: layout.height,
            nodes,
            edges,
        }
    }
}

/// Writes the dump to `path`, or to stdout when no path is given.
pub fn write_layout_dump(path: Option<&Path>, layout: &MindMapLayout) -> anyhow::Result<()> {
    let dump = LayoutDump::from_layout(layout);
    match path {
        Some(path) => {
            let file = File::create(path)?;
            let writer = BufWriter::new(file);
            serde_json::to_writer_pretty(writer, &dump)?;
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            serde_json::to_writer_pretty(&mut writer, &dump)?;
            writeln!(writer)?;
        }
    }
    Ok(())
}
