mod anchor;
mod branch;
mod error;
mod ranking;
mod stitch;
mod text;
pub(crate) mod types;

pub use anchor::{
    AnchorSide, BezierPath, BoxGeometry, EdgeAnchors, floating_edge_path, resolve_anchors,
};
pub use branch::Branch;
pub use error::LayoutError;
pub use ranking::{LayerEdge, LayerNode, LayerOptions, Placement, layerize};
pub use text::{
    FontMetricsEstimator, HeuristicEstimator, SizeEstimator, strip_markup, wrapped_line_count,
};
pub use types::*;

use std::collections::HashSet;

use crate::config::LayoutConfig;
use crate::ir::InputNode;
use crate::theme::{Theme, ThemeId};
use branch::ClassifiedTree;

/// Lays out a note tree as a two-sided mind map.
///
/// A missing tree yields an empty layout. Estimation uses the character-count
/// heuristic unless `config.font_metrics` is set.
pub fn compute_mindmap_layout(
    tree: Option<&InputNode>,
    theme: &Theme,
    config: &LayoutConfig,
) -> Result<MindMapLayout, LayoutError> {
    let Some(tree) = tree else {
        return Ok(MindMapLayout::empty(theme.id));
    };
    let estimator = estimator_for(config);
    compute_mindmap_layout_with(tree, theme, config, estimator.as_ref())
}

pub fn estimator_for(config: &LayoutConfig) -> Box<dyn SizeEstimator> {
    if config.font_metrics {
        Box::new(FontMetricsEstimator::new(config.footprint.clone()))
    } else {
        Box::new(HeuristicEstimator::new(config.footprint.clone()))
    }
}

/// Same as [`compute_mindmap_layout`] with a caller-supplied estimator.
pub fn compute_mindmap_layout_with(
    tree: &InputNode,
    theme: &Theme,
    config: &LayoutConfig,
    estimator: &dyn SizeEstimator,
) -> Result<MindMapLayout, LayoutError> {
    let classified = branch::classify(tree, theme, estimator);
    let lone_root = classified.root().filter(|_| classified.edges.is_empty());
    let nodes = if let Some(root) = lone_root {
        let mut root = root.clone();
        root.position = Point::new(-root.width / 2.0, -root.height / 2.0);
        vec![root]
    } else {
        let right = layout_half(&classified, Side::Right, config)?;
        let left = layout_half(&classified, Side::Left, config)?;
        tracing::debug!(right = right.len(), left = left.len(), "layered halves");
        stitch::stitch(right, left)
    };

    let mut layout = MindMapLayout {
        theme_id: theme.id,
        nodes,
        edges: classified.edges,
        ..Default::default()
    };
    update_bounds(&mut layout);
    tracing::debug!(
        nodes = layout.nodes.len(),
        edges = layout.edges.len(),
        width = layout.width,
        height = layout.height,
        theme = theme.id.as_str(),
        "mind map laid out"
    );
    Ok(layout)
}

/// Layers the root plus every node on `side`. The root copy is deduplicated
/// again when the halves are stitched.
fn layout_half(
    tree: &ClassifiedTree,
    side: Side,
    config: &LayoutConfig,
) -> Result<Vec<LayoutNode>, LayoutError> {
    let members: Vec<&LayoutNode> = tree
        .nodes
        .iter()
        .filter(|node| node.is_root || node.side == side)
        .collect();
    let member_ids: HashSet<&str> = members
        .iter()
        .filter(|node| !node.is_root)
        .map(|node| node.id.as_str())
        .collect();

    let layer_nodes: Vec<LayerNode> = members
        .iter()
        .map(|node| LayerNode::new(node.id.clone(), node.width, node.height))
        .collect();
    let layer_edges: Vec<LayerEdge> = tree
        .edges
        .iter()
        .filter(|edge| member_ids.contains(edge.target.as_str()))
        .map(|edge| LayerEdge::new(edge.source.clone(), edge.target.clone()))
        .collect();

    let options = LayerOptions::from_config(config).with_direction(Direction::LeftRight);
    let placements = layerize(&layer_nodes, &layer_edges, &options)?;
    Ok(members
        .into_iter()
        .zip(placements)
        .map(|(node, placement)| LayoutNode {
            position: placement.position,
            ..node.clone()
        })
        .collect())
}

fn update_bounds(layout: &mut MindMapLayout) {
    if layout.nodes.is_empty() {
        layout.min_x = 0.0;
        layout.min_y = 0.0;
        layout.width = 0.0;
        layout.height = 0.0;
        return;
    }
    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;
    for node in &layout.nodes {
        min_x = min_x.min(node.position.x);
        min_y = min_y.min(node.position.y);
        max_x = max_x.max(node.position.x + node.width);
        max_y = max_y.max(node.position.y + node.height);
    }
    layout.min_x = min_x;
    layout.min_y = min_y;
    layout.width = max_x - min_x;
    layout.height = max_y - min_y;
}

impl MindMapLayout {
    /// Source and target boxes of every edge, in edge order. `None` marks an
    /// edge whose endpoint is not in `nodes`.
    pub fn edge_boxes(&self) -> Vec<Option<(BoxGeometry, BoxGeometry)>> {
        let index = self.node_index();
        self.edges
            .iter()
            .map(|edge| {
                let source = index.get(edge.source.as_str())?;
                let target = index.get(edge.target.as_str())?;
                Some((BoxGeometry::from(*source), BoxGeometry::from(*target)))
            })
            .collect()
    }

    /// Floating connector of every edge, in edge order.
    pub fn edge_paths(&self) -> Vec<Option<BezierPath>> {
        self.edge_boxes()
            .into_iter()
            .map(|boxes| boxes.map(|(source, target)| floating_edge_path(&source, &target)))
            .collect()
    }
}

/// Holds the pristine input tree so a theme switch can lay everything out
/// again from scratch.
///
/// Switching theme discards whatever the caller did to the previous layout.
#[derive(Debug, Clone)]
pub struct MindMapSession {
    tree: Option<InputNode>,
    theme: Theme,
    config: LayoutConfig,
    layout: MindMapLayout,
}

impl MindMapSession {
    pub fn new(
        tree: Option<InputNode>,
        theme_id: ThemeId,
        config: LayoutConfig,
    ) -> Result<Self, LayoutError> {
        let theme = Theme::resolve(theme_id);
        let layout = compute_mindmap_layout(tree.as_ref(), &theme, &config)?;
        Ok(Self {
            tree,
            theme,
            config,
            layout,
        })
    }

    pub fn layout(&self) -> &MindMapLayout {
        &self.layout
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn tree(&self) -> Option<&InputNode> {
        self.tree.as_ref()
    }

    pub fn set_theme(&mut self, theme_id: ThemeId) -> Result<&MindMapLayout, LayoutError> {
        let theme = Theme::resolve(theme_id);
        let layout = compute_mindmap_layout(self.tree.as_ref(), &theme, &self.config)?;
        tracing::debug!(theme = theme_id.as_str(), "re-laid out for theme change");
        self.theme = theme;
        self.layout = layout;
        Ok(&self.layout)
    }

    pub fn into_layout(self) -> MindMapLayout {
        self.layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-3;

    fn branch(id: &str, label: &str, leaves: &[(&str, &str)]) -> InputNode {
        InputNode::new(label).with_id(id).with_children(
            leaves
                .iter()
                .map(|(leaf_id, leaf_label)| InputNode::new(*leaf_label).with_id(*leaf_id))
                .collect(),
        )
    }

    /// Branches 0/1 and 2/3 have the same shape so the halves mirror exactly.
    fn balanced_tree() -> InputNode {
        InputNode::new("Photosynthesis").with_children(vec![
            branch("r0", "Light reactions", &[("r0a", "Thylakoid"), ("r0b", "Photolysis")]),
            branch("l0", "Calvin cycle!!!", &[("l0a", "Stroma..."), ("l0b", "RuBisCO!!!")]),
            branch("r1", "Pigments", &[("r1a", "Chlorophyll a")]),
            branch("l1", "Products", &[("l1a", "Glucose & O2!")]),
        ])
    }

    fn layout_of(tree: &InputNode) -> MindMapLayout {
        compute_mindmap_layout(Some(tree), &Theme::light(), &LayoutConfig::default()).unwrap()
    }

    fn node<'a>(layout: &'a MindMapLayout, id: &str) -> &'a LayoutNode {
        layout.node(id).unwrap()
    }

    #[test]
    fn missing_tree_is_empty_layout() {
        let layout =
            compute_mindmap_layout(None, &Theme::future_tech(), &LayoutConfig::default()).unwrap();
        assert!(layout.is_empty());
        assert!(layout.edges.is_empty());
        assert_eq!(layout.theme_id, ThemeId::Tech);
        assert_eq!((layout.width, layout.height), (0.0, 0.0));
    }

    #[test]
    fn lone_root_is_centered_on_origin() {
        let layout = layout_of(&InputNode::new("Only a title"));
        assert_eq!(layout.nodes.len(), 1);
        assert!(layout.edges.is_empty());
        let root = layout.root().unwrap();
        assert_eq!(root.id, ROOT_ID);
        assert_eq!(root.size(), Size::new(280.0, 280.0));
        assert_eq!(root.center(), Point::new(0.0, 0.0));
        assert_eq!((layout.min_x, layout.min_y), (-140.0, -140.0));
    }

    #[test]
    fn every_input_node_appears_once() {
        let tree = balanced_tree();
        let layout = layout_of(&tree);
        assert_eq!(layout.nodes.len(), tree.node_count());
        assert_eq!(layout.edges.len(), tree.node_count() - 1);
        let ids: HashSet<&str> = layout.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids.len(), layout.nodes.len());
        assert_eq!(layout.nodes[0].id, ROOT_ID);
    }

    #[test]
    fn sides_follow_first_level_index() {
        let layout = layout_of(&balanced_tree());
        let root_x = layout.root().unwrap().center().x;
        for id in ["r0", "r0a", "r0b", "r1", "r1a"] {
            let node = node(&layout, id);
            assert_eq!(node.side, Side::Right, "{id}");
            assert!(node.position.x > root_x, "{id} should sit right of the root");
        }
        for id in ["l0", "l0a", "l0b", "l1", "l1a"] {
            let node = node(&layout, id);
            assert_eq!(node.side, Side::Left, "{id}");
            assert!(node.position.x + node.width < root_x, "{id} should sit left of the root");
        }
    }

    #[test]
    fn halves_mirror_each_other() {
        let layout = layout_of(&balanced_tree());
        for (right, left) in [
            ("r0", "l0"),
            ("r0a", "l0a"),
            ("r0b", "l0b"),
            ("r1", "l1"),
            ("r1a", "l1a"),
        ] {
            let r = node(&layout, right);
            let l = node(&layout, left);
            assert!((l.position.x - (-r.position.x - r.width)).abs() < EPS, "{left}");
            assert!((l.position.y - r.position.y).abs() < EPS, "{left}");
        }
    }

    #[test]
    fn root_sits_on_vertical_axis() {
        let layout = layout_of(&balanced_tree());
        let root = layout.root().unwrap();
        assert!(root.center().x.abs() < EPS);
        assert!((layout.min_x + layout.width / 2.0).abs() < EPS);
    }

    #[test]
    fn same_side_same_rank_boxes_do_not_overlap() {
        let layout = layout_of(&balanced_tree());
        for side in [Side::Right, Side::Left] {
            let boxes: Vec<&LayoutNode> = layout.nodes.iter().filter(|n| n.side == side).collect();
            for (i, a) in boxes.iter().enumerate() {
                for b in boxes.iter().skip(i + 1) {
                    if a.depth != b.depth {
                        continue;
                    }
                    let overlap_y =
                        a.position.y < b.position.y + b.height && b.position.y < a.position.y + a.height;
                    assert!(!overlap_y, "{} overlaps {}", a.id, b.id);
                }
            }
        }
    }

    #[test]
    fn branch_colors_propagate() {
        let theme = Theme::pink_cyberpunk();
        let layout =
            compute_mindmap_layout(Some(&balanced_tree()), &theme, &LayoutConfig::default()).unwrap();
        for (id, idx) in [("r0a", 0), ("l0b", 1), ("r1a", 2), ("l1a", 3)] {
            assert_eq!(node(&layout, id).branch_color.as_deref(), theme.branch_color(idx));
        }
        for edge in &layout.edges {
            let target = node(&layout, &edge.target);
            assert_eq!(Some(edge.stroke_color.as_str()), target.branch_color.as_deref());
        }
    }

    #[test]
    fn layout_is_deterministic() {
        let tree = balanced_tree();
        assert_eq!(layout_of(&tree), layout_of(&tree));
    }

    #[test]
    fn font_metrics_geometry_ignores_theme() {
        let config = LayoutConfig {
            font_metrics: true,
            ..LayoutConfig::default()
        };
        let tree = balanced_tree();
        let geometry = |theme: &Theme| -> Vec<(String, Point, f32, f32)> {
            compute_mindmap_layout(Some(&tree), theme, &config)
                .unwrap()
                .nodes
                .into_iter()
                .map(|node| (node.id, node.position, node.width, node.height))
                .collect()
        };
        let light = geometry(&Theme::light());
        assert_eq!(light, geometry(&Theme::future_tech()));
        assert_eq!(light, geometry(&Theme::pink_cyberpunk()));
    }

    #[test]
    fn bounds_cover_every_node() {
        let layout = layout_of(&balanced_tree());
        for node in &layout.nodes {
            assert!(node.position.x >= layout.min_x - EPS);
            assert!(node.position.y >= layout.min_y - EPS);
            assert!(node.position.x + node.width <= layout.min_x + layout.width + EPS);
            assert!(node.position.y + node.height <= layout.min_y + layout.height + EPS);
        }
    }

    #[test]
    fn single_branch_leaves_left_half_empty() {
        let tree = InputNode::new("Topic").with_children(vec![InputNode::new("Only child")]);
        let layout = layout_of(&tree);
        assert_eq!(layout.nodes.len(), 2);
        assert_eq!(layout.edges[0].id, "e-root-n-0");
        assert!(node(&layout, "n-0").position.x > 140.0);
    }

    #[test]
    fn edge_paths_connect_facing_sides() {
        let layout = layout_of(&balanced_tree());
        let paths = layout.edge_paths();
        assert_eq!(paths.len(), layout.edges.len());
        let path_to = |target: &str| {
            let idx = layout.edges.iter().position(|e| e.target == target).unwrap();
            paths[idx].unwrap()
        };
        assert!(path_to("r0").target.x > path_to("r0").source.x);
        assert!(path_to("l0").target.x < path_to("l0").source.x);
    }

    #[test]
    fn edge_with_missing_endpoint_has_no_path() {
        let mut layout = layout_of(&balanced_tree());
        layout.edges[0].target = "gone".to_string();
        let paths = layout.edge_paths();
        assert!(paths[0].is_none());
        assert!(paths[1..].iter().all(Option::is_some));
    }

    #[test]
    fn session_retheme_relayouts_from_pristine_tree() {
        let mut session =
            MindMapSession::new(Some(balanced_tree()), ThemeId::Default, LayoutConfig::default())
                .unwrap();
        let before = session.layout().clone();
        let after = session.set_theme(ThemeId::Tech).unwrap().clone();
        assert_eq!(after.theme_id, ThemeId::Tech);
        assert_eq!(session.theme().id, ThemeId::Tech);
        assert_eq!(before.nodes.len(), after.nodes.len());
        for (a, b) in before.nodes.iter().zip(&after.nodes) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.position, b.position);
        }
        assert_ne!(before.nodes[1].branch_color, after.nodes[1].branch_color);
    }
}
