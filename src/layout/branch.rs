use std::collections::HashSet;

use crate::ir::InputNode;
use crate::theme::Theme;

use super::text::{SizeEstimator, resolve_size};
use super::{EdgeStyle, LayoutEdge, LayoutNode, NodeStyle, Point, ROOT_ID, Side};

/// Side and color shared by every node of one first-level branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Branch<'a> {
    pub index: usize,
    pub side: Side,
    pub color: Option<&'a str>,
}

impl<'a> Branch<'a> {
    /// Branches alternate right/left in input order; colors cycle through the
    /// palette with the same index.
    pub fn for_child(index: usize, theme: &'a Theme) -> Self {
        Self {
            index,
            side: if index % 2 == 0 { Side::Right } else { Side::Left },
            color: theme.branch_color(index),
        }
    }
}

/// Nodes and edges of the whole tree, before any positioning.
#[derive(Debug, Clone, Default)]
pub(super) struct ClassifiedTree {
    pub(super) nodes: Vec<LayoutNode>,
    pub(super) edges: Vec<LayoutEdge>,
}

impl ClassifiedTree {
    pub(super) fn root(&self) -> Option<&LayoutNode> {
        self.nodes.first().filter(|node| node.is_root)
    }
}

struct Visit<'t, 'p> {
    parent: Option<&'p str>,
    branch: Option<Branch<'t>>,
    depth: usize,
    path: Vec<usize>,
}

pub(super) fn classify(root: &InputNode, theme: &Theme, estimator: &dyn SizeEstimator) -> ClassifiedTree {
    let mut tree = ClassifiedTree::default();
    let mut used_ids: HashSet<String> = HashSet::new();
    visit(
        root,
        Visit {
            parent: None,
            branch: None,
            depth: 0,
            path: Vec::new(),
        },
        theme,
        estimator,
        &mut used_ids,
        &mut tree,
    );
    tree
}

fn visit(
    node: &InputNode,
    state: Visit<'_, '_>,
    theme: &Theme,
    estimator: &dyn SizeEstimator,
    used_ids: &mut HashSet<String>,
    tree: &mut ClassifiedTree,
) {
    let is_root = state.parent.is_none();
    let id = if is_root {
        ROOT_ID.to_string()
    } else {
        resolve_node_id(node.id.as_deref(), &state.path, used_ids)
    };
    used_ids.insert(id.clone());

    let size = resolve_size(estimator, &node.label, is_root, node.style.as_ref());
    let side = state.branch.map(|branch| branch.side).unwrap_or(Side::Root);
    let branch_color = state.branch.and_then(|branch| branch.color).map(str::to_string);
    tree.nodes.push(LayoutNode {
        id: id.clone(),
        label: node.label.clone(),
        width: size.width,
        height: size.height,
        position: Point::default(),
        side,
        branch_color: branch_color.clone(),
        branch_index: state.branch.map(|branch| branch.index),
        depth: state.depth,
        is_root,
        style: node_style(theme, is_root, branch_color.as_deref()),
    });

    if let Some(parent) = state.parent {
        let stroke = branch_color.unwrap_or_else(|| theme.edge.stroke.clone());
        tree.edges.push(LayoutEdge {
            id: format!("e-{parent}-{id}"),
            source: parent.to_string(),
            target: id.clone(),
            stroke_color: stroke.clone(),
            label: None,
            style: EdgeStyle {
                stroke,
                stroke_width: theme.edge.stroke_width,
                filter: theme.edge.filter.clone(),
                connector: "floating".to_string(),
                marker_end: "arrowclosed".to_string(),
                animated: false,
            },
        });
    }

    for (idx, child) in node.children.iter().enumerate() {
        let branch = match state.branch {
            Some(branch) => branch,
            None => Branch::for_child(idx, theme),
        };
        let mut path = state.path.clone();
        path.push(idx);
        visit(
            child,
            Visit {
                parent: Some(&id),
                branch: Some(branch),
                depth: state.depth + 1,
                path,
            },
            theme,
            estimator,
            used_ids,
            tree,
        );
    }
}

/// Input id when usable, otherwise an id derived from the child-index path.
fn resolve_node_id(input: Option<&str>, path: &[usize], used_ids: &HashSet<String>) -> String {
    if let Some(id) = input.map(str::trim).filter(|id| !id.is_empty())
        && !used_ids.contains(id)
    {
        return id.to_string();
    }
    let mut base = String::from("n");
    for idx in path {
        base.push('-');
        base.push_str(&idx.to_string());
    }
    if !used_ids.contains(&base) {
        return base;
    }
    let mut suffix = 1usize;
    loop {
        let candidate = format!("{base}.{suffix}");
        if !used_ids.contains(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}

fn node_style(theme: &Theme, is_root: bool, branch_color: Option<&str>) -> NodeStyle {
    let node = &theme.node;
    if is_root {
        return NodeStyle {
            background: node.root_background.clone(),
            border: node.root_border.clone(),
            border_radius: "50%".to_string(),
            color: node.root_text_color.clone(),
            font_family: node.font_family.clone(),
            font_size: 26.0,
            font_weight: 800,
            padding: 10.0,
            box_shadow: node.box_shadow.clone(),
        };
    }
    let border_color = branch_color.unwrap_or(theme.accent.as_str());
    NodeStyle {
        background: node.child_background.clone(),
        border: format!("1px solid {border_color}"),
        border_radius: "20px".to_string(),
        color: node.text_color.clone(),
        font_family: node.font_family.clone(),
        font_size: 14.0,
        font_weight: 500,
        padding: 10.0,
        box_shadow: node.box_shadow.clone(),
    }
}
