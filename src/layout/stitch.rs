use super::{LayoutNode, Point, ROOT_ID};

/// Joins the two independently layered halves around a shared root.
///
/// Both halves are expected to carry their own copy of the root. The right
/// half is kept in place and its root is pinned onto the vertical axis; the
/// left half is mirrored across that axis and its root copy is dropped.
pub(super) fn stitch(right: Vec<LayoutNode>, left: Vec<LayoutNode>) -> Vec<LayoutNode> {
    let center_y = shared_center_y(&right, &left);
    let mut nodes = Vec::with_capacity(right.len() + left.len());

    for mut node in right {
        if node.id == ROOT_ID {
            node.position = Point::new(-node.width / 2.0, center_y - node.height / 2.0);
        }
        nodes.push(node);
    }
    nodes.extend(
        left.into_iter()
            .filter(|node| node.id != ROOT_ID)
            .map(mirror_horizontally),
    );
    nodes
}

/// Midpoint of the lowest and highest box bottoms over both halves.
fn shared_center_y(right: &[LayoutNode], left: &[LayoutNode]) -> f32 {
    let (min_y, max_y) = right
        .iter()
        .chain(left)
        .map(|node| node.position.y + node.height)
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), bottom| {
            (lo.min(bottom), hi.max(bottom))
        });
    if min_y.is_finite() && max_y.is_finite() {
        (min_y + max_y) / 2.0
    } else {
        0.0
    }
}

fn mirror_horizontally(mut node: LayoutNode) -> LayoutNode {
    node.position.x = -node.position.x - node.width;
    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{NodeStyle, Side};

    fn node(id: &str, x: f32, y: f32, width: f32, height: f32, side: Side) -> LayoutNode {
        LayoutNode {
            id: id.to_string(),
            label: id.to_string(),
            width,
            height,
            position: Point::new(x, y),
            side,
            branch_color: None,
            branch_index: None,
            depth: usize::from(id != ROOT_ID),
            is_root: id == ROOT_ID,
            style: NodeStyle {
                background: String::new(),
                border: String::new(),
                border_radius: String::new(),
                color: String::new(),
                font_family: String::new(),
                font_size: 14.0,
                font_weight: 500,
                padding: 10.0,
                box_shadow: String::new(),
            },
        }
    }

    #[test]
    fn root_copy_from_left_is_dropped() {
        let right = vec![
            node(ROOT_ID, 0.0, 0.0, 280.0, 280.0, Side::Root),
            node("a", 480.0, 110.0, 240.0, 60.0, Side::Right),
        ];
        let left = vec![
            node(ROOT_ID, 0.0, 0.0, 280.0, 280.0, Side::Root),
            node("b", 480.0, 110.0, 240.0, 60.0, Side::Left),
        ];
        let nodes = stitch(right, left);
        let ids: Vec<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec![ROOT_ID, "a", "b"]);
    }

    #[test]
    fn left_half_mirrors_across_axis() {
        let right = vec![
            node(ROOT_ID, 0.0, 0.0, 280.0, 280.0, Side::Root),
            node("a", 480.0, 110.0, 240.0, 60.0, Side::Right),
        ];
        let left = vec![
            node(ROOT_ID, 0.0, 0.0, 280.0, 280.0, Side::Root),
            node("b", 480.0, 110.0, 240.0, 60.0, Side::Left),
        ];
        let nodes = stitch(right, left);
        assert_eq!(nodes[1].position, Point::new(480.0, 110.0));
        assert_eq!(nodes[2].position, Point::new(-720.0, 110.0));
    }

    #[test]
    fn root_pinned_on_shared_center() {
        let right = vec![
            node(ROOT_ID, 0.0, 40.0, 280.0, 280.0, Side::Root),
            node("a", 480.0, 0.0, 240.0, 60.0, Side::Right),
        ];
        let left = vec![
            node(ROOT_ID, 0.0, 0.0, 280.0, 280.0, Side::Root),
            node("b", 480.0, 300.0, 240.0, 100.0, Side::Left),
        ];
        // bottoms: 320, 60, 280, 400
        let nodes = stitch(right, left);
        let root = &nodes[0];
        assert_eq!(root.position, Point::new(-140.0, 230.0 - 140.0));
        assert_eq!(root.center(), Point::new(0.0, 230.0));
    }

    #[test]
    fn lone_root_lands_on_origin_row() {
        let nodes = stitch(
            vec![node(ROOT_ID, 0.0, 0.0, 280.0, 280.0, Side::Root)],
            vec![node(ROOT_ID, 0.0, 0.0, 280.0, 280.0, Side::Root)],
        );
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].center(), Point::new(0.0, 280.0));
    }

    #[test]
    fn empty_halves_produce_nothing() {
        assert!(stitch(Vec::new(), Vec::new()).is_empty());
    }
}
