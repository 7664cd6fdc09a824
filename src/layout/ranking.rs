use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use crate::config::LayoutConfig;

use super::error::LayoutError;
use super::{Direction, Point};

/// A box to be placed by [`layerize`].
#[derive(Debug, Clone, PartialEq)]
pub struct LayerNode {
    pub id: String,
    pub width: f32,
    pub height: f32,
}

impl LayerNode {
    pub fn new(id: impl Into<String>, width: f32, height: f32) -> Self {
        Self {
            id: id.into(),
            width,
            height,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerEdge {
    pub from: String,
    pub to: String,
}

impl LayerEdge {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerOptions {
    pub direction: Direction,
    pub rank_spacing: f32,
    pub node_spacing: f32,
    pub order_passes: usize,
}

impl Default for LayerOptions {
    fn default() -> Self {
        Self::from_config(&LayoutConfig::default())
    }
}

impl LayerOptions {
    pub fn from_config(config: &LayoutConfig) -> Self {
        Self {
            direction: Direction::LeftRight,
            rank_spacing: config.rank_spacing,
            node_spacing: config.node_spacing,
            order_passes: config.order_passes,
        }
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }
}

/// Top-left corner assigned to one input node.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub id: String,
    pub position: Point,
}

/// Places boxes in discrete ranks along `options.direction`.
///
/// Placements come back in input order, with the smallest top-left corner at
/// the origin. Boxes sharing a rank never overlap on the cross axis, and
/// adjacent ranks are at least `rank_spacing` apart.
pub fn layerize(
    nodes: &[LayerNode],
    edges: &[LayerEdge],
    options: &LayerOptions,
) -> Result<Vec<Placement>, LayoutError> {
    let links = validate(nodes, edges)?;
    if nodes.is_empty() {
        return Ok(Vec::new());
    }

    let horizontal = options.direction.is_horizontal();
    let ranks = compute_ranks(nodes.len(), &links);
    let grid = Grid::build(nodes, &links, &ranks, horizontal);
    let mut buckets = grid.buckets();
    order_rank_nodes(&mut buckets, &grid, options.order_passes);

    let rank_centers = rank_centers(&buckets, &grid, options.rank_spacing);
    let cross = assign_cross_axis(&buckets, &grid, options);
    tracing::trace!(
        nodes = nodes.len(),
        ranks = buckets.len(),
        dummies = grid.len() - grid.real,
        "layered"
    );

    let mut placements: Vec<Placement> = nodes
        .iter()
        .enumerate()
        .map(|(idx, node)| {
            let main = rank_centers[grid.rank[idx]];
            let (cx, cy) = if horizontal {
                (main, cross[idx])
            } else {
                (cross[idx], main)
            };
            Placement {
                id: node.id.clone(),
                position: Point::new(cx - node.width / 2.0, cy - node.height / 2.0),
            }
        })
        .collect();

    normalize_origin(&mut placements);
    apply_direction_mirror(options.direction, nodes, &mut placements);
    Ok(placements)
}

/// Index pairs for every edge, after checking ids are unique and every
/// endpoint is known.
fn validate(nodes: &[LayerNode], edges: &[LayerEdge]) -> Result<Vec<(usize, usize)>, LayoutError> {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(nodes.len());
    for (idx, node) in nodes.iter().enumerate() {
        if index.insert(node.id.as_str(), idx).is_some() {
            return Err(LayoutError::DuplicateNode(node.id.clone()));
        }
    }
    edges
        .iter()
        .map(|edge| -> Result<(usize, usize), LayoutError> {
            let lookup = |id: &str| {
                index
                    .get(id)
                    .copied()
                    .ok_or_else(|| LayoutError::UnknownEndpoint {
                        from: edge.from.clone(),
                        to: edge.to.clone(),
                        missing: id.to_string(),
                    })
            };
            Ok((lookup(&edge.from)?, lookup(&edge.to)?))
        })
        .collect()
}

/// Longest-path ranks over a topological order where input order breaks
/// ties. A cycle is broken at its earliest remaining node, whose incoming
/// edges are then treated as back edges.
fn compute_ranks(count: usize, links: &[(usize, usize)]) -> Vec<usize> {
    let mut adj: Vec<Vec<usize>> = vec![Vec::new(); count];
    let mut indeg = vec![0usize; count];
    for &(from, to) in links {
        adj[from].push(to);
        indeg[to] += 1;
    }

    let mut ready: BinaryHeap<Reverse<usize>> = (0..count)
        .filter(|&idx| indeg[idx] == 0)
        .map(Reverse)
        .collect();
    let mut order = Vec::with_capacity(count);
    let mut processed = vec![false; count];
    loop {
        while let Some(Reverse(idx)) = ready.pop() {
            if processed[idx] {
                continue;
            }
            processed[idx] = true;
            order.push(idx);
            for &next in &adj[idx] {
                if processed[next] {
                    continue;
                }
                indeg[next] = indeg[next].saturating_sub(1);
                if indeg[next] == 0 {
                    ready.push(Reverse(next));
                }
            }
        }
        if order.len() >= count {
            break;
        }
        match (0..count).find(|&idx| !processed[idx]) {
            Some(idx) => ready.push(Reverse(idx)),
            None => break,
        }
    }

    let mut order_index = vec![0usize; count];
    for (pos, &idx) in order.iter().enumerate() {
        order_index[idx] = pos;
    }
    let mut ranks = vec![0usize; count];
    for &idx in &order {
        for &next in &adj[idx] {
            if order_index[next] <= order_index[idx] {
                continue;
            }
            ranks[next] = ranks[next].max(ranks[idx] + 1);
        }
    }
    ranks
}

/// Real nodes followed by zero-size dummies that split long edges, all
/// addressed by index.
struct Grid {
    main: Vec<f32>,
    cross: Vec<f32>,
    rank: Vec<usize>,
    incoming: Vec<Vec<usize>>,
    outgoing: Vec<Vec<usize>>,
    real: usize,
}

impl Grid {
    fn build(nodes: &[LayerNode], links: &[(usize, usize)], ranks: &[usize], horizontal: bool) -> Self {
        let (main, cross): (Vec<f32>, Vec<f32>) = nodes
            .iter()
            .map(|node| {
                if horizontal {
                    (node.width, node.height)
                } else {
                    (node.height, node.width)
                }
            })
            .unzip();
        let mut grid = Self {
            main,
            cross,
            rank: ranks.to_vec(),
            incoming: vec![Vec::new(); nodes.len()],
            outgoing: vec![Vec::new(); nodes.len()],
            real: nodes.len(),
        };
        for &(from, to) in links {
            let (from_rank, to_rank) = (ranks[from], ranks[to]);
            if to_rank <= from_rank {
                continue;
            }
            let mut prev = from;
            for step in 1..(to_rank - from_rank) {
                let dummy = grid.push_dummy(from_rank + step);
                grid.link(prev, dummy);
                prev = dummy;
            }
            grid.link(prev, to);
        }
        grid
    }

    fn len(&self) -> usize {
        self.rank.len()
    }

    fn push_dummy(&mut self, rank: usize) -> usize {
        self.main.push(0.0);
        self.cross.push(0.0);
        self.rank.push(rank);
        self.incoming.push(Vec::new());
        self.outgoing.push(Vec::new());
        self.len() - 1
    }

    fn link(&mut self, from: usize, to: usize) {
        self.outgoing[from].push(to);
        self.incoming[to].push(from);
    }

    /// Ranks seeded in depth-first preorder from the sources, following
    /// edges in input order. On a tree every rank then already lists its
    /// members grouped by parent, in the order of those parents.
    fn buckets(&self) -> Vec<Vec<usize>> {
        let max_rank = self.rank.iter().copied().max().unwrap_or(0);
        let mut buckets = vec![Vec::new(); max_rank + 1];
        let mut visited = vec![false; self.len()];
        let sources = (0..self.len()).filter(|&idx| self.incoming[idx].is_empty());
        let leftovers = 0..self.len();
        for start in sources.chain(leftovers) {
            if visited[start] {
                continue;
            }
            let mut stack = vec![start];
            while let Some(idx) = stack.pop() {
                if visited[idx] {
                    continue;
                }
                visited[idx] = true;
                buckets[self.rank[idx]].push(idx);
                stack.extend(self.outgoing[idx].iter().rev().filter(|&&next| !visited[next]));
            }
        }
        buckets
    }
}

fn order_rank_nodes(buckets: &mut [Vec<usize>], grid: &Grid, passes: usize) {
    if buckets.len() <= 1 {
        return;
    }
    let mut positions = vec![0usize; grid.len()];
    let update_positions = |buckets: &[Vec<usize>], positions: &mut [usize]| {
        for bucket in buckets {
            for (slot, &idx) in bucket.iter().enumerate() {
                positions[idx] = slot;
            }
        }
    };
    update_positions(buckets, &mut positions);

    for _ in 0..passes.max(1) {
        for rank in 1..buckets.len() {
            sort_bucket(&mut buckets[rank], &grid.incoming, &positions);
            update_positions(buckets, &mut positions);
        }
        for rank in (0..buckets.len() - 1).rev() {
            sort_bucket(&mut buckets[rank], &grid.outgoing, &positions);
            update_positions(buckets, &mut positions);
        }
    }
}

/// Reorders the members that have neighbors by the median slot of those
/// neighbors. Members without neighbors keep their slot.
fn sort_bucket(bucket: &mut [usize], neighbors: &[Vec<usize>], positions: &[usize]) {
    let mut keyed: Vec<(usize, f32)> = bucket
        .iter()
        .enumerate()
        .filter_map(|(slot, &idx)| {
            let values = neighbors[idx].iter().map(|&n| positions[n] as f32).collect();
            median(values).map(|key| (slot, key))
        })
        .collect();
    if keyed.len() <= 1 {
        return;
    }
    let slots: Vec<usize> = keyed.iter().map(|&(slot, _)| slot).collect();
    keyed.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    let moved: Vec<usize> = keyed.iter().map(|&(slot, _)| bucket[slot]).collect();
    for (slot, idx) in slots.into_iter().zip(moved) {
        bucket[slot] = idx;
    }
}

fn median(mut values: Vec<f32>) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f32::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        Some(values[mid])
    } else {
        Some((values[mid - 1] + values[mid]) * 0.5)
    }
}

/// Main-axis center of each rank. The cursor advances by the widest member
/// of the rank plus the rank spacing.
fn rank_centers(buckets: &[Vec<usize>], grid: &Grid, rank_spacing: f32) -> Vec<f32> {
    let mut centers = Vec::with_capacity(buckets.len());
    let mut cursor = 0.0f32;
    for bucket in buckets {
        let extent = bucket.iter().map(|&idx| grid.main[idx]).fold(0.0f32, f32::max);
        centers.push(cursor + extent / 2.0);
        cursor += extent + rank_spacing;
    }
    centers
}

fn assign_cross_axis(buckets: &[Vec<usize>], grid: &Grid, options: &LayerOptions) -> Vec<f32> {
    let mut cross_pos = vec![0.0f32; grid.len()];
    for bucket in buckets {
        let mut prev: Option<(f32, f32)> = None;
        for &idx in bucket {
            let half = grid.cross[idx] / 2.0;
            let center = match prev {
                Some((prev_center, prev_half)) => prev_center + prev_half + half + options.node_spacing,
                None => 0.0,
            };
            cross_pos[idx] = center;
            prev = Some((center, half));
        }
    }

    for _ in 0..options.order_passes.max(1) {
        for bucket in buckets {
            place_rank(bucket, &grid.incoming, grid, options.node_spacing, &mut cross_pos);
        }
        for bucket in buckets.iter().rev() {
            place_rank(bucket, &grid.outgoing, grid, options.node_spacing, &mut cross_pos);
        }
    }
    cross_pos
}

/// Pulls each member of a rank toward the median of its neighbors, then packs
/// the rank in bucket order with `node_spacing` and shifts it back onto the
/// desired mean. The order settled by the sweeps is never changed here.
fn place_rank(
    bucket: &[usize],
    neighbors: &[Vec<usize>],
    grid: &Grid,
    node_spacing: f32,
    cross_pos: &mut [f32],
) {
    if bucket.is_empty() {
        return;
    }
    let desired: Vec<f32> = bucket
        .iter()
        .map(|&idx| {
            let current = cross_pos[idx];
            let centers = neighbors[idx].iter().map(|&n| cross_pos[n]).collect();
            match median(centers) {
                Some(target) => target * 0.85 + current * 0.15,
                None => current,
            }
        })
        .collect();

    let desired_mean = desired.iter().sum::<f32>() / desired.len() as f32;
    let mut assigned: Vec<f32> = Vec::with_capacity(bucket.len());
    let mut prev: Option<(f32, f32)> = None;
    for (&idx, &want) in bucket.iter().zip(&desired) {
        let half = grid.cross[idx] / 2.0;
        let center = match prev {
            Some((prev_center, prev_half)) => want.max(prev_center + prev_half + half + node_spacing),
            None => want,
        };
        assigned.push(center);
        prev = Some((center, half));
    }
    let actual_mean = assigned.iter().sum::<f32>() / assigned.len() as f32;
    let delta = desired_mean - actual_mean;
    for (&idx, center) in bucket.iter().zip(assigned) {
        cross_pos[idx] = center + delta;
    }
}

fn normalize_origin(placements: &mut [Placement]) {
    let min_x = placements.iter().map(|p| p.position.x).fold(f32::INFINITY, f32::min);
    let min_y = placements.iter().map(|p| p.position.y).fold(f32::INFINITY, f32::min);
    if !min_x.is_finite() || !min_y.is_finite() {
        return;
    }
    for placement in placements {
        placement.position.x -= min_x;
        placement.position.y -= min_y;
    }
}

fn apply_direction_mirror(direction: Direction, nodes: &[LayerNode], placements: &mut [Placement]) {
    let max_x = nodes
        .iter()
        .zip(placements.iter())
        .map(|(node, p)| p.position.x + node.width)
        .fold(0.0f32, f32::max);
    let max_y = nodes
        .iter()
        .zip(placements.iter())
        .map(|(node, p)| p.position.y + node.height)
        .fold(0.0f32, f32::max);
    match direction {
        Direction::RightLeft => {
            for (node, placement) in nodes.iter().zip(placements.iter_mut()) {
                placement.position.x = max_x - placement.position.x - node.width;
            }
        }
        Direction::BottomTop => {
            for (node, placement) in nodes.iter().zip(placements.iter_mut()) {
                placement.position.y = max_y - placement.position.y - node.height;
            }
        }
        Direction::LeftRight | Direction::TopBottom => {}
    }
}
