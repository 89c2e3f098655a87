//! Incremental 2D kd-tree for exact nearest-neighbor and radius queries
//!
//! Points are registered in insertion order and keep their registry position
//! for the lifetime of the index. New points are appended to the tree
//! without rebalancing; the whole tree is rebuilt around medians whenever its
//! size has doubled since the last rebuild.

use log::trace;

use crate::common::{PlanningResult, Point2D};

/// Size multiple that triggers a full rebuild
const REBUILD_THRESHOLD: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

impl Axis {
    fn next(self) -> Axis {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }

    fn from_depth(depth: usize) -> Axis {
        if depth % 2 == 0 {
            Axis::X
        } else {
            Axis::Y
        }
    }
}

#[derive(Debug, Clone)]
struct KdNode {
    coords: [f64; 2],
    /// Position of the point in the registry
    index: usize,
    axis: Axis,
    left: Option<usize>,
    right: Option<usize>,
}

impl KdNode {
    fn split_value(&self) -> f64 {
        match self.axis {
            Axis::X => self.coords[0],
            Axis::Y => self.coords[1],
        }
    }
}

/// Result of a nearest-neighbor query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Registry position of the matched point
    pub index: usize,
    pub point: Point2D,
    pub distance: f64,
}

/// Dynamic kd-tree over 2D points
#[derive(Debug, Clone, Default)]
pub struct KdTree2D {
    registry: Vec<Point2D>,
    nodes: Vec<KdNode>,
    root: Option<usize>,
    size_at_build: usize,
}

impl KdTree2D {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a point and return its registry position
    pub fn add_point(&mut self, point: Point2D) -> PlanningResult<usize> {
        point.validate()?;

        let index = self.registry.len();
        self.registry.push(point);

        if self.root.is_none() || self.registry.len() >= REBUILD_THRESHOLD * self.size_at_build {
            self.rebuild();
        } else {
            self.insert_node(index);
        }
        Ok(index)
    }

    /// Register points in order. Points accepted before a failure stay in the index.
    pub fn add_points(&mut self, points: &[Point2D]) -> PlanningResult<()> {
        for point in points {
            self.add_point(*point)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Registered point at a registry position
    pub fn point(&self, index: usize) -> Option<&Point2D> {
        self.registry.get(index)
    }

    /// All registered points in registry order
    pub fn points(&self) -> &[Point2D] {
        &self.registry
    }

    /// Length of the longest root-to-leaf chain
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack: Vec<(usize, usize)> = self.root.map(|root| (root, 1)).into_iter().collect();
        while let Some((node_id, level)) = stack.pop() {
            deepest = deepest.max(level);
            let node = &self.nodes[node_id];
            stack.extend(node.left.map(|child| (child, level + 1)));
            stack.extend(node.right.map(|child| (child, level + 1)));
        }
        deepest
    }

    /// Exact nearest registered point, or `None` if the index is empty
    pub fn nearest_neighbor(&self, query: &Point2D) -> Option<Neighbor> {
        let root = self.root?;
        let target = [query.x, query.y];
        let (node_id, dist_sq) = self.search_nearest(root, &target);

        let index = self.nodes[node_id].index;
        Some(Neighbor {
            index,
            point: self.registry[index],
            distance: dist_sq.sqrt(),
        })
    }

    /// All registered points within `radius` (inclusive), unordered.
    ///
    /// Returns `None` on an empty index, `Some(vec![])` when nothing is in range.
    /// A negative or NaN radius matches nothing.
    pub fn radius_search(&self, query: &Point2D, radius: f64) -> Option<Vec<Point2D>> {
        let root = self.root?;
        if radius.is_nan() || radius < 0.0 {
            return Some(Vec::new());
        }
        let target = [query.x, query.y];
        let radius_sq = radius * radius;

        let mut found = Vec::new();
        let mut stack = vec![root];
        while let Some(node_id) = stack.pop() {
            let node = &self.nodes[node_id];
            if squared_distance(&node.coords, &target) <= radius_sq {
                found.push(self.registry[node.index]);
            }

            let diff = axis_value(&target, node.axis) - node.split_value();
            let (near, far) = if diff < 0.0 {
                (node.left, node.right)
            } else {
                (node.right, node.left)
            };
            if let Some(near) = near {
                stack.push(near);
            }
            if diff * diff <= radius_sq {
                if let Some(far) = far {
                    stack.push(far);
                }
            }
        }
        Some(found)
    }

    /// Depth-first search with an explicit stack. Each entry carries the
    /// squared distance from the target to its splitting plane, so far
    /// subtrees are skipped once a closer point is known.
    fn search_nearest(&self, root: usize, target: &[f64; 2]) -> (usize, f64) {
        let mut best = (root, f64::INFINITY);
        let mut stack = vec![(root, 0.0)];

        while let Some((node_id, plane_dist_sq)) = stack.pop() {
            if plane_dist_sq > best.1 {
                continue;
            }
            let node = &self.nodes[node_id];
            let dist_sq = squared_distance(&node.coords, target);
            if dist_sq < best.1 {
                best = (node_id, dist_sq);
            }

            let diff = axis_value(target, node.axis) - node.split_value();
            let (near, far) = if diff < 0.0 {
                (node.left, node.right)
            } else {
                (node.right, node.left)
            };

            // near child goes on top so it is explored first
            if let Some(far) = far {
                stack.push((far, diff * diff));
            }
            if let Some(near) = near {
                stack.push((near, plane_dist_sq));
            }
        }
        best
    }

    /// Descend from the root and hang the registry entry off a leaf
    fn insert_node(&mut self, index: usize) {
        let point = self.registry[index];
        let coords = [point.x, point.y];

        let mut current = match self.root {
            Some(root) => root,
            None => {
                self.rebuild();
                return;
            }
        };
        loop {
            let node = &self.nodes[current];
            let go_left = axis_value(&coords, node.axis) < node.split_value();
            let child = if go_left { node.left } else { node.right };
            match child {
                Some(next) => current = next,
                None => {
                    let new_id = self.nodes.len();
                    let axis = node.axis.next();
                    self.nodes.push(KdNode {
                        coords,
                        index,
                        axis,
                        left: None,
                        right: None,
                    });
                    let parent = &mut self.nodes[current];
                    if go_left {
                        parent.left = Some(new_id);
                    } else {
                        parent.right = Some(new_id);
                    }
                    return;
                }
            }
        }
    }

    /// Rebuild a balanced tree over every registered point
    fn rebuild(&mut self) {
        trace!("Rebuilding kd-tree over {} points", self.registry.len());

        self.nodes.clear();
        self.nodes.reserve(self.registry.len());
        let mut indices: Vec<usize> = (0..self.registry.len()).collect();
        self.root = self.build(&mut indices, 0);
        self.size_at_build = self.registry.len();

        debug_assert_eq!(self.nodes.len(), self.registry.len());
    }

    fn build(&mut self, indices: &mut [usize], depth: usize) -> Option<usize> {
        if indices.is_empty() {
            return None;
        }

        let axis = Axis::from_depth(depth);
        let mid = indices.len() / 2;
        let registry = &self.registry;
        indices.select_nth_unstable_by(mid, |&a, &b| {
            let pa = [registry[a].x, registry[a].y];
            let pb = [registry[b].x, registry[b].y];
            axis_value(&pa, axis).total_cmp(&axis_value(&pb, axis))
        });

        let index = indices[mid];
        let point = self.registry[index];
        let node_id = self.nodes.len();
        self.nodes.push(KdNode {
            coords: [point.x, point.y],
            index,
            axis,
            left: None,
            right: None,
        });

        let (lower, rest) = indices.split_at_mut(mid);
        let left = self.build(lower, depth + 1);
        let right = self.build(&mut rest[1..], depth + 1);
        self.nodes[node_id].left = left;
        self.nodes[node_id].right = right;
        Some(node_id)
    }
}

fn axis_value(coords: &[f64; 2], axis: Axis) -> f64 {
    match axis {
        Axis::X => coords[0],
        Axis::Y => coords[1],
    }
}

fn squared_distance(a: &[f64; 2], b: &[f64; 2]) -> f64 {
    (a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)
}
