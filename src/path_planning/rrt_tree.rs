//! N-ary tree of points grown by nearest-neighbor attachment
//!
//! Nodes live in an arena addressed by [`NodeId`]; the root is always id 0.
//! Each node id doubles as the point's registry position in the kd-tree, so
//! a nearest-neighbor hit maps straight back to its tree node.

use std::collections::HashMap;

use log::debug;

use crate::common::{PlanningResult, Point2D, Trajectory};
use crate::utils::kd_tree::KdTree2D;

/// Index of a node in the tree arena
pub type NodeId = usize;

/// Id of the root node in a non-empty tree
pub const ROOT: NodeId = 0;

/// Tree node with a back-reference to its parent
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub point: Point2D,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl TreeNode {
    fn new(point: Point2D, parent: Option<NodeId>) -> Self {
        TreeNode {
            point,
            parent,
            children: Vec::new(),
        }
    }
}

/// Rapidly-exploring random tree over 2D points
#[derive(Debug, Clone, Default)]
pub struct RrtTree {
    nodes: Vec<TreeNode>,
    registry: HashMap<Point2D, NodeId>,
    kd_tree: KdTree2D,
}

impl RrtTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tree holding only `root`
    pub fn with_root(root: Point2D) -> PlanningResult<Self> {
        let mut tree = Self::new();
        tree.insert(root)?;
        Ok(tree)
    }

    /// Insert a point under its nearest neighbor in the tree.
    ///
    /// The first point becomes the root. Returns `Ok(false)` if the point is
    /// already in the tree.
    pub fn insert(&mut self, point: Point2D) -> PlanningResult<bool> {
        point.validate()?;

        if self.nodes.is_empty() {
            self.attach(point, None)?;
            return Ok(true);
        }
        if self.contains(&point) {
            debug!("Tree already contains ({}, {})", point.x, point.y);
            return Ok(false);
        }

        let parent = match self.kd_tree.nearest_neighbor(&point) {
            Some(neighbor) => neighbor.index,
            None => return Ok(false),
        };
        self.attach(point, Some(parent))?;
        Ok(true)
    }

    /// Insert a point under a given parent.
    ///
    /// Returns `Ok(false)` if the parent is not in the tree or the point already is.
    pub fn insert_with_parent(&mut self, point: Point2D, parent: &Point2D) -> PlanningResult<bool> {
        point.validate()?;

        let parent_id = match self.registry.get(parent) {
            Some(&id) => id,
            None => {
                debug!("Specified parent ({}, {}) does not exist. Did not insert.", parent.x, parent.y);
                return Ok(false);
            }
        };
        if self.contains(&point) {
            debug!("Tree already contains ({}, {})", point.x, point.y);
            return Ok(false);
        }

        self.attach(point, Some(parent_id))?;
        Ok(true)
    }

    pub fn contains(&self, point: &Point2D) -> bool {
        self.registry.contains_key(point)
    }

    pub fn len(&self) -> usize {
        self.kd_tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nearest point in the tree, or `None` if the tree is empty
    pub fn nearest(&self, point: &Point2D) -> Option<Point2D> {
        self.kd_tree.nearest_neighbor(point).map(|neighbor| neighbor.point)
    }

    /// Points in the tree within `radius` of `point`, or `None` if the tree is empty
    pub fn near(&self, point: &Point2D, radius: f64) -> Option<Vec<Point2D>> {
        self.kd_tree.radius_search(point, radius)
    }

    pub fn root(&self) -> Option<&Point2D> {
        self.nodes.first().map(|node| &node.point)
    }

    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id)
    }

    pub fn node_id(&self, point: &Point2D) -> Option<NodeId> {
        self.registry.get(point).copied()
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub fn parent_of(&self, point: &Point2D) -> Option<Point2D> {
        let id = self.node_id(point)?;
        self.nodes[id].parent.map(|parent| self.nodes[parent].point)
    }

    pub fn children_of(&self, point: &Point2D) -> Option<Vec<Point2D>> {
        let id = self.node_id(point)?;
        Some(self.nodes[id].children.iter().map(|&child| self.nodes[child].point).collect())
    }

    /// (parent, child) pairs for every non-root node
    pub fn edges(&self) -> Vec<(Point2D, Point2D)> {
        self.nodes
            .iter()
            .filter_map(|node| node.parent.map(|parent| (self.nodes[parent].point, node.point)))
            .collect()
    }

    /// Root-to-goal sequence of points, or `None` if `goal` is not in the tree
    pub fn trajectory(&self, goal: &Point2D) -> Option<Trajectory> {
        let mut current = match self.node_id(goal) {
            Some(id) => Some(id),
            None => {
                debug!("Tree does not contain the goal point ({}, {})", goal.x, goal.y);
                return None;
            }
        };

        let mut trace = Vec::new();
        while let Some(id) = current {
            debug_assert!(trace.len() < self.nodes.len(), "cycle in parent links");
            let node = &self.nodes[id];
            trace.push(node.point);
            current = node.parent;
        }

        trace.reverse();
        Some(Trajectory::from_points(trace))
    }

    fn attach(&mut self, point: Point2D, parent: Option<NodeId>) -> PlanningResult<NodeId> {
        let index = self.kd_tree.add_point(point)?;
        let id = self.nodes.len();
        debug_assert_eq!(index, id, "kd-tree registry out of step with tree nodes");

        self.nodes.push(TreeNode::new(point, parent));
        if let Some(parent) = parent {
            self.nodes[parent].children.push(id);
        }
        self.registry.insert(point, id);

        debug_assert_eq!(self.registry.len(), self.kd_tree.len());
        Ok(id)
    }
}
