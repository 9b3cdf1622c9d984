//! Incremental construction of a [`ClassTree`].

use super::leaf::ClassLeaf;
use super::tree::ClassTree;
use super::NodeId;

/// Growable node storage that freezes into a [`ClassTree`].
///
/// Two styles are supported:
/// - grow from the root with [`init_root`](Self::init_root) and
///   [`apply_split`](Self::apply_split), which allocates children;
/// - fill explicit slots with [`set_split`](Self::set_split) and
///   [`set_leaf`](Self::set_leaf), as when mirroring an exported node table.
///
/// Slots that are never assigned become internal nodes without children, so
/// [`ClassTree::validate`] reports them.
#[derive(Debug, Clone, Default)]
pub struct TreeBuilder {
    split_indices: Vec<u32>,
    split_thresholds: Vec<f64>,
    left_children: Vec<Option<NodeId>>,
    right_children: Vec<Option<NodeId>>,
    is_leaf: Vec<bool>,
    leaves: Vec<Option<ClassLeaf>>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(n_nodes: usize) -> Self {
        Self {
            split_indices: Vec::with_capacity(n_nodes),
            split_thresholds: Vec::with_capacity(n_nodes),
            left_children: Vec::with_capacity(n_nodes),
            right_children: Vec::with_capacity(n_nodes),
            is_leaf: Vec::with_capacity(n_nodes),
            leaves: Vec::with_capacity(n_nodes),
        }
    }

    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.is_leaf.len()
    }

    /// Allocate the root node and return its id (always 0).
    pub fn init_root(&mut self) -> NodeId {
        self.ensure_node(0);
        0
    }

    /// Turn `node` into a split and allocate two fresh children.
    ///
    /// Returns `(left, right)`.
    pub fn apply_split(&mut self, node: NodeId, feature: u32, threshold: f64) -> (NodeId, NodeId) {
        let left = self.n_nodes() as NodeId;
        let right = left + 1;
        self.ensure_node(right);
        self.set_split(node, feature, threshold, left, right);
        (left, right)
    }

    /// Make `node` a split on `feature <= threshold` with the given children.
    pub fn set_split(
        &mut self,
        node: NodeId,
        feature: u32,
        threshold: f64,
        left: NodeId,
        right: NodeId,
    ) {
        self.ensure_node(node);
        let idx = node as usize;
        self.split_indices[idx] = feature;
        self.split_thresholds[idx] = threshold;
        self.left_children[idx] = Some(left);
        self.right_children[idx] = Some(right);
        self.is_leaf[idx] = false;
        self.leaves[idx] = None;
    }

    /// Make `node` a leaf.
    pub fn set_leaf(&mut self, node: NodeId, leaf: ClassLeaf) {
        self.ensure_node(node);
        let idx = node as usize;
        self.left_children[idx] = None;
        self.right_children[idx] = None;
        self.is_leaf[idx] = true;
        self.leaves[idx] = Some(leaf);
    }

    /// Freeze into an immutable tree. No validation is performed.
    pub fn build(self) -> ClassTree {
        ClassTree::new(
            self.split_indices,
            self.split_thresholds,
            self.left_children,
            self.right_children,
            self.is_leaf,
            self.leaves,
        )
    }

    fn ensure_node(&mut self, node: NodeId) {
        let needed = node as usize + 1;
        if self.n_nodes() < needed {
            self.split_indices.resize(needed, 0);
            self.split_thresholds.resize(needed, 0.0);
            self.left_children.resize(needed, None);
            self.right_children.resize(needed, None);
            self.is_leaf.resize(needed, false);
            self.leaves.resize(needed, None);
        }
    }
}
