//! Arena (SoA) storage for a binary classification tree.
//!
//! This module provides:
//! - [`ClassTree`]: Immutable SoA tree storage addressed by [`NodeId`]
//! - [`TreeValidationError`]: Structural and reference validation errors
//!
//! For incremental construction, see [`super::builder::TreeBuilder`].

use super::leaf::ClassLeaf;
use super::names::{ClassLabelSet, FeatureSet};
use super::NodeId;

// ============================================================================
// TreeValidationError
// ============================================================================

/// Validation errors for [`ClassTree`].
///
/// The first group covers the shape of the tree on its own; the second group
/// covers references into a [`FeatureSet`] and [`ClassLabelSet`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeValidationError {
    #[error("tree has no nodes")]
    EmptyTree,
    #[error("{field} has {len} entries but the tree has {n_nodes} nodes")]
    ArrayLenMismatch {
        field: &'static str,
        len: usize,
        n_nodes: usize,
    },
    #[error("internal node {node} is missing its {side} child")]
    MissingChild { node: NodeId, side: &'static str },
    #[error("leaf node {node} has children")]
    LeafWithChildren { node: NodeId },
    #[error("leaf node {node} has no class")]
    MissingLeafValue { node: NodeId },
    #[error("node {node} references {side} child {child} but tree has {n_nodes} nodes")]
    ChildOutOfBounds {
        node: NodeId,
        side: &'static str,
        child: NodeId,
        n_nodes: usize,
    },
    #[error("node {node} references itself as a child")]
    SelfLoop { node: NodeId },
    #[error("node {node} is reachable through more than one parent")]
    DuplicateVisit { node: NodeId },
    #[error("cycle detected at node {node}")]
    CycleDetected { node: NodeId },
    #[error("node {node} is unreachable from the root")]
    UnreachableNode { node: NodeId },
    #[error("node {node} splits on feature {feature}, which has no name")]
    UnknownFeature { node: NodeId, feature: u32 },
    #[error("leaf node {node} predicts class {class}, which is not a known label")]
    UnknownClass { node: NodeId, class: String },
    #[error("leaf node {node} has {len} weights but there are {n_classes} classes")]
    WeightsLenMismatch {
        node: NodeId,
        len: usize,
        n_classes: usize,
    },
    #[error("leaf node {node} has a non-finite weight")]
    NonFiniteWeight { node: NodeId },
}

// ============================================================================
// ClassTree
// ============================================================================

/// Structure-of-Arrays tree storage.
///
/// Child indices are local to this tree (0 = root). Internal nodes carry a
/// feature index, a threshold and two children; leaves carry a [`ClassLeaf`].
/// A sample goes left when `feature <= threshold`.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassTree {
    split_indices: Box<[u32]>,
    split_thresholds: Box<[f64]>,
    left_children: Box<[Option<NodeId>]>,
    right_children: Box<[Option<NodeId>]>,
    is_leaf: Box<[bool]>,
    leaves: Box<[Option<ClassLeaf>]>,
}

impl ClassTree {
    /// Create a tree from parallel arrays.
    ///
    /// `is_leaf` sets the number of nodes and every other array must have the
    /// same length; [`validate`](Self::validate) reports any mismatch. Entries
    /// that do not apply to a node kind are ignored: split fields of leaves and
    /// the leaf payload of internal nodes.
    pub fn new(
        split_indices: Vec<u32>,
        split_thresholds: Vec<f64>,
        left_children: Vec<Option<NodeId>>,
        right_children: Vec<Option<NodeId>>,
        is_leaf: Vec<bool>,
        leaves: Vec<Option<ClassLeaf>>,
    ) -> Self {
        Self {
            split_indices: split_indices.into_boxed_slice(),
            split_thresholds: split_thresholds.into_boxed_slice(),
            left_children: left_children.into_boxed_slice(),
            right_children: right_children.into_boxed_slice(),
            is_leaf: is_leaf.into_boxed_slice(),
            leaves: leaves.into_boxed_slice(),
        }
    }

    /// A tree made of a single leaf.
    pub fn leaf(leaf: ClassLeaf) -> Self {
        Self::new(vec![0], vec![0.0], vec![None], vec![None], vec![true], vec![Some(leaf)])
    }

    // =========================================================================
    // Node accessors
    // =========================================================================

    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.is_leaf.len()
    }

    #[inline]
    pub fn is_leaf(&self, node: NodeId) -> bool {
        self.is_leaf[node as usize]
    }

    /// Feature index tested at a split node.
    #[inline]
    pub fn split_index(&self, node: NodeId) -> u32 {
        self.split_indices[node as usize]
    }

    /// Threshold tested at a split node.
    #[inline]
    pub fn split_threshold(&self, node: NodeId) -> f64 {
        self.split_thresholds[node as usize]
    }

    #[inline]
    pub fn left_child(&self, node: NodeId) -> Option<NodeId> {
        self.left_children[node as usize]
    }

    #[inline]
    pub fn right_child(&self, node: NodeId) -> Option<NodeId> {
        self.right_children[node as usize]
    }

    /// Leaf payload, `None` for internal nodes.
    #[inline]
    pub fn leaf_value(&self, node: NodeId) -> Option<&ClassLeaf> {
        if self.is_leaf(node) {
            self.leaves[node as usize].as_ref()
        } else {
            None
        }
    }

    /// Both children of an internal node, `None` if either is missing.
    #[inline]
    fn children(&self, node: NodeId) -> Option<(NodeId, NodeId)> {
        let idx = node as usize;
        self.left_children[idx].zip(self.right_children[idx])
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Validate the structural invariants of this tree.
    ///
    /// Checks that the node arrays agree in length, that the tree is
    /// non-empty, that every internal node has two in-bounds children, that
    /// leaves have none, and that the nodes form a tree rooted at 0 (no
    /// cycles, no shared children, no orphans).
    pub fn validate(&self) -> Result<(), TreeValidationError> {
        self.check_lengths()?;
        let n_nodes = self.n_nodes();
        if n_nodes == 0 {
            return Err(TreeValidationError::EmptyTree);
        }

        // Iterative DFS with color marking.
        // 0 = unvisited, 1 = visiting, 2 = done
        let mut color = vec![0u8; n_nodes];
        let mut stack: Vec<(NodeId, u8)> = vec![(0, 0)];

        while let Some((node, phase)) = stack.pop() {
            let node_usize = node as usize;

            match phase {
                0 => {
                    match color[node_usize] {
                        0 => {}
                        1 => return Err(TreeValidationError::CycleDetected { node }),
                        _ => return Err(TreeValidationError::DuplicateVisit { node }),
                    }

                    color[node_usize] = 1;
                    stack.push((node, 1));

                    let left = self.left_children[node_usize];
                    let right = self.right_children[node_usize];

                    if self.is_leaf(node) {
                        if left.is_some() || right.is_some() {
                            return Err(TreeValidationError::LeafWithChildren { node });
                        }
                        if self.leaves[node_usize].is_none() {
                            return Err(TreeValidationError::MissingLeafValue { node });
                        }
                        continue;
                    }

                    let left =
                        left.ok_or(TreeValidationError::MissingChild { node, side: "left" })?;
                    let right =
                        right.ok_or(TreeValidationError::MissingChild { node, side: "right" })?;

                    for (side, child) in [("left", left), ("right", right)] {
                        if child == node {
                            return Err(TreeValidationError::SelfLoop { node });
                        }
                        if child as usize >= n_nodes {
                            return Err(TreeValidationError::ChildOutOfBounds {
                                node,
                                side,
                                child,
                                n_nodes,
                            });
                        }
                    }

                    // Visit children, left first
                    stack.push((right, 0));
                    stack.push((left, 0));
                }
                _ => {
                    color[node_usize] = 2;
                }
            }
        }

        if let Some(orphan) = color.iter().position(|&c| c == 0) {
            return Err(TreeValidationError::UnreachableNode {
                node: orphan as NodeId,
            });
        }

        Ok(())
    }

    fn check_lengths(&self) -> Result<(), TreeValidationError> {
        let n_nodes = self.n_nodes();
        let lengths = [
            ("split_indices", self.split_indices.len()),
            ("split_thresholds", self.split_thresholds.len()),
            ("left_children", self.left_children.len()),
            ("right_children", self.right_children.len()),
            ("leaves", self.leaves.len()),
        ];
        match lengths.into_iter().find(|&(_, len)| len != n_nodes) {
            Some((field, len)) => Err(TreeValidationError::ArrayLenMismatch {
                field,
                len,
                n_nodes,
            }),
            None => Ok(()),
        }
    }

    /// Validate the tree's references against a feature set and label set.
    ///
    /// Every internal node must split on a named feature; every leaf must
    /// resolve to a label, and its weight vector (if any) must be finite with
    /// one entry per label. Call after [`validate`](Self::validate).
    pub fn validate_references(
        &self,
        features: &FeatureSet,
        labels: &ClassLabelSet,
    ) -> Result<(), TreeValidationError> {
        for node in self.preorder() {
            if !self.is_leaf(node) {
                let feature = self.split_index(node);
                if !features.contains(feature) {
                    return Err(TreeValidationError::UnknownFeature { node, feature });
                }
                continue;
            }

            let Some(leaf) = self.leaf_value(node) else {
                return Err(TreeValidationError::MissingLeafValue { node });
            };
            if let Some(weights) = &leaf.weights {
                if weights.len() != labels.len() {
                    return Err(TreeValidationError::WeightsLenMismatch {
                        node,
                        len: weights.len(),
                        n_classes: labels.len(),
                    });
                }
                if weights.iter().any(|w| !w.is_finite()) {
                    return Err(TreeValidationError::NonFiniteWeight { node });
                }
            }
            if leaf.resolve(labels).is_none() {
                return Err(TreeValidationError::UnknownClass {
                    node,
                    class: leaf.class.to_string(),
                });
            }
        }
        Ok(())
    }

    // =========================================================================
    // Traversal helpers (validated trees only)
    // =========================================================================

    /// Node ids in pre-order (node, left subtree, right subtree).
    ///
    /// Expects a tree that passed [`validate`](Self::validate); a cyclic tree
    /// would never finish.
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.n_nodes());
        if self.n_nodes() == 0 {
            return order;
        }
        let mut stack = vec![0 as NodeId];
        while let Some(node) = stack.pop() {
            order.push(node);
            if let (false, Some((left, right))) = (self.is_leaf(node), self.children(node)) {
                stack.push(right);
                stack.push(left);
            }
        }
        order
    }

    /// Distinct feature indices tested by internal nodes, in the order they
    /// are first met during a pre-order walk.
    pub fn referenced_features(&self) -> Vec<u32> {
        let mut seen = Vec::new();
        for node in self.preorder() {
            if !self.is_leaf(node) {
                let feature = self.split_index(node);
                if !seen.contains(&feature) {
                    seen.push(feature);
                }
            }
        }
        seen
    }

    /// Depth of the subtree rooted at every node, indexed by `NodeId`.
    ///
    /// A leaf has depth 1. Computed in one post-order pass.
    pub fn subtree_depths(&self) -> Vec<u32> {
        let mut depths = vec![0u32; self.n_nodes()];
        // Reverse pre-order visits children before their parent.
        for node in self.preorder().into_iter().rev() {
            depths[node as usize] = match (self.is_leaf(node), self.children(node)) {
                (false, Some((left, right))) => {
                    1 + depths[left as usize].max(depths[right as usize])
                }
                _ => 1,
            };
        }
        depths
    }

    /// Depth of the whole tree (a single leaf has depth 1).
    pub fn depth(&self) -> u32 {
        self.subtree_depths().first().copied().unwrap_or(0)
    }

    /// Traverse the tree for a sample and return the reached leaf.
    ///
    /// `sample[i]` is the value of feature `i`. Goes left when
    /// `value <= threshold`, matching the generated C code.
    ///
    /// # Panics
    ///
    /// Panics if `sample` is shorter than a feature index on the path.
    pub fn traverse_to_leaf(&self, sample: &[f32]) -> NodeId {
        let mut node: NodeId = 0;
        while let (false, Some((left, right))) = (self.is_leaf(node), self.children(node)) {
            let value = sample[self.split_index(node) as usize];
            node = if value <= self.split_threshold(node) as f32 {
                left
            } else {
                right
            };
        }
        node
    }

    /// Predicted class index for a sample, resolved through `labels`.
    pub fn predict_class(&self, sample: &[f32], labels: &ClassLabelSet) -> Option<usize> {
        let leaf = self.traverse_to_leaf(sample);
        self.leaf_value(leaf)?.resolve(labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class_tree;

    fn labels() -> ClassLabelSet {
        ClassLabelSet::new(["low", "high"]).unwrap()
    }

    #[test]
    fn predict_simple_tree() {
        let tree = class_tree! {
            0 => split(0, 0.5) -> 1, 2,
            1 => leaf(0),
            2 => leaf(1),
        };

        assert_eq!(tree.validate(), Ok(()));
        assert_eq!(tree.predict_class(&[0.3], &labels()), Some(0));
        assert_eq!(tree.predict_class(&[0.5], &labels()), Some(0));
        assert_eq!(tree.predict_class(&[0.7], &labels()), Some(1));
    }

    #[test]
    fn validate_rejects_empty_tree() {
        let tree = ClassTree::new(vec![], vec![], vec![], vec![], vec![], vec![]);
        assert_eq!(tree.validate(), Err(TreeValidationError::EmptyTree));
    }

    #[test]
    fn validate_rejects_mismatched_array_lengths() {
        let longer = ClassTree::new(
            vec![0],
            vec![0.0, 0.0],
            vec![None],
            vec![None],
            vec![true],
            vec![Some(ClassLeaf::index(0))],
        );
        assert_eq!(
            longer.validate(),
            Err(TreeValidationError::ArrayLenMismatch {
                field: "split_thresholds",
                len: 2,
                n_nodes: 1
            })
        );

        let shorter = ClassTree::new(
            vec![0, 0, 0],
            vec![1.0, 0.0, 0.0],
            vec![Some(1), None, None],
            vec![Some(2), None, None],
            vec![false, true, true],
            vec![None, Some(ClassLeaf::index(0))],
        );
        assert_eq!(
            shorter.validate(),
            Err(TreeValidationError::ArrayLenMismatch {
                field: "leaves",
                len: 2,
                n_nodes: 3
            })
        );
    }

    #[test]
    fn validate_rejects_missing_child() {
        let tree = ClassTree::new(
            vec![0, 0],
            vec![1.0, 0.0],
            vec![Some(1), None],
            vec![None, None],
            vec![false, true],
            vec![None, Some(ClassLeaf::index(0))],
        );
        assert_eq!(
            tree.validate(),
            Err(TreeValidationError::MissingChild {
                node: 0,
                side: "right"
            })
        );
    }

    #[test]
    fn validate_rejects_leaf_with_children() {
        let tree = ClassTree::new(
            vec![0, 0],
            vec![0.0, 0.0],
            vec![Some(1), None],
            vec![None, None],
            vec![true, true],
            vec![Some(ClassLeaf::index(0)), Some(ClassLeaf::index(0))],
        );
        assert_eq!(
            tree.validate(),
            Err(TreeValidationError::LeafWithChildren { node: 0 })
        );
    }

    #[test]
    fn validate_rejects_out_of_bounds_child() {
        let tree = ClassTree::new(
            vec![0, 0],
            vec![1.0, 0.0],
            vec![Some(1), None],
            vec![Some(5), None],
            vec![false, true],
            vec![None, Some(ClassLeaf::index(0))],
        );
        assert_eq!(
            tree.validate(),
            Err(TreeValidationError::ChildOutOfBounds {
                node: 0,
                side: "right",
                child: 5,
                n_nodes: 2
            })
        );
    }

    #[test]
    fn validate_rejects_self_loop_and_shared_child() {
        let self_loop = ClassTree::new(
            vec![0, 0],
            vec![1.0, 0.0],
            vec![Some(0), None],
            vec![Some(1), None],
            vec![false, true],
            vec![None, Some(ClassLeaf::index(0))],
        );
        assert_eq!(
            self_loop.validate(),
            Err(TreeValidationError::SelfLoop { node: 0 })
        );

        let shared = ClassTree::new(
            vec![0, 0],
            vec![1.0, 0.0],
            vec![Some(1), None],
            vec![Some(1), None],
            vec![false, true],
            vec![None, Some(ClassLeaf::index(0))],
        );
        assert_eq!(
            shared.validate(),
            Err(TreeValidationError::DuplicateVisit { node: 1 })
        );
    }

    #[test]
    fn validate_rejects_cycle() {
        // 0 -> (1, 2), 1 -> (0, 2)
        let tree = ClassTree::new(
            vec![0, 0, 0],
            vec![1.0, 1.0, 0.0],
            vec![Some(1), Some(0), None],
            vec![Some(2), Some(2), None],
            vec![false, false, true],
            vec![None, None, Some(ClassLeaf::index(0))],
        );
        assert_eq!(
            tree.validate(),
            Err(TreeValidationError::CycleDetected { node: 0 })
        );
    }

    #[test]
    fn validate_rejects_unreachable_node() {
        let tree = class_tree! {
            0 => split(0, 0.5) -> 1, 2,
            1 => leaf(0),
            2 => leaf(1),
            3 => leaf(1),
        };
        assert_eq!(
            tree.validate(),
            Err(TreeValidationError::UnreachableNode { node: 3 })
        );
    }

    #[test]
    fn validate_references_checks_features_and_classes() {
        let tree = class_tree! {
            0 => split(4, 0.5) -> 1, 2,
            1 => leaf(0),
            2 => label("medium"),
        };
        tree.validate().unwrap();

        let features = FeatureSet::from_names(["a"]).unwrap();
        assert_eq!(
            tree.validate_references(&features, &labels()),
            Err(TreeValidationError::UnknownFeature { node: 0, feature: 4 })
        );

        let features = FeatureSet::new([(4, "a")]).unwrap();
        assert_eq!(
            tree.validate_references(&features, &labels()),
            Err(TreeValidationError::UnknownClass {
                node: 2,
                class: "\"medium\"".into()
            })
        );
    }

    #[test]
    fn validate_references_checks_weights() {
        let features = FeatureSet::from_names(["a"]).unwrap();

        let short = class_tree! {
            0 => weights(1.0, 2.0, 3.0),
        };
        assert_eq!(
            short.validate_references(&features, &labels()),
            Err(TreeValidationError::WeightsLenMismatch {
                node: 0,
                len: 3,
                n_classes: 2
            })
        );

        let nan = class_tree! {
            0 => weights(1.0, f64::NAN),
        };
        assert_eq!(
            nan.validate_references(&features, &labels()),
            Err(TreeValidationError::NonFiniteWeight { node: 0 })
        );
    }

    #[test]
    fn preorder_and_referenced_features() {
        //        0:f2
        //      /      \
        //    1:f0     4:f2
        //   /   \    /   \
        //  2     3  5    6:f2
        //               /   \
        //              7     8
        let tree = class_tree! {
            0 => split(2, 1.0) -> 1, 4,
            1 => split(0, 1.0) -> 2, 3,
            2 => leaf(0),
            3 => leaf(1),
            4 => split(2, 2.0) -> 5, 6,
            5 => leaf(0),
            6 => split(2, 3.0) -> 7, 8,
            7 => leaf(1),
            8 => leaf(0),
        };
        tree.validate().unwrap();

        assert_eq!(tree.preorder(), vec![0, 1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(tree.referenced_features(), vec![2, 0]);
    }

    #[test]
    fn subtree_depths_count_leaves_as_one() {
        let tree = class_tree! {
            0 => split(0, 1.0) -> 1, 2,
            1 => leaf(0),
            2 => split(0, 2.0) -> 3, 4,
            3 => leaf(1),
            4 => split(0, 3.0) -> 5, 6,
            5 => leaf(0),
            6 => leaf(1),
        };
        tree.validate().unwrap();

        assert_eq!(tree.subtree_depths(), vec![4, 1, 3, 1, 2, 1, 1]);
        assert_eq!(tree.depth(), 4);
        assert_eq!(ClassTree::leaf(ClassLeaf::index(0)).depth(), 1);
    }
}
