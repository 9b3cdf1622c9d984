//! Translation of the tree into nested `if`/`else` statements.

use super::config::GeneratorConfig;
use super::format::{format_threshold, format_weight};
use super::sections::RETURN_VAR;
use super::writer::SourceWriter;
use super::Truncation;
use crate::error::CodegenError;
use crate::repr::{ClassLabelSet, ClassTree, FeatureSet, NodeId, TreeValidationError};

/// Pending work of the body emitter.
enum Frame {
    /// Emit the node at `depth`.
    Node { node: NodeId, depth: usize },
    /// Close the `if` block and open its `else`.
    Else { depth: usize, condition: String },
    /// Close the `else` block.
    Close { depth: usize },
}

/// Emitter for the function body.
///
/// Expects a tree that passed structural and reference validation; any
/// violation met anyway is reported as [`CodegenError::MalformedTree`].
pub(crate) struct BodyEmitter<'a> {
    tree: &'a ClassTree,
    features: &'a FeatureSet,
    labels: &'a ClassLabelSet,
    config: &'a GeneratorConfig,
    /// Subtree depth per node, computed once up front.
    subtree_depths: Vec<u32>,
    out: SourceWriter,
    truncations: Vec<Truncation>,
}

impl<'a> BodyEmitter<'a> {
    pub(crate) fn new(
        tree: &'a ClassTree,
        features: &'a FeatureSet,
        labels: &'a ClassLabelSet,
        config: &'a GeneratorConfig,
    ) -> Self {
        Self {
            tree,
            features,
            labels,
            config,
            subtree_depths: tree.subtree_depths(),
            out: SourceWriter::new(config.indent_width),
            truncations: Vec::new(),
        }
    }

    /// Emit the whole tree starting at the root (depth 1).
    pub(crate) fn emit(mut self) -> Result<(String, Vec<Truncation>), CodegenError> {
        // Work stack instead of recursion: tree depth is not limited by the call stack.
        let mut stack = vec![Frame::Node { node: 0, depth: 1 }];
        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Node { node, depth } => self.emit_node(node, depth, &mut stack)?,
                Frame::Else { depth, condition } => {
                    self.out.line(depth, "}");
                    self.out.line(depth, format!("else /* {condition} */"));
                    self.out.line(depth, "{");
                }
                Frame::Close { depth } => self.out.line(depth, "}"),
            }
        }
        Ok((self.out.into_string(), self.truncations))
    }

    /// Open the `if` of a split node and schedule the rest of it on `stack`.
    fn emit_node(
        &mut self,
        node: NodeId,
        depth: usize,
        stack: &mut Vec<Frame>,
    ) -> Result<(), CodegenError> {
        if depth > self.config.max_depth.saturating_add(1) {
            return self.emit_truncated(node, depth);
        }
        if self.tree.is_leaf(node) {
            return self.emit_leaf(node, depth);
        }

        let tree = self.tree;
        let left = tree
            .left_child(node)
            .ok_or(TreeValidationError::MissingChild { node, side: "left" })?;
        let right = tree
            .right_child(node)
            .ok_or(TreeValidationError::MissingChild { node, side: "right" })?;
        let feature = tree.split_index(node);
        let features = self.features;
        let name = features
            .name(feature)
            .ok_or(TreeValidationError::UnknownFeature { node, feature })?;
        let threshold = format_threshold(tree.split_threshold(node), self.config.decimal_places)?;

        self.out.line(depth, format!("if ({name} <= {threshold})"));
        self.out.line(depth, "{");

        // Popped in reverse: left subtree, else, right subtree, close.
        stack.push(Frame::Close { depth });
        stack.push(Frame::Node {
            node: right,
            depth: depth + 1,
        });
        stack.push(Frame::Else {
            depth,
            condition: format!("{name} > {threshold}"),
        });
        stack.push(Frame::Node {
            node: left,
            depth: depth + 1,
        });
        Ok(())
    }

    /// Past the depth limit: a lone leaf is still emitted, anything deeper is
    /// replaced by a compiler warning.
    fn emit_truncated(&mut self, node: NodeId, depth: usize) -> Result<(), CodegenError> {
        let subtree_depth = self.subtree_depths[node as usize] as usize;
        if subtree_depth == 1 {
            return self.emit_leaf(node, depth);
        }

        log::warn!(
            "truncated branch at node {} (depth {}): remaining subtree depth {}",
            node,
            depth,
            subtree_depth
        );
        self.out.line(
            depth,
            format!("#warning truncated branch of depth {subtree_depth}"),
        );
        self.truncations.push(Truncation {
            node,
            depth,
            subtree_depth,
        });
        Ok(())
    }

    fn emit_leaf(&mut self, node: NodeId, depth: usize) -> Result<(), CodegenError> {
        let tree = self.tree;
        let labels = self.labels;
        let leaf = tree
            .leaf_value(node)
            .ok_or(TreeValidationError::MissingLeafValue { node })?;
        let label = leaf
            .resolve(labels)
            .and_then(|class| labels.get(class))
            .ok_or_else(|| TreeValidationError::UnknownClass {
                node,
                class: leaf.class.to_string(),
            })?;

        if self.config.include_class_weights {
            if let Some(weights) = &leaf.weights {
                let formatted = weights
                    .iter()
                    .map(|&w| format_weight(w, self.config.decimal_places))
                    .collect::<Result<Vec<_>, _>>()?;
                self.out
                    .line(depth, format!("/* weights: [{}] */", formatted.join(", ")));
            }
        }
        self.out.line(depth, format!("{RETURN_VAR} = {label};"));
        Ok(())
    }
}
