//! Conversion from scikit-learn dump types to native dtcgen types.

use crate::repr::{ClassLabelSet, ClassLeaf, ClassTree, FeatureSet, NameError, TreeBuilder};

use super::json::{SklearnClassifier, TreeDump, TREE_LEAF};

/// Error type for scikit-learn model conversion.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConversionError {
    #[error("tree array `{field}` has {len} entries but node_count is {node_count}")]
    LengthMismatch {
        field: &'static str,
        len: usize,
        node_count: usize,
    },
    #[error("node {node} has {n_outputs} outputs; only single-output trees are supported")]
    UnsupportedOutputs { node: usize, n_outputs: usize },
    #[error("invalid node index: node {node} references child {child} but tree has {node_count} nodes")]
    ChildOutOfRange {
        node: usize,
        child: i64,
        node_count: usize,
    },
    #[error("leaf node {node} has children")]
    LeafWithChildren { node: usize },
    #[error(transparent)]
    Names(#[from] NameError),
}

impl SklearnClassifier {
    /// Convert to native parts, requiring names that are already valid C
    /// identifiers.
    pub fn to_parts(&self) -> Result<(ClassTree, FeatureSet, ClassLabelSet), ConversionError> {
        let features = FeatureSet::from_names(self.feature_names.iter().cloned())?;
        let labels = ClassLabelSet::new(self.classes.iter().map(|c| c.to_string()))?;
        Ok((convert_tree(&self.tree)?, features, labels))
    }

    /// Convert to native parts, rewriting feature names and class labels into
    /// C identifiers (`suboptimal-left` becomes `suboptimal_left`, class `0`
    /// becomes `class_0`).
    pub fn to_parts_sanitized(
        &self,
    ) -> Result<(ClassTree, FeatureSet, ClassLabelSet), ConversionError> {
        let features = FeatureSet::sanitized(&self.feature_names)?;
        let labels = ClassLabelSet::sanitized(self.classes.iter().map(|c| c.to_string()))?;
        Ok((convert_tree(&self.tree)?, features, labels))
    }
}

/// Convert the node arrays to a [`ClassTree`].
///
/// Only the dump's own consistency is checked here; the result still has to
/// pass [`ClassTree::validate`].
fn convert_tree(dump: &TreeDump) -> Result<ClassTree, ConversionError> {
    let node_count = dump.node_count;
    for (field, len) in [
        ("children_left", dump.children_left.len()),
        ("children_right", dump.children_right.len()),
        ("feature", dump.feature.len()),
        ("threshold", dump.threshold.len()),
        ("value", dump.value.len()),
    ] {
        if len != node_count {
            return Err(ConversionError::LengthMismatch {
                field,
                len,
                node_count,
            });
        }
    }

    let child_id = |node: usize, child: i64| -> Result<u32, ConversionError> {
        if child < 0 || child as usize >= node_count {
            return Err(ConversionError::ChildOutOfRange {
                node,
                child,
                node_count,
            });
        }
        Ok(child as u32)
    };

    let mut builder = TreeBuilder::with_capacity(node_count);
    for node in 0..node_count {
        let n_outputs = dump.value[node].len();
        if n_outputs != 1 {
            return Err(ConversionError::UnsupportedOutputs { node, n_outputs });
        }

        let left = dump.children_left[node];
        let right = dump.children_right[node];

        if dump.is_leaf(node) {
            if left != TREE_LEAF || right != TREE_LEAF {
                return Err(ConversionError::LeafWithChildren { node });
            }
            builder.set_leaf(node as u32, ClassLeaf::from_weights(dump.value[node][0].clone()));
        } else {
            builder.set_split(
                node as u32,
                dump.feature[node] as u32,
                dump.threshold[node],
                child_id(node, left)?,
                child_id(node, right)?,
            );
        }
    }

    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compat::sklearn::from_json_str;
    use crate::repr::ClassRef;

    fn dump() -> SklearnClassifier {
        from_json_str(
            r#"{
                "classes": ["a-b", "c"],
                "feature_names": ["x 0", "x1"],
                "tree": {
                    "node_count": 5,
                    "children_left": [1, -1, 3, -1, -1],
                    "children_right": [2, -1, 4, -1, -1],
                    "feature": [1, -2, 0, -2, -2],
                    "threshold": [0.5, -2.0, 2.25, -2.0, -2.0],
                    "value": [[[4, 4]], [[3, 0]], [[1, 4]], [[0, 4]], [[1, 0]]]
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn convert_structure() {
        let (tree, features, labels) = dump().to_parts_sanitized().unwrap();
        assert_eq!(tree.validate(), Ok(()));
        assert_eq!(tree.n_nodes(), 5);
        assert_eq!(tree.split_index(0), 1);
        assert_eq!(tree.split_threshold(2), 2.25);
        assert_eq!(tree.left_child(2), Some(3));
        assert_eq!(tree.right_child(2), Some(4));
        assert_eq!(tree.leaf_value(3).unwrap().class, ClassRef::Index(1));
        assert_eq!(tree.leaf_value(4).unwrap().class, ClassRef::Index(0));
        assert_eq!(features.name(0), Some("x_0"));
        assert_eq!(labels.get(0), Some("a_b"));
        assert_eq!(tree.validate_references(&features, &labels), Ok(()));
    }

    #[test]
    fn strict_conversion_rejects_invalid_names() {
        assert!(matches!(
            dump().to_parts(),
            Err(ConversionError::Names(NameError::InvalidIdentifier { .. }))
        ));
    }

    #[test]
    fn length_mismatch() {
        let mut model = dump();
        model.tree.threshold.pop();
        assert_eq!(
            model.to_parts_sanitized().unwrap_err(),
            ConversionError::LengthMismatch {
                field: "threshold",
                len: 4,
                node_count: 5
            }
        );
    }

    #[test]
    fn child_out_of_range() {
        let mut model = dump();
        model.tree.children_right[2] = 9;
        assert_eq!(
            model.to_parts_sanitized().unwrap_err(),
            ConversionError::ChildOutOfRange {
                node: 2,
                child: 9,
                node_count: 5
            }
        );

        let mut model = dump();
        model.tree.children_left[0] = TREE_LEAF;
        assert!(matches!(
            model.to_parts_sanitized(),
            Err(ConversionError::ChildOutOfRange { node: 0, child: -1, .. })
        ));
    }

    #[test]
    fn multi_output_is_unsupported() {
        let mut model = dump();
        model.tree.value[1].push(vec![1.0, 2.0]);
        assert_eq!(
            model.to_parts_sanitized().unwrap_err(),
            ConversionError::UnsupportedOutputs {
                node: 1,
                n_outputs: 2
            }
        );
    }

    #[test]
    fn leaf_with_children() {
        let mut model = dump();
        model.tree.children_left[3] = 1;
        assert_eq!(
            model.to_parts_sanitized().unwrap_err(),
            ConversionError::LeafWithChildren { node: 3 }
        );
    }
}
