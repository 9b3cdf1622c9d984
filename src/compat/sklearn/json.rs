//! scikit-learn decision tree dump format.
//!
//! `DecisionTreeClassifier` has no portable serialization of its own, so the
//! exporter writes the arrays of `clf.tree_` as JSON, next to `clf.classes_`
//! and the feature names used during training:
//!
//! ```json
//! {
//!   "classes": ["low", "high"],
//!   "feature_names": ["x0"],
//!   "provenance": {"block_size": 100, "block_type": "BLOCK"},
//!   "tree": {
//!     "node_count": 3,
//!     "children_left": [1, -1, -1],
//!     "children_right": [2, -1, -1],
//!     "feature": [0, -2, -2],
//!     "threshold": [1.0, -2.0, -2.0],
//!     "value": [[[2.0, 2.0]], [[2.0, 0.0]], [[0.0, 2.0]]]
//!   }
//! }
//! ```
//!
//! These are "foreign types" used only for parsing; see the `convert` module
//! for the mapping to native types.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, OneOrMany, Same};

use crate::codegen::Provenance;

/// Child index marking a leaf (`sklearn.tree._tree.TREE_LEAF`).
pub const TREE_LEAF: i64 = -1;

/// Feature index marking a leaf (`sklearn.tree._tree.TREE_UNDEFINED`).
pub const TREE_UNDEFINED: i64 = -2;

/// Errors raised while reading a dump.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("failed to read model dump: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse model dump: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Model level
// =============================================================================

/// A fitted `DecisionTreeClassifier`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SklearnClassifier {
    /// `clf.classes_`, in the classifier's internal index order.
    pub classes: Vec<ClassName>,
    /// Feature names; position `i` names feature index `i`.
    pub feature_names: Vec<String>,
    /// Windowing parameters the features were computed with, if recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provenance: Option<Provenance>,
    pub tree: TreeDump,
}

/// One entry of `clf.classes_`.
///
/// Classes can be strings or numbers depending on the training targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClassName {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl fmt::Display for ClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassName::Text(s) => f.write_str(s),
            ClassName::Integer(i) => write!(f, "{i}"),
            ClassName::Float(x) => write!(f, "{x}"),
        }
    }
}

// =============================================================================
// Tree level
// =============================================================================

/// The parallel arrays of `clf.tree_`.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeDump {
    pub node_count: usize,
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    /// Per-node class weights, indexed `[node][output][class]`.
    ///
    /// Single-output dumps may drop the middle axis (`[node][class]`).
    #[serde_as(as = "Vec<OneOrMany<Same>>")]
    pub value: Vec<Vec<Vec<f64>>>,
}

impl TreeDump {
    /// Whether `node` is a leaf. Leaves carry a negative feature index.
    #[inline]
    pub fn is_leaf(&self, node: usize) -> bool {
        self.feature[node] < 0
    }
}

// =============================================================================
// Loading
// =============================================================================

/// Parse a dump from a JSON string.
pub fn from_json_str(json: &str) -> Result<SklearnClassifier, ReadError> {
    Ok(serde_json::from_str(json)?)
}

/// Read and parse a dump from disk.
pub fn load_json(path: impl AsRef<Path>) -> Result<SklearnClassifier, ReadError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let model = from_json_str(&text)?;
    log::debug!(
        "loaded {} nodes, {} classes, {} features from {}",
        model.tree.node_count,
        model.classes.len(),
        model.feature_names.len(),
        path.display()
    );
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::BlockType;

    const MINIMAL: &str = r#"{
        "classes": ["low", "high"],
        "feature_names": ["x0"],
        "tree": {
            "node_count": 3,
            "children_left": [1, -1, -1],
            "children_right": [2, -1, -1],
            "feature": [0, -2, -2],
            "threshold": [1.0, -2.0, -2.0],
            "value": [[[2.0, 2.0]], [[2.0, 0.0]], [[0.0, 2.0]]]
        }
    }"#;

    #[test]
    fn parse_minimal_dump() {
        let model = from_json_str(MINIMAL).unwrap();
        assert_eq!(
            model.classes,
            vec![ClassName::Text("low".into()), ClassName::Text("high".into())]
        );
        assert_eq!(model.provenance, None);
        assert_eq!(model.tree.node_count, 3);
        assert_eq!(model.tree.value[1], vec![vec![2.0, 0.0]]);
        assert!(!model.tree.is_leaf(0));
        assert!(model.tree.is_leaf(2));
    }

    #[test]
    fn value_without_output_axis() {
        let json = MINIMAL.replace(
            "[[[2.0, 2.0]], [[2.0, 0.0]], [[0.0, 2.0]]]",
            "[[2.0, 2.0], [2.0, 0.0], [0.0, 2.0]]",
        );
        let model = from_json_str(&json).unwrap();
        assert_eq!(model.tree.value[2], vec![vec![0.0, 2.0]]);
    }

    #[test]
    fn numeric_classes_and_provenance() {
        let json = MINIMAL
            .replace(r#"["low", "high"]"#, "[0, 1.5]")
            .replace(
                r#""feature_names""#,
                r#""provenance": {"block_size": 25, "block_type": "SLIDING"}, "feature_names""#,
            );
        let model = from_json_str(&json).unwrap();
        assert_eq!(model.classes, vec![ClassName::Integer(0), ClassName::Float(1.5)]);
        assert_eq!(model.classes[1].to_string(), "1.5");
        assert_eq!(
            model.provenance,
            Some(Provenance {
                block_size: 25,
                block_type: BlockType::Sliding
            })
        );
    }

    #[test]
    fn invalid_json_is_reported() {
        assert!(matches!(from_json_str("{"), Err(ReadError::Json(_))));
        assert!(matches!(
            load_json("/nonexistent/model.json"),
            Err(ReadError::Io(_))
        ));
    }
}
