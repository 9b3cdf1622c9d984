//! Leaf payloads for classification trees.

use std::fmt;

use super::names::ClassLabelSet;

/// Reference from a leaf to its predicted class.
///
/// Trees exported by a classifier usually carry the internal class index;
/// hand-built trees may name the label directly. Both forms are resolved
/// against the authoritative [`ClassLabelSet`] at generation time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClassRef {
    /// Index into the class label set (0..k-1).
    Index(u32),
    /// Label text, looked up in the class label set.
    Label(String),
}

impl fmt::Display for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassRef::Index(idx) => write!(f, "#{idx}"),
            ClassRef::Label(label) => write!(f, "{label:?}"),
        }
    }
}

impl From<u32> for ClassRef {
    fn from(value: u32) -> Self {
        ClassRef::Index(value)
    }
}

impl From<&str> for ClassRef {
    fn from(value: &str) -> Self {
        ClassRef::Label(value.to_string())
    }
}

impl From<String> for ClassRef {
    fn from(value: String) -> Self {
        ClassRef::Label(value)
    }
}

/// Terminal payload: the predicted class plus optional per-class weights.
///
/// When `weights` is present it is authoritative: the predicted class is the
/// argmax of the weights (see [`majority_index`]). The `class` field is used
/// only for leaves without weights.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassLeaf {
    pub class: ClassRef,
    pub weights: Option<Box<[f64]>>,
}

impl ClassLeaf {
    /// Leaf predicting the class at `index`.
    pub fn index(index: u32) -> Self {
        Self {
            class: ClassRef::Index(index),
            weights: None,
        }
    }

    /// Leaf predicting the named class.
    pub fn label(label: impl Into<String>) -> Self {
        Self {
            class: ClassRef::Label(label.into()),
            weights: None,
        }
    }

    /// Leaf carrying a per-class weight vector; the class is its majority.
    ///
    /// An empty vector yields class index 0, which validation then rejects
    /// through the weight-length check.
    pub fn from_weights(weights: Vec<f64>) -> Self {
        let class = majority_index(&weights).unwrap_or(0) as u32;
        Self {
            class: ClassRef::Index(class),
            weights: Some(weights.into_boxed_slice()),
        }
    }

    /// Attach a weight vector to an existing leaf.
    pub fn with_weights(mut self, weights: Vec<f64>) -> Self {
        self.weights = Some(weights.into_boxed_slice());
        self
    }

    /// Resolve the predicted class to an index into `labels`.
    ///
    /// Returns `None` if the class reference does not exist in `labels`.
    pub fn resolve(&self, labels: &ClassLabelSet) -> Option<usize> {
        if let Some(weights) = &self.weights {
            return majority_index(weights).filter(|&idx| idx < labels.len());
        }
        match &self.class {
            ClassRef::Index(idx) => {
                let idx = *idx as usize;
                (idx < labels.len()).then_some(idx)
            }
            ClassRef::Label(label) => labels.index_of(label),
        }
    }
}

/// Index of the largest weight. Ties go to the lowest index.
///
/// Returns `None` for an empty slice.
pub fn majority_index(weights: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, &w) in weights.iter().enumerate() {
        match best {
            Some((_, best_w)) if w <= best_w => {}
            _ => best = Some((idx, w)),
        }
    }
    best.map(|(idx, _)| idx)
}
