//! Decision-tree classifier representation consumed by the code generator.

/// Node identifier: an index into the tree's SoA arrays.
pub type NodeId = u32;

pub mod builder;
pub mod leaf;
pub mod names;
pub mod tree;

pub use builder::TreeBuilder;
pub use leaf::{majority_index, ClassLeaf, ClassRef};
pub use names::{is_c_identifier, sanitize_identifier, ClassLabelSet, FeatureSet, NameError};
pub use tree::{ClassTree, TreeValidationError};
