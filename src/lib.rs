//! dtcgen: turn trained decision-tree classifiers into standalone C functions.
//!
//! This crate translates a binary classification tree into a dependency-free
//! C function suitable for microcontrollers, with support for loading trees
//! exported from scikit-learn.
//!
//! - [`repr`]: the tree, its feature names and class labels
//! - [`codegen`]: the C generator and its configuration
//! - [`compat`]: readers for trees exported by other frameworks

pub mod codegen;
pub mod compat;
pub mod error;
pub mod repr;
pub mod testing;

pub use codegen::{generate, generate_sections, GeneratedSource, GeneratorConfig, Truncation};
pub use error::CodegenError;
pub use repr::{ClassLabelSet, ClassTree, FeatureSet};
