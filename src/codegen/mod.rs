//! C source generation for decision-tree classifiers.
//!
//! A validated [`ClassTree`] plus its feature names and class labels is
//! translated into one self-contained C function:
//!
//! 1. a `typedef enum` of the class labels, in classifier order
//! 2. a documentation header with the windowing provenance
//! 3. the function signature, one `const float` per referenced feature
//! 4. the body: nested `if`/`else` statements mirroring the tree
//! 5. the epilogue returning the result
//!
//! Branches deeper than [`GeneratorConfig::max_depth`] are replaced by a
//! `#warning` directive so oversized trees still produce compilable code.
//!
//! # Example
//!
//! ```
//! use dtcgen::codegen::{generate, GeneratorConfig};
//! use dtcgen::repr::{ClassLabelSet, ClassLeaf, FeatureSet, TreeBuilder};
//!
//! let mut builder = TreeBuilder::new();
//! let root = builder.init_root();
//! let (left, right) = builder.apply_split(root, 0, 1.0);
//! builder.set_leaf(left, ClassLeaf::index(0));
//! builder.set_leaf(right, ClassLeaf::index(1));
//! let tree = builder.build();
//!
//! let features = FeatureSet::from_names(["x0"]).unwrap();
//! let labels = ClassLabelSet::new(["low", "high"]).unwrap();
//!
//! let source = generate(&tree, &features, &labels, &GeneratorConfig::default()).unwrap();
//! assert!(source.contains("dtc_t dtc(const float x0)"));
//! assert!(source.contains("if (x0 <= 1.000000f)"));
//! ```

mod body;
pub mod config;
pub mod format;
mod sections;
mod writer;

use std::fmt;

pub use config::{BlockType, ConfigError, GeneratorConfig, Provenance, MAX_DECIMAL_PLACES};
pub use format::{format_threshold, format_weight};

use crate::error::CodegenError;
use crate::repr::{ClassLabelSet, ClassTree, FeatureSet, NodeId};

use body::BodyEmitter;

/// A branch replaced by a `#warning` directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Truncation {
    /// Root of the omitted subtree.
    pub node: NodeId,
    /// Depth of `node` (root = 1).
    pub depth: usize,
    /// Depth of the omitted subtree (always at least 2).
    pub subtree_depth: usize,
}

/// Generated source split into its sections.
///
/// [`Display`](fmt::Display) writes the sections back to back, which is the
/// complete translation unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSource {
    pub type_declaration: String,
    pub doc_header: String,
    pub signature: String,
    pub body: String,
    pub epilogue: String,
    /// Branches cut by the depth limit, in emission order.
    pub truncations: Vec<Truncation>,
}

impl GeneratedSource {
    /// Whether any branch was cut by the depth limit.
    pub fn is_truncated(&self) -> bool {
        !self.truncations.is_empty()
    }
}

impl fmt::Display for GeneratedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.type_declaration)?;
        f.write_str(&self.doc_header)?;
        f.write_str(&self.signature)?;
        f.write_str(&self.body)?;
        f.write_str(&self.epilogue)
    }
}

/// Generate the complete C source for `tree`.
///
/// # Errors
///
/// See [`generate_sections`].
pub fn generate(
    tree: &ClassTree,
    features: &FeatureSet,
    labels: &ClassLabelSet,
    config: &GeneratorConfig,
) -> Result<String, CodegenError> {
    Ok(generate_sections(tree, features, labels, config)?.to_string())
}

/// Generate the C source for `tree`, keeping the sections apart.
///
/// The output is a pure function of the inputs: identical inputs give
/// byte-identical sections.
///
/// # Errors
///
/// - [`CodegenError::InvalidConfig`] if `config` fails
///   [`GeneratorConfig::validate`]
/// - [`CodegenError::EmptyModel`] if `labels` is empty
/// - [`CodegenError::MalformedTree`] if the tree is structurally invalid or
///   references a feature or class that does not exist
/// - [`CodegenError::NameCollision`] if a feature or label reuses the name of
///   another symbol in the generated code
/// - [`CodegenError::FormattingOverflow`] if a threshold does not fit a
///   `float` literal
pub fn generate_sections(
    tree: &ClassTree,
    features: &FeatureSet,
    labels: &ClassLabelSet,
    config: &GeneratorConfig,
) -> Result<GeneratedSource, CodegenError> {
    config.validate()?;
    if labels.is_empty() {
        return Err(CodegenError::EmptyModel);
    }
    tree.validate()?;
    tree.validate_references(features, labels)?;

    let parameters = sections::parameters(tree, features)?;
    sections::check_collisions(&parameters, labels, config)?;

    log::debug!(
        "generating {}() for {} nodes, {} parameters, {} classes",
        config.function_name,
        tree.n_nodes(),
        parameters.len(),
        labels.len()
    );

    let (body, truncations) = BodyEmitter::new(tree, features, labels, config).emit()?;
    if !truncations.is_empty() {
        log::warn!(
            "{} branch(es) truncated at max_depth {}",
            truncations.len(),
            config.max_depth
        );
    }

    let source = GeneratedSource {
        type_declaration: sections::type_declaration(labels, config),
        doc_header: sections::doc_header(labels, config),
        signature: sections::signature(&parameters, config),
        body,
        epilogue: sections::epilogue(config),
        truncations,
    };
    log::debug!("generated {} bytes of body", source.body.len());
    Ok(source)
}
