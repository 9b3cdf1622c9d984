//! Testing utilities for dtcgen.
//!
//! This module provides a compact tree literal and text helpers that can be
//! used in both unit tests and integration tests.
//!
//! # Usage
//!
//! ```
//! use dtcgen::class_tree;
//!
//! let tree = class_tree! {
//!     0 => split(0, 0.5) -> 1, 2,
//!     1 => leaf(0),
//!     2 => label("high"),
//! };
//! assert_eq!(tree.n_nodes(), 3);
//! assert!(tree.validate().is_ok());
//! ```

// =============================================================================
// Tree Literals
// =============================================================================

/// Build a [`ClassTree`](crate::repr::ClassTree) from a node table.
///
/// Each entry is `id => kind`, where `kind` is one of:
/// - `split(feature, threshold) -> left, right`
/// - `leaf(class_index)`
/// - `label("class_label")`
/// - `weights(w0, w1, ...)`: leaf whose class is the weights' majority
///
/// Entries may appear in any order. No validation is performed, so the macro
/// can also describe malformed trees.
#[macro_export]
macro_rules! class_tree {
    (@node $b:ident, $id:expr, split($f:expr, $t:expr) -> $l:expr, $r:expr) => {
        $b.set_split($id, $f, $t as f64, $l, $r);
    };
    (@node $b:ident, $id:expr, leaf($c:expr)) => {
        $b.set_leaf($id, $crate::repr::ClassLeaf::index($c));
    };
    (@node $b:ident, $id:expr, label($s:expr)) => {
        $b.set_leaf($id, $crate::repr::ClassLeaf::label($s));
    };
    (@node $b:ident, $id:expr, weights($($w:expr),+ $(,)?)) => {
        $b.set_leaf(
            $id,
            $crate::repr::ClassLeaf::from_weights(vec![$($w as f64),+]),
        );
    };
    ($($id:literal => $kind:ident ($($args:tt)*) $(-> $l:literal, $r:literal)?),* $(,)?) => {{
        let mut builder = $crate::repr::TreeBuilder::new();
        $(
            $crate::class_tree!(@node builder, $id, $kind($($args)*) $(-> $l, $r)?);
        )*
        builder.build()
    }};
}

// =============================================================================
// Text Helpers
// =============================================================================

/// Collapse every run of whitespace into a single space and trim the ends.
///
/// Useful to compare generated fragments without caring about indentation.
///
/// ```
/// # use dtcgen::testing::squash_whitespace;
/// assert_eq!(squash_whitespace("  if (x)\n    {\n"), "if (x) {");
/// ```
pub fn squash_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repr::{ClassLeaf, ClassRef};

    #[test]
    fn class_tree_accepts_any_order() {
        let tree = class_tree! {
            2 => leaf(1),
            0 => split(3, 1) -> 1, 2,
            1 => label("a"),
        };
        assert_eq!(tree.validate(), Ok(()));
        assert_eq!(tree.split_index(0), 3);
        assert_eq!(tree.split_threshold(0), 1.0);
        assert_eq!(tree.leaf_value(1), Some(&ClassLeaf::label("a")));
    }

    #[test]
    fn class_tree_weights_leaf() {
        let tree = class_tree! {
            0 => weights(1, 4, 2),
        };
        let leaf = tree.leaf_value(0).unwrap();
        assert_eq!(leaf.class, ClassRef::Index(1));
        assert_eq!(leaf.weights.as_deref(), Some(&[1.0, 4.0, 2.0][..]));
    }

    #[test]
    fn squash_whitespace_collapses_runs() {
        assert_eq!(squash_whitespace("a\t\tb\n\n c  "), "a b c");
        assert_eq!(squash_whitespace("   "), "");
    }
}
