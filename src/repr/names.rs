//! Named inputs and outputs of a classifier: feature names and class labels.
//!
//! Both end up as identifiers in the generated C source (function parameters
//! and enumerators), so every name is checked against C identifier rules when
//! the set is built. The `sanitized` constructors accept arbitrary strings and
//! rewrite them into identifiers instead.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};

/// Errors raised while building a [`FeatureSet`] or [`ClassLabelSet`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    #[error("{name:?} is not a valid C identifier")]
    InvalidIdentifier { name: String },
    #[error("name {name:?} appears more than once")]
    DuplicateName { name: String },
    #[error("feature index {index} is assigned more than once")]
    DuplicateIndex { index: u32 },
    #[error("{first:?} and {second:?} both sanitize to {name:?}")]
    SanitizeCollision {
        name: String,
        first: String,
        second: String,
    },
}

const C_KEYWORDS: &[&str] = &[
    "auto", "break", "case", "char", "const", "continue", "default", "do", "double", "else",
    "enum", "extern", "float", "for", "goto", "if", "inline", "int", "long", "register",
    "restrict", "return", "short", "signed", "sizeof", "static", "struct", "switch", "typedef",
    "union", "unsigned", "void", "volatile", "while", "_Alignas", "_Alignof", "_Atomic",
    "_Bool", "_Complex", "_Generic", "_Imaginary", "_Noreturn", "_Static_assert",
    "_Thread_local",
];

/// Whether `name` can be used verbatim as a C identifier.
pub fn is_c_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !C_KEYWORDS.contains(&name)
}

/// Rewrite `name` into a C identifier.
///
/// Characters outside `[A-Za-z0-9_]` become `_`, names that are empty or
/// start with a digit get `prefix` prepended, and keywords get a trailing `_`.
pub fn sanitize_identifier(name: &str, prefix: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert_str(0, prefix);
    }
    if C_KEYWORDS.contains(&out.as_str()) {
        out.push('_');
    }
    out
}

fn check_identifier(name: &str) -> Result<(), NameError> {
    if is_c_identifier(name) {
        Ok(())
    } else {
        Err(NameError::InvalidIdentifier {
            name: name.to_string(),
        })
    }
}

/// Sanitize every name, rejecting distinct inputs that collapse together.
fn sanitize_all<I, S>(names: I, prefix: &str) -> Result<Vec<String>, NameError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen: HashMap<String, String> = HashMap::new();
    let mut out = Vec::new();
    for raw in names {
        let raw = raw.as_ref();
        let clean = sanitize_identifier(raw, prefix);
        if let Some(first) = seen.get(&clean) {
            if first == raw {
                return Err(NameError::DuplicateName {
                    name: raw.to_string(),
                });
            }
            return Err(NameError::SanitizeCollision {
                name: clean,
                first: first.clone(),
                second: raw.to_string(),
            });
        }
        seen.insert(clean.clone(), raw.to_string());
        out.push(clean);
    }
    Ok(out)
}

// =============================================================================
// FeatureSet
// =============================================================================

/// Ordered mapping from feature index to a unique identifier.
///
/// Indices need not be contiguous: a tree trained on a wide feature table may
/// only reference a handful of columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureSet {
    names: BTreeMap<u32, String>,
}

impl FeatureSet {
    /// Build from explicit `(index, name)` pairs.
    pub fn new<I, S>(entries: I) -> Result<Self, NameError>
    where
        I: IntoIterator<Item = (u32, S)>,
        S: Into<String>,
    {
        let mut names = BTreeMap::new();
        let mut taken: HashMap<String, u32> = HashMap::new();
        for (index, name) in entries {
            let name = name.into();
            check_identifier(&name)?;
            if taken.insert(name.clone(), index).is_some() {
                return Err(NameError::DuplicateName { name });
            }
            match names.entry(index) {
                Entry::Occupied(_) => return Err(NameError::DuplicateIndex { index }),
                Entry::Vacant(slot) => {
                    slot.insert(name);
                }
            }
        }
        Ok(Self { names })
    }

    /// Build from a positional list: the i-th name belongs to feature `i`.
    pub fn from_names<I, S>(names: I) -> Result<Self, NameError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new((0u32..).zip(names))
    }

    /// Like [`from_names`](Self::from_names), rewriting each name into an
    /// identifier first (prefix `feature_` for names starting with a digit).
    pub fn sanitized<I, S>(names: I) -> Result<Self, NameError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::from_names(sanitize_all(names, "feature_")?)
    }

    /// Name of feature `index`, if present.
    #[inline]
    pub fn name(&self, index: u32) -> Option<&str> {
        self.names.get(&index).map(String::as_str)
    }

    #[inline]
    pub fn contains(&self, index: u32) -> bool {
        self.names.contains_key(&index)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate `(index, name)` in index order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.names.iter().map(|(&idx, name)| (idx, name.as_str()))
    }
}

// =============================================================================
// ClassLabelSet
// =============================================================================

/// Class labels in the classifier's internal index order.
///
/// The order is an external contract with the trained model: label `i` is the
/// class the classifier calls `i`. It is never re-sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassLabelSet {
    labels: Vec<String>,
}

impl ClassLabelSet {
    /// Build from labels in classifier order.
    ///
    /// An empty set is allowed here; code generation rejects it.
    pub fn new<I, S>(labels: I) -> Result<Self, NameError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out: Vec<String> = Vec::new();
        for label in labels {
            let label = label.into();
            check_identifier(&label)?;
            if out.contains(&label) {
                return Err(NameError::DuplicateName { name: label });
            }
            out.push(label);
        }
        Ok(Self { labels: out })
    }

    /// Like [`new`](Self::new), rewriting each label into an identifier first
    /// (prefix `class_` for labels starting with a digit, e.g. numeric classes).
    pub fn sanitized<I, S>(labels: I) -> Result<Self, NameError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(sanitize_all(labels, "class_")?)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    /// Position of `label`, if present.
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}
