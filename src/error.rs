//! Errors returned by code generation.

use crate::codegen::ConfigError;
use crate::repr::TreeValidationError;

/// Reasons a tree cannot be turned into C source.
///
/// Generation is all-or-nothing: on error no partial text is returned.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CodegenError {
    /// The configuration no longer satisfies the checks of its builder.
    #[error("invalid generator configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// The tree failed structural or reference validation.
    #[error("malformed tree: {0}")]
    MalformedTree(#[from] TreeValidationError),

    /// The class label set is empty, so no return type can be declared.
    #[error("model has no class labels")]
    EmptyModel,

    /// A threshold or weight cannot be written as a finite number literal.
    #[error("value {value} cannot be written as a literal with {decimals} decimal places")]
    FormattingOverflow { value: f64, decimals: usize },

    /// A feature or label name would shadow another symbol of the generated code.
    #[error("name {name:?} collides with another symbol in the generated code")]
    NameCollision { name: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflow_message_names_the_value() {
        let err = CodegenError::FormattingOverflow {
            value: f64::INFINITY,
            decimals: 6,
        };
        assert_eq!(
            err.to_string(),
            "value inf cannot be written as a literal with 6 decimal places"
        );
    }

    #[test]
    fn config_errors_convert() {
        let err = CodegenError::from(ConfigError::InvalidDecimalPlaces(0));
        assert_eq!(
            err.to_string(),
            "invalid generator configuration: decimal_places must be in 1..=17, got 0"
        );
    }
}
