//! Code generator configuration with builder pattern.
//!
//! [`GeneratorConfig`] uses the `bon` crate for builder generation with
//! validation at build time.
//!
//! # Example
//!
//! ```
//! use dtcgen::codegen::{BlockType, GeneratorConfig, Provenance};
//!
//! // All defaults: 4-space indent, 6 decimals, depth 10, no weights
//! let config = GeneratorConfig::builder().build().unwrap();
//!
//! let config = GeneratorConfig::builder()
//!     .max_depth(6)
//!     .include_class_weights(true)
//!     .provenance(Provenance { block_size: 50, block_type: BlockType::Sliding })
//!     .function_name("gesture")
//!     .build()
//!     .unwrap();
//! assert_eq!(config.type_name, "dtc_t");
//! ```

use std::fmt;

use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::repr::is_c_identifier;

/// Largest accepted `decimal_places`. An f64 carries at most 17 significant
/// decimal digits.
pub const MAX_DECIMAL_PLACES: usize = 17;

// =============================================================================
// ConfigError
// =============================================================================

/// Errors that can occur during configuration validation.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Decimal places outside `1..=MAX_DECIMAL_PLACES`.
    InvalidDecimalPlaces(usize),
    /// A generated symbol name is not a C identifier.
    InvalidSymbol { field: &'static str, value: String },
    /// Function and type share a name.
    SymbolClash(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDecimalPlaces(v) => {
                write!(
                    f,
                    "decimal_places must be in 1..={}, got {}",
                    MAX_DECIMAL_PLACES, v
                )
            }
            Self::InvalidSymbol { field, value } => {
                write!(f, "{} must be a C identifier, got {:?}", field, value)
            }
            Self::SymbolClash(name) => {
                write!(f, "function_name and type_name are both {:?}", name)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// =============================================================================
// Provenance
// =============================================================================

/// How feature windows were cut from the sample stream during training.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockType {
    /// Non-overlapping blocks.
    #[default]
    Block,
    /// Overlapping windows advanced one sample at a time.
    Sliding,
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockType::Block => f.write_str("BLOCK"),
            BlockType::Sliding => f.write_str("SLIDING"),
        }
    }
}

/// Windowing parameters the classifier was trained against.
///
/// Purely descriptive: echoed in the generated documentation header so the
/// firmware author computes features over the same windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    pub block_size: usize,
    pub block_type: BlockType,
}

impl Default for Provenance {
    fn default() -> Self {
        Self {
            block_size: 100,
            block_type: BlockType::Block,
        }
    }
}

// =============================================================================
// GeneratorConfig
// =============================================================================

/// Options controlling the shape of the generated C source.
#[derive(Debug, Clone, PartialEq, Builder)]
#[builder(
    derive(Clone, Debug),
    finish_fn(vis = "", name = __build_internal)
)]
pub struct GeneratorConfig {
    /// Spaces per nesting level. Default: 4.
    #[builder(default = 4)]
    pub indent_width: usize,

    /// Fractional digits of every emitted number. Default: 6.
    #[builder(default = 6)]
    pub decimal_places: usize,

    /// Split depth emitted before branches are truncated. Default: 10.
    ///
    /// Nodes down to depth `max_depth + 1` (root = 1) become `if` statements.
    #[builder(default = 10)]
    pub max_depth: usize,

    /// Emit each leaf's per-class weights as a comment. Default: false.
    #[builder(default)]
    pub include_class_weights: bool,

    /// Windowing parameters echoed in the documentation header.
    #[builder(default)]
    pub provenance: Provenance,

    /// Name of the generated function. Default: `dtc`.
    #[builder(into, default = String::from("dtc"))]
    pub function_name: String,

    /// Name of the generated label enumeration. Default: `dtc_t`.
    #[builder(into, default = String::from("dtc_t"))]
    pub type_name: String,
}

/// Custom finishing function that validates the config.
impl<S: generator_config_builder::IsComplete> GeneratorConfigBuilder<S> {
    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if:
    /// - `decimal_places` is 0 or above [`MAX_DECIMAL_PLACES`]
    /// - `function_name` or `type_name` is not a C identifier
    /// - `function_name == type_name`
    pub fn build(self) -> Result<GeneratorConfig, ConfigError> {
        let config = self.__build_internal();
        config.validate()?;
        Ok(config)
    }
}

impl GeneratorConfig {
    /// Check the invariants enforced by the builder.
    ///
    /// Fields are public, so a config edited after `build()` is checked again
    /// before generation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Zero digits would print `1f`, which C rejects.
        if self.decimal_places == 0 || self.decimal_places > MAX_DECIMAL_PLACES {
            return Err(ConfigError::InvalidDecimalPlaces(self.decimal_places));
        }

        for (field, value) in [
            ("function_name", &self.function_name),
            ("type_name", &self.type_name),
        ] {
            if !is_c_identifier(value) {
                return Err(ConfigError::InvalidSymbol {
                    field,
                    value: value.clone(),
                });
            }
        }

        if self.function_name == self.type_name {
            return Err(ConfigError::SymbolClash(self.function_name.clone()));
        }

        Ok(())
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::builder().build().expect("default config is valid")
    }
}

// =============================================================================
// Tests
// =============================================================================
