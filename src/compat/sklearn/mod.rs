//! scikit-learn `DecisionTreeClassifier` support.
//!
//! This module provides parsing of a JSON dump of a fitted classifier and
//! conversion to native dtcgen types.

mod convert;
mod json;

pub use convert::ConversionError;
pub use json::*;
