//! External format compatibility loaders.
//!
//! This module provides loaders for trees trained in external frameworks and
//! converts them to native dtcgen types.

pub mod sklearn;

pub use sklearn::{ConversionError, ReadError, SklearnClassifier};
