//! Fixed-point number formatting for C literals.
//!
//! Numbers are always written as `[-]digits.digits` with exactly the
//! requested number of fractional digits. Exponent notation is never used,
//! so every C compiler parses the literal the same way.

use crate::error::CodegenError;

/// Format a split threshold as a `float` literal, e.g. `0.333333f`.
///
/// # Errors
///
/// [`CodegenError::FormattingOverflow`] if `value` is NaN, infinite, or
/// outside the range of `f32`.
pub fn format_threshold(value: f64, decimals: usize) -> Result<String, CodegenError> {
    if !value.is_finite() || value.abs() > f32::MAX as f64 {
        return Err(CodegenError::FormattingOverflow { value, decimals });
    }
    Ok(format!("{value:.decimals$}f"))
}

/// Format a leaf weight for the weights comment, e.g. `12.000000`.
///
/// # Errors
///
/// [`CodegenError::FormattingOverflow`] if `value` is NaN or infinite.
pub fn format_weight(value: f64, decimals: usize) -> Result<String, CodegenError> {
    if !value.is_finite() {
        return Err(CodegenError::FormattingOverflow { value, decimals });
    }
    Ok(format!("{value:.decimals$}"))
}
