use crate::error::GraphAggError;
use crate::ops::math_elem::{apply_unary_op, UnaryKind};
use crate::tensor::Tensor;

/// Clamps every element into `[min, max]`; a missing bound is unbounded.
///
/// The gradient passes through where `min <= x <= max` and is zero elsewhere.
pub fn clamp_op(input: &Tensor, min: Option<f32>, max: Option<f32>) -> Result<Tensor, GraphAggError> {
    let min = min.unwrap_or(f32::NEG_INFINITY);
    let max = max.unwrap_or(f32::INFINITY);
    if min > max {
        return Err(GraphAggError::UnsupportedOperation(format!(
            "clamp requires min <= max (got {} and {})",
            min, max
        )));
    }
    apply_unary_op(input, UnaryKind::Clamp { min, max })
}

#[cfg(test)]
#[path = "clamp_test.rs"]
mod tests;
