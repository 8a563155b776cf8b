use crate::error::GraphAggError;
use crate::ops::math_elem::{apply_unary_op, UnaryKind};
use crate::tensor::Tensor;

/// Computes the element-wise square root.
///
/// The gradient at `0` is taken to be `0` rather than infinity.
pub fn sqrt_op(input: &Tensor) -> Result<Tensor, GraphAggError> {
    apply_unary_op(input, UnaryKind::Sqrt)
}
