use crate::error::GraphAggError;
use crate::ops::math_elem::{apply_unary_op, UnaryKind};
use crate::tensor::Tensor;

/// Computes the element-wise exponential `e^x`.
pub fn exp_op(input: &Tensor) -> Result<Tensor, GraphAggError> {
    apply_unary_op(input, UnaryKind::Exp)
}
