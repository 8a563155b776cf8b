use crate::error::GraphAggError;
use crate::ops::arithmetic::{apply_binary_op, BinaryKind};
use crate::ops::math_elem::{apply_unary_op, UnaryKind};
use crate::tensor::Tensor;

/// Performs element-wise multiplication with broadcasting.
pub fn mul_op(a: &Tensor, b: &Tensor) -> Result<Tensor, GraphAggError> {
    apply_binary_op(a, b, BinaryKind::Mul)
}

/// Multiplies every element by a constant.
pub fn mul_scalar_op(a: &Tensor, scalar: f32) -> Result<Tensor, GraphAggError> {
    apply_unary_op(a, UnaryKind::MulScalar(scalar))
}

#[cfg(test)]
#[path = "mul_test.rs"]
mod tests;
