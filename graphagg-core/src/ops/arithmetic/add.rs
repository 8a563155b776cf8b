use crate::error::GraphAggError;
use crate::ops::arithmetic::{apply_binary_op, BinaryKind};
use crate::ops::math_elem::{apply_unary_op, UnaryKind};
use crate::tensor::Tensor;

/// Performs element-wise addition of two tensors with broadcasting.
pub fn add_op(a: &Tensor, b: &Tensor) -> Result<Tensor, GraphAggError> {
    apply_binary_op(a, b, BinaryKind::Add)
}

/// Adds a constant to every element.
pub fn add_scalar_op(a: &Tensor, scalar: f32) -> Result<Tensor, GraphAggError> {
    apply_unary_op(a, UnaryKind::AddScalar(scalar))
}

#[cfg(test)]
#[path = "add_test.rs"]
mod tests;
