use crate::error::GraphAggError;
use crate::ops::arithmetic::{apply_binary_op, BinaryKind};
use crate::ops::math_elem::{apply_unary_op, UnaryKind};
use crate::tensor::Tensor;

/// Raises `base` to the element-wise power `exponent`, with broadcasting.
///
/// The gradient with respect to `exponent` is `base^exponent * ln(base)`
/// where `base > 0` and zero elsewhere.
pub fn pow_op(base: &Tensor, exponent: &Tensor) -> Result<Tensor, GraphAggError> {
    apply_binary_op(base, exponent, BinaryKind::Pow)
}

/// Raises every element to a constant power.
pub fn pow_scalar_op(base: &Tensor, exponent: f32) -> Result<Tensor, GraphAggError> {
    apply_unary_op(base, UnaryKind::PowScalar(exponent))
}

#[cfg(test)]
#[path = "pow_test.rs"]
mod tests;
