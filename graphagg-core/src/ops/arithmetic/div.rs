use crate::error::GraphAggError;
use crate::ops::arithmetic::{apply_binary_op, BinaryKind};
use crate::tensor::Tensor;

/// Performs element-wise division (`a / b`) with broadcasting.
///
/// Division by zero follows IEEE semantics.
pub fn div_op(a: &Tensor, b: &Tensor) -> Result<Tensor, GraphAggError> {
    apply_binary_op(a, b, BinaryKind::Div)
}

#[cfg(test)]
#[path = "div_test.rs"]
mod tests;
