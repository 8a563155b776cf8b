use crate::error::GraphAggError;
use crate::ops::arithmetic::{apply_binary_op, BinaryKind};
use crate::tensor::Tensor;

/// Performs element-wise subtraction (`a - b`) with broadcasting.
pub fn sub_op(a: &Tensor, b: &Tensor) -> Result<Tensor, GraphAggError> {
    apply_binary_op(a, b, BinaryKind::Sub)
}

#[cfg(test)]
#[path = "sub_test.rs"]
mod tests;
