use std::fmt::Debug;

use crate::error::GraphAggError;
use crate::tensor::Tensor;

/// Defines the interface for the backward pass of a differentiable tensor operation.
///
/// Any operation that creates a non-leaf `Tensor` (a tensor resulting from an operation
/// on inputs that require gradients) must have an associated `BackwardOp` implementation.
/// This implementation is stored in the output tensor's `grad_fn` field and is used
/// during the `backward()` call to propagate gradients according to the chain rule.
///
/// Implementations compute on raw buffers and never record new graph nodes.
pub trait BackwardOp: Debug + Send + Sync {
    /// Computes `dL/dInput_i` for each input given `dL/dOutput` (`grad_output`).
    ///
    /// The returned gradients must be in the same order as `inputs()` and each must
    /// have the shape of the corresponding input.
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, GraphAggError>;

    /// Returns handles to the tensors that participated in the forward operation.
    fn inputs(&self) -> Vec<Tensor>;
}
