use std::sync::Arc;

use crate::error::GraphAggError;
use crate::tensor::Tensor;

/// Fills `tensor` with `value` in place and drops its accumulated gradient.
///
/// Every handle sharing the tensor observes the new values. Only leaf
/// tensors may be filled.
pub fn fill_(tensor: &Tensor, value: f32) -> Result<(), GraphAggError> {
    let mut guard = tensor.write_data();
    if guard.grad_fn.is_some() {
        return Err(GraphAggError::UnsupportedOperation(
            "in-place fill of a non-leaf tensor".to_string(),
        ));
    }
    let numel = guard.numel();
    guard.buffer = Arc::new(vec![value; numel]);
    guard.grad = None;
    Ok(())
}

/// Fills the input `Tensor` with zeros in place.
pub fn zeros_(tensor: &Tensor) -> Result<(), GraphAggError> {
    fill_(tensor, 0.0)
}

/// Fills the input `Tensor` with ones in place.
pub fn ones_(tensor: &Tensor) -> Result<(), GraphAggError> {
    fill_(tensor, 1.0)
}
