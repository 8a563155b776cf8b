use std::sync::Arc;

use super::sum::SumBackward;
use crate::error::GraphAggError;
use crate::tensor::Tensor;

/// Averages every element into a 0-dimensional tensor. An empty input
/// averages to `0`.
pub fn mean_op(input: &Tensor) -> Result<Tensor, GraphAggError> {
    let numel = input.numel();
    let buffer = input.buffer();
    let scale = if numel == 0 { 0.0 } else { 1.0 / numel as f32 };
    let mean = buffer.iter().sum::<f32>() * scale;
    let result = Tensor::scalar(mean);
    if input.requires_grad() {
        result.attach_grad_fn(Arc::new(SumBackward {
            input: input.clone(),
            scale,
        }));
    }
    Ok(result)
}
