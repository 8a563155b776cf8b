use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::error::GraphAggError;
use crate::tensor::Tensor;

/// Sums every element into a 0-dimensional tensor. An empty input sums to `0`.
pub fn sum_op(input: &Tensor) -> Result<Tensor, GraphAggError> {
    let total: f32 = input.buffer().iter().sum();
    let result = Tensor::scalar(total);
    if input.requires_grad() {
        result.attach_grad_fn(Arc::new(SumBackward {
            input: input.clone(),
            scale: 1.0,
        }));
    }
    Ok(result)
}

// --- Backward Operation ---

/// Shared by `sum_op` and `mean_op`: every input element receives
/// `grad_output * scale`.
#[derive(Debug)]
pub(super) struct SumBackward {
    pub(super) input: Tensor,
    pub(super) scale: f32,
}

impl BackwardOp for SumBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, GraphAggError> {
        let g = grad_output.item()? * self.scale;
        let shape = self.input.shape();
        Ok(vec![crate::tensor::full(&shape, g)?])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.clone()]
    }
}

#[cfg(test)]
#[path = "sum_test.rs"]
mod tests;
