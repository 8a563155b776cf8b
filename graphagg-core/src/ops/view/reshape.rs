use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::error::GraphAggError;
use crate::tensor::Tensor;

/// Returns a tensor with the same data in row-major order and a new shape.
///
/// Fails with `ShapeMismatch` if the element counts differ.
pub fn reshape_op(input: &Tensor, new_shape: Vec<usize>) -> Result<Tensor, GraphAggError> {
    let input_shape = input.shape();
    let new_numel: usize = new_shape.iter().product();
    if new_numel != input.numel() {
        return Err(GraphAggError::ShapeMismatch {
            expected: input_shape,
            actual: new_shape,
            operation: "reshape".to_string(),
        });
    }
    let result = Tensor::new(input.get_f32_data(), new_shape)?;
    if input.requires_grad() {
        result.attach_grad_fn(Arc::new(ReshapeBackward {
            input: input.clone(),
        }));
    }
    Ok(result)
}

#[derive(Debug)]
struct ReshapeBackward {
    input: Tensor,
}

impl BackwardOp for ReshapeBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, GraphAggError> {
        Ok(vec![Tensor::new(
            grad_output.get_f32_data(),
            self.input.shape(),
        )?])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.clone()]
    }
}
