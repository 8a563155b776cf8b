use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::error::GraphAggError;
use crate::tensor::utils::split_at_axis;
use crate::tensor::Tensor;

/// Gathers slices of `input` along axis `dim` at the positions in `index`.
///
/// The result has `input`'s shape with axis `dim` replaced by `index.len()`.
/// Every index must be `< input.size(dim)`, else `IndexOutOfBounds`.
pub fn index_select_op(input: &Tensor, dim: usize, index: &[usize]) -> Result<Tensor, GraphAggError> {
    let input_shape = input.shape();
    let rank = input_shape.len();
    if dim >= rank {
        return Err(GraphAggError::InvalidDimension {
            dim: dim as isize,
            rank,
        });
    }
    let (outer, size, inner) = split_at_axis(&input_shape, dim);
    if let Some(&bad) = index.iter().find(|&&i| i >= size) {
        return Err(GraphAggError::IndexOutOfBounds {
            index: vec![bad],
            shape: vec![size],
        });
    }

    let buffer = input.buffer();
    let mut data = Vec::with_capacity(outer * index.len() * inner);
    for o in 0..outer {
        for &i in index {
            let start = (o * size + i) * inner;
            data.extend_from_slice(&buffer[start..start + inner]);
        }
    }
    let mut output_shape = input_shape;
    output_shape[dim] = index.len();
    let result = Tensor::new(data, output_shape)?;

    if input.requires_grad() {
        result.attach_grad_fn(Arc::new(IndexSelectBackward {
            input: input.clone(),
            dim,
            index: index.to_vec(),
        }));
    }
    Ok(result)
}

/// Scatter-adds the upstream gradient back onto the gathered positions.
#[derive(Debug)]
struct IndexSelectBackward {
    input: Tensor,
    dim: usize,
    index: Vec<usize>,
}

impl BackwardOp for IndexSelectBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, GraphAggError> {
        let input_shape = self.input.shape();
        let (outer, size, inner) = split_at_axis(&input_shape, self.dim);
        let upstream = grad_output.buffer();
        let mut grad = vec![0.0; outer * size * inner];
        for o in 0..outer {
            for (k, &i) in self.index.iter().enumerate() {
                let src = (o * self.index.len() + k) * inner;
                let dst = (o * size + i) * inner;
                for j in 0..inner {
                    grad[dst + j] += upstream[src + j];
                }
            }
        }
        Ok(vec![Tensor::new(grad, input_shape)?])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.clone()]
    }
}
