use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::error::GraphAggError;
use crate::tensor::utils::split_at_axis;
use crate::tensor::Tensor;

/// Concatenates tensors along axis `dim`.
///
/// All inputs must have the same rank and agree on every axis except `dim`.
pub fn cat_op(tensors: &[Tensor], dim: usize) -> Result<Tensor, GraphAggError> {
    let first = tensors.first().ok_or_else(|| {
        GraphAggError::UnsupportedOperation("cat requires at least one tensor".to_string())
    })?;
    let reference_shape = first.shape();
    let rank = reference_shape.len();
    if dim >= rank {
        return Err(GraphAggError::InvalidDimension {
            dim: dim as isize,
            rank,
        });
    }

    let mut sizes = Vec::with_capacity(tensors.len());
    for t in tensors {
        let shape = t.shape();
        let compatible = shape.len() == rank
            && shape
                .iter()
                .zip(&reference_shape)
                .enumerate()
                .all(|(axis, (a, b))| axis == dim || a == b);
        if !compatible {
            return Err(GraphAggError::ShapeMismatch {
                expected: reference_shape.clone(),
                actual: shape,
                operation: format!("cat along dim {}", dim),
            });
        }
        sizes.push(shape[dim]);
    }

    let total: usize = sizes.iter().sum();
    let mut output_shape = reference_shape.clone();
    output_shape[dim] = total;
    let (outer, _, inner) = split_at_axis(&output_shape, dim);

    let buffers: Vec<Arc<Vec<f32>>> = tensors.iter().map(|t| t.buffer()).collect();
    let mut data = Vec::with_capacity(outer * total * inner);
    for o in 0..outer {
        for (buffer, &size) in buffers.iter().zip(&sizes) {
            let chunk = size * inner;
            data.extend_from_slice(&buffer[o * chunk..(o + 1) * chunk]);
        }
    }
    let result = Tensor::new(data, output_shape)?;

    if tensors.iter().any(|t| t.requires_grad()) {
        result.attach_grad_fn(Arc::new(CatBackward {
            inputs: tensors.to_vec(),
            sizes,
            dim,
        }));
    }
    Ok(result)
}

#[derive(Debug)]
struct CatBackward {
    inputs: Vec<Tensor>,
    sizes: Vec<usize>,
    dim: usize,
}

impl BackwardOp for CatBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, GraphAggError> {
        let upstream = grad_output.buffer();
        let output_shape = grad_output.shape();
        let (outer, total, inner) = split_at_axis(&output_shape, self.dim);

        let mut grads: Vec<Vec<f32>> = self
            .sizes
            .iter()
            .map(|&s| Vec::with_capacity(outer * s * inner))
            .collect();
        for o in 0..outer {
            let mut offset = o * total * inner;
            for (grad, &size) in grads.iter_mut().zip(&self.sizes) {
                let chunk = size * inner;
                grad.extend_from_slice(&upstream[offset..offset + chunk]);
                offset += chunk;
            }
        }

        grads
            .into_iter()
            .zip(&self.inputs)
            .map(|(g, input)| Tensor::new(g, input.shape()))
            .collect()
    }

    fn inputs(&self) -> Vec<Tensor> {
        self.inputs.clone()
    }
}
