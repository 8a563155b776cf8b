use std::sync::Arc;

use log::trace;

use crate::autograd::BackwardOp;
use crate::error::GraphAggError;
use crate::tensor::Tensor;

/// Converts a flat `[N, ...]` tensor of grouped elements into a padded
/// `[B, M, ...]` batch plus a `[B, M]` occupancy mask (row-major).
///
/// * `index[n]` is the group (batch slot) of row `n`; rows keep their order of
///   appearance within a group.
/// * `batch_size` defaults to `max(index) + 1` (`0` for an empty index).
/// * `max_num_elements` defaults to the largest group size. Rows beyond it are
///   dropped.
/// * Unoccupied slots hold `fill_value`.
///
/// Differentiable with respect to `x`; dropped rows receive zero gradient.
pub fn to_dense_batch_op(
    x: &Tensor,
    index: &[usize],
    batch_size: Option<usize>,
    fill_value: f32,
    max_num_elements: Option<usize>,
) -> Result<(Tensor, Vec<bool>), GraphAggError> {
    let x_shape = x.shape();
    let num_rows = *x_shape.first().ok_or(GraphAggError::NotTwoDimensional { rank: 0 })?;
    if index.len() != num_rows {
        return Err(GraphAggError::ShapeMismatch {
            expected: vec![num_rows],
            actual: vec![index.len()],
            operation: "to_dense_batch".to_string(),
        });
    }
    let row_len: usize = x_shape[1..].iter().product();

    let batch_size = batch_size.unwrap_or_else(|| index.iter().max().map_or(0, |&m| m + 1));
    let mut counts = vec![0usize; batch_size];
    for &g in index {
        let count = counts.get_mut(g).ok_or_else(|| GraphAggError::IndexOutOfBounds {
            index: vec![g],
            shape: vec![batch_size],
        })?;
        *count += 1;
    }
    let max_per_group = max_num_elements.unwrap_or_else(|| counts.iter().copied().max().unwrap_or(0));

    // Slot of every row in the dense layout, or None if it overflowed.
    let mut next = vec![0usize; batch_size];
    let slots: Vec<Option<usize>> = index
        .iter()
        .map(|&g| {
            let position = next[g];
            next[g] += 1;
            (position < max_per_group).then_some(g * max_per_group + position)
        })
        .collect();
    let dropped = slots.iter().filter(|s| s.is_none()).count();
    if dropped > 0 {
        trace!(
            "to_dense_batch: dropped {} rows exceeding {} elements per group",
            dropped,
            max_per_group
        );
    }

    let buffer = x.buffer();
    let mut data = vec![fill_value; batch_size * max_per_group * row_len];
    let mut mask = vec![false; batch_size * max_per_group];
    for (row, slot) in slots.iter().enumerate() {
        if let Some(slot) = *slot {
            mask[slot] = true;
            data[slot * row_len..(slot + 1) * row_len]
                .copy_from_slice(&buffer[row * row_len..(row + 1) * row_len]);
        }
    }

    let mut output_shape = vec![batch_size, max_per_group];
    output_shape.extend_from_slice(&x_shape[1..]);
    let result = Tensor::new(data, output_shape)?;

    if x.requires_grad() {
        result.attach_grad_fn(Arc::new(DenseBatchBackward {
            input: x.clone(),
            slots,
            row_len,
        }));
    }
    Ok((result, mask))
}

#[derive(Debug)]
struct DenseBatchBackward {
    input: Tensor,
    slots: Vec<Option<usize>>,
    row_len: usize,
}

impl BackwardOp for DenseBatchBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, GraphAggError> {
        let upstream = grad_output.buffer();
        let mut grad = vec![0.0; self.slots.len() * self.row_len];
        for (row, slot) in self.slots.iter().enumerate() {
            if let Some(slot) = *slot {
                grad[row * self.row_len..(row + 1) * self.row_len]
                    .copy_from_slice(&upstream[slot * self.row_len..(slot + 1) * self.row_len]);
            }
        }
        Ok(vec![Tensor::new(grad, self.input.shape())?])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.clone()]
    }
}

#[cfg(test)]
#[path = "dense_batch_test.rs"]
mod tests;
