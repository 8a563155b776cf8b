use std::cmp::max;

use crate::error::GraphAggError;

/// Calculates the strides for a given shape.
/// Strides represent the number of elements to skip in the flattened data array
/// to move one step along each dimension.
///
/// Example:
/// shape = [2, 3] -> strides = [3, 1]
/// shape = [2, 2, 2] -> strides = [4, 2, 1]
pub fn calculate_strides(shape: &[usize]) -> Vec<usize> {
    if shape.is_empty() {
        return vec![];
    }
    let rank = shape.len();
    let mut strides = vec![1; rank];
    for i in (0..rank - 1).rev() {
        strides[i] = strides[i + 1] * shape[i + 1];
    }
    strides
}

/// Determines the output shape resulting from broadcasting two input shapes.
///
/// Follows NumPy/PyTorch broadcasting rules:
/// 1. If the shapes have different numbers of dimensions, prepend 1s to the shorter shape.
/// 2. Compare dimensions element-wise from right to left.
/// 3. Dimensions are compatible if they are equal, or one of them is 1.
pub fn broadcast_shapes(shape_a: &[usize], shape_b: &[usize]) -> Result<Vec<usize>, GraphAggError> {
    let rank_a = shape_a.len();
    let rank_b = shape_b.len();
    let max_rank = max(rank_a, rank_b);
    let mut result_shape = vec![0; max_rank];

    for i in 0..max_rank {
        let dim_a = shape_a.get(rank_a.wrapping_sub(1 + i)).copied().unwrap_or(1);
        let dim_b = shape_b.get(rank_b.wrapping_sub(1 + i)).copied().unwrap_or(1);

        result_shape[max_rank - 1 - i] = if dim_a == dim_b || dim_b == 1 {
            dim_a
        } else if dim_a == 1 {
            dim_b
        } else {
            return Err(GraphAggError::BroadcastError {
                shape1: shape_a.to_vec(),
                shape2: shape_b.to_vec(),
            });
        };
    }
    Ok(result_shape)
}

/// Converts a flat row-major index into coordinates.
pub fn index_to_coord(index: usize, strides: &[usize], shape: &[usize]) -> Vec<usize> {
    let mut coord = vec![0; shape.len()];
    let mut remainder = index;
    for (i, &stride) in strides.iter().enumerate() {
        if stride == 0 {
            continue;
        }
        coord[i] = remainder / stride;
        remainder %= stride;
    }
    coord
}

/// Splits `shape` around axis `dim` into `(outer, size, inner)` element counts.
///
/// A tensor of that shape can then be addressed as `[outer, size, inner]`.
pub fn split_at_axis(shape: &[usize], dim: usize) -> (usize, usize, usize) {
    let outer = shape[..dim].iter().product();
    let inner = shape[dim + 1..].iter().product();
    (outer, shape[dim], inner)
}
