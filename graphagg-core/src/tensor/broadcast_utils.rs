use crate::tensor::utils::{calculate_strides, index_to_coord};

/// For every element of `output_shape`, the flat index of the element of a
/// tensor of `input_shape` that broadcasts onto it.
///
/// `input_shape` must be broadcast-compatible with `output_shape`.
pub fn broadcast_offsets(output_shape: &[usize], input_shape: &[usize]) -> Vec<usize> {
    let numel: usize = output_shape.iter().product();
    let output_strides = calculate_strides(output_shape);
    let input_strides = calculate_strides(input_shape);
    let rank_diff = output_shape.len() - input_shape.len();

    if output_shape == input_shape {
        return (0..numel).collect();
    }

    (0..numel)
        .map(|i| {
            let coords = index_to_coord(i, &output_strides, output_shape);
            input_shape
                .iter()
                .enumerate()
                .map(|(dim, &size)| {
                    if size == 1 {
                        0
                    } else {
                        coords[rank_diff + dim] * input_strides[dim]
                    }
                })
                .sum()
        })
        .collect()
}

/// Sums a gradient computed over the broadcast output back onto the input
/// it was broadcast from.
pub fn reduce_to_shape(grad_full: &[f32], offsets: &[usize], input_numel: usize) -> Vec<f32> {
    let mut grad = vec![0.0; input_numel];
    for (&g, &offset) in grad_full.iter().zip(offsets) {
        grad[offset] += g;
    }
    grad
}
