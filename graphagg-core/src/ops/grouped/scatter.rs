use log::trace;

use crate::error::GraphAggError;
use crate::ops::grouped::kernel::{grouped_reduce_op, GroupLayout};
use crate::ops::grouped::ReduceKind;
use crate::tensor::Tensor;

/// Reduces the slices of `x` along `dim` into `dim_size` groups given by a
/// per-element group `index` (index path).
///
/// `index` may be in any order. Its length must equal `x.size(dim)`
/// (`ShapeMismatch` otherwise), and every entry must be `< dim_size`
/// (`IndexOutOfBounds` otherwise). The result has `x`'s shape with axis
/// `dim` replaced by `dim_size`; groups without elements hold
/// [`ReduceKind::empty_value`].
pub fn scatter_op(
    x: &Tensor,
    index: &[usize],
    dim: usize,
    dim_size: usize,
    kind: ReduceKind,
) -> Result<Tensor, GraphAggError> {
    trace!(
        "scatter_op: kind={} dim={} dim_size={} shape={:?}",
        kind,
        dim,
        dim_size,
        x.shape()
    );
    let group_of = index.iter().copied().map(Some).collect();
    let layout = GroupLayout::new(x.shape(), dim, group_of, dim_size)?;
    grouped_reduce_op(x, layout, kind)
}

#[cfg(test)]
#[path = "scatter_test.rs"]
mod tests;
