#[cfg(feature = "segment")]
use log::trace;

use crate::error::GraphAggError;
use crate::ops::grouped::ReduceKind;
use crate::tensor::Tensor;

/// Reduces the contiguous segments `[ptr[g], ptr[g + 1])` of `x` along `dim`
/// (pointer path). The output holds `ptr.len() - 1` groups along `dim`.
///
/// `ptr` must be non-empty and non-decreasing with `ptr.last() <=
/// x.size(dim)`; violations fail with `InvalidPointer`. Positions outside
/// `[ptr[0], ptr.last())` belong to no group.
///
/// Requires the `segment` cargo feature; without it the call fails with
/// `MissingCapability`.
#[cfg(feature = "segment")]
pub fn segment_op(
    x: &Tensor,
    ptr: &[usize],
    dim: usize,
    kind: ReduceKind,
) -> Result<Tensor, GraphAggError> {
    use crate::ops::grouped::kernel::{grouped_reduce_op, GroupLayout};

    let shape = x.shape();
    let size = *shape.get(dim).ok_or(GraphAggError::InvalidDimension {
        dim: dim as isize,
        rank: shape.len(),
    })?;
    validate_ptr(ptr, size)?;
    trace!(
        "segment_op: kind={} dim={} segments={} shape={:?}",
        kind,
        dim,
        ptr.len() - 1,
        shape
    );

    let mut group_of = vec![None; size];
    for (g, bounds) in ptr.windows(2).enumerate() {
        for slot in &mut group_of[bounds[0]..bounds[1]] {
            *slot = Some(g);
        }
    }
    let layout = GroupLayout::new(shape, dim, group_of, ptr.len() - 1)?;
    grouped_reduce_op(x, layout, kind)
}

#[cfg(not(feature = "segment"))]
pub fn segment_op(
    _x: &Tensor,
    _ptr: &[usize],
    _dim: usize,
    _kind: ReduceKind,
) -> Result<Tensor, GraphAggError> {
    Err(GraphAggError::MissingCapability(
        "aggregation via 'ptr' requires the 'segment' feature".to_string(),
    ))
}

/// Checks that `ptr` is a valid pointer vector covering all `n` positions:
/// `ptr[0] == 0` and `ptr.last() == n` in addition to the checks of
/// [`segment_op`].
pub fn check_ptr_covers(ptr: &[usize], n: usize) -> Result<(), GraphAggError> {
    validate_ptr(ptr, n)?;
    let (first, last) = (ptr[0], ptr[ptr.len() - 1]);
    if first != 0 || last != n {
        return Err(GraphAggError::InvalidPointer(format!(
            "pointer must span [0, {}] (got [{}, {}])",
            n, first, last
        )));
    }
    Ok(())
}

/// Expands a pointer vector covering all `n` positions into per-element
/// group ids.
pub fn ptr_to_index(ptr: &[usize], n: usize) -> Result<Vec<usize>, GraphAggError> {
    check_ptr_covers(ptr, n)?;
    let mut index = Vec::with_capacity(n);
    for (g, bounds) in ptr.windows(2).enumerate() {
        index.extend(std::iter::repeat(g).take(bounds[1] - bounds[0]));
    }
    Ok(index)
}

fn validate_ptr(ptr: &[usize], size: usize) -> Result<(), GraphAggError> {
    let last = *ptr
        .last()
        .ok_or_else(|| GraphAggError::InvalidPointer("pointer vector is empty".to_string()))?;
    if let Some(position) = ptr.windows(2).position(|w| w[1] < w[0]) {
        return Err(GraphAggError::InvalidPointer(format!(
            "pointer decreases at position {}",
            position + 1
        )));
    }
    if last > size {
        return Err(GraphAggError::InvalidPointer(format!(
            "pointer ends at {} but the aggregation axis holds {} elements",
            last, size
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "segment_test.rs"]
mod tests;
