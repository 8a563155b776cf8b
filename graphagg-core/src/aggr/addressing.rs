use std::borrow::Cow;

use crate::aggr::AggrArgs;
use crate::error::{GraphAggError, GroupCountRequirement};
use crate::ops::grouped::{check_ptr_covers, ptr_to_index};

/// Resolves a possibly negative axis against a tensor of rank `rank`.
///
/// Valid values lie in `[-rank, rank - 1]`; anything else fails with
/// `InvalidDimension`.
pub fn normalize_dim(dim: isize, rank: usize) -> Result<usize, GraphAggError> {
    let signed_rank = rank as isize;
    if dim >= signed_rank || dim < -signed_rank {
        return Err(GraphAggError::InvalidDimension { dim, rank });
    }
    Ok(if dim < 0 {
        (dim + signed_rank) as usize
    } else {
        dim as usize
    })
}

/// The resolved grouping of one aggregation call.
///
/// Either an element-wise group `index`, a pointer vector `ptr`, or both are
/// present, along with the authoritative group count `dim_size` and the
/// normalized aggregation axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Groups<'a> {
    index: Option<Cow<'a, [usize]>>,
    ptr: Option<&'a [usize]>,
    dim_size: usize,
    dim: usize,
    max_num_elements: Option<usize>,
}

impl<'a> Groups<'a> {
    /// The per-element group index, if one was given or synthesized.
    pub fn index(&self) -> Option<&[usize]> {
        self.index.as_deref()
    }

    pub fn ptr(&self) -> Option<&'a [usize]> {
        self.ptr
    }

    /// Number of output groups.
    pub fn dim_size(&self) -> usize {
        self.dim_size
    }

    /// Normalized aggregation axis.
    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn max_num_elements(&self) -> Option<usize> {
        self.max_num_elements
    }

    /// `max(index) + 1`, the smallest group count the index fits into.
    /// `None` without an index or for an empty one.
    pub fn required_dim_size(&self) -> Option<usize> {
        self.index()?.iter().max().map(|&m| m + 1)
    }

    /// Group id of each of the `n` elements along the aggregation axis: the
    /// index itself, or the pointer vector expanded.
    pub fn element_index(&self, n: usize) -> Result<Cow<'_, [usize]>, GraphAggError> {
        match (self.index(), self.ptr) {
            (Some(index), _) => Ok(Cow::Borrowed(index)),
            (None, Some(ptr)) => Ok(Cow::Owned(ptr_to_index(ptr, n)?)),
            (None, None) => Err(GraphAggError::InternalError(
                "groups carry neither 'index' nor 'ptr'".to_string(),
            )),
        }
    }
}

/// Resolves the grouping of an input of shape `shape` from the call
/// arguments.
///
/// * Neither `index` nor `ptr`: every element belongs to group `0`.
/// * `ptr`: the group count is `ptr.len() - 1`; an explicit `dim_size` must
///   agree (`InvalidGroupCount`). The pointer must be non-decreasing and span
///   every element along `dim`, else `InvalidPointer`.
/// * `index` without `dim_size`: `max(index) + 1`, or `0` for an empty index.
///   Under `static_shapes` the count is never inferred and a missing
///   `dim_size` fails with `DimSizeRequired`.
pub fn resolve_groups<'a>(shape: &[usize], args: &AggrArgs<'a>) -> Result<Groups<'a>, GraphAggError> {
    let dim = normalize_dim(args.dim, shape.len())?;

    let index: Option<Cow<'a, [usize]>> = match (args.index, args.ptr) {
        (None, None) => Some(Cow::Owned(vec![0; shape[dim]])),
        (index, _) => index.map(Cow::Borrowed),
    };

    let dim_size = match args.ptr {
        Some(ptr) => {
            let expected = ptr.len().checked_sub(1).ok_or_else(|| {
                GraphAggError::InvalidPointer("pointer vector is empty".to_string())
            })?;
            if let Some(got) = args.dim_size.filter(|&got| got != expected) {
                return Err(GraphAggError::InvalidGroupCount {
                    got,
                    expected: GroupCountRequirement::Exactly(expected),
                });
            }
            check_ptr_covers(ptr, shape[dim])?;
            expected
        }
        None => match (args.dim_size, index.as_deref()) {
            (Some(dim_size), _) => dim_size,
            (None, Some(index)) => {
                if args.static_shapes && args.index.is_some() {
                    return Err(GraphAggError::DimSizeRequired);
                }
                index.iter().max().map_or(0, |&m| m + 1)
            }
            (None, None) => 0,
        },
    };

    Ok(Groups {
        index,
        ptr: args.ptr,
        dim_size,
        dim,
        max_num_elements: args.max_num_elements,
    })
}

#[cfg(test)]
#[path = "addressing_test.rs"]
mod tests;
