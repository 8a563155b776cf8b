use std::fmt;

use log::debug;

use crate::aggr::addressing::{resolve_groups, Groups};
use crate::error::{GraphAggError, GroupCountRequirement};
use crate::nn::Parameter;
use crate::ops::grouped::{scatter_op, segment_op, ReduceKind};
use crate::ops::view::to_dense_batch_op;
use crate::tensor::Tensor;

/// Per-call arguments of an aggregation.
///
/// Built with [`AggrArgs::new`] and the `with_*` methods. The aggregation axis
/// defaults to `-2`, the node axis of a `[..., N, F]` feature tensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggrArgs<'a> {
    pub index: Option<&'a [usize]>,
    pub ptr: Option<&'a [usize]>,
    pub dim_size: Option<usize>,
    pub dim: isize,
    pub max_num_elements: Option<usize>,
    pub static_shapes: bool,
}

impl Default for AggrArgs<'_> {
    fn default() -> Self {
        AggrArgs {
            index: None,
            ptr: None,
            dim_size: None,
            dim: -2,
            max_num_elements: None,
            static_shapes: false,
        }
    }
}

impl<'a> AggrArgs<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_index(mut self, index: &'a [usize]) -> Self {
        self.index = Some(index);
        self
    }

    pub fn with_ptr(mut self, ptr: &'a [usize]) -> Self {
        self.ptr = Some(ptr);
        self
    }

    pub fn with_dim_size(mut self, dim_size: usize) -> Self {
        self.dim_size = Some(dim_size);
        self
    }

    pub fn with_dim(mut self, dim: isize) -> Self {
        self.dim = dim;
        self
    }

    pub fn with_max_num_elements(mut self, max_num_elements: usize) -> Self {
        self.max_num_elements = Some(max_num_elements);
        self
    }

    /// Forbids inferring `dim_size` from index values.
    pub fn with_static_shapes(mut self, static_shapes: bool) -> Self {
        self.static_shapes = static_shapes;
        self
    }
}

/// A strategy reducing the elements of each group along one axis to a single
/// value per group.
///
/// Implementors provide [`forward`](Aggregation::forward) on already resolved
/// [`Groups`]; callers go through [`aggregate`](Aggregation::aggregate), which
/// validates the axis, resolves the grouping and turns collaborator faults
/// caused by a too small `dim_size` into `InvalidGroupCount`.
///
/// `Display` renders the aggregator as `TypeName()` or `TypeName(learn=...)`.
pub trait Aggregation: fmt::Debug + fmt::Display + Send + Sync {
    fn forward(&self, x: &Tensor, groups: &Groups<'_>) -> Result<Tensor, GraphAggError>;

    fn aggregate(&self, x: &Tensor, args: &AggrArgs<'_>) -> Result<Tensor, GraphAggError> {
        run_aggregation(self, x, args, |groups| self.forward(x, groups))
    }

    /// Restores learnable state to its initial values.
    fn reset_parameters(&mut self) -> Result<(), GraphAggError> {
        Ok(())
    }

    /// Handles to the learnable parameters, materialized ones only.
    fn parameters(&self) -> Vec<Parameter> {
        Vec::new()
    }
}

/// Shared call flow of [`Aggregation::aggregate`] and the weighted variant.
pub(crate) fn run_aggregation<A, F>(
    aggr: &A,
    x: &Tensor,
    args: &AggrArgs<'_>,
    forward: F,
) -> Result<Tensor, GraphAggError>
where
    A: fmt::Display + ?Sized,
    F: FnOnce(&Groups<'_>) -> Result<Tensor, GraphAggError>,
{
    let groups = resolve_groups(&x.shape(), args)?;
    debug!(
        "{}: shape={:?} dim={} dim_size={} addressing={}",
        aggr,
        x.shape(),
        groups.dim(),
        groups.dim_size(),
        if groups.ptr().is_some() { "ptr" } else { "index" }
    );
    forward(&groups).map_err(|err| diagnose_fault(err, &groups))
}

/// Reinterprets an out-of-range or shape fault as `InvalidGroupCount` when
/// the index does not fit into `dim_size`. Other errors pass through.
pub(crate) fn diagnose_fault(err: GraphAggError, groups: &Groups<'_>) -> GraphAggError {
    let collaborator_fault = matches!(
        err,
        GraphAggError::IndexOutOfBounds { .. } | GraphAggError::ShapeMismatch { .. }
    );
    match groups.required_dim_size() {
        Some(required) if collaborator_fault && groups.dim_size() < required => {
            debug!(
                "reinterpreting '{}' as invalid dim_size {} (need >= {})",
                err,
                groups.dim_size(),
                required
            );
            GraphAggError::InvalidGroupCount {
                got: groups.dim_size(),
                expected: GroupCountRequirement::AtLeast(required),
            }
        }
        _ => err,
    }
}

/// Fails unless the grouping carries an element index.
pub fn assert_index_present(groups: &Groups<'_>) -> Result<(), GraphAggError> {
    if groups.index().is_none() {
        return Err(GraphAggError::UnsupportedAddressingMode(
            "Aggregation requires 'index' to be specified".to_string(),
        ));
    }
    Ok(())
}

/// Fails if `index` decreases anywhere.
pub fn assert_sorted_index(index: Option<&[usize]>) -> Result<(), GraphAggError> {
    if let Some(index) = index {
        if let Some(position) = index.windows(2).position(|w| w[1] < w[0]) {
            return Err(GraphAggError::UnsortedIndex {
                position: position + 1,
            });
        }
    }
    Ok(())
}

/// Fails unless `x` is two-dimensional and aggregated along its first axis.
pub fn assert_two_dimensional_input(x: &Tensor, dim: usize) -> Result<(), GraphAggError> {
    let rank = x.rank();
    if rank != 2 {
        return Err(GraphAggError::NotTwoDimensional { rank });
    }
    if dim != 0 {
        return Err(GraphAggError::NotFirstDimension { dim });
    }
    Ok(())
}

/// Reduces `x` group by group: pointer path when `ptr` is present, index path
/// otherwise.
pub fn reduce(x: &Tensor, groups: &Groups<'_>, kind: ReduceKind) -> Result<Tensor, GraphAggError> {
    match (groups.ptr(), groups.index()) {
        (Some(ptr), _) => segment_op(x, ptr, groups.dim(), kind),
        (None, Some(index)) => scatter_op(x, index, groups.dim(), groups.dim_size(), kind),
        (None, None) => Err(GraphAggError::InternalError(
            "groups carry neither 'index' nor 'ptr'".to_string(),
        )),
    }
}

/// Lays the groups of a sorted `[N, F]` input out as a padded
/// `[dim_size, M, F]` batch with its `[dim_size, M]` occupancy mask.
///
/// `M` is `max_num_elements` when given, else the largest group size.
pub fn to_dense_batch(
    x: &Tensor,
    groups: &Groups<'_>,
    fill_value: f32,
) -> Result<(Tensor, Vec<bool>), GraphAggError> {
    assert_index_present(groups)?;
    assert_sorted_index(groups.index())?;
    assert_two_dimensional_input(x, groups.dim())?;
    let index = groups.index().unwrap_or_default();
    to_dense_batch_op(
        x,
        index,
        Some(groups.dim_size()),
        fill_value,
        groups.max_num_elements(),
    )
}

#[cfg(test)]
#[path = "base_test.rs"]
mod tests;
