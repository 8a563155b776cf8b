use crate::aggr::addressing::{normalize_dim, Groups};
use crate::aggr::base::{reduce, run_aggregation, AggrArgs, Aggregation};
use crate::error::{GraphAggError, WeightFault};
use crate::ops::arithmetic::mul_op;
use crate::ops::grouped::ReduceKind;
use crate::ops::view::reshape_op;
use crate::tensor::Tensor;

/// An aggregation that additionally accepts one weight per element along the
/// aggregation axis.
pub trait WeightedAggregation: Aggregation {
    fn forward_weighted(
        &self,
        x: &Tensor,
        weight: Option<&Tensor>,
        groups: &Groups<'_>,
    ) -> Result<Tensor, GraphAggError>;

    /// Like [`Aggregation::aggregate`], validating `weight` after the axis:
    /// it must be one-dimensional and hold `x.size(dim)` entries.
    fn aggregate_weighted(
        &self,
        x: &Tensor,
        weight: Option<&Tensor>,
        args: &AggrArgs<'_>,
    ) -> Result<Tensor, GraphAggError> {
        let dim = normalize_dim(args.dim, x.rank())?;
        if let Some(weight) = weight {
            check_weight(weight, x.shape()[dim])?;
        }
        run_aggregation(self, x, args, |groups| self.forward_weighted(x, weight, groups))
    }
}

fn check_weight(weight: &Tensor, elements: usize) -> Result<(), GraphAggError> {
    let rank = weight.rank();
    if rank != 1 {
        return Err(GraphAggError::MalformedWeight(WeightFault::Rank(rank)));
    }
    let weights = weight.numel();
    if weights != elements {
        return Err(GraphAggError::MalformedWeight(WeightFault::Length {
            elements,
            weights,
        }));
    }
    Ok(())
}

/// Fails unless a weight was supplied.
pub fn assert_weight_present(weight: Option<&Tensor>) -> Result<&Tensor, GraphAggError> {
    weight.ok_or_else(|| {
        GraphAggError::UnsupportedAddressingMode(
            "Aggregation requires 'weight' to be specified".to_string(),
        )
    })
}

/// Reshapes a `[n]` weight so it broadcasts along axis `dim` of a rank-`rank`
/// tensor.
pub(crate) fn weight_along_dim(weight: &Tensor, dim: usize, rank: usize) -> Result<Tensor, GraphAggError> {
    let mut shape = vec![1; rank];
    shape[dim] = weight.numel();
    reshape_op(weight, shape)
}

/// Scales every slice of `x` along the aggregation axis by its weight, then
/// reduces group by group.
pub fn weighted_reduce(
    x: &Tensor,
    weight: &Tensor,
    groups: &Groups<'_>,
    kind: ReduceKind,
) -> Result<Tensor, GraphAggError> {
    let weight = weight_along_dim(weight, groups.dim(), x.rank())?;
    reduce(&mul_op(x, &weight)?, groups, kind)
}
