use std::fmt;

use crate::aggr::addressing::Groups;
use crate::aggr::base::{assert_index_present, reduce, Aggregation};
use crate::aggr::weighted::{assert_weight_present, weighted_reduce, WeightedAggregation};
use crate::error::GraphAggError;
use crate::ops::arithmetic::{mul_op, sub_op};
use crate::ops::grouped::{scatter_op, ReduceKind};
use crate::ops::math_elem::{clamp_op, sqrt_op};
use crate::ops::view::index_select_op;
use crate::tensor::Tensor;

macro_rules! reduce_aggregation {
    ($(#[$meta:meta])* $name:ident, $kind:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        pub struct $name;

        impl $name {
            pub fn new() -> Self {
                $name
            }
        }

        impl Aggregation for $name {
            fn forward(&self, x: &Tensor, groups: &Groups<'_>) -> Result<Tensor, GraphAggError> {
                reduce(x, groups, $kind)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}()", stringify!($name))
            }
        }
    };
}

reduce_aggregation!(
    /// Sum of each group; empty groups give `0`.
    SumAggregation,
    ReduceKind::Sum
);
reduce_aggregation!(
    /// Arithmetic mean of each group; empty groups give `0`.
    MeanAggregation,
    ReduceKind::Mean
);
reduce_aggregation!(
    /// Feature-wise maximum of each group; empty groups give `0`.
    MaxAggregation,
    ReduceKind::Max
);
reduce_aggregation!(
    /// Feature-wise minimum of each group; empty groups give `0`.
    MinAggregation,
    ReduceKind::Min
);

/// Product of each group; empty groups give `1`.
///
/// Only supports index addressing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MulAggregation;

impl MulAggregation {
    pub fn new() -> Self {
        MulAggregation
    }
}

impl Aggregation for MulAggregation {
    fn forward(&self, x: &Tensor, groups: &Groups<'_>) -> Result<Tensor, GraphAggError> {
        assert_index_present(groups)?;
        let index = groups.index().unwrap_or_default();
        scatter_op(x, index, groups.dim(), groups.dim_size(), ReduceKind::Mul)
    }
}

impl fmt::Display for MulAggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MulAggregation()")
    }
}

/// Population variance of each group, computed in two passes: the group mean
/// is gathered back to the elements and the squared residuals are averaged.
///
/// With `semi_grad`, no gradient flows through the group mean.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VarAggregation {
    semi_grad: bool,
}

impl VarAggregation {
    pub fn new(semi_grad: bool) -> Self {
        VarAggregation { semi_grad }
    }

    pub fn semi_grad(&self) -> bool {
        self.semi_grad
    }
}

impl Aggregation for VarAggregation {
    fn forward(&self, x: &Tensor, groups: &Groups<'_>) -> Result<Tensor, GraphAggError> {
        let mean = reduce(x, groups, ReduceKind::Mean)?;
        let mean = if self.semi_grad { mean.detach() } else { mean };
        let n = x.shape()[groups.dim()];
        let index = groups.element_index(n)?;
        let residual = sub_op(x, &index_select_op(&mean, groups.dim(), &index)?)?;
        reduce(&mul_op(&residual, &residual)?, groups, ReduceKind::Mean)
    }
}

impl fmt::Display for VarAggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VarAggregation()")
    }
}

/// Standard deviation of each group, `sqrt(max(var, 0))`.
///
/// Empty, singleton and constant groups give exactly `0`; the square root
/// passes a zero sub-gradient there, so the gradient stays finite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StdAggregation {
    var: VarAggregation,
}

impl StdAggregation {
    pub fn new(semi_grad: bool) -> Self {
        StdAggregation {
            var: VarAggregation::new(semi_grad),
        }
    }
}

impl Aggregation for StdAggregation {
    fn forward(&self, x: &Tensor, groups: &Groups<'_>) -> Result<Tensor, GraphAggError> {
        let var = self.var.forward(x, groups)?;
        sqrt_op(&clamp_op(&var, Some(0.0), None)?)
    }
}

impl fmt::Display for StdAggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StdAggregation()")
    }
}

/// Weighted aggregation `sum(w * x)` of each group: every element is scaled
/// by its weight before the group sum. Empty groups give `0`.
///
/// Calling [`Aggregation::aggregate`] without a weight fails with
/// `UnsupportedAddressingMode`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WeightedMeanAggregation;

impl WeightedMeanAggregation {
    pub fn new() -> Self {
        WeightedMeanAggregation
    }
}

impl Aggregation for WeightedMeanAggregation {
    fn forward(&self, x: &Tensor, groups: &Groups<'_>) -> Result<Tensor, GraphAggError> {
        self.forward_weighted(x, None, groups)
    }
}

impl WeightedAggregation for WeightedMeanAggregation {
    fn forward_weighted(
        &self,
        x: &Tensor,
        weight: Option<&Tensor>,
        groups: &Groups<'_>,
    ) -> Result<Tensor, GraphAggError> {
        let weight = assert_weight_present(weight)?;
        weighted_reduce(x, weight, groups, ReduceKind::Sum)
    }
}

impl fmt::Display for WeightedMeanAggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WeightedMeanAggregation()")
    }
}

#[cfg(test)]
#[path = "basic_test.rs"]
mod tests;
