//! # Aggregation Module (`aggr`)
//!
//! Aggregators reduce the elements of a tensor along one axis group by group.
//! Groups are addressed either by a per-element `index` or by a sorted offset
//! vector `ptr`; [`resolve_groups`] turns the call arguments ([`AggrArgs`])
//! into validated [`Groups`] before any aggregator runs.
//!
//! - [`base`]: the [`Aggregation`] contract and shared assertions.
//! - [`weighted`]: the [`WeightedAggregation`] contract for per-element weights.
//! - [`basic`]: sum, mean, max, min, mul, var, std and weighted mean.
//! - [`softmax`] and [`power_mean`]: aggregators with optional learnable
//!   per-channel parameters.
//! - [`multi`]: several aggregators over the same grouping.
//! - [`resolver`]: construction by name.

pub mod addressing;
pub mod base;
pub mod basic;
pub mod multi;
pub mod power_mean;
pub mod resolver;
pub mod softmax;
pub mod weighted;

pub use addressing::{normalize_dim, resolve_groups, Groups};
pub use base::{
    assert_index_present, assert_sorted_index, assert_two_dimensional_input, reduce,
    to_dense_batch, AggrArgs, Aggregation,
};
pub use basic::{
    MaxAggregation, MeanAggregation, MinAggregation, MulAggregation, StdAggregation,
    SumAggregation, VarAggregation, WeightedMeanAggregation,
};
pub use multi::{MultiAggregation, MultiMode};
pub use power_mean::PowerMeanAggregation;
pub use resolver::aggregation_resolver;
pub use softmax::{group_softmax, SoftmaxAggregation};
pub use weighted::{assert_weight_present, weighted_reduce, WeightedAggregation};
