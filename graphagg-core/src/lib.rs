//! Segment-wise aggregation of tensors with reverse-mode autograd.
//!
//! The crate is organised bottom-up:
//!
//! - [`tensor`] and [`autograd`]: an `f32` tensor with a dynamic computation
//!   graph and `backward()`.
//! - [`ops`]: differentiable operations, including the grouped reduction
//!   primitive in [`ops::grouped`].
//! - [`nn`]: learnable parameters, including lazily sized ones.
//! - [`aggr`]: the aggregation contracts and the aggregators built on them.

pub mod aggr;
pub mod autograd;
pub mod error;
pub mod nn;
pub mod ops;
pub mod tensor;
pub mod tensor_data;
pub mod utils;

pub use aggr::{
    aggregation_resolver, AggrArgs, Aggregation, Groups, MaxAggregation, MeanAggregation,
    MinAggregation, MulAggregation, MultiAggregation, MultiMode, PowerMeanAggregation,
    SoftmaxAggregation, StdAggregation, SumAggregation, VarAggregation, WeightedAggregation,
    WeightedMeanAggregation,
};
pub use error::GraphAggError;
pub use tensor::Tensor;
