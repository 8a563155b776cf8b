use std::fmt;

use crate::aggr::addressing::Groups;
use crate::aggr::base::{reduce, Aggregation};
use crate::error::GraphAggError;
use crate::nn::{LazyParameter, Parameter};
use crate::ops::arithmetic::{add_scalar_op, div_op, mul_op, mul_scalar_op, sub_op};
use crate::ops::grouped::ReduceKind;
use crate::ops::math_elem::exp_op;
use crate::ops::view::index_select_op;
use crate::tensor::Tensor;

/// Added to every softmax denominator.
const SOFTMAX_EPS: f32 = 1e-16;

/// Softmax over the elements of each group along the aggregation axis,
/// computed independently per feature.
///
/// The group maximum is subtracted before exponentiation and does not carry
/// gradient.
pub fn group_softmax(src: &Tensor, groups: &Groups<'_>) -> Result<Tensor, GraphAggError> {
    let dim = groups.dim();
    let index = groups.element_index(src.shape()[dim])?;
    let max = reduce(&src.detach(), groups, ReduceKind::Max)?;
    let shifted = sub_op(src, &index_select_op(&max, dim, &index)?)?;
    let exp = exp_op(&shifted)?;
    let sum = reduce(&exp, groups, ReduceKind::Sum)?;
    let denominator = add_scalar_op(&index_select_op(&sum, dim, &index)?, SOFTMAX_EPS)?;
    div_op(&exp, &denominator)
}

/// Softmax-weighted sum: each group is summed with weights
/// `softmax(x * t)` computed within the group.
///
/// * `t`: inverse temperature. With `learn`, `t` becomes a parameter with
///   `channels` entries (`Some(1)` for a single shared value, `None` to size
///   it from the last axis of the first input).
/// * `semi_grad`: no gradient flows through the softmax weights. Cannot be
///   combined with `learn`.
#[derive(Debug)]
pub struct SoftmaxAggregation {
    t: f32,
    learn: bool,
    semi_grad: bool,
    channels: Option<usize>,
    t_param: Option<LazyParameter>,
}

impl SoftmaxAggregation {
    pub fn new(
        t: f32,
        learn: bool,
        semi_grad: bool,
        channels: Option<usize>,
    ) -> Result<Self, GraphAggError> {
        if learn && semi_grad {
            return Err(GraphAggError::InvalidConfiguration(
                "Cannot enable 'semi_grad' in 'SoftmaxAggregation' in case the temperature term 't' is learnable"
                    .to_string(),
            ));
        }
        let t_param = if learn {
            Some(LazyParameter::new("t", t, channels)?)
        } else {
            None
        };
        Ok(SoftmaxAggregation {
            t,
            learn,
            semi_grad,
            channels,
            t_param,
        })
    }

    pub fn learn(&self) -> bool {
        self.learn
    }

    pub fn channels(&self) -> Option<usize> {
        self.channels
    }

    /// The learnable temperature, once materialized.
    pub fn t(&self) -> Option<&Parameter> {
        self.t_param.as_ref().and_then(LazyParameter::get)
    }
}

impl Default for SoftmaxAggregation {
    fn default() -> Self {
        SoftmaxAggregation {
            t: 1.0,
            learn: false,
            semi_grad: false,
            channels: Some(1),
            t_param: None,
        }
    }
}

impl Aggregation for SoftmaxAggregation {
    fn forward(&self, x: &Tensor, groups: &Groups<'_>) -> Result<Tensor, GraphAggError> {
        let alpha = match &self.t_param {
            Some(lazy) => {
                let channels = x.shape().last().copied().unwrap_or(1);
                mul_op(x, lazy.materialize(channels)?)?
            }
            None if self.t != 1.0 => mul_scalar_op(x, self.t)?,
            None => x.clone(),
        };
        let alpha = if !self.learn && self.semi_grad {
            group_softmax(&alpha.detach(), groups)?
        } else {
            group_softmax(&alpha, groups)?
        };
        reduce(&mul_op(x, &alpha)?, groups, ReduceKind::Sum)
    }

    fn reset_parameters(&mut self) -> Result<(), GraphAggError> {
        match self.t_param.as_mut() {
            Some(lazy) => lazy.reset_parameters(),
            None => Ok(()),
        }
    }

    fn parameters(&self) -> Vec<Parameter> {
        self.t().cloned().into_iter().collect()
    }
}

impl fmt::Display for SoftmaxAggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SoftmaxAggregation(learn={})", self.learn)
    }
}

#[cfg(test)]
#[path = "softmax_test.rs"]
mod tests;
