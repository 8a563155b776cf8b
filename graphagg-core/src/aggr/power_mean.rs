use std::fmt;

use crate::aggr::addressing::Groups;
use crate::aggr::base::{reduce, Aggregation};
use crate::error::GraphAggError;
use crate::nn::{LazyParameter, Parameter};
use crate::ops::arithmetic::{pow_op, pow_scalar_op};
use crate::ops::grouped::ReduceKind;
use crate::ops::math_elem::clamp_op;
use crate::tensor::Tensor;

const POWER_MEAN_EPS: f32 = 1e-7;
const POWER_MEAN_MAX: f32 = 100.0;

/// Generalized mean `mean(x^p)^(1/p)` of each group.
///
/// Inputs and the intermediate mean are clamped into `[1e-7, 100]` so the
/// powers stay finite. With `p == 1` and no learning the plain mean is
/// returned. With `learn`, `p` is a parameter with `channels` entries
/// (`Some(1)` for a shared value, `None` to size it from the first input).
#[derive(Debug)]
pub struct PowerMeanAggregation {
    p: f32,
    learn: bool,
    channels: Option<usize>,
    p_param: Option<LazyParameter>,
}

impl PowerMeanAggregation {
    pub fn new(p: f32, learn: bool, channels: Option<usize>) -> Result<Self, GraphAggError> {
        if !learn && p == 0.0 {
            return Err(GraphAggError::InvalidConfiguration(
                "'p' must be non-zero in 'PowerMeanAggregation'".to_string(),
            ));
        }
        let p_param = if learn {
            Some(LazyParameter::new("p", p, channels)?)
        } else {
            None
        };
        Ok(PowerMeanAggregation {
            p,
            learn,
            channels,
            p_param,
        })
    }

    pub fn learn(&self) -> bool {
        self.learn
    }

    pub fn channels(&self) -> Option<usize> {
        self.channels
    }

    /// The learnable exponent, once materialized.
    pub fn p(&self) -> Option<&Parameter> {
        self.p_param.as_ref().and_then(LazyParameter::get)
    }
}

impl Default for PowerMeanAggregation {
    fn default() -> Self {
        PowerMeanAggregation {
            p: 1.0,
            learn: false,
            channels: Some(1),
            p_param: None,
        }
    }
}

impl Aggregation for PowerMeanAggregation {
    fn forward(&self, x: &Tensor, groups: &Groups<'_>) -> Result<Tensor, GraphAggError> {
        let clamp = |t: &Tensor| clamp_op(t, Some(POWER_MEAN_EPS), Some(POWER_MEAN_MAX));
        match &self.p_param {
            Some(lazy) => {
                let channels = x.shape().last().copied().unwrap_or(1);
                let p = lazy.materialize(channels)?;
                let powered = pow_op(&clamp(x)?, p)?;
                let mean = reduce(&powered, groups, ReduceKind::Mean)?;
                pow_op(&clamp(&mean)?, &pow_scalar_op(p, -1.0)?)
            }
            None if self.p == 1.0 => reduce(x, groups, ReduceKind::Mean),
            None => {
                let powered = pow_scalar_op(&clamp(x)?, self.p)?;
                let mean = reduce(&powered, groups, ReduceKind::Mean)?;
                pow_scalar_op(&clamp(&mean)?, 1.0 / self.p)
            }
        }
    }

    fn reset_parameters(&mut self) -> Result<(), GraphAggError> {
        match self.p_param.as_mut() {
            Some(lazy) => lazy.reset_parameters(),
            None => Ok(()),
        }
    }

    fn parameters(&self) -> Vec<Parameter> {
        self.p().cloned().into_iter().collect()
    }
}

impl fmt::Display for PowerMeanAggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PowerMeanAggregation(learn={})", self.learn)
    }
}

#[cfg(test)]
#[path = "power_mean_test.rs"]
mod tests;
