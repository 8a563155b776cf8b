use std::fmt;
use std::str::FromStr;

use crate::aggr::addressing::Groups;
use crate::aggr::base::Aggregation;
use crate::error::GraphAggError;
use crate::nn::Parameter;
use crate::ops::arithmetic::{add_op, maximum_op, minimum_op, mul_scalar_op};
use crate::ops::view::cat_op;
use crate::tensor::Tensor;

/// How [`MultiAggregation`] combines the outputs of its aggregators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MultiMode {
    /// Concatenate along the last axis.
    #[default]
    Cat,
    Sum,
    Mean,
    Max,
    Min,
}

impl fmt::Display for MultiMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MultiMode::Cat => "cat",
            MultiMode::Sum => "sum",
            MultiMode::Mean => "mean",
            MultiMode::Max => "max",
            MultiMode::Min => "min",
        };
        f.write_str(name)
    }
}

impl FromStr for MultiMode {
    type Err = GraphAggError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cat" => Ok(MultiMode::Cat),
            "sum" => Ok(MultiMode::Sum),
            "mean" => Ok(MultiMode::Mean),
            "max" => Ok(MultiMode::Max),
            "min" => Ok(MultiMode::Min),
            other => Err(GraphAggError::InvalidConfiguration(format!(
                "unknown combine mode '{}'",
                other
            ))),
        }
    }
}

/// Applies several aggregations to the same grouping and combines their
/// results according to a [`MultiMode`].
#[derive(Debug)]
pub struct MultiAggregation {
    aggrs: Vec<Box<dyn Aggregation>>,
    mode: MultiMode,
}

impl MultiAggregation {
    pub fn new(aggrs: Vec<Box<dyn Aggregation>>, mode: MultiMode) -> Result<Self, GraphAggError> {
        if aggrs.is_empty() {
            return Err(GraphAggError::InvalidConfiguration(
                "'aggrs' of 'MultiAggregation' should not be empty".to_string(),
            ));
        }
        Ok(MultiAggregation { aggrs, mode })
    }

    /// Builds every aggregator by name through
    /// [`aggregation_resolver`](crate::aggr::aggregation_resolver).
    pub fn from_names(names: &[&str], mode: MultiMode) -> Result<Self, GraphAggError> {
        let aggrs = names
            .iter()
            .map(|name| crate::aggr::aggregation_resolver(name))
            .collect::<Result<Vec<_>, _>>()?;
        MultiAggregation::new(aggrs, mode)
    }

    pub fn mode(&self) -> MultiMode {
        self.mode
    }

    pub fn aggrs(&self) -> &[Box<dyn Aggregation>] {
        &self.aggrs
    }

    fn combine(&self, outputs: Vec<Tensor>) -> Result<Tensor, GraphAggError> {
        let count = outputs.len();
        let mut iter = outputs.into_iter();
        let first = iter.next().ok_or_else(|| {
            GraphAggError::InternalError("no aggregation outputs to combine".to_string())
        })?;
        match self.mode {
            MultiMode::Cat => {
                let all: Vec<Tensor> = std::iter::once(first).chain(iter).collect();
                let last_axis = all[0].rank().saturating_sub(1);
                cat_op(&all, last_axis)
            }
            MultiMode::Sum => iter.try_fold(first, |acc, t| add_op(&acc, &t)),
            MultiMode::Mean => {
                let sum = iter.try_fold(first, |acc, t| add_op(&acc, &t))?;
                mul_scalar_op(&sum, 1.0 / count as f32)
            }
            MultiMode::Max => iter.try_fold(first, |acc, t| maximum_op(&acc, &t)),
            MultiMode::Min => iter.try_fold(first, |acc, t| minimum_op(&acc, &t)),
        }
    }
}

impl Aggregation for MultiAggregation {
    fn forward(&self, x: &Tensor, groups: &Groups<'_>) -> Result<Tensor, GraphAggError> {
        let outputs = self
            .aggrs
            .iter()
            .map(|aggr| aggr.forward(x, groups))
            .collect::<Result<Vec<_>, _>>()?;
        self.combine(outputs)
    }

    fn reset_parameters(&mut self) -> Result<(), GraphAggError> {
        self.aggrs
            .iter_mut()
            .try_for_each(|aggr| aggr.reset_parameters())
    }

    fn parameters(&self) -> Vec<Parameter> {
        self.aggrs.iter().flat_map(|aggr| aggr.parameters()).collect()
    }
}

impl fmt::Display for MultiAggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "MultiAggregation([")?;
        for aggr in &self.aggrs {
            writeln!(f, "  {},", aggr)?;
        }
        write!(f, "], mode={})", self.mode)
    }
}

#[cfg(test)]
#[path = "multi_test.rs"]
mod tests;
