use log::debug;

use crate::aggr::basic::{
    MaxAggregation, MeanAggregation, MinAggregation, MulAggregation, StdAggregation,
    SumAggregation, VarAggregation, WeightedMeanAggregation,
};
use crate::aggr::power_mean::PowerMeanAggregation;
use crate::aggr::softmax::SoftmaxAggregation;
use crate::aggr::Aggregation;
use crate::error::GraphAggError;

/// Builds a default-configured aggregator from its name.
///
/// Matching ignores case, `_` and `-`, and an optional `aggregation` suffix,
/// so `"mean"`, `"Mean"` and `"MeanAggregation"` all resolve to
/// [`MeanAggregation`]. `"add"` is an alias of `"sum"`.
pub fn aggregation_resolver(name: &str) -> Result<Box<dyn Aggregation>, GraphAggError> {
    let normalized: String = name
        .chars()
        .filter(|c| *c != '_' && *c != '-')
        .collect::<String>()
        .to_ascii_lowercase();
    let key = normalized
        .strip_suffix("aggregation")
        .unwrap_or(&normalized);

    let aggr: Box<dyn Aggregation> = match key {
        "sum" | "add" => Box::new(SumAggregation),
        "mean" => Box::new(MeanAggregation),
        "max" => Box::new(MaxAggregation),
        "min" => Box::new(MinAggregation),
        "mul" => Box::new(MulAggregation),
        "var" => Box::new(VarAggregation::default()),
        "std" => Box::new(StdAggregation::default()),
        "softmax" => Box::new(SoftmaxAggregation::default()),
        "powermean" => Box::new(PowerMeanAggregation::default()),
        "weightedmean" => Box::new(WeightedMeanAggregation),
        _ => {
            return Err(GraphAggError::InvalidConfiguration(format!(
                "Could not resolve '{}' among the available aggregations",
                name
            )))
        }
    };
    debug!("resolved aggregation '{}' to {}", name, aggr);
    Ok(aggr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolver_names() {
        let cases = [
            ("sum", "SumAggregation()"),
            ("add", "SumAggregation()"),
            ("MeanAggregation", "MeanAggregation()"),
            ("max", "MaxAggregation()"),
            ("min", "MinAggregation()"),
            ("mul", "MulAggregation()"),
            ("var", "VarAggregation()"),
            ("std", "StdAggregation()"),
            ("softmax", "SoftmaxAggregation(learn=false)"),
            ("power_mean", "PowerMeanAggregation(learn=false)"),
            ("weighted-mean", "WeightedMeanAggregation()"),
        ];
        for (name, display) in cases {
            let aggr = aggregation_resolver(name).unwrap();
            assert_eq!(aggr.to_string(), display, "resolving '{}'", name);
        }
    }

    #[test]
    fn test_resolver_unknown() {
        assert!(matches!(
            aggregation_resolver("median"),
            Err(GraphAggError::InvalidConfiguration(_))
        ));
    }
}
