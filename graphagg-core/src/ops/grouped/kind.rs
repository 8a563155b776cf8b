use std::fmt;
use std::str::FromStr;

use crate::error::GraphAggError;

/// Reduction applied within each group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReduceKind {
    Sum,
    Mean,
    Max,
    Min,
    Mul,
    /// Population variance (divides by the group size).
    Var,
    /// Square root of the population variance.
    Std,
}

impl ReduceKind {
    /// Value produced for a group that receives no elements.
    pub fn empty_value(self) -> f32 {
        match self {
            ReduceKind::Mul => 1.0,
            ReduceKind::Sum
            | ReduceKind::Mean
            | ReduceKind::Max
            | ReduceKind::Min
            | ReduceKind::Var
            | ReduceKind::Std => 0.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ReduceKind::Sum => "sum",
            ReduceKind::Mean => "mean",
            ReduceKind::Max => "max",
            ReduceKind::Min => "min",
            ReduceKind::Mul => "mul",
            ReduceKind::Var => "var",
            ReduceKind::Std => "std",
        }
    }
}

impl fmt::Display for ReduceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ReduceKind {
    type Err = GraphAggError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sum" | "add" => Ok(ReduceKind::Sum),
            "mean" => Ok(ReduceKind::Mean),
            "max" => Ok(ReduceKind::Max),
            "min" => Ok(ReduceKind::Min),
            "mul" | "prod" => Ok(ReduceKind::Mul),
            "var" => Ok(ReduceKind::Var),
            "std" => Ok(ReduceKind::Std),
            other => Err(GraphAggError::InvalidConfiguration(format!(
                "unknown reduction '{}'",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduce_kind_parse_aliases() {
        assert_eq!("add".parse::<ReduceKind>().unwrap(), ReduceKind::Sum);
        assert_eq!("SUM".parse::<ReduceKind>().unwrap(), ReduceKind::Sum);
        assert_eq!("prod".parse::<ReduceKind>().unwrap(), ReduceKind::Mul);
        assert_eq!("std".parse::<ReduceKind>().unwrap(), ReduceKind::Std);
        assert!(matches!(
            "median".parse::<ReduceKind>(),
            Err(GraphAggError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_reduce_kind_display_round_trips() {
        for kind in [
            ReduceKind::Sum,
            ReduceKind::Mean,
            ReduceKind::Max,
            ReduceKind::Min,
            ReduceKind::Mul,
            ReduceKind::Var,
            ReduceKind::Std,
        ] {
            assert_eq!(kind.to_string().parse::<ReduceKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_empty_values() {
        assert_eq!(ReduceKind::Mul.empty_value(), 1.0);
        assert_eq!(ReduceKind::Max.empty_value(), 0.0);
        assert_eq!(ReduceKind::Std.empty_value(), 0.0);
    }
}
