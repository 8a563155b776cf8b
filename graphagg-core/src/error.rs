use std::fmt;
use thiserror::Error;

/// Lower bound a `dim_size` failed to meet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupCountRequirement {
    /// `ptr` fixes the group count exactly.
    Exactly(usize),
    /// `index` requires at least `max(index) + 1` groups.
    AtLeast(usize),
}

impl fmt::Display for GroupCountRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupCountRequirement::Exactly(n) => write!(f, "'{}'", n),
            GroupCountRequirement::AtLeast(n) => write!(f, ">= '{}'", n),
        }
    }
}

/// What is wrong with a `weight` vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightFault {
    /// The weight is not one-dimensional.
    Rank(usize),
    /// The weight length does not match the aggregation axis.
    Length { elements: usize, weights: usize },
}

impl fmt::Display for WeightFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeightFault::Rank(rank) => write!(
                f,
                "The 'weight' vector needs to be one-dimensional (got {} dimensions)",
                rank
            ),
            WeightFault::Length { elements, weights } => write!(
                f,
                "The input tensor has {} elements, but the 'weight' vector holds {} elements. \
                 Please make sure that the size of the inputs align",
                elements, weights
            ),
        }
    }
}

/// Custom error type for the graphagg crate.
#[derive(Error, Debug, PartialEq, Clone)]
pub enum GraphAggError {
    // --- Aggregation contract ---
    #[error("Encountered invalid dimension '{dim}' of source tensor with {rank} dimensions")]
    InvalidDimension { dim: isize, rank: usize },

    #[error("Encountered invalid 'dim_size' (got '{got}' but expected {expected})")]
    InvalidGroupCount {
        got: usize,
        expected: GroupCountRequirement,
    },

    #[error("'dim_size' must be given explicitly when static shapes are required")]
    DimSizeRequired,

    #[error("{0}")]
    UnsupportedAddressingMode(String),

    #[error("{0}")]
    MalformedWeight(WeightFault),

    #[error("Can not perform aggregation since the 'index' tensor is not sorted (first decrease at position {position})")]
    UnsortedIndex { position: usize },

    #[error("Aggregation requires two-dimensional inputs (got '{rank}')")]
    NotTwoDimensional { rank: usize },

    #[error("Aggregation needs to perform aggregation in first dimension (got '{dim}')")]
    NotFirstDimension { dim: usize },

    #[error("Missing capability: {0}")]
    MissingCapability(String),

    #[error("Invalid aggregation configuration: {0}")]
    InvalidConfiguration(String),

    // --- Tensor engine ---
    #[error("Shape mismatch: expected {expected:?}, got {actual:?} during operation {operation}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
        operation: String,
    },

    #[error("Cannot broadcast shapes: {shape1:?} and {shape2:?}")]
    BroadcastError {
        shape1: Vec<usize>,
        shape2: Vec<usize>,
    },

    #[error("Index out of bounds: index {index:?} for shape {shape:?}")]
    IndexOutOfBounds { index: Vec<usize>, shape: Vec<usize> },

    #[error("Invalid 'ptr': {0}")]
    InvalidPointer(String),

    #[error("Tensor creation error: data length {data_len} does not match shape {shape:?}")]
    TensorCreationError { data_len: usize, shape: Vec<usize> },

    #[error("Backward called on non-scalar tensor without explicit gradient.")]
    BackwardNonScalar,

    #[error("Backward error: {0}")]
    BackwardError(String),

    #[error("Cycle detected in the computation graph during backward pass.")]
    CycleDetected,

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}
