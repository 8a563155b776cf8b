// src/tensor_data.rs
use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::error::GraphAggError;
use crate::tensor::utils::calculate_strides;
use crate::tensor::Tensor;

/// Internal storage and metadata for a Tensor.
///
/// Holds the `f32` CPU buffer, the shape and strides of a contiguous layout,
/// and the autograd-related information. It is wrapped in
/// `Arc<RwLock<TensorData>>` by the `Tensor` struct to allow shared ownership
/// and interior mutability of the autograd fields.
#[derive(Debug)]
pub struct TensorData {
    /// The underlying data buffer. Wrapped in Arc so backward contexts can keep
    /// a forward result alive without cloning it.
    pub(crate) buffer: Arc<Vec<f32>>,
    /// The shape (dimensions) of the tensor.
    pub(crate) shape: Vec<usize>,
    /// Row-major strides for `shape`.
    pub(crate) strides: Vec<usize>,

    // --- Autograd Metadata ---
    /// Flag indicating if the tensor requires gradient computation.
    pub(crate) requires_grad: bool,
    /// Accumulated gradient (leaf tensors only).
    pub(crate) grad: Option<Tensor>,
    /// The operation that produced this tensor, if it is part of a graph.
    pub(crate) grad_fn: Option<Arc<dyn BackwardOp>>,
}

impl TensorData {
    /// Creates new `TensorData` from a data vector and shape.
    ///
    /// Fails with `TensorCreationError` if the data length does not match the
    /// product of the shape dimensions.
    pub fn new(data: Vec<f32>, shape: Vec<usize>) -> Result<Self, GraphAggError> {
        let numel: usize = shape.iter().product();
        if data.len() != numel {
            return Err(GraphAggError::TensorCreationError {
                data_len: data.len(),
                shape,
            });
        }
        let strides = calculate_strides(&shape);
        Ok(TensorData {
            buffer: Arc::new(data),
            shape,
            strides,
            requires_grad: false,
            grad: None,
            grad_fn: None,
        })
    }

    /// Number of elements.
    pub fn numel(&self) -> usize {
        self.shape.iter().product()
    }

    /// Returns the shared data buffer.
    pub fn buffer(&self) -> &Arc<Vec<f32>> {
        &self.buffer
    }
}
