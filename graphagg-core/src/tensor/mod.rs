// src/tensor/mod.rs

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::GraphAggError;
use crate::tensor_data::TensorData;

mod autograd_methods;
pub mod broadcast_utils;
pub mod create;
pub mod utils;

pub use create::{full, ones, ones_like, rand_uniform, randn, zeros, zeros_like};

/// Represents a multi-dimensional array (tensor) of `f32` values.
///
/// `Tensor` uses `Arc<RwLock<TensorData>>` internally to allow for:
/// 1.  **Shared Ownership:** Multiple `Tensor` handles can point to the same
///     underlying data without cloning the data itself (cheap clones).
/// 2.  **Interior Mutability:** Autograd metadata (`requires_grad`, `grad`,
///     `grad_fn`) can be modified through an immutable handle.
pub struct Tensor {
    /// Arc for shared ownership, RwLock for interior mutability of TensorData.
    pub(crate) data: Arc<RwLock<TensorData>>,
}

impl Tensor {
    /// Creates a new Tensor with the given data and shape.
    ///
    /// This is the primary constructor for creating tensors from raw data.
    pub fn new(data_vec: Vec<f32>, shape: Vec<usize>) -> Result<Self, GraphAggError> {
        let tensor_data = TensorData::new(data_vec, shape)?;
        Ok(Tensor {
            data: Arc::new(RwLock::new(tensor_data)),
        })
    }

    /// Creates a 0-dimensional tensor holding `value`.
    pub fn scalar(value: f32) -> Self {
        let tensor_data = TensorData {
            buffer: Arc::new(vec![value]),
            shape: vec![],
            strides: vec![],
            requires_grad: false,
            grad: None,
            grad_fn: None,
        };
        Tensor {
            data: Arc::new(RwLock::new(tensor_data)),
        }
    }

    /// Returns a clone of the tensor's shape.
    pub fn shape(&self) -> Vec<usize> {
        self.read_data().shape.clone()
    }

    /// Returns a clone of the tensor's strides.
    pub fn strides(&self) -> Vec<usize> {
        self.read_data().strides.clone()
    }

    /// Number of dimensions.
    pub fn rank(&self) -> usize {
        self.read_data().shape.len()
    }

    /// Size of axis `dim`, if it exists.
    pub fn size(&self, dim: usize) -> Option<usize> {
        self.read_data().shape.get(dim).copied()
    }

    /// Returns the number of elements in the tensor.
    pub fn numel(&self) -> usize {
        self.read_data().numel()
    }

    /// Acquires a read lock on the tensor's data.
    ///
    /// A poisoned lock is recovered: tensor metadata is always left in a
    /// consistent state between writes.
    pub fn read_data(&self) -> RwLockReadGuard<'_, TensorData> {
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Acquires a write lock on the tensor's data.
    pub fn write_data(&self) -> RwLockWriteGuard<'_, TensorData> {
        self.data.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a copy of the tensor data in row-major order.
    pub fn get_f32_data(&self) -> Vec<f32> {
        self.read_data().buffer.as_ref().clone()
    }

    /// Returns the shared buffer without copying.
    pub(crate) fn buffer(&self) -> Arc<Vec<f32>> {
        Arc::clone(&self.read_data().buffer)
    }

    /// Returns the single value of a one-element tensor.
    pub fn item(&self) -> Result<f32, GraphAggError> {
        let guard = self.read_data();
        if guard.numel() != 1 {
            return Err(GraphAggError::ShapeMismatch {
                expected: vec![1],
                actual: guard.shape.clone(),
                operation: "item".to_string(),
            });
        }
        Ok(guard.buffer[0])
    }

    /// Returns true if every element is finite (no NaN or infinity).
    pub fn all_finite(&self) -> bool {
        self.read_data().buffer.iter().all(|v| v.is_finite())
    }
}

impl Clone for Tensor {
    /// Clones the handle (bumps the `Arc` count); the data is shared.
    fn clone(&self) -> Self {
        Tensor {
            data: Arc::clone(&self.data),
        }
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let td = self.read_data();
        f.debug_struct("Tensor")
            .field("data", &td.buffer)
            .field("shape", &td.shape)
            .field("requires_grad", &td.requires_grad)
            .field("grad_defined", &td.grad.is_some())
            .field("grad_fn_defined", &td.grad_fn.is_some())
            .finish()
    }
}
