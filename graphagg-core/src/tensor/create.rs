// src/tensor/create.rs

use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

use crate::error::GraphAggError;
use crate::tensor::Tensor;

/// Creates a new tensor filled with zeros with the specified shape.
pub fn zeros(shape: &[usize]) -> Result<Tensor, GraphAggError> {
    full(shape, 0.0)
}

/// Creates a new tensor filled with ones with the specified shape.
pub fn ones(shape: &[usize]) -> Result<Tensor, GraphAggError> {
    full(shape, 1.0)
}

/// Creates a new tensor filled with a specific value with the specified shape.
pub fn full(shape: &[usize], value: f32) -> Result<Tensor, GraphAggError> {
    let numel = shape.iter().product();
    Tensor::new(vec![value; numel], shape.to_vec())
}

/// Creates a new tensor filled with zeros, having the same shape as the input tensor.
pub fn zeros_like(tensor: &Tensor) -> Result<Tensor, GraphAggError> {
    zeros(&tensor.shape())
}

/// Creates a new tensor filled with ones, having the same shape as the input tensor.
pub fn ones_like(tensor: &Tensor) -> Result<Tensor, GraphAggError> {
    ones(&tensor.shape())
}

/// Creates a tensor with elements drawn from the standard normal distribution.
pub fn randn(shape: &[usize]) -> Result<Tensor, GraphAggError> {
    let numel = shape.iter().product();
    let mut rng = rand::thread_rng();
    let data: Vec<f32> = (0..numel).map(|_| StandardNormal.sample(&mut rng)).collect();
    Tensor::new(data, shape.to_vec())
}

/// Creates a tensor with elements drawn uniformly from `[low, high)`.
pub fn rand_uniform(shape: &[usize], low: f32, high: f32) -> Result<Tensor, GraphAggError> {
    if !(low < high) {
        return Err(GraphAggError::UnsupportedOperation(format!(
            "rand_uniform requires low < high (got {} and {})",
            low, high
        )));
    }
    let numel = shape.iter().product();
    let mut rng = rand::thread_rng();
    let data: Vec<f32> = (0..numel).map(|_| rng.gen_range(low..high)).collect();
    Tensor::new(data, shape.to_vec())
}
