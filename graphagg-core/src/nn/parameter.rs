use std::fmt;
use std::ops::Deref;

use crate::error::GraphAggError;
use crate::tensor::Tensor;

/// A wrapper around a Tensor indicating it is a learnable parameter.
/// Parameters always have `requires_grad` set to `true`.
///
/// Cloning a `Parameter` clones the handle: both clones observe the same
/// values and gradients.
#[derive(Clone)]
pub struct Parameter {
    tensor: Tensor,
    name: Option<String>,
}

impl Parameter {
    /// Creates a new Parameter from a Tensor and marks it as requiring gradients.
    pub fn new(tensor: Tensor) -> Result<Self, GraphAggError> {
        tensor.set_requires_grad(true)?;
        Ok(Parameter { tensor, name: None })
    }

    /// Creates a named Parameter.
    pub fn new_with_name(tensor: Tensor, name: impl Into<String>) -> Result<Self, GraphAggError> {
        let mut param = Parameter::new(tensor)?;
        param.name = Some(name.into());
        Ok(param)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Consumes the Parameter and returns the underlying Tensor.
    pub fn into_inner(self) -> Tensor {
        self.tensor
    }
}

impl Deref for Parameter {
    type Target = Tensor;

    fn deref(&self) -> &Self::Target {
        &self.tensor
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "Parameter({}: {:?})", name, self.tensor),
            None => write!(f, "Parameter({:?})", self.tensor),
        }
    }
}

#[cfg(test)]
#[path = "parameter_test.rs"]
mod tests;
