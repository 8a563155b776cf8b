use std::sync::OnceLock;

use log::debug;

use crate::error::GraphAggError;
use crate::nn::init::fill_;
use crate::nn::Parameter;
use crate::tensor::full;

/// A per-channel parameter of shape `[channels]` whose size may only become
/// known from the first input it is applied to.
///
/// * `channels = Some(c)`: materialized immediately with `c` entries. `c == 1`
///   is a single value broadcast over every channel.
/// * `channels = None`: uninitialized until [`materialize`](Self::materialize)
///   is called with the observed channel count.
///
/// Materialization happens at most once, even when the owning aggregator is
/// shared between threads.
#[derive(Debug)]
pub struct LazyParameter {
    name: String,
    init_value: f32,
    channels: Option<usize>,
    cell: OnceLock<Parameter>,
}

impl LazyParameter {
    pub fn new(
        name: impl Into<String>,
        init_value: f32,
        channels: Option<usize>,
    ) -> Result<Self, GraphAggError> {
        let lazy = LazyParameter {
            name: name.into(),
            init_value,
            channels,
            cell: OnceLock::new(),
        };
        match channels {
            Some(0) => Err(GraphAggError::InvalidConfiguration(format!(
                "parameter '{}' needs at least one channel",
                lazy.name
            ))),
            Some(c) => {
                lazy.materialize(c)?;
                Ok(lazy)
            }
            None => Ok(lazy),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }

    /// The materialized parameter, if any.
    pub fn get(&self) -> Option<&Parameter> {
        self.cell.get()
    }

    pub fn init_value(&self) -> f32 {
        self.init_value
    }

    /// Returns the parameter, creating it on first use for inputs with
    /// `observed_channels` channels.
    ///
    /// A parameter with more than one channel must match the observed channel
    /// count, else `ShapeMismatch`.
    pub fn materialize(&self, observed_channels: usize) -> Result<&Parameter, GraphAggError> {
        if self.cell.get().is_none() {
            let size = self.channels.unwrap_or(observed_channels);
            let param =
                Parameter::new_with_name(full(&[size], self.init_value)?, self.name.clone())?;
            if self.cell.set(param).is_ok() {
                debug!(
                    "materialized parameter '{}' with {} channel(s), init {}",
                    self.name, size, self.init_value
                );
            }
        }
        let param = self.cell.get().ok_or_else(|| {
            GraphAggError::InternalError(format!("parameter '{}' failed to materialize", self.name))
        })?;
        let size = param.numel();
        if size != 1 && size != observed_channels {
            return Err(GraphAggError::ShapeMismatch {
                expected: vec![size],
                actual: vec![observed_channels],
                operation: format!("channels of parameter '{}'", self.name),
            });
        }
        Ok(param)
    }

    /// Refills a materialized parameter with its initial value in place, so
    /// handles obtained earlier keep observing it. No-op when uninitialized.
    pub fn reset_parameters(&mut self) -> Result<(), GraphAggError> {
        match self.cell.get() {
            Some(param) => fill_(param, self.init_value),
            None => Ok(()),
        }
    }
}
