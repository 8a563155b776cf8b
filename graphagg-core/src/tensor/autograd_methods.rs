use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, trace, warn};

use crate::autograd::graph::{topological_sort, NodeId};
use crate::autograd::BackwardOp;
use crate::error::GraphAggError;
use crate::tensor::Tensor;

impl Tensor {
    /// Checks if this tensor requires gradient computation.
    pub fn requires_grad(&self) -> bool {
        self.read_data().requires_grad
    }

    /// Sets the `requires_grad` flag for this tensor.
    ///
    /// Setting it on a non-leaf tensor is allowed but has no effect on gradient
    /// accumulation: only leaves receive `.grad`.
    pub fn set_requires_grad(&self, requires_grad: bool) -> Result<(), GraphAggError> {
        let mut guard = self.write_data();
        if requires_grad && guard.grad_fn.is_some() {
            warn!("Setting requires_grad=true on a non-leaf tensor. Gradients will not accumulate here during backward().");
        }
        guard.requires_grad = requires_grad;
        Ok(())
    }

    /// Returns a clone of the gradient tensor, if it exists.
    pub fn grad(&self) -> Option<Tensor> {
        self.read_data().grad.clone()
    }

    /// Drops the accumulated gradient.
    pub fn clear_grad(&self) {
        self.write_data().grad = None;
    }

    /// Accumulates the given gradient into the tensor's `grad` field.
    pub fn acc_grad(&self, grad_to_add: Tensor) -> Result<(), GraphAggError> {
        let mut guard = self.write_data();
        if grad_to_add.shape() != guard.shape {
            return Err(GraphAggError::ShapeMismatch {
                expected: guard.shape.clone(),
                actual: grad_to_add.shape(),
                operation: "acc_grad".to_string(),
            });
        }
        let summed = match guard.grad.take() {
            Some(existing) => add_buffers(&existing, &grad_to_add)?,
            None => grad_to_add,
        };
        guard.grad = Some(summed);
        Ok(())
    }

    /// Returns a clone of the `Arc` pointing to the backward operation node (`grad_fn`).
    pub fn grad_fn(&self) -> Option<Arc<dyn BackwardOp>> {
        self.read_data().grad_fn.clone()
    }

    /// Sets the backward operation node (`grad_fn`) for this tensor.
    pub fn set_grad_fn(&self, grad_fn: Option<Arc<dyn BackwardOp>>) -> Result<(), GraphAggError> {
        self.write_data().grad_fn = grad_fn;
        Ok(())
    }

    /// Marks an op result as part of the graph: `requires_grad` plus its `grad_fn`.
    pub(crate) fn attach_grad_fn(&self, grad_fn: Arc<dyn BackwardOp>) {
        let mut guard = self.write_data();
        guard.requires_grad = true;
        guard.grad_fn = Some(grad_fn);
    }

    /// A tensor is a leaf if it was not produced by a recorded operation.
    pub fn is_leaf(&self) -> bool {
        self.read_data().grad_fn.is_none()
    }

    /// Returns a new tensor sharing this tensor's buffer but cut off from the graph.
    pub fn detach(&self) -> Tensor {
        let guard = self.read_data();
        let detached = crate::tensor_data::TensorData {
            buffer: Arc::clone(&guard.buffer),
            shape: guard.shape.clone(),
            strides: guard.strides.clone(),
            requires_grad: false,
            grad: None,
            grad_fn: None,
        };
        Tensor {
            data: Arc::new(std::sync::RwLock::new(detached)),
        }
    }

    /// Performs the backward pass starting from this tensor.
    ///
    /// # Arguments
    /// * `gradient`: Initial gradient for this tensor. If `None`, it defaults to
    ///   `1.0` when the tensor holds a single element; otherwise the call fails
    ///   with `BackwardNonScalar`.
    ///
    /// Calling `backward` on a tensor that does not require grad is a no-op.
    pub fn backward(&self, gradient: Option<Tensor>) -> Result<(), GraphAggError> {
        if !self.requires_grad() {
            return Ok(());
        }

        let grad_init = match gradient {
            Some(g) => {
                if g.shape() != self.shape() {
                    return Err(GraphAggError::BackwardError(format!(
                        "Gradient shape mismatch: expected {:?}, got {:?}",
                        self.shape(),
                        g.shape()
                    )));
                }
                g.detach()
            }
            None => {
                if self.numel() != 1 {
                    return Err(GraphAggError::BackwardNonScalar);
                }
                crate::tensor::ones(&self.shape())?
            }
        };

        let sorted_nodes = topological_sort(self)?;
        debug!("backward: traversing {} graph nodes", sorted_nodes.len());

        let mut grad_map: HashMap<NodeId, Tensor> = HashMap::new();
        grad_map.insert(self.get_node_id(), grad_init);

        for node in sorted_nodes {
            let Some(accumulated_grad) = grad_map.remove(&node.get_node_id()) else {
                continue;
            };
            let (grad_fn, requires_grad) = {
                let guard = node.read_data();
                (guard.grad_fn.clone(), guard.requires_grad)
            };

            match grad_fn {
                Some(op) => {
                    let input_grads = op.backward(&accumulated_grad)?;
                    let inputs = op.inputs();
                    if input_grads.len() != inputs.len() {
                        return Err(GraphAggError::BackwardError(format!(
                            "BackwardOp returned {} gradients, but expected {} (for op: {:?})",
                            input_grads.len(),
                            inputs.len(),
                            op
                        )));
                    }
                    trace!("backward: {:?} produced {} input gradients", op, inputs.len());
                    for (input, grad_to_add) in inputs.into_iter().zip(input_grads) {
                        if !input.requires_grad() {
                            continue;
                        }
                        let id = input.get_node_id();
                        let merged = match grad_map.remove(&id) {
                            Some(existing) => add_buffers(&existing, &grad_to_add)?,
                            None => grad_to_add,
                        };
                        grad_map.insert(id, merged);
                    }
                }
                None if requires_grad => node.acc_grad(accumulated_grad)?,
                None => {}
            }
        }

        Ok(())
    }
}

/// Element-wise sum of two same-shaped gradients, outside of the graph.
fn add_buffers(a: &Tensor, b: &Tensor) -> Result<Tensor, GraphAggError> {
    if a.shape() != b.shape() {
        return Err(GraphAggError::BackwardError(format!(
            "Cannot accumulate gradients of shapes {:?} and {:?}",
            a.shape(),
            b.shape()
        )));
    }
    let lhs = a.buffer();
    let rhs = b.buffer();
    let data = lhs.iter().zip(rhs.iter()).map(|(x, y)| x + y).collect();
    Tensor::new(data, a.shape())
}
