use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::GraphAggError;
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;

/// Stable identity of a graph node: the address of its shared `TensorData`.
///
/// Only ever compared and hashed, never dereferenced.
pub type NodeId = *const RwLock<TensorData>;

#[derive(Clone, Copy, PartialEq, Eq)]
enum VisitState {
    InProgress,
    Done,
}

/// Orders the graph reachable from `root` so that every node comes before
/// the inputs it was computed from (`root` first, leaves last).
///
/// Fails with `CycleDetected` if the graph is not acyclic.
pub fn topological_sort(root: &Tensor) -> Result<Vec<Tensor>, GraphAggError> {
    let mut state: HashMap<NodeId, VisitState> = HashMap::new();
    let mut post_order: Vec<Tensor> = Vec::new();
    // (node, inputs already expanded)
    let mut stack: Vec<(Tensor, bool)> = vec![(root.clone(), false)];

    while let Some((node, expanded)) = stack.pop() {
        let id = node.get_node_id();
        if expanded {
            state.insert(id, VisitState::Done);
            post_order.push(node);
            continue;
        }
        match state.get(&id) {
            Some(VisitState::Done) => continue,
            Some(VisitState::InProgress) => return Err(GraphAggError::CycleDetected),
            None => {}
        }
        state.insert(id, VisitState::InProgress);
        let grad_fn = node.read_data().grad_fn.clone();
        stack.push((node, true));
        if let Some(op) = grad_fn {
            for input in op.inputs() {
                match state.get(&input.get_node_id()) {
                    Some(VisitState::Done) => {}
                    Some(VisitState::InProgress) => return Err(GraphAggError::CycleDetected),
                    None => stack.push((input, false)),
                }
            }
        }
    }

    post_order.reverse();
    Ok(post_order)
}

impl Tensor {
    /// Returns the graph identity of this tensor.
    pub fn get_node_id(&self) -> NodeId {
        Arc::as_ptr(&self.data)
    }
}
