// src/autograd/mod.rs

pub mod backward_op;
pub mod grad_check;
pub mod graph;

pub use backward_op::BackwardOp;
pub use graph::{topological_sort, NodeId};
